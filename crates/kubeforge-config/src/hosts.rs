//! 仮想ホストの補完

use kubeforge_core::{ENVIRONMENT_PLACEHOLDER, ServiceModel};
use tracing::debug;

/// ホスト未指定の仮想ホストを `<サービス名>.<ベースドメイン>` で埋める
///
/// 複数環境テンプレートのサービスでは `<サービス名>.#ENVIRONMENT#.<ベースドメイン>`。
/// ベースドメインがなければ何もしない（Ingress 生成時に検証エラーになる）。
pub fn resolve_virtual_hosts(model: &mut ServiceModel, base_virtual_host: Option<&str>) {
    let Some(base) = base_virtual_host.map(str::trim).filter(|b| !b.is_empty()) else {
        return;
    };

    let host = if model.is_templated() {
        format!("{}.{ENVIRONMENT_PLACEHOLDER}.{base}", model.name)
    } else {
        format!("{}.{base}", model.name)
    };

    for vhost in model.virtual_hosts.iter_mut().filter(|v| v.host.is_none()) {
        debug!(service = %model.name, host = %host, port = vhost.port, "Virtual host resolved");
        vhost.host = Some(host.clone());
    }
}
