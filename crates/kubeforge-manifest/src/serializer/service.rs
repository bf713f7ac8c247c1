//! Service（Kubernetesのサービスオブジェクト）

use super::PlatformFlags;
use crate::document::{ManifestDocument, Mapping, Node};
use crate::kind::ResourceKind;
use kubeforge_core::ServiceModel;
use std::collections::HashSet;
use tracing::warn;

/// ポート名（全ポート共通）
pub const PORT_NAME: &str = "http";

/// Serviceのドキュメントを生成
///
/// NodePort経由のIngressを使うプラットフォームで、かつ仮想ホストを持つ場合のみ
/// `type: NodePort` を設定する。それ以外は既定（ClusterIP）のまま。
/// 公開ポートが重複する場合は最初の定義を使う。
pub fn serialize_service(model: &ServiceModel, flags: &PlatformFlags) -> ManifestDocument {
    let mut seen = HashSet::new();
    let ports: Vec<Node> = model
        .ports
        .iter()
        .filter(|port| {
            let first = seen.insert(port.source);
            if !first {
                warn!(service = %model.name, port = port.source, "Duplicate port; skipping");
            }
            first
        })
        .map(|port| {
            Mapping::new()
                .with("name", PORT_NAME)
                .with(
                    "port",
                    Node::int(i64::from(port.source)).with_comment(port.comment.as_deref()),
                )
                .with("targetPort", Node::int(i64::from(port.target)))
                .into()
        })
        .collect();

    let node_port = flags.use_node_port_for_ingress && !model.virtual_hosts.is_empty();

    let spec = Mapping::new()
        .with_opt("type", node_port.then_some("NodePort"))
        .with("selector", Mapping::new().with("app", model.name.as_str()))
        .with_non_empty("ports", ports);

    ManifestDocument::new(
        ResourceKind::Service,
        &model.name,
        Mapping::new(),
        Mapping::new().with("spec", spec),
    )
}
