//! リソース名とファイルパスの命名規則
//!
//! 同じ入力からは常に同じ名前・パスを返す。マージが収束する前提条件。

use crate::group::ContainerGroup;
use crate::kind::ResourceKind;
use std::path::{Path, PathBuf};

const MANIFEST_EXT: &str = "yml";
const TEMPLATE_EXT: &str = "yml.template";

/// 共有Ingressのオブジェクト名
pub const INGRESS_NAME: &str = "ingress";

pub fn secret_name(group: &ContainerGroup) -> String {
    match group.container_id() {
        None => "default-secrets".to_string(),
        Some(id) => format!("secrets-{id}"),
    }
}

/// ConfigMap名
///
/// `configMap` の大文字は既存の環境ディレクトリで使われている固定名のため変更しない。
/// DNS-1123 の小文字制約は満たさないが、この名前で参照しているマニフェストがある。
pub fn config_map_name(group: &ContainerGroup) -> String {
    match group.container_id() {
        None => "default-configMap".to_string(),
        Some(id) => format!("configMap-{id}"),
    }
}

/// PVC名（Kubernetesのオブジェクト名に使えない `_` と `/` は `-` に置換）
pub fn pvc_name(volume_source: &str) -> String {
    let sanitized: String = volume_source
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == '/' { '-' } else { c })
        .collect();
    format!("pvc-{sanitized}-pvc")
}

/// 依存サービス待ちのinitコンテナ名
pub fn init_container_name(dependency: &str) -> String {
    format!("init-{dependency}")
}

/// cert-manager が発行する証明書のSecret名
pub fn tls_secret_name(service: &str) -> String {
    format!("{service}-tls")
}

/// 環境ディレクトリ内のサービスごとのファイル配置
#[derive(Debug, Clone)]
pub struct NamingScheme<'a> {
    env_dir: &'a Path,
    service: &'a str,
    templated: bool,
}

impl<'a> NamingScheme<'a> {
    /// `templated` の場合、DeploymentとIngressは `.yml.template` になる
    pub fn new(env_dir: &'a Path, service: &'a str, templated: bool) -> Self {
        Self {
            env_dir,
            service,
            templated,
        }
    }

    pub fn service_dir(&self) -> PathBuf {
        self.env_dir.join(self.service)
    }

    /// リソースの出力先
    ///
    /// - Deployment / Service / PVC: `<env>/<service>/` 配下
    /// - Secret / ConfigMap: グループ単位で `<env>/<グループ名>.yml`
    /// - Ingress: `<env>/ingress.yml`
    ///
    /// `disambiguator` はSecret/ConfigMapのグループ名、PVC名。
    pub fn file_path(&self, kind: ResourceKind, disambiguator: Option<&str>) -> PathBuf {
        match kind {
            ResourceKind::Deployment => self
                .service_dir()
                .join(format!("deployment.{}", self.extension())),
            ResourceKind::Service => self.service_dir().join(format!("service.{MANIFEST_EXT}")),
            ResourceKind::PersistentVolumeClaim => {
                let stem = disambiguator.unwrap_or("persistentvolumeclaim");
                self.service_dir().join(format!("{stem}.{MANIFEST_EXT}"))
            }
            ResourceKind::Secret => {
                let stem = disambiguator
                    .map(str::to_string)
                    .unwrap_or_else(|| secret_name(&ContainerGroup::Default));
                self.env_dir.join(format!("{stem}.{MANIFEST_EXT}"))
            }
            ResourceKind::ConfigMap => {
                let stem = disambiguator
                    .map(str::to_string)
                    .unwrap_or_else(|| config_map_name(&ContainerGroup::Default));
                self.env_dir.join(format!("{stem}.{MANIFEST_EXT}"))
            }
            ResourceKind::Ingress => self
                .env_dir
                .join(format!("{INGRESS_NAME}.{}", self.extension())),
        }
    }

    fn extension(&self) -> &'static str {
        if self.templated {
            TEMPLATE_EXT
        } else {
            MANIFEST_EXT
        }
    }
}
