//! ServiceModel から各Kubernetesリソースのドキュメントを生成するシリアライザー
//!
//! すべて純粋関数で、入力はメモリ上のモデルのみ。

mod deployment;
mod env_group;
mod ingress;
mod pvc;
mod service;

pub use deployment::serialize_deployment;
pub use env_group::{serialize_config_map, serialize_secret};
pub use ingress::serialize_ingress;
pub use pvc::serialize_persistent_volume_claim;
pub use service::serialize_service;

use crate::document::ManifestDocument;
use crate::error::{ManifestError, Result};
use crate::group::{ContainerGroup, ContainerGroupIndex};
use crate::kind::ResourceKind;
use crate::naming::{self, NamingScheme};
use kubeforge_core::{EnvVariableKind, NamedVolume, ServiceModel, is_dns_label};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// 環境ごとに一度だけ解決されるプラットフォームフラグ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformFlags {
    pub ingress_class: Option<String>,
    pub cert_manager: bool,
    pub use_node_port_for_ingress: bool,
}

/// 1サービスから生成されるリソース（種別タグ＋識別子）
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<'a> {
    Deployment,
    Service,
    Ingress,
    Secret(ContainerGroup),
    ConfigMap(ContainerGroup),
    PersistentVolumeClaim(&'a NamedVolume),
}

impl Resource<'_> {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Deployment => ResourceKind::Deployment,
            Resource::Service => ResourceKind::Service,
            Resource::Ingress => ResourceKind::Ingress,
            Resource::Secret(_) => ResourceKind::Secret,
            Resource::ConfigMap(_) => ResourceKind::ConfigMap,
            Resource::PersistentVolumeClaim(_) => ResourceKind::PersistentVolumeClaim,
        }
    }

    /// `metadata.name` になる名前
    pub fn object_name(&self, model: &ServiceModel) -> String {
        match self {
            Resource::Deployment | Resource::Service => model.name.clone(),
            Resource::Ingress => naming::INGRESS_NAME.to_string(),
            Resource::Secret(group) => naming::secret_name(group),
            Resource::ConfigMap(group) => naming::config_map_name(group),
            Resource::PersistentVolumeClaim(volume) => naming::pvc_name(&volume.source),
        }
    }

    /// 出力先のパス
    ///
    /// パスに入る名前（サービス名、グループ名、PVC名）はDNS-1123ラベルでなければ
    /// エラーにする。環境ディレクトリの外を指すパスは作らない。
    pub fn path(&self, model: &ServiceModel, naming: &NamingScheme<'_>) -> Result<PathBuf> {
        let kind = self.kind();
        require_label(model, kind, "name", &model.name)?;

        let disambiguator = match self {
            Resource::Secret(group) | Resource::ConfigMap(group) => {
                if let Some(id) = group.container_id() {
                    require_label(model, kind, "container", id)?;
                }
                Some(self.object_name(model))
            }
            Resource::PersistentVolumeClaim(volume) => {
                let name = self.object_name(model);
                if !is_dns_label(&name) {
                    return Err(ManifestError::InvalidName {
                        service: model.name.clone(),
                        kind,
                        field: "volume".to_string(),
                        value: volume.source.clone(),
                    });
                }
                Some(name)
            }
            _ => None,
        };
        Ok(naming.file_path(kind, disambiguator.as_deref()))
    }

    pub fn serialize(&self, model: &ServiceModel, flags: &PlatformFlags) -> Result<ManifestDocument> {
        match self {
            Resource::Deployment => serialize_deployment(model),
            Resource::Service => Ok(serialize_service(model, flags)),
            Resource::Ingress => serialize_ingress(model, flags),
            Resource::Secret(group) => Ok(serialize_secret(model, group)),
            Resource::ConfigMap(group) => Ok(serialize_config_map(model, group)),
            Resource::PersistentVolumeClaim(volume) => {
                serialize_persistent_volume_claim(model, volume)
            }
        }
    }
}

/// サービスから生成するリソースの一覧
///
/// 順序: Deployment, Service, Secret(グループ順), ConfigMap(グループ順), PVC, Ingress
pub fn plan(model: &ServiceModel) -> Vec<Resource<'_>> {
    let mut resources = vec![Resource::Deployment, Resource::Service];

    let secrets = ContainerGroupIndex::build(&model.environment, EnvVariableKind::SharedSecret);
    resources.extend(secrets.groups().cloned().map(Resource::Secret));

    let config_maps =
        ContainerGroupIndex::build(&model.environment, EnvVariableKind::SharedEnvVariable);
    resources.extend(config_maps.groups().cloned().map(Resource::ConfigMap));

    // 同じボリュームを複数箇所にマウントしてもPVCは1つ
    let mut sources = HashSet::new();
    resources.extend(
        model
            .named_volumes()
            .filter(|volume| sources.insert(volume.source.as_str()))
            .map(Resource::PersistentVolumeClaim),
    );

    if !model.virtual_hosts.is_empty() {
        resources.push(Resource::Ingress);
    }

    resources
}

/// 必須項目の取り出し（未設定ならValidationError）
fn require<'m>(
    model: &ServiceModel,
    kind: ResourceKind,
    field: &str,
    value: Option<&'m str>,
    hint: &str,
) -> Result<&'m str> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ManifestError::Validation {
            service: model.name.clone(),
            kind,
            field: field.to_string(),
            hint: hint.to_string(),
        })
}

/// リソース名に使う値の検証（DNS-1123ラベルでなければInvalidName）
fn require_label<'v>(
    model: &ServiceModel,
    kind: ResourceKind,
    field: &str,
    value: &'v str,
) -> Result<&'v str> {
    if is_dns_label(value) {
        Ok(value)
    } else {
        Err(ManifestError::InvalidName {
            service: model.name.clone(),
            kind,
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubeforge_core::{EnvVariable, VirtualHost, Volume};

    #[test]
    fn test_plan_minimal_service() {
        let model = ServiceModel::new("web");
        let kinds: Vec<_> = plan(&model).iter().map(Resource::kind).collect();
        assert_eq!(kinds, vec![ResourceKind::Deployment, ResourceKind::Service]);
    }

    #[test]
    fn test_plan_full_service() {
        let mut model = ServiceModel::new("web");
        model
            .environment
            .insert(EnvVariable::shared_secret("API_KEY", "x").with_container("worker"));
        model.environment.insert(EnvVariable::shared_secret("TOKEN", "y"));
        model.environment.insert(EnvVariable::shared_env("MODE", "prod"));
        model.volumes.push(Volume::Named(
            NamedVolume::new("my_data", "/data").with_storage("1Gi"),
        ));
        model.virtual_hosts.push(VirtualHost::new("a.example.com", 80));

        let resources = plan(&model);
        let names: Vec<_> = resources.iter().map(|r| r.object_name(&model)).collect();
        assert_eq!(
            names,
            vec![
                "web",
                "web",
                "secrets-worker",
                "default-secrets",
                "default-configMap",
                "pvc-my-data-pvc",
                "ingress",
            ]
        );
    }

    #[test]
    fn test_resource_paths() {
        let mut model = ServiceModel::new("web");
        model.volumes.push(Volume::Named(NamedVolume::new("data", "/data")));
        let env_dir = std::path::Path::new("kubernetes-prod");
        let naming = NamingScheme::new(env_dir, "web", false);

        let pvc = Resource::PersistentVolumeClaim(model.named_volumes().next().unwrap());
        assert_eq!(
            pvc.path(&model, &naming).unwrap(),
            env_dir.join("web").join("pvc-data-pvc.yml")
        );
        assert_eq!(
            Resource::Secret(ContainerGroup::Container("api".to_string()))
                .path(&model, &naming)
                .unwrap(),
            env_dir.join("secrets-api.yml")
        );
    }

    #[test]
    fn test_resource_path_rejects_traversal() {
        let env_dir = std::path::Path::new("kubernetes-prod");

        let model = ServiceModel::new("../escaped");
        let naming = NamingScheme::new(env_dir, &model.name, false);
        assert!(matches!(
            Resource::Deployment.path(&model, &naming),
            Err(ManifestError::InvalidName { ref field, .. }) if field == "name"
        ));

        let model = ServiceModel::new("web");
        let naming = NamingScheme::new(env_dir, &model.name, false);
        let group = ContainerGroup::Container("x/../../pwned".to_string());
        assert!(matches!(
            Resource::ConfigMap(group).path(&model, &naming),
            Err(ManifestError::InvalidName { ref value, .. }) if value == "x/../../pwned"
        ));

        let mut model = ServiceModel::new("web");
        model.volumes.push(Volume::Named(NamedVolume::new("../data", "/data")));
        let naming = NamingScheme::new(env_dir, &model.name, false);
        let pvc = Resource::PersistentVolumeClaim(model.named_volumes().next().unwrap());
        assert!(matches!(
            pvc.path(&model, &naming),
            Err(ManifestError::InvalidName { ref value, .. }) if value == "../data"
        ));
    }

    #[test]
    fn test_plan_shares_pvc_between_mounts() {
        let mut model = ServiceModel::new("db");
        model.volumes.push(Volume::Named(NamedVolume::new("data", "/a")));
        model.volumes.push(Volume::Named(NamedVolume::new("data", "/b")));

        let pvcs = plan(&model)
            .into_iter()
            .filter(|r| r.kind() == ResourceKind::PersistentVolumeClaim)
            .count();
        assert_eq!(pvcs, 1);
    }
}
