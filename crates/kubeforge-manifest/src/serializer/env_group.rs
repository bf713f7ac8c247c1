//! Secret / ConfigMap（共有変数のコンテナグループ単位）

use crate::document::{ManifestDocument, Mapping, Node};
use crate::group::{ContainerGroup, ContainerGroupIndex};
use crate::kind::ResourceKind;
use crate::naming;
use kubeforge_core::{EnvVariableKind, ServiceModel};

/// グループの共有シークレットを `stringData` に持つSecret
pub fn serialize_secret(model: &ServiceModel, group: &ContainerGroup) -> ManifestDocument {
    grouped_document(
        model,
        group,
        EnvVariableKind::SharedSecret,
        ResourceKind::Secret,
        "stringData",
        naming::secret_name(group),
    )
}

/// グループの共有環境変数を `data` に持つConfigMap
pub fn serialize_config_map(model: &ServiceModel, group: &ContainerGroup) -> ManifestDocument {
    grouped_document(
        model,
        group,
        EnvVariableKind::SharedEnvVariable,
        ResourceKind::ConfigMap,
        "data",
        naming::config_map_name(group),
    )
}

fn grouped_document(
    model: &ServiceModel,
    group: &ContainerGroup,
    env_kind: EnvVariableKind,
    kind: ResourceKind,
    data_key: &str,
    name: String,
) -> ManifestDocument {
    let index = ContainerGroupIndex::build(&model.environment, env_kind);
    let data: Mapping = index
        .get(group)
        .unwrap_or_default()
        .iter()
        .map(|var| {
            (
                var.key.as_str(),
                Node::str(var.value.as_str()).with_comment(var.comment.as_deref()),
            )
        })
        .collect();

    ManifestDocument::new(kind, &name, Mapping::new(), Mapping::new().with(data_key, data))
}
