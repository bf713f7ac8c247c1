//! Deployment

use super::{require, require_label};
use crate::document::{ManifestDocument, Mapping, Node};
use crate::error::Result;
use crate::group::{ContainerGroup, ContainerGroupIndex};
use crate::kind::ResourceKind;
use crate::naming;
use kubeforge_core::{EnvVariableKind, ServiceModel, Volume};
use std::collections::HashSet;
use tracing::warn;

/// 依存サービスの名前解決を待つinitコンテナのイメージ
pub const INIT_CONTAINER_IMAGE: &str = "busybox";

const IMAGE_HINT: &str = "service ブロックに image \"<イメージ名>\" を指定してください";
const RESOURCES_HINT: &str =
    "resources profile=\"small\" を指定するか、kforge apply --profile で既定値を補ってください";

/// DeploymentのドキュメントをServiceModelから生成
///
/// コンテナは現状1つ。コンテナ専用の環境変数は `env` に展開し、共有変数は
/// グループごとのSecret/ConfigMapを `envFrom` で参照する。
pub fn serialize_deployment(model: &ServiceModel) -> Result<ManifestDocument> {
    let kind = ResourceKind::Deployment;
    let image = require(model, kind, "image", model.image.as_deref(), IMAGE_HINT)?;

    let [request_cpu, request_memory, limit_cpu, limit_memory] =
        model.resources.fields().map(|(field, value, _)| {
            require(model, kind, field, value, RESOURCES_HINT).map(Node::str)
        });
    let requests = Mapping::new()
        .with("cpu", request_cpu?)
        .with("memory", request_memory?);
    let limits = Mapping::new()
        .with("cpu", limit_cpu?)
        .with("memory", limit_memory?);

    let env: Vec<Node> = model
        .container_env()
        .map(|var| {
            Mapping::new()
                .with("name", var.key.as_str())
                .with(
                    "value",
                    Node::str(var.value.as_str()).with_comment(var.comment.as_deref()),
                )
                .into()
        })
        .collect();

    let (volume_mounts, volumes) = volume_entries(model);
    let init_containers = init_containers(model)?;

    let container = Mapping::new()
        .with("name", model.name.as_str())
        .with("image", image)
        .with("imagePullPolicy", "Always")
        .with(
            "resources",
            Mapping::new().with("requests", requests).with("limits", limits),
        )
        .with_non_empty("env", env)
        .with_opt("args", model.command.as_ref().map(|args| Node::str_seq(args)))
        .with_non_empty("envFrom", env_from_entries(model)?)
        .with_non_empty("volumeMounts", volume_mounts);

    let labels = || Mapping::new().with("app", model.name.as_str());

    let pod_spec = Mapping::new()
        .with_non_empty("initContainers", init_containers)
        .with("containers", Node::seq([container.into()]))
        .with_non_empty("volumes", volumes);

    let spec = Mapping::new()
        .with("replicas", Node::int(1))
        .with("selector", Mapping::new().with("matchLabels", labels()))
        .with(
            "template",
            Mapping::new()
                .with("metadata", Mapping::new().with("labels", labels()))
                .with("spec", pod_spec),
        );

    Ok(ManifestDocument::new(
        kind,
        &model.name,
        Mapping::new().with("labels", labels()),
        Mapping::new().with("spec", spec),
    ))
}

/// 共有シークレット・共有変数グループへの参照
///
/// グループ単位で1エントリのみ生成する。
fn env_from_entries(model: &ServiceModel) -> Result<Vec<Node>> {
    let secrets = ContainerGroupIndex::build(&model.environment, EnvVariableKind::SharedSecret);
    let config_maps =
        ContainerGroupIndex::build(&model.environment, EnvVariableKind::SharedEnvVariable);

    for id in secrets
        .groups()
        .chain(config_maps.groups())
        .filter_map(ContainerGroup::container_id)
    {
        require_label(model, ResourceKind::Deployment, "container", id)?;
    }

    let secret_refs = secrets.groups().map(|group| {
        Mapping::new()
            .with(
                "secretRef",
                Mapping::new()
                    .with("name", naming::secret_name(group))
                    .with("optional", Node::bool(false)),
            )
            .into()
    });
    let config_map_refs = config_maps.groups().map(|group| {
        Mapping::new()
            .with(
                "configMapRef",
                Mapping::new().with("name", naming::config_map_name(group)),
            )
            .into()
    });

    Ok(secret_refs.chain(config_map_refs).collect())
}

/// 名前付きボリュームの volumeMounts と volumes
///
/// 同じボリュームを複数のパスにマウントできる。volumes はボリューム名で、
/// volumeMounts はマウント先で一意にする。
fn volume_entries(model: &ServiceModel) -> (Vec<Node>, Vec<Node>) {
    let mut mounts = Vec::new();
    let mut volumes = Vec::new();
    let mut targets = HashSet::new();
    let mut sources = HashSet::new();

    for volume in &model.volumes {
        let named = match volume {
            Volume::Named(named) => named,
            Volume::Bind(bind) => {
                warn!(
                    service = %model.name,
                    source = %bind.source,
                    target = %bind.target,
                    "Bind volumes have no Kubernetes counterpart; skipping"
                );
                continue;
            }
        };

        if !targets.insert(named.target.as_str()) {
            warn!(
                service = %model.name,
                source = %named.source,
                target = %named.target,
                "Mount path already used; skipping"
            );
            continue;
        }

        let mount = Mapping::new()
            .with(
                "name",
                Node::str(named.source.as_str()).with_comment(named.comment.as_deref()),
            )
            .with("mountPath", named.target.as_str());
        let mount = if named.read_only {
            mount.with("readOnly", Node::bool(true))
        } else {
            mount
        };
        mounts.push(mount.into());

        if sources.insert(named.source.as_str()) {
            volumes.push(
                Mapping::new()
                    .with("name", named.source.as_str())
                    .with(
                        "persistentVolumeClaim",
                        Mapping::new().with("claimName", naming::pvc_name(&named.source)),
                    )
                    .into(),
            );
        }
    }

    (mounts, volumes)
}

/// 依存サービスごとに名前解決を待つinitコンテナ
///
/// 依存名はシェルスクリプトに埋め込まれるため、DNS-1123ラベル以外は拒否する。
fn init_containers(model: &ServiceModel) -> Result<Vec<Node>> {
    let kind = ResourceKind::Deployment;
    model
        .depends_on
        .iter()
        .map(|dep| {
            let dep = require_label(model, kind, "depends_on", dep)?;
            let script = format!("until nslookup {dep}; do echo waiting for {dep}; sleep 2; done;");
            Ok(Mapping::new()
                .with("name", naming::init_container_name(dep))
                .with("image", INIT_CONTAINER_IMAGE)
                .with("command", Node::str_seq(["sh", "-c", script.as_str()]))
                .into())
        })
        .collect()
}
