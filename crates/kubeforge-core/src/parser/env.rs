//! 環境変数ブロックのパース

use super::value::{argument, scalar_to_string, string_property};
use crate::error::{FlowError, Result};
use crate::model::{EnvVariable, EnvVariableKind, is_dns_label};
use kdl::KdlNode;

/// env ブロック内の1エントリをパース
///
/// 形式: KEY "value" type="shared-secret" container="worker" comment="..."
pub fn parse_env_entry(node: &KdlNode) -> Result<EnvVariable> {
    let key = node.name().value().to_string();
    let value = argument(node, 0).map(scalar_to_string).unwrap_or_default();

    let kind = match string_property(node, "type") {
        Some(raw) => EnvVariableKind::parse(&raw).ok_or_else(|| {
            FlowError::InvalidConfig(format!(
                "環境変数 {key} の type が不正です: {raw} (container, shared-env, shared-secret のいずれか)"
            ))
        })?,
        None => EnvVariableKind::Container,
    };

    // コンテナIDはSecret/ConfigMapの名前とファイル名になる
    let container_id = string_property(node, "container").filter(|id| !id.is_empty());
    if let Some(id) = container_id.as_deref().filter(|id| !is_dns_label(id)) {
        return Err(FlowError::InvalidName {
            field: "container",
            value: id.to_string(),
        });
    }

    Ok(EnvVariable {
        key,
        value,
        comment: string_property(node, "comment"),
        kind,
        container_id,
    })
}

/// フラットな env "KEY=VALUE" 形式をパース
pub fn parse_flat_env(node: &KdlNode) -> Option<EnvVariable> {
    let raw = argument(node, 0)?.as_string()?;
    let (key, value) = raw.split_once('=')?;
    Some(EnvVariable::container(key.trim(), value.trim()))
}
