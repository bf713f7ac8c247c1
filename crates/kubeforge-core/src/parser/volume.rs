//! ボリュームノードのパース

use super::value::{argument, string_property};
use crate::error::{FlowError, Result};
use crate::model::{BindVolume, NamedVolume, QuantityKind, Volume};
use kdl::KdlNode;
use tracing::warn;

fn source_and_target(node: &KdlNode) -> Result<(String, String)> {
    let source = argument(node, 0).and_then(|v| v.as_string());
    let target = argument(node, 1).and_then(|v| v.as_string());
    match (source, target) {
        (Some(source), Some(target)) => Ok((source.to_string(), target.to_string())),
        _ => Err(FlowError::InvalidConfig(format!(
            "{} requires a source and a target path",
            node.name().value()
        ))),
    }
}

/// volume ノードをパース（名前付きボリューム）
///
/// 形式: volume "data" "/var/lib/data" storage="8Gi" read_only=#true
pub fn parse_named_volume(service: &str, node: &KdlNode) -> Result<Volume> {
    let (source, target) = source_and_target(node)?;

    let request_storage = match string_property(node, "storage") {
        Some(raw) => Some(QuantityKind::Storage.validate(&raw).ok_or_else(|| {
            FlowError::InvalidQuantity {
                service: service.to_string(),
                field: "storage",
                value: raw,
                hint: QuantityKind::Storage.hint(),
            }
        })?),
        None => None,
    };

    Ok(Volume::Named(NamedVolume {
        source,
        target,
        read_only: parse_bool_with_hint(node, "read_only").unwrap_or(false),
        comment: string_property(node, "comment"),
        request_storage,
    }))
}

/// bind ノードをパース（ホストパスのバインド）
pub fn parse_bind_volume(node: &KdlNode) -> Result<Volume> {
    let (source, target) = source_and_target(node)?;

    Ok(Volume::Bind(BindVolume {
        source,
        target,
        read_only: parse_bool_with_hint(node, "read_only").unwrap_or(false),
        comment: string_property(node, "comment"),
    }))
}

/// ブール値をパースし、`true`/`false` 文字列が使用された場合は警告を出力
/// KDL v2では `#true`/`#false` を使用する必要がある
fn parse_bool_with_hint(node: &KdlNode, key: &str) -> Option<bool> {
    let value = node.get(key)?;
    if let Some(b) = value.as_bool() {
        return Some(b);
    }

    match value.as_string() {
        Some(s @ ("true" | "false")) => {
            warn!(
                key,
                value = s,
                "String used for a boolean property; in KDL v2 write #true / #false"
            );
            Some(s == "true")
        }
        _ => None,
    }
}
