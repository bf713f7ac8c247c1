//! ポート・仮想ホストノードのパース

use super::value::{argument, string_property};
use crate::error::{FlowError, Result};
use crate::model::{Port, VirtualHost};
use kdl::{KdlNode, KdlValue};

fn as_port(value: &KdlValue) -> Option<Result<u16>> {
    value.as_integer().map(|v| {
        u16::try_from(v)
            .map_err(|_| FlowError::InvalidConfig(format!("ポート番号が範囲外です: {v}")))
    })
}

/// port ノードをパース
///
/// サポートされる形式:
/// - 名前付き引数: port source=80 target=8080
/// - 位置引数: port 80 8080
/// - 単一引数: port 80 （source と target が同じ）
pub fn parse_port(node: &KdlNode) -> Result<Port> {
    // 名前付き引数を優先
    let source = node
        .get("source")
        .and_then(as_port)
        .or_else(|| argument(node, 0).and_then(as_port))
        .ok_or_else(|| FlowError::InvalidConfig("port requires a source port".to_string()))??;

    let target = match node
        .get("target")
        .and_then(as_port)
        .or_else(|| argument(node, 1).and_then(as_port))
    {
        Some(target) => target?,
        None => source,
    };

    Ok(Port {
        source,
        target,
        comment: string_property(node, "comment"),
    })
}

/// virtual_host ノードをパース
///
/// 形式: virtual_host "www.example.com" port=80 comment="..."
/// ホストを省略した場合は後段で解決される。
pub fn parse_virtual_host(node: &KdlNode) -> Result<VirtualHost> {
    let port = node
        .get("port")
        .and_then(as_port)
        .ok_or_else(|| FlowError::InvalidConfig("virtual_host requires port=".to_string()))??;

    let host = argument(node, 0)
        .and_then(|v| v.as_string())
        .or_else(|| node.get("host").and_then(|v| v.as_string()))
        .map(|s| s.to_string());

    Ok(VirtualHost {
        host,
        port,
        comment: string_property(node, "comment"),
    })
}
