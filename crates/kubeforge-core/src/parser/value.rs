//! KDL値の取り出しヘルパー

use kdl::{KdlNode, KdlValue};

/// 位置引数（名前なしエントリ）を順番に返す
pub fn arguments(node: &KdlNode) -> impl Iterator<Item = &KdlValue> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .map(|e| e.value())
}

/// n番目の位置引数
pub fn argument(node: &KdlNode, index: usize) -> Option<&KdlValue> {
    arguments(node).nth(index)
}

/// 文字列プロパティ
pub fn string_property(node: &KdlNode, key: &str) -> Option<String> {
    node.get(key).and_then(|v| v.as_string()).map(|s| s.to_string())
}

/// スカラー値を文字列として取り出す（環境変数値用）
pub fn scalar_to_string(value: &KdlValue) -> String {
    if let Some(s) = value.as_string() {
        s.to_string()
    } else if let Some(i) = value.as_integer() {
        i.to_string()
    } else if let Some(f) = value.as_float() {
        f.to_string()
    } else if let Some(b) = value.as_bool() {
        b.to_string()
    } else {
        String::new()
    }
}
