//! マニフェストの抽象ドキュメントツリー
//!
//! マッピング・シーケンス・スカラーからなる順序付きのツリーです。
//! スカラーには注釈コメントを付けられますが、コメントは等価比較とマージの
//! 判定には影響しません。

use crate::kind::ResourceKind;
use std::fmt;

/// スカラー値
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

/// 注釈付きスカラー（葉ノード）
#[derive(Debug, Clone)]
pub struct Leaf {
    pub value: Scalar,
    pub comment: Option<String>,
}

impl Leaf {
    pub fn new(value: Scalar) -> Self {
        Self {
            value,
            comment: None,
        }
    }
}

// コメントは比較対象外
impl PartialEq for Leaf {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// ツリーのノード
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Mapping(Mapping),
    Sequence(Vec<Node>),
    Scalar(Leaf),
}

impl Node {
    pub fn str(value: impl Into<String>) -> Self {
        Node::Scalar(Leaf::new(Scalar::Str(value.into())))
    }

    pub fn int(value: i64) -> Self {
        Node::Scalar(Leaf::new(Scalar::Int(value)))
    }

    pub fn bool(value: bool) -> Self {
        Node::Scalar(Leaf::new(Scalar::Bool(value)))
    }

    /// スカラーに注釈を付ける（スカラー以外と `None` はそのまま）
    pub fn with_comment(self, comment: Option<&str>) -> Self {
        match (self, comment) {
            (Node::Scalar(leaf), Some(comment)) => Node::Scalar(Leaf {
                comment: Some(comment.to_string()),
                ..leaf
            }),
            (node, _) => node,
        }
    }

    pub fn seq(items: impl IntoIterator<Item = Node>) -> Self {
        Node::Sequence(items.into_iter().collect())
    }

    /// 文字列のシーケンス
    pub fn str_seq<S: AsRef<str>>(items: impl IntoIterator<Item = S>) -> Self {
        Node::seq(items.into_iter().map(|s| Node::str(s.as_ref())))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Node::Scalar(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_leaf().and_then(|leaf| leaf.value.as_str())
    }

    /// ドット区切りではなくキー列で子孫を辿る
    pub fn get_path(&self, path: &[&str]) -> Option<&Node> {
        path.iter()
            .try_fold(self, |node, key| node.as_mapping()?.get(key))
    }
}

impl From<Mapping> for Node {
    fn from(mapping: Mapping) -> Self {
        Node::Mapping(mapping)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::str(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::str(value)
    }
}

/// 挿入順を保持するマッピング
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// キーを追加したマッピングを返す（ビルダー）
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Node>) -> Self {
        self.insert(key, value);
        self
    }

    /// 値がある場合のみキーを追加する
    pub fn with_opt(self, key: impl Into<String>, value: Option<impl Into<Node>>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// シーケンスが空でない場合のみキーを追加する
    pub fn with_non_empty(self, key: impl Into<String>, items: Vec<Node>) -> Self {
        if items.is_empty() {
            self
        } else {
            self.with(key, Node::Sequence(items))
        }
    }

    /// 既存のキーは位置を保ったまま置き換える
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Node>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

/// 1つのKubernetesオブジェクトを表すドキュメント
///
/// シリアライザーが生成するドキュメントは必ず `apiVersion`・`kind`・
/// `metadata.name` を持つ。ディスクから読み込んだドキュメントはこの限りではなく、
/// 欠落はマージ時にスキーマ不一致として扱われる。
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    root: Mapping,
}

impl ManifestDocument {
    /// ヘッダーとメタデータ、本体からドキュメントを組み立てる
    ///
    /// `metadata` の `name` は常に先頭に置かれる。
    pub fn new(kind: ResourceKind, name: &str, metadata: Mapping, body: Mapping) -> Self {
        let mut meta = Mapping::new().with("name", name);
        for (key, value) in metadata.iter() {
            if key != "name" {
                meta.insert(key, value.clone());
            }
        }

        let mut root = Mapping::new()
            .with("apiVersion", kind.api_version())
            .with("kind", kind.kind())
            .with("metadata", meta);
        for (key, value) in body.iter() {
            root.insert(key, value.clone());
        }

        Self { root }
    }

    /// 読み込んだツリーをそのまま包む
    pub fn from_root(root: Mapping) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    pub fn into_root(self) -> Mapping {
        self.root
    }

    pub fn api_version(&self) -> Option<&str> {
        self.root.get("apiVersion").and_then(Node::as_str)
    }

    pub fn kind(&self) -> Option<&str> {
        self.root.get("kind").and_then(Node::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.get_path(&["metadata", "name"]).and_then(Node::as_str)
    }

    pub fn get_path(&self, path: &[&str]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        self.root.get(first)?.get_path(rest)
    }

    /// `apiVersion/kind` 形式の識別子（比較・エラー表示用）
    pub fn type_id(&self) -> String {
        format!(
            "{}/{}",
            self.api_version().unwrap_or("<none>"),
            self.kind().unwrap_or("<none>")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_header() {
        let doc = ManifestDocument::new(
            ResourceKind::Service,
            "web",
            Mapping::new().with("labels", Mapping::new().with("app", "web")),
            Mapping::new().with("spec", Mapping::new()),
        );

        let keys: Vec<_> = doc.root().iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["apiVersion", "kind", "metadata", "spec"]);
        assert_eq!(doc.api_version(), Some("v1"));
        assert_eq!(doc.kind(), Some("Service"));
        assert_eq!(doc.name(), Some("web"));
        assert_eq!(
            doc.get_path(&["metadata", "labels", "app"]).and_then(Node::as_str),
            Some("web")
        );
    }

    #[test]
    fn test_name_cannot_be_overridden_by_metadata() {
        let doc = ManifestDocument::new(
            ResourceKind::Secret,
            "default-secrets",
            Mapping::new().with("name", "other"),
            Mapping::new(),
        );
        assert_eq!(doc.name(), Some("default-secrets"));
    }

    #[test]
    fn test_comment_does_not_affect_equality() {
        let a = Node::str("x").with_comment(Some("note"));
        let b = Node::str("x");
        assert_eq!(a, b);
        assert_ne!(Node::str("x"), Node::str("y"));
    }

    #[test]
    fn test_mapping_insert_keeps_position() {
        let mut mapping = Mapping::new().with("a", "1").with("b", "2");
        mapping.insert("a", "3");

        let entries: Vec<_> = mapping
            .iter()
            .map(|(k, v)| (k, v.as_str().unwrap()))
            .collect();
        assert_eq!(entries, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_builder_skips_empty() {
        let mapping = Mapping::new()
            .with_opt("present", Some("x"))
            .with_opt("absent", None::<&str>)
            .with_non_empty("items", vec![]);
        assert_eq!(mapping.len(), 1);
        assert!(mapping.contains_key("present"));
    }
}
