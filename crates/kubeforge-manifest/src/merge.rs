//! 既存マニフェストと新規生成ドキュメントのディープマージ
//!
//! - マッピングはキー単位でマージし、既存側にしかないキーは残す
//! - シーケンスは位置ではなく要素の識別キーで突き合わせる
//! - スカラーは新規側が優先。値が同じならコメントは失われない
//!
//! 同じ入力で繰り返しマージしてもシーケンスは伸びず、並びも変わらない。

use crate::document::{Leaf, ManifestDocument, Mapping, Node};

/// `apiVersion`/`kind` の不一致
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaMismatch {
    pub expected: String,
    pub found: String,
}

/// 既存ドキュメント（なければ `None`）に新規ドキュメントをマージする
///
/// 既存側の `apiVersion` と `kind` が新規側と異なる（欠落を含む）場合は
/// 上書きせずにエラーを返す。
pub fn merge(
    existing: Option<&ManifestDocument>,
    incoming: &ManifestDocument,
) -> Result<ManifestDocument, SchemaMismatch> {
    let Some(existing) = existing else {
        return Ok(incoming.clone());
    };

    if existing.api_version() != incoming.api_version() || existing.kind() != incoming.kind() {
        return Err(SchemaMismatch {
            expected: incoming.type_id(),
            found: existing.type_id(),
        });
    }

    Ok(ManifestDocument::from_root(merge_mapping(
        existing.root(),
        incoming.root(),
    )))
}

fn merge_mapping(existing: &Mapping, incoming: &Mapping) -> Mapping {
    let mut merged = existing.clone();
    for (key, value) in incoming.iter() {
        let node = match existing.get(key) {
            Some(current) => merge_node(key, current, value),
            None => value.clone(),
        };
        merged.insert(key, node);
    }
    merged
}

/// `key` は親マッピングでのキー（シーケンスの識別規則の選択に使う）
fn merge_node(key: &str, existing: &Node, incoming: &Node) -> Node {
    match (existing, incoming) {
        (Node::Mapping(a), Node::Mapping(b)) => Node::Mapping(merge_mapping(a, b)),
        (Node::Sequence(a), Node::Sequence(b)) => Node::Sequence(merge_sequence(key, a, b)),
        (Node::Scalar(a), Node::Scalar(b)) => Node::Scalar(merge_leaf(a, b)),
        // 型が違う場合は新規側で置き換える
        (_, incoming) => incoming.clone(),
    }
}

fn merge_leaf(existing: &Leaf, incoming: &Leaf) -> Leaf {
    let comment = match &incoming.comment {
        Some(comment) => Some(comment.clone()),
        None if existing.value == incoming.value => existing.comment.clone(),
        None => None,
    };
    Leaf {
        value: incoming.value.clone(),
        comment,
    }
}

/// シーケンスの要素を識別するキー
///
/// 親キーごとに識別フィールドが決まっている。
fn identity(key: &str, item: &Node) -> Option<String> {
    match key {
        "containers" | "initContainers" | "env" | "volumes" => scalar_at(item, &["name"]),
        // 同じボリュームを複数のパスにマウントできるため、名前ではなくマウント先で照合
        "volumeMounts" => scalar_at(item, &["mountPath"]),
        "envFrom" => scalar_at(item, &["secretRef", "name"])
            .map(|name| format!("secret:{name}"))
            .or_else(|| {
                scalar_at(item, &["configMapRef", "name"]).map(|name| format!("configMap:{name}"))
            }),
        "ports" => scalar_at(item, &["port"])
            .or_else(|| scalar_at(item, &["containerPort"]))
            .or_else(|| scalar_at(item, &["name"])),
        "rules" => scalar_at(item, &["host"]),
        "tls" => scalar_at(item, &["secretName"]),
        "paths" => match scalar_at(item, &["path"]) {
            Some(path) => Some(path),
            None => {
                let service = scalar_at(item, &["backend", "serviceName"])?;
                let port = scalar_at(item, &["backend", "servicePort"]).unwrap_or_default();
                Some(format!("{service}:{port}"))
            }
        },
        _ => None,
    }
}

fn scalar_at(item: &Node, path: &[&str]) -> Option<String> {
    item.get_path(path)
        .and_then(Node::as_leaf)
        .map(|leaf| leaf.value.to_string())
}

/// 丸ごと置き換えるシーケンス（順序に意味がある引数列）
fn is_atomic(key: &str) -> bool {
    matches!(key, "command" | "args")
}

fn merge_sequence(key: &str, existing: &[Node], incoming: &[Node]) -> Vec<Node> {
    if is_atomic(key) {
        return incoming.to_vec();
    }

    let mut merged: Vec<Node> = existing.to_vec();
    for item in incoming {
        let position = match identity(key, item) {
            Some(id) => merged
                .iter()
                .position(|current| identity(key, current).as_deref() == Some(id.as_str())),
            // 識別キーがなければ構造的に等しい要素を探す（スカラーは値の和集合になる）
            None => merged.iter().position(|current| current == item),
        };

        match position {
            Some(index) => {
                let node = merge_node(key, &merged[index], item);
                merged[index] = node;
            }
            None => merged.push(item.clone()),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Scalar;
    use crate::kind::ResourceKind;

    fn deployment(env_from: Vec<Node>) -> ManifestDocument {
        let container = Mapping::new()
            .with("name", "web")
            .with("envFrom", Node::Sequence(env_from));
        ManifestDocument::new(
            ResourceKind::Deployment,
            "web",
            Mapping::new(),
            Mapping::new().with("containers", Node::seq([container.into()])),
        )
    }

    fn secret_ref(name: &str) -> Node {
        Mapping::new()
            .with("secretRef", Mapping::new().with("name", name))
            .into()
    }

    fn env_from_names(doc: &ManifestDocument) -> Vec<String> {
        doc.get_path(&["containers"])
            .and_then(Node::as_sequence)
            .and_then(|c| c.first())
            .and_then(|c| c.get_path(&["envFrom"]))
            .and_then(Node::as_sequence)
            .unwrap()
            .iter()
            .filter_map(|e| e.get_path(&["secretRef", "name"]).and_then(Node::as_str))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_absent_existing_returns_incoming() {
        let incoming = deployment(vec![secret_ref("secrets-api")]);
        assert_eq!(merge(None, &incoming).unwrap(), incoming);
    }

    #[test]
    fn test_env_from_same_reference_is_not_duplicated() {
        let existing = deployment(vec![secret_ref("secrets-api")]);
        let incoming = deployment(vec![secret_ref("secrets-api")]);

        let merged = merge(Some(&existing), &incoming).unwrap();
        assert_eq!(env_from_names(&merged), vec!["secrets-api"]);
    }

    #[test]
    fn test_env_from_new_reference_is_appended() {
        let existing = deployment(vec![secret_ref("secrets-api")]);
        let incoming = deployment(vec![secret_ref("secrets-web")]);

        let merged = merge(Some(&existing), &incoming).unwrap();
        assert_eq!(env_from_names(&merged), vec!["secrets-api", "secrets-web"]);
    }

    #[test]
    fn test_scalar_precedence() {
        let doc = |cpu: &str| {
            ManifestDocument::new(
                ResourceKind::Deployment,
                "web",
                Mapping::new(),
                Mapping::new().with(
                    "resources",
                    Mapping::new().with("requests", Mapping::new().with("cpu", cpu)),
                ),
            )
        };

        let merged = merge(Some(&doc("0.1")), &doc("0.5")).unwrap();
        assert_eq!(
            merged
                .get_path(&["resources", "requests", "cpu"])
                .and_then(Node::as_str),
            Some("0.5")
        );
    }

    #[test]
    fn test_manual_label_is_preserved() {
        let existing = ManifestDocument::new(
            ResourceKind::Service,
            "web",
            Mapping::new().with(
                "labels",
                Mapping::new().with("app", "web").with("team", "payments"),
            ),
            Mapping::new(),
        );
        let incoming = ManifestDocument::new(
            ResourceKind::Service,
            "web",
            Mapping::new().with("labels", Mapping::new().with("app", "web")),
            Mapping::new().with("spec", Mapping::new().with("selector", Mapping::new())),
        );

        let merged = merge(Some(&existing), &incoming).unwrap();
        assert_eq!(
            merged
                .get_path(&["metadata", "labels", "team"])
                .and_then(Node::as_str),
            Some("payments")
        );
        assert!(merged.get_path(&["spec", "selector"]).is_some());
    }

    #[test]
    fn test_schema_conflict() {
        let existing = ManifestDocument::new(ResourceKind::ConfigMap, "x", Mapping::new(), Mapping::new());
        let incoming = ManifestDocument::new(ResourceKind::Secret, "x", Mapping::new(), Mapping::new());

        let err = merge(Some(&existing), &incoming).unwrap_err();
        assert_eq!(err.expected, "v1/Secret");
        assert_eq!(err.found, "v1/ConfigMap");
    }

    #[test]
    fn test_missing_kind_is_conflict() {
        let existing = ManifestDocument::from_root(Mapping::new().with("foo", "bar"));
        let incoming = ManifestDocument::new(ResourceKind::Secret, "x", Mapping::new(), Mapping::new());

        assert!(merge(Some(&existing), &incoming).is_err());
    }

    #[test]
    fn test_comment_kept_when_value_unchanged() {
        let existing = Leaf {
            value: Scalar::Str("v".to_string()),
            comment: Some("note".to_string()),
        };
        let same = Leaf::new(Scalar::Str("v".to_string()));
        let changed = Leaf::new(Scalar::Str("w".to_string()));

        assert_eq!(merge_leaf(&existing, &same).comment.as_deref(), Some("note"));
        assert_eq!(merge_leaf(&existing, &changed).comment, None);

        let recommented = Leaf {
            value: Scalar::Str("v".to_string()),
            comment: Some("new".to_string()),
        };
        assert_eq!(
            merge_leaf(&existing, &recommented).comment.as_deref(),
            Some("new")
        );
    }

    #[test]
    fn test_sequence_identity_merges_in_place() {
        let existing = vec![
            Mapping::new().with("name", "A").with("value", "1").into(),
            Mapping::new().with("name", "MANUAL").with("value", "x").into(),
        ];
        let incoming = vec![
            Mapping::new().with("name", "B").with("value", "2").into(),
            Mapping::new().with("name", "A").with("value", "3").into(),
        ];

        let merged = merge_sequence("env", &existing, &incoming);
        let pairs: Vec<_> = merged
            .iter()
            .map(|n| {
                (
                    n.get_path(&["name"]).and_then(Node::as_str).unwrap(),
                    n.get_path(&["value"]).and_then(Node::as_str).unwrap(),
                )
            })
            .collect();
        assert_eq!(pairs, vec![("A", "3"), ("MANUAL", "x"), ("B", "2")]);
    }

    #[test]
    fn test_volume_mounts_match_by_mount_path() {
        let mount = |path: &str| -> Node {
            Mapping::new()
                .with("name", "data")
                .with("mountPath", path)
                .into()
        };
        let incoming = vec![mount("/a"), mount("/b")];

        let once = merge_sequence("volumeMounts", &[], &incoming);
        let twice = merge_sequence("volumeMounts", &once, &incoming);
        assert_eq!(once, incoming);
        assert_eq!(twice, incoming);
    }

    #[test]
    fn test_scalar_sequence_union() {
        let existing = vec![Node::str("a.example.com")];
        let incoming = vec![Node::str("b.example.com"), Node::str("a.example.com")];

        let merged = merge_sequence("hosts", &existing, &incoming);
        assert_eq!(
            merged,
            vec![Node::str("a.example.com"), Node::str("b.example.com")]
        );
    }

    #[test]
    fn test_args_are_replaced() {
        let existing = vec![Node::str("serve"), Node::str("--old")];
        let incoming = vec![Node::str("serve")];

        assert_eq!(merge_sequence("args", &existing, &incoming), incoming);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let existing = deployment(vec![secret_ref("secrets-api"), secret_ref("manual")]);
        let incoming = deployment(vec![secret_ref("secrets-api"), secret_ref("secrets-web")]);

        let once = merge(Some(&existing), &incoming).unwrap();
        let twice = merge(Some(&once), &incoming).unwrap();
        assert_eq!(once, twice);
        assert_eq!(
            env_from_names(&twice),
            vec!["secrets-api", "manual", "secrets-web"]
        );
    }
}
