//! ドキュメントツリーとYAMLテキストの相互変換
//!
//! 書き出しはブロック形式・2スペースインデントで、注釈付きスカラーは行末に
//! `# コメント` を付ける。読み込みは serde_yaml で行う（コメントは読み捨て）。

use crate::document::{Leaf, ManifestDocument, Mapping, Node, Scalar};

const INDENT: usize = 2;

/// ドキュメントをYAMLテキストにする
pub fn render(doc: &ManifestDocument) -> String {
    let mut out = String::new();
    write_mapping(&mut out, doc.root(), 0);
    if out.is_empty() {
        out.push_str("{}\n");
    }
    out
}

/// YAMLテキストを読み込む
///
/// 空（空白・コメントのみ）の場合は `Ok(None)`。ルートがマッピングでない場合や
/// 複数ドキュメントを含む場合はエラー。
pub fn parse(text: &str) -> Result<Option<ManifestDocument>, String> {
    let blank = text
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'));
    if blank {
        return Ok(None);
    }

    let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
    match from_yaml(value) {
        Node::Mapping(root) => Ok(Some(ManifestDocument::from_root(root))),
        Node::Scalar(Leaf {
            value: Scalar::Null,
            ..
        }) => Ok(None),
        Node::Sequence(_) => Err("top-level value is a sequence, expected a mapping".to_string()),
        Node::Scalar(_) => Err("top-level value is a scalar, expected a mapping".to_string()),
    }
}

fn from_yaml(value: serde_yaml::Value) -> Node {
    use serde_yaml::Value;

    match value {
        Value::Null => Node::Scalar(Leaf::new(Scalar::Null)),
        Value::Bool(b) => Node::bool(b),
        Value::Number(n) => {
            let scalar = match n.as_i64() {
                Some(i) => Scalar::Int(i),
                None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)),
            };
            Node::Scalar(Leaf::new(scalar))
        }
        Value::String(s) => Node::str(s),
        Value::Sequence(items) => Node::seq(items.into_iter().map(from_yaml)),
        Value::Mapping(entries) => Node::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (key_to_string(k), from_yaml(v)))
                .collect(),
        ),
        // タグは保持しない
        Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

fn key_to_string(key: serde_yaml::Value) -> String {
    match from_yaml(key) {
        Node::Scalar(leaf) => leaf.value.to_string(),
        other => format!("{other:?}"),
    }
}

fn pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat_n(' ', indent));
}

fn write_mapping(out: &mut String, mapping: &Mapping, indent: usize) {
    for (key, value) in mapping.iter() {
        pad(out, indent);
        out.push_str(&quote_if_needed(key));
        out.push(':');
        write_value(out, value, indent + INDENT);
    }
}

fn write_sequence(out: &mut String, items: &[Node], indent: usize) {
    for item in items {
        // 子要素は indent+2 で書き、先頭行の字下げを "- " に置き換える
        let mut nested = String::new();
        match item {
            Node::Mapping(m) if !m.is_empty() => write_mapping(&mut nested, m, indent + INDENT),
            Node::Sequence(s) if !s.is_empty() => write_sequence(&mut nested, s, indent + INDENT),
            _ => {
                pad(out, indent);
                out.push('-');
                write_value(out, item, indent + INDENT);
                continue;
            }
        }
        pad(out, indent);
        out.push_str("- ");
        out.push_str(&nested[indent + INDENT..]);
    }
}

/// `key:` や `-` の直後から値を書く
fn write_value(out: &mut String, value: &Node, child_indent: usize) {
    match value {
        Node::Mapping(m) if m.is_empty() => out.push_str(" {}\n"),
        Node::Sequence(s) if s.is_empty() => out.push_str(" []\n"),
        Node::Mapping(m) => {
            out.push('\n');
            write_mapping(out, m, child_indent);
        }
        Node::Sequence(s) => {
            out.push('\n');
            write_sequence(out, s, child_indent);
        }
        Node::Scalar(leaf) => {
            out.push(' ');
            out.push_str(&format_scalar(&leaf.value));
            if let Some(comment) = &leaf.comment {
                out.push_str(" # ");
                out.push_str(&flatten_comment(comment));
            }
            out.push('\n');
        }
    }
}

fn flatten_comment(comment: &str) -> String {
    comment.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn format_scalar(value: &Scalar) -> String {
    match value {
        Scalar::Null => "null".to_string(),
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(i) => i.to_string(),
        Scalar::Float(f) => format_float(*f),
        Scalar::Str(s) => quote_if_needed(s),
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        ".nan".to_string()
    } else if f == f64::INFINITY {
        ".inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-.inf".to_string()
    } else {
        let s = f.to_string();
        if s.contains(['.', 'e', 'E']) {
            s
        } else {
            format!("{s}.0")
        }
    }
}

/// プレーンスカラーとして書くと別の型・構文に読まれる文字列は二重引用符で囲む
fn quote_if_needed(s: &str) -> String {
    if needs_quotes(s) {
        quote(s)
    } else {
        s.to_string()
    }
}

fn needs_quotes(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return true;
    };

    const RESERVED: [&str; 14] = [
        "null", "~", "true", "false", "yes", "no", "on", "off", "y", "n", ".inf", "-.inf", "+.inf",
        ".nan",
    ];
    if RESERVED.contains(&s.to_lowercase().as_str()) {
        return true;
    }

    // 数値に見えるもの
    if (first.is_ascii_digit() || matches!(first, '+' | '-' | '.'))
        && (s.parse::<f64>().is_ok() || s.starts_with("0x") || s.starts_with("0o"))
    {
        return true;
    }

    if "-?:,[]{}#&*!|>'\"%@`".contains(first) {
        return true;
    }

    if s != s.trim()
        || s.ends_with(':')
        || s.contains(": ")
        || s.contains(" #")
        || s.chars().any(char::is_control)
    {
        return true;
    }

    // 0b101 など上の規則で拾えない解決は、読み戻して文字列になるかで判定する
    !matches!(
        serde_yaml::from_str::<serde_yaml::Value>(s),
        Ok(serde_yaml::Value::String(ref v)) if v == s
    )
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
