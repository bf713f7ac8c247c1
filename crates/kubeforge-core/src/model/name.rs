//! リソース名の検証

/// DNS-1123 ラベルの最大長
pub const DNS_LABEL_MAX_LEN: usize = 63;

/// 名前の制約（エラーメッセージ用）
pub const DNS_LABEL_HINT: &str =
    "英小文字・数字・'-' のみ、先頭と末尾は英数字、63文字以内で指定してください";

/// DNS-1123 ラベルとして有効か
///
/// サービス名やコンテナIDはオブジェクト名とファイルパスの両方に使われるため、
/// `/` や `..` を含む値はここで弾く。
pub fn is_dns_label(s: &str) -> bool {
    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    !s.is_empty()
        && s.len() <= DNS_LABEL_MAX_LEN
        && s.chars().all(|c| alnum(c) || c == '-')
        && s.starts_with(alnum)
        && s.ends_with(alnum)
}
