//! ポート・仮想ホスト定義

use serde::{Deserialize, Serialize};

/// ポート定義
///
/// `source` はServiceが公開するポート、`target` はコンテナ側のポート。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub source: u16,
    pub target: u16,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Port {
    pub fn new(source: u16, target: u16) -> Self {
        Self {
            source,
            target,
            comment: None,
        }
    }
}

/// 仮想ホスト定義（Ingressルールの元になる）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualHost {
    /// ホスト名。未指定の場合は呼び出し側で解決する
    #[serde(default)]
    pub host: Option<String>,
    pub port: u16,
    #[serde(default)]
    pub comment: Option<String>,
}

impl VirtualHost {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: Some(host.into()),
            port,
            comment: None,
        }
    }
}
