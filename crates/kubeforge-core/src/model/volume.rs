//! ボリューム定義

use serde::{Deserialize, Serialize};

/// ボリューム定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Volume {
    /// 名前付きボリューム（PersistentVolumeClaimになる）
    Named(NamedVolume),
    /// ホストパスのバインド
    Bind(BindVolume),
}

impl Volume {
    pub fn source(&self) -> &str {
        match self {
            Self::Named(v) => &v.source,
            Self::Bind(v) => &v.source,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Self::Named(v) => &v.target,
            Self::Bind(v) => &v.target,
        }
    }

    pub fn as_named(&self) -> Option<&NamedVolume> {
        match self {
            Self::Named(v) => Some(v),
            Self::Bind(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedVolume {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub comment: Option<String>,
    /// 要求ストレージ量（例: 8Gi）
    #[serde(default)]
    pub request_storage: Option<String>,
}

impl NamedVolume {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            read_only: false,
            comment: None,
            request_storage: None,
        }
    }

    pub fn with_storage(mut self, storage: impl Into<String>) -> Self {
        self.request_storage = Some(storage.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindVolume {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub comment: Option<String>,
}
