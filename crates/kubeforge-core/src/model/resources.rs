//! リソース要求・制限の定義

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static CPU_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+[.])?\d+m?$").expect("static cpu pattern"));

static BYTES_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+[.])?\d+([EPTGMK]i?)?$").expect("static bytes pattern"));

/// 数量の種別ごとの文法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityKind {
    Cpu,
    Memory,
    Storage,
}

impl QuantityKind {
    /// 値を検証し、前後の空白を除いた値を返す
    pub fn validate(&self, value: &str) -> Option<String> {
        let value = value.trim();
        let pattern = match self {
            Self::Cpu => &*CPU_PATTERN,
            Self::Memory | Self::Storage => &*BYTES_PATTERN,
        };
        pattern.is_match(value).then(|| value.to_string())
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Self::Cpu => {
                "CPUはcpu単位で指定します（小数可）。接尾辞 m はミリを表し、100m は 0.1 cpu と同じです"
            }
            Self::Memory => {
                "メモリはバイト数で指定します。整数または E, P, T, G, M, K, Ei, Pi, Ti, Gi, Mi, Ki の接尾辞付き（例: 128974848, 129M, 123Mi）"
            }
            Self::Storage => {
                "ストレージはバイト数で指定します。整数または E, P, T, G, M, K, Ei, Pi, Ti, Gi, Mi, Ki の接尾辞付き（例: 8G, 1Ti）"
            }
        }
    }
}

/// コンテナのリソース要求と制限
///
/// 値は文字列のまま保持し、単位変換は行わない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    #[serde(default)]
    pub request_cpu: Option<String>,
    #[serde(default)]
    pub request_memory: Option<String>,
    #[serde(default)]
    pub limit_cpu: Option<String>,
    #[serde(default)]
    pub limit_memory: Option<String>,
}

impl Resources {
    /// 未設定の項目だけをプロファイルの値で埋める
    pub fn fill_from(&mut self, profile: ResourceProfile) {
        let defaults = profile.resources();
        self.request_cpu = self.request_cpu.take().or(defaults.request_cpu);
        self.request_memory = self.request_memory.take().or(defaults.request_memory);
        self.limit_cpu = self.limit_cpu.take().or(defaults.limit_cpu);
        self.limit_memory = self.limit_memory.take().or(defaults.limit_memory);
    }

    /// 各項目を (フィールド名, 値, 種別) で列挙
    pub fn fields(&self) -> [(&'static str, Option<&str>, QuantityKind); 4] {
        [
            ("request_cpu", self.request_cpu.as_deref(), QuantityKind::Cpu),
            (
                "request_memory",
                self.request_memory.as_deref(),
                QuantityKind::Memory,
            ),
            ("limit_cpu", self.limit_cpu.as_deref(), QuantityKind::Cpu),
            (
                "limit_memory",
                self.limit_memory.as_deref(),
                QuantityKind::Memory,
            ),
        ]
    }
}

/// CPU・メモリのプリセット
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceProfile {
    Large,
    Medium,
    #[default]
    Small,
}

impl ResourceProfile {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "large" => Some(Self::Large),
            "medium" => Some(Self::Medium),
            "small" => Some(Self::Small),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Large => "large",
            Self::Medium => "medium",
            Self::Small => "small",
        }
    }

    pub fn resources(&self) -> Resources {
        let (request_cpu, request_memory, limit_cpu, limit_memory) = match self {
            Self::Large => ("4", "4G", "8", "16G"),
            Self::Medium => ("1", "1G", "2", "4G"),
            Self::Small => ("0.5", "256M", "1", "1G"),
        };
        Resources {
            request_cpu: Some(request_cpu.to_string()),
            request_memory: Some(request_memory.to_string()),
            limit_cpu: Some(limit_cpu.to_string()),
            limit_memory: Some(limit_memory.to_string()),
        }
    }
}

impl std::fmt::Display for ResourceProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
