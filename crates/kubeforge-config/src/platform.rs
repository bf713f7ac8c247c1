//! プラットフォーム設定
//!
//! デプロイ先クラスタの性質（プロバイダー、Ingressクラス、cert-manager の有無）。
//! マニフェスト生成時には [`PlatformFlags`] に変換して渡す。

use crate::error::{ConfigError, Result};
use crate::get_config_dir;
use kubeforge_manifest::PlatformFlags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// 環境ディレクトリ内のプラットフォーム設定ファイル名
pub const PLATFORM_FILE_NAME: &str = "kubeforge.yml";

/// グローバル設定ファイル名（`~/.config/kubeforge/` 配下）
pub const GLOBAL_PLATFORM_FILE_NAME: &str = "platform.yml";

pub const PLATFORM_PATH_ENV: &str = "KUBEFORGE_PLATFORM";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    #[default]
    Rancher,
    GoogleCloud,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Rancher => "rancher",
            Provider::GoogleCloud => "google-cloud",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rancher" => Ok(Provider::Rancher),
            "google-cloud" | "gcloud" | "gke" => Ok(Provider::GoogleCloud),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub provider: Provider,
    /// `kubernetes.io/ingress.class` アノテーション（空ならクラスタ既定）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_class: Option<String>,
    #[serde(default)]
    pub cert_manager: bool,
    #[serde(default)]
    pub use_node_port_for_ingress: bool,
    /// ホスト未指定の仮想ホストに使うベースドメイン
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_virtual_host: Option<String>,
}

impl PlatformConfig {
    /// プロバイダーの既定値を適用した設定を作る
    ///
    /// cert-manager ありなら Ingress クラスは nginx、NodePort は使わない。
    /// それ以外では Google Cloud かつクラスが未指定または gce の場合のみ NodePort を使う。
    pub fn preset(provider: Provider, cert_manager: bool, ingress_class: Option<String>) -> Self {
        let ingress_class = ingress_class.filter(|class| !class.trim().is_empty());

        let (ingress_class, use_node_port_for_ingress) = if cert_manager {
            (Some("nginx".to_string()), false)
        } else {
            let gce = ingress_class.as_deref().is_none_or(|class| class == "gce");
            (ingress_class, provider == Provider::GoogleCloud && gce)
        };

        Self {
            provider,
            ingress_class,
            cert_manager,
            use_node_port_for_ingress,
            ..Default::default()
        }
    }

    pub fn flags(&self) -> PlatformFlags {
        PlatformFlags {
            ingress_class: self.ingress_class.clone(),
            cert_manager: self.cert_manager,
            use_node_port_for_ingress: self.use_node_port_for_ingress,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::InvalidPlatformFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        debug!(path = %path.display(), "Platform config saved");
        Ok(())
    }
}

/// プラットフォーム設定を探して読み込む
///
/// 以下の優先順位で検索:
/// 1. 明示的に指定されたファイル（存在しなければエラー）
/// 2. 環境ディレクトリ内の kubeforge.yml
/// 3. 環境変数 KUBEFORGE_PLATFORM
/// 4. ~/.config/kubeforge/platform.yml
/// 5. いずれもなければ既定値
#[tracing::instrument]
pub fn load_platform(explicit: Option<&Path>, env_dir: Option<&Path>) -> Result<PlatformConfig> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(ConfigError::PlatformFileNotFound(path.to_path_buf()));
        }
        return load_from(path);
    }

    match find_platform_file(env_dir) {
        Some(path) => load_from(&path),
        None => {
            debug!("No platform config found, using defaults");
            Ok(PlatformConfig::default())
        }
    }
}

fn find_platform_file(env_dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = env_dir
        .map(|dir| dir.join(PLATFORM_FILE_NAME))
        .filter(|path| path.is_file())
    {
        return Some(path);
    }

    if let Ok(path) = std::env::var(PLATFORM_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Some(path);
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("kubeforge").join(GLOBAL_PLATFORM_FILE_NAME))
        .filter(|path| path.is_file())
}

fn load_from(path: &Path) -> Result<PlatformConfig> {
    let config = PlatformConfig::load(path)?;
    info!(path = %path.display(), provider = %config.provider, "Platform config loaded");
    Ok(config)
}

/// グローバル設定として保存する
pub fn save_global(config: &PlatformConfig) -> Result<PathBuf> {
    let path = get_config_dir()?.join(GLOBAL_PLATFORM_FILE_NAME);
    config.save(&path)?;
    Ok(path)
}
