//! 環境ディレクトリ（`kubernetes-<環境名>`）の探索と作成

use crate::error::{ConfigError, Result};
use crate::platform::{PLATFORM_FILE_NAME, PlatformConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const ENV_DIR_ENV: &str = "KUBEFORGE_ENV_DIR";

const ENV_DIR_PREFIX: &str = "kubernetes-";

/// 環境名からディレクトリ名を作る
pub fn env_dir_name(env_name: &str) -> String {
    format!("{ENV_DIR_PREFIX}{env_name}")
}

/// プロジェクトディレクトリから環境ディレクトリを探す
///
/// 1. 環境変数 KUBEFORGE_ENV_DIR
/// 2. プロジェクト直下の `kubernetes-*` ディレクトリ（1つだけの場合）
#[tracing::instrument(skip(project_dir), fields(project_dir = %project_dir.display()))]
pub fn find_env_dir(project_dir: &Path) -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_DIR_ENV) {
        let dir = PathBuf::from(dir);
        debug!(env_dir = %dir.display(), "Env dir from environment variable");
        return Ok(dir);
    }

    let pattern = project_dir.join(format!("{ENV_DIR_PREFIX}*"));
    let pattern = pattern.to_string_lossy();
    let mut candidates: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_dir())
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => Err(ConfigError::EnvDirNotFound(project_dir.to_path_buf())),
        1 => Ok(candidates.remove(0)),
        _ => Err(ConfigError::AmbiguousEnvDir(candidates)),
    }
}

/// 環境ディレクトリを作成してプラットフォーム設定を書き込む
///
/// 同名のディレクトリがある場合は末尾に 1, 2, ... を付ける。
#[tracing::instrument(skip(project_dir, config), fields(project_dir = %project_dir.display()))]
pub fn init_environment_dir(
    project_dir: &Path,
    env_name: &str,
    config: &PlatformConfig,
) -> Result<PathBuf> {
    validate_env_name(env_name)?;

    let base = env_dir_name(env_name);
    let mut dir = project_dir.join(&base);
    let mut suffix = 0u32;
    while dir.exists() {
        suffix += 1;
        dir = project_dir.join(format!("{base}{suffix}"));
    }

    std::fs::create_dir_all(&dir)?;
    config.save(&dir.join(PLATFORM_FILE_NAME))?;

    info!(env_dir = %dir.display(), provider = %config.provider, "Environment directory created");
    Ok(dir)
}

fn validate_env_name(env_name: &str) -> Result<()> {
    let valid = !env_name.is_empty()
        && env_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvironmentName(env_name.to_string()))
    }
}
