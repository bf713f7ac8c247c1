//! kubeforge の設定
//!
//! プラットフォーム設定の読み書きと、環境ディレクトリの探索・作成。

pub mod environment;
pub mod error;
pub mod hosts;
pub mod platform;

pub use environment::*;
pub use error::*;
pub use hosts::resolve_virtual_hosts;
pub use platform::*;

use std::path::PathBuf;

/// kubeforge の設定ディレクトリを取得（なければ作成）
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("kubeforge");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}
