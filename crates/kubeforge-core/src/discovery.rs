//! サービス定義ファイルの自動発見
//!
//! カレントディレクトリ周辺から services.kdl を探します。

use crate::error::{FlowError, Result};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// サービス定義ファイルのパスを直接指定する環境変数
pub const SERVICES_PATH_ENV: &str = "KUBEFORGE_SERVICES_PATH";

/// 探索するファイル名（優先順）
const CANDIDATES: [&str; 2] = ["services.local.kdl", "services.kdl"];

/// サービス定義ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 KUBEFORGE_SERVICES_PATH
/// 2. カレントディレクトリ: services.local.kdl, services.kdl
/// 3. ./.kubeforge/ ディレクトリ内: 同様の順序
#[tracing::instrument]
pub fn find_services_file() -> Result<PathBuf> {
    if let Ok(raw) = std::env::var(SERVICES_PATH_ENV) {
        let path = PathBuf::from(&raw);
        debug!(env_path = %raw, "Checking KUBEFORGE_SERVICES_PATH");
        if path.is_file() {
            info!(services_file = %path.display(), "Found services file from environment variable");
            return Ok(path);
        }
        warn!(env_path = %raw, "KUBEFORGE_SERVICES_PATH does not point to a file");
    }

    let current_dir = std::env::current_dir()?;

    for dir in [current_dir.clone(), current_dir.join(".kubeforge")] {
        if !dir.is_dir() {
            continue;
        }
        for filename in CANDIDATES {
            let path = dir.join(filename);
            debug!(checking = %path.display(), "Looking for services file");
            if path.is_file() {
                info!(services_file = %path.display(), "Found services file");
                return Ok(path);
            }
        }
    }

    Err(FlowError::ServicesFileNotFound(current_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    #[serial]
    fn test_find_services_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("services.kdl"), "// test").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_services_file();

        std::env::set_current_dir(original_dir).unwrap();
        assert!(result.unwrap().ends_with("services.kdl"));
    }

    #[test]
    #[serial]
    fn test_local_file_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("services.kdl"), "// shared").unwrap();
        fs::write(temp_dir.path().join("services.local.kdl"), "// local").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_services_file();

        std::env::set_current_dir(original_dir).unwrap();
        // services.local.kdl が優先される
        assert!(result.unwrap().ends_with("services.local.kdl"));
    }

    #[test]
    #[serial]
    fn test_find_services_file_in_kubeforge_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        let kf_dir = temp_dir.path().join(".kubeforge");
        fs::create_dir(&kf_dir).unwrap();
        fs::write(kf_dir.join("services.kdl"), "// in dir").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_services_file();

        std::env::set_current_dir(original_dir).unwrap();
        assert!(result.unwrap().ends_with(".kubeforge/services.kdl"));
    }

    #[test]
    #[serial]
    fn test_find_services_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("custom.kdl");
        fs::write(&path, "// custom").unwrap();

        unsafe {
            std::env::set_var(SERVICES_PATH_ENV, path.to_str().unwrap());
        }

        let result = find_services_file();

        unsafe {
            std::env::remove_var(SERVICES_PATH_ENV);
        }
        assert_eq!(result.unwrap(), path);
    }

    #[test]
    #[serial]
    fn test_find_services_file_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_services_file();

        std::env::set_current_dir(original_dir).unwrap();
        assert!(matches!(result, Err(FlowError::ServicesFileNotFound(_))));
    }
}
