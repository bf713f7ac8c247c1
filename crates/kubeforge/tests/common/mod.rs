use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_services_kdl(&self, content: &str) {
        let path = self.root.path().join("services.kdl");
        fs::write(path, content).unwrap();
    }

    #[allow(dead_code)]
    pub fn create_env_dir(&self, name: &str) -> PathBuf {
        let dir = self.root.path().join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[allow(dead_code)]
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root.path().join(relative)).unwrap()
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// プロジェクトディレクトリで実行する kforge コマンド
    ///
    /// 利用者の環境変数やグローバル設定の影響を受けないようにする。
    #[allow(deprecated)]
    pub fn kforge(&self) -> Command {
        let mut cmd = Command::cargo_bin("kforge").unwrap();
        cmd.current_dir(self.path())
            .env_remove("KUBEFORGE_ENV_DIR")
            .env_remove("KUBEFORGE_PLATFORM")
            .env_remove("KUBEFORGE_SERVICES_PATH")
            .env_remove("RUST_LOG")
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env("NO_COLOR", "1");
        cmd
    }
}
