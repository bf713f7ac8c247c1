use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error("プラットフォーム設定ファイルが見つかりません: {0}")]
    PlatformFileNotFound(PathBuf),

    #[error("プラットフォーム設定の読み込みに失敗しました: {path}\n理由: {message}")]
    InvalidPlatformFile { path: PathBuf, message: String },

    #[error("不明なプロバイダーです: {0}\nヒント: rancher または google-cloud を指定してください")]
    UnknownProvider(String),

    #[error(
        "環境ディレクトリが見つかりません: {0}\nヒント: kforge init <環境名> で作成するか --env-dir で指定してください"
    )]
    EnvDirNotFound(PathBuf),

    #[error(
        "環境ディレクトリが複数あります: {}\nヒント: --env-dir または KUBEFORGE_ENV_DIR で指定してください",
        .0.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
    )]
    AmbiguousEnvDir(Vec<PathBuf>),

    #[error("無効な環境名です: \"{0}\"\nヒント: 英数字・ハイフン・アンダースコアのみ使用できます")]
    InvalidEnvironmentName(String),

    #[error("パターンエラー: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("YAML エラー: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
