use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO エラー: {path}\n理由: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("サービス '{service}' の {field} が不正な値です: \"{value}\"\nヒント: {hint}")]
    InvalidQuantity {
        service: String,
        field: &'static str,
        value: String,
        hint: &'static str,
    },

    #[error(
        "{field} に使えない名前です: \"{value}\"\nヒント: 英小文字・数字・'-' のみ、先頭と末尾は英数字、63文字以内で指定してください"
    )]
    InvalidName { field: &'static str, value: String },

    #[error(
        "サービス定義ファイルが見つかりません\n探索開始位置: {0}\nヒント: services.kdl を含むディレクトリで実行するか KUBEFORGE_SERVICES_PATH を指定してください"
    )]
    ServicesFileNotFound(PathBuf),

    #[error("サービスが見つかりません: {0}")]
    ServiceNotFound(String),
}

pub type Result<T> = std::result::Result<T, FlowError>;
