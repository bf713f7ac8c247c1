use crate::kind::ResourceKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("サービス '{service}' の {kind} を生成できません: {field} が未設定です\nヒント: {hint}")]
    Validation {
        service: String,
        kind: ResourceKind,
        field: String,
        hint: String,
    },

    #[error(
        "サービス '{service}' の {kind} を生成できません: {field} \"{value}\" はリソース名に使えません\nヒント: 英小文字・数字・'-' のみ、先頭と末尾は英数字、63文字以内で指定してください"
    )]
    InvalidName {
        service: String,
        kind: ResourceKind,
        field: String,
        value: String,
    },

    #[error(
        "{path} には別種のオブジェクトが存在します\n既存: {found}\n生成: {expected}\n\nヒント:\n  • ファイルを移動するか削除してから再実行してください"
    )]
    SchemaConflict {
        kind: ResourceKind,
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error(
        "既存の {kind} マニフェストを解析できません: {path}\n理由: {message}\n\nヒント:\n  • YAMLの構文を確認してください（1ファイル1ドキュメント）"
    )]
    CorruptManifest {
        kind: ResourceKind,
        path: PathBuf,
        message: String,
    },

    #[error("IO エラー: {path}\n理由: {message}")]
    Io { path: PathBuf, message: String },
}

impl ManifestError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        ManifestError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ManifestError>;
