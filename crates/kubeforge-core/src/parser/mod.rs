//! KDLパーサー
//!
//! サービス定義ファイル（services.kdl）をパースします。
//! 各ノードタイプのパース処理はモジュールに分離されています。

mod env;
mod port;
mod service;
mod value;
mod volume;

use service::parse_service;

use crate::error::{FlowError, Result};
use crate::model::ServiceModel;
use kdl::KdlDocument;
use std::fs;
use std::path::Path;
use tracing::debug;

/// KDLファイルをパースしてサービス定義の一覧を生成
pub fn parse_kdl_file<P: AsRef<Path>>(path: P) -> Result<Vec<ServiceModel>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| FlowError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_kdl_string(&content)
}

/// KDL文字列をパース
///
/// 同名の service ノードが複数ある場合は後のノードでマージする。
/// 返却順は最初に宣言された順。
pub fn parse_kdl_string(content: &str) -> Result<Vec<ServiceModel>> {
    let doc: KdlDocument = content.parse()?;

    let mut services: Vec<ServiceModel> = Vec::new();

    for node in doc.nodes() {
        match node.name().value() {
            "service" => {
                let service = parse_service(node)?;
                // 既存のサービスがあればマージ、なければ追加
                if let Some(existing) = services.iter_mut().find(|s| s.name == service.name) {
                    existing.merge(service);
                } else {
                    services.push(service);
                }
            }
            other => {
                debug!(node = other, "Skipping unknown top-level node");
            }
        }
    }

    Ok(services)
}

/// 名前を指定してサービスを1つ取り出す
pub fn find_service(services: Vec<ServiceModel>, name: &str) -> Result<ServiceModel> {
    services
        .into_iter()
        .find(|s| s.name == name)
        .ok_or_else(|| FlowError::ServiceNotFound(name.to_string()))
}
