//! kubeforge のコア
//!
//! サービスモデルと、KDL で書かれたサービス定義のパーサーを提供します。

pub mod discovery;
pub mod error;
pub mod model;
pub mod parser;

pub use discovery::find_services_file;
pub use error::{FlowError, Result};
pub use model::*;
pub use parser::{find_service, parse_kdl_file, parse_kdl_string};
