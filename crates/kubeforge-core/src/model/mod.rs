//! モデル定義
//!
//! kubeforgeで使用されるサービス定義のデータモデル。

mod env;
mod name;
mod port;
mod resources;
mod service;
mod volume;

// Re-exports
pub use env::*;
pub use name::*;
pub use port::*;
pub use resources::*;
pub use service::*;
pub use volume::*;
