//! Kubernetesマニフェストの合成とマージ
//!
//! ServiceModel から Deployment / Service / Ingress / Secret / ConfigMap /
//! PersistentVolumeClaim のドキュメントを生成し、既存ファイルへ冪等にマージします。

pub mod document;
pub mod error;
pub mod group;
pub mod kind;
pub mod merge;
pub mod naming;
pub mod render;
pub mod serializer;
pub mod store;
pub mod synth;

pub use document::{Leaf, ManifestDocument, Mapping, Node, Scalar};
pub use error::{ManifestError, Result};
pub use group::{ContainerGroup, ContainerGroupIndex};
pub use kind::ResourceKind;
pub use merge::{SchemaMismatch, merge};
pub use naming::NamingScheme;
pub use serializer::{PlatformFlags, Resource, plan};
pub use store::{FsStore, ManifestStore, MemoryStore};
pub use synth::{FileFailure, FileOutcome, FileStatus, SynthesisReport, synthesize};
