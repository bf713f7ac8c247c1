//! 合成パイプライン
//!
//! ServiceModel → ContainerGroupIndex → シリアライザー → マージ → ストア。
//! ファイルごとに独立して処理し、失敗は蓄積して最後にまとめて返す。

use crate::document::ManifestDocument;
use crate::error::{ManifestError, Result};
use crate::kind::ResourceKind;
use crate::merge::merge;
use crate::naming::NamingScheme;
use crate::render::{parse, render};
use crate::serializer::{PlatformFlags, Resource, plan};
use crate::store::ManifestStore;
use kubeforge_core::ServiceModel;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// 1ファイルの処理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Created,
    Updated,
    Unchanged,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileStatus::Created => "created",
            FileStatus::Updated => "updated",
            FileStatus::Unchanged => "unchanged",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub kind: ResourceKind,
    pub name: String,
    pub path: PathBuf,
    pub status: FileStatus,
}

/// ファイル単位の失敗
#[derive(Debug)]
pub struct FileFailure {
    pub kind: ResourceKind,
    pub path: PathBuf,
    pub error: ManifestError,
}

/// 1サービス分の合成結果
#[derive(Debug, Default)]
pub struct SynthesisReport {
    pub service: String,
    pub outcomes: Vec<FileOutcome>,
    pub failures: Vec<FileFailure>,
}

impl SynthesisReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn count(&self, status: FileStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

/// サービスのマニフェスト一式を合成して環境ディレクトリにマージする
///
/// モデルは既定値の補完まで済んでいること。1ファイルの失敗は他のファイルの
/// 処理を止めない。
#[instrument(
    skip(model, flags, env_dir, store),
    fields(service = %model.name, env_dir = %env_dir.display())
)]
pub fn synthesize(
    model: &ServiceModel,
    flags: &PlatformFlags,
    env_dir: &Path,
    store: &mut dyn ManifestStore,
) -> SynthesisReport {
    let naming = NamingScheme::new(env_dir, &model.name, model.is_templated());
    let mut report = SynthesisReport {
        service: model.name.clone(),
        ..Default::default()
    };

    for resource in plan(model) {
        let kind = resource.kind();
        let path = match resource.path(model, &naming) {
            Ok(path) => path,
            Err(error) => {
                warn!(kind = %kind, error = %error, "Manifest path rejected");
                report.failures.push(FileFailure {
                    kind,
                    path: env_dir.to_path_buf(),
                    error,
                });
                continue;
            }
        };

        match apply_resource(model, flags, &resource, &path, store) {
            Ok(status) => {
                info!(kind = %kind, path = %path.display(), status = %status, "Manifest synthesized");
                report.outcomes.push(FileOutcome {
                    kind,
                    name: resource.object_name(model),
                    path,
                    status,
                });
            }
            Err(error) => {
                warn!(kind = %kind, path = %path.display(), error = %error, "Manifest synthesis failed");
                report.failures.push(FileFailure { kind, path, error });
            }
        }
    }

    report
}

/// 1ファイル分: 生成 → 既存の読み込み → マージ → 書き込み
///
/// エラー時は対象ファイルに触れない。
fn apply_resource(
    model: &ServiceModel,
    flags: &PlatformFlags,
    resource: &Resource<'_>,
    path: &Path,
    store: &mut dyn ManifestStore,
) -> Result<FileStatus> {
    let kind = resource.kind();
    let incoming = resource.serialize(model, flags)?;

    let current = store.load(path)?;
    let existing = match current.as_deref() {
        Some(text) => load_existing(kind, path, text)?,
        None => None,
    };

    let merged = merge(existing.as_ref(), &incoming).map_err(|mismatch| {
        ManifestError::SchemaConflict {
            kind,
            path: path.to_path_buf(),
            expected: mismatch.expected,
            found: mismatch.found,
        }
    })?;
    let content = render(&merged);

    let status = match current.as_deref() {
        Some(text) if text == content => FileStatus::Unchanged,
        // 空ファイルは存在しないものとして扱う
        Some(_) if existing.is_none() => FileStatus::Created,
        Some(_) => FileStatus::Updated,
        None => FileStatus::Created,
    };

    if status == FileStatus::Unchanged {
        debug!(path = %path.display(), "Manifest unchanged, skipping write");
    } else {
        store.save(path, &content)?;
    }

    Ok(status)
}

fn load_existing(kind: ResourceKind, path: &Path, text: &str) -> Result<Option<ManifestDocument>> {
    parse(text).map_err(|message| ManifestError::CorruptManifest {
        kind,
        path: path.to_path_buf(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use kubeforge_core::{EnvVariable, Port, ResourceProfile};

    fn web() -> ServiceModel {
        let mut model = ServiceModel::new("web");
        model.image = Some("web:1".to_string());
        model.ports.push(Port::new(80, 8080));
        model.apply_profile(ResourceProfile::Small);
        model
    }

    #[test]
    fn test_second_run_is_unchanged() {
        let mut store = MemoryStore::new();
        let env_dir = Path::new("kubernetes-prod");
        let flags = PlatformFlags::default();

        let first = synthesize(&web(), &flags, env_dir, &mut store);
        assert!(first.is_success());
        assert_eq!(first.count(FileStatus::Created), 2);

        let second = synthesize(&web(), &flags, env_dir, &mut store);
        assert!(second.is_success());
        assert_eq!(second.count(FileStatus::Unchanged), 2);
    }

    #[test]
    fn test_changed_model_updates() {
        let mut store = MemoryStore::new();
        let env_dir = Path::new("k");
        let flags = PlatformFlags::default();

        synthesize(&web(), &flags, env_dir, &mut store);

        let mut model = web();
        model.image = Some("web:2".to_string());
        let report = synthesize(&model, &flags, env_dir, &mut store);

        let deployment = report
            .outcomes
            .iter()
            .find(|o| o.kind == ResourceKind::Deployment)
            .unwrap();
        assert_eq!(deployment.status, FileStatus::Updated);
        assert!(
            store
                .get(Path::new("k/web/deployment.yml"))
                .unwrap()
                .contains("image: web:2")
        );
    }

    #[test]
    fn test_failures_are_accumulated() {
        let mut store = MemoryStore::new();
        let env_dir = Path::new("k");
        let service_path = env_dir.join("web").join("service.yml");
        store.save(&service_path, "a: [unclosed\n").unwrap();

        let mut model = web();
        model.image = None;
        model.environment.insert(EnvVariable::shared_secret("KEY", "v"));

        let report = synthesize(&model, &PlatformFlags::default(), env_dir, &mut store);

        let failed: Vec<_> = report.failures.iter().map(|f| f.kind).collect();
        assert_eq!(failed, vec![ResourceKind::Deployment, ResourceKind::Service]);
        assert!(matches!(
            report.failures[1].error,
            ManifestError::CorruptManifest { .. }
        ));

        // 他のファイルは処理される
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].kind, ResourceKind::Secret);

        // 壊れたファイルには触れない
        assert_eq!(store.get(&service_path), Some("a: [unclosed\n"));
    }

    #[test]
    fn test_schema_conflict_leaves_file() {
        let mut store = MemoryStore::new();
        let env_dir = Path::new("k");
        let path = env_dir.join("web").join("service.yml");
        let original = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: web\n";
        store.save(&path, original).unwrap();

        let report = synthesize(&web(), &PlatformFlags::default(), env_dir, &mut store);

        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            ManifestError::SchemaConflict { kind: ResourceKind::Service, .. }
        ));
        assert_eq!(store.get(&path), Some(original));
    }

    #[test]
    fn test_empty_file_counts_as_absent() {
        let mut store = MemoryStore::new();
        let env_dir = Path::new("k");
        let path = env_dir.join("web").join("service.yml");
        store.save(&path, "\n").unwrap();

        let report = synthesize(&web(), &PlatformFlags::default(), env_dir, &mut store);
        let service = report
            .outcomes
            .iter()
            .find(|o| o.kind == ResourceKind::Service)
            .unwrap();
        assert_eq!(service.status, FileStatus::Created);
    }
}
