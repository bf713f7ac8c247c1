//! マニフェストの永続化
//!
//! マージ済みドキュメントのテキストを読み書きするだけの薄いI/O境界。

use crate::error::{ManifestError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// マニフェストの読み書き
pub trait ManifestStore {
    /// ファイルの内容（存在しなければ `None`）
    fn load(&self, path: &Path) -> Result<Option<String>>;

    /// ファイル全体を置き換える
    fn save(&mut self, path: &Path, content: &str) -> Result<()>;
}

/// ファイルシステム上のストア
///
/// 書き込みは同じディレクトリの一時ファイルからのリネームで行い、途中状態の
/// ファイルを残さない。親ディレクトリは必要に応じて作成する。
#[derive(Debug, Clone, Default)]
pub struct FsStore;

impl FsStore {
    pub fn new() -> Self {
        Self
    }
}

impl ManifestStore for FsStore {
    fn load(&self, path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ManifestError::io(path, e)),
        }
    }

    fn save(&mut self, path: &Path, content: &str) -> Result<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| ManifestError::io(dir, e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| ManifestError::io(dir, e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| ManifestError::io(tmp.path(), e))?;
        tmp.persist(path)
            .map_err(|e| ManifestError::io(path, e.error))?;

        debug!(path = %path.display(), bytes = content.len(), "Manifest written");
        Ok(())
    }
}

/// メモリ上のストア
///
/// 書き込みはメモリに留める。`overlay` で作ると、まだ書き込んでいないパスは
/// ファイルシステムから読む（ドライラン用）。
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: BTreeMap<PathBuf, String>,
    read_through: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlay() -> Self {
        Self {
            files: BTreeMap::new(),
            read_through: true,
        }
    }

    /// 書き込まれたファイル（パス順）
    pub fn files(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files.iter().map(|(p, c)| (p.as_path(), c.as_str()))
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }
}

impl ManifestStore for MemoryStore {
    fn load(&self, path: &Path) -> Result<Option<String>> {
        if let Some(content) = self.files.get(path) {
            return Ok(Some(content.clone()));
        }
        if self.read_through {
            return FsStore.load(path);
        }
        Ok(None)
    }

    fn save(&mut self, path: &Path, content: &str) -> Result<()> {
        self.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kubernetes-prod").join("web").join("service.yml");
        let mut store = FsStore::new();

        assert_eq!(store.load(&path).unwrap(), None);

        store.save(&path, "kind: Service\n").unwrap();
        assert_eq!(store.load(&path).unwrap().as_deref(), Some("kind: Service\n"));

        store.save(&path, "kind: Service\nmetadata: {}\n").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "kind: Service\nmetadata: {}\n"
        );

        // 一時ファイルが残らない
        let entries = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        let path = Path::new("k/web/deployment.yml");

        assert_eq!(store.load(path).unwrap(), None);
        store.save(path, "a: 1\n").unwrap();
        assert_eq!(store.get(path), Some("a: 1\n"));
        assert_eq!(store.files().count(), 1);
    }

    #[test]
    fn test_overlay_reads_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ingress.yml");
        fs::write(&path, "on-disk\n").unwrap();

        let mut store = MemoryStore::overlay();
        assert_eq!(store.load(&path).unwrap().as_deref(), Some("on-disk\n"));

        store.save(&path, "in-memory\n").unwrap();
        assert_eq!(store.load(&path).unwrap().as_deref(), Some("in-memory\n"));
        // ディスクは変更されない
        assert_eq!(fs::read_to_string(&path).unwrap(), "on-disk\n");
    }
}
