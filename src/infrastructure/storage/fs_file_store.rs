use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ports::file_store::{FileStore, FileUpload, StoredFileMeta, UrlScope};

const META_FILE: &str = "meta.json";
const DEFAULT_FILENAME: &str = "file.bin";

static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid regex"));

/// Filesystem-backed file store: one directory per key holding the stored
/// bytes and a `meta.json` sidecar.
pub struct FsFileStore {
    root: PathBuf,
    public_base_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SidecarMeta {
    title: String,
    size: i64,
    content_type: Option<String>,
}

impl FsFileStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: Option<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url,
        }
    }

    /// Keys are always UUIDs we generated; anything else (including path
    /// traversal attempts) never touches the filesystem.
    fn key_dir(&self, file_key: &str) -> anyhow::Result<PathBuf> {
        let parsed = Uuid::parse_str(file_key)
            .map_err(|_| anyhow::anyhow!("invalid file key: {file_key}"))?;
        Ok(self.root.join(parsed.to_string()))
    }

    fn sanitize_filename(original: Option<&str>) -> String {
        let base = original
            .and_then(|name| name.rsplit(['/', '\\']).next())
            .unwrap_or(DEFAULT_FILENAME)
            .trim();
        let cleaned = UNSAFE_FILENAME_CHARS.replace_all(base, "_").to_string();
        if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
            DEFAULT_FILENAME.to_string()
        } else {
            cleaned
        }
    }

    async fn read_meta(&self, file_key: &str) -> anyhow::Result<Option<SidecarMeta>> {
        let path = self.key_dir(file_key)?.join(META_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl FileStore for FsFileStore {
    async fn store(&self, upload: &FileUpload) -> anyhow::Result<String> {
        let file_key = Uuid::new_v4().to_string();
        let dir = self.key_dir(&file_key)?;
        tokio::fs::create_dir_all(&dir).await?;

        let title = Self::sanitize_filename(upload.filename.as_deref());
        tokio::fs::write(dir.join(&title), &upload.bytes).await?;

        let meta = SidecarMeta {
            title,
            size: upload.bytes.len() as i64,
            content_type: upload.content_type.clone(),
        };
        tokio::fs::write(dir.join(META_FILE), serde_json::to_vec(&meta)?).await?;
        Ok(file_key)
    }

    async fn get_file_metadata(&self, file_key: &str) -> anyhow::Result<Option<StoredFileMeta>> {
        let Some(meta) = self.read_meta(file_key).await? else {
            return Ok(None);
        };
        Ok(Some(StoredFileMeta {
            file_key: file_key.to_string(),
            title: meta.title,
            size: meta.size,
            content_type: meta.content_type,
        }))
    }

    async fn read_bytes(&self, file_key: &str) -> anyhow::Result<Vec<u8>> {
        let meta = self
            .read_meta(file_key)
            .await?
            .ok_or_else(|| anyhow::anyhow!("file not found: {file_key}"))?;
        let path = self.key_dir(file_key)?.join(&meta.title);
        Ok(tokio::fs::read(&path).await?)
    }

    async fn delete(&self, file_key: &str) -> anyhow::Result<()> {
        let dir = self.key_dir(file_key)?;
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn download_url(&self, scope: UrlScope, file_key: &str) -> String {
        let path = match scope {
            UrlScope::BackOffice => format!("/api/admin/projects/files/{file_key}"),
            UrlScope::FrontOffice => format!("/api/projects/files/{file_key}"),
        };
        match self.public_base_url.as_deref() {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
            None => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn upload(name: &str, bytes: &[u8]) -> FileUpload {
        FileUpload {
            filename: Some(name.to_string()),
            content_type: Some("text/plain".into()),
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn store_metadata_read_delete_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = FsFileStore::new(temp.path(), None);

        let key = store.store(&upload("notes.txt", b"hello")).await.unwrap();
        let meta = store.get_file_metadata(&key).await.unwrap().unwrap();
        assert_eq!(meta.title, "notes.txt");
        assert_eq!(meta.size, 5);
        assert_eq!(meta.content_type.as_deref(), Some("text/plain"));

        assert_eq!(store.read_bytes(&key).await.unwrap(), b"hello");

        store.delete(&key).await.unwrap();
        assert!(store.get_file_metadata(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = FsFileStore::new(temp.path(), None);
        store
            .delete("5f0b9a6e-0000-0000-0000-000000000000")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejects_non_uuid_keys() {
        let temp = TempDir::new().unwrap();
        let store = FsFileStore::new(temp.path(), None);
        assert!(store.read_bytes("../../etc/passwd").await.is_err());
        assert!(store.get_file_metadata("..").await.is_err());
    }

    #[test]
    fn sanitizes_hostile_filenames() {
        assert_eq!(
            FsFileStore::sanitize_filename(Some("../../evil sh.txt")),
            "evil_sh.txt"
        );
        assert_eq!(
            FsFileStore::sanitize_filename(Some(r"C:\temp\report.pdf")),
            "report.pdf"
        );
        assert_eq!(FsFileStore::sanitize_filename(None), "file.bin");
        assert_eq!(FsFileStore::sanitize_filename(Some("...")), "file.bin");
    }

    #[test]
    fn download_urls_respect_scope_and_base() {
        let store = FsFileStore::new("/tmp/x", Some("https://cms.example.org/".into()));
        assert_eq!(
            store.download_url(UrlScope::BackOffice, "k"),
            "https://cms.example.org/api/admin/projects/files/k"
        );
        let store = FsFileStore::new("/tmp/x", None);
        assert_eq!(
            store.download_url(UrlScope::FrontOffice, "k"),
            "/api/projects/files/k"
        );
    }
}
