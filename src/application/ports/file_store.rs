use async_trait::async_trait;

/// Which controller surface a download URL is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlScope {
    BackOffice,
    FrontOffice,
}

/// Bytes received from a multipart upload, before the store assigns a key.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Metadata the store keeps alongside a stored file.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFileMeta {
    pub file_key: String,
    pub title: String,
    pub size: i64,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persists the upload and returns the opaque key referencing it.
    async fn store(&self, upload: &FileUpload) -> anyhow::Result<String>;
    async fn get_file_metadata(&self, file_key: &str) -> anyhow::Result<Option<StoredFileMeta>>;
    async fn read_bytes(&self, file_key: &str) -> anyhow::Result<Vec<u8>>;
    /// Removes the stored file. Unknown keys are not an error.
    async fn delete(&self, file_key: &str) -> anyhow::Result<()>;
    fn download_url(&self, scope: UrlScope, file_key: &str) -> String;
}
