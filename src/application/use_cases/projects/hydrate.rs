use crate::application::ports::file_store::{FileStore, UrlScope};
use crate::domain::projects::project::{Project, ProjectFile};

/// Fills in attachment metadata and the download URL for the given surface.
/// Projects without an attachment pass through untouched; a key whose file is
/// gone from the store keeps the bare key.
pub async fn hydrate_attachment<F: FileStore + ?Sized>(
    files: &F,
    scope: UrlScope,
    project: &mut Project,
) -> anyhow::Result<()> {
    let Some(current) = project.neuf_file.as_ref() else {
        return Ok(());
    };
    let meta = files.get_file_metadata(&current.file_key).await?;
    if let Some(meta) = meta {
        let url = files.download_url(scope, &meta.file_key);
        project.neuf_file = Some(ProjectFile {
            file_key: meta.file_key,
            title: Some(meta.title),
            size: Some(meta.size),
            content_type: meta.content_type,
            url: Some(url),
        });
    }
    Ok(())
}
