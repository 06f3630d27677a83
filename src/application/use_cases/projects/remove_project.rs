use crate::application::ports::file_store::FileStore;
use crate::application::ports::project_repository::ProjectRepository;

pub struct RemoveProject<'a, R, F>
where
    R: ProjectRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub repo: &'a R,
    pub files: &'a F,
}

impl<'a, R, F> RemoveProject<'a, R, F>
where
    R: ProjectRepository + ?Sized,
    F: FileStore + ?Sized,
{
    /// Deletes the attachment (when present) before the row. Returns false
    /// when no such project exists.
    pub async fn execute(&self, id: i32) -> anyhow::Result<bool> {
        let Some(project) = self.repo.load(id).await? else {
            return Ok(false);
        };
        if let Some(file) = project.neuf_file.as_ref() {
            if !file.file_key.is_empty() {
                self.files.delete(&file.file_key).await.map_err(|err| {
                    tracing::error!(error = ?err, file_key = %file.file_key, "file_delete_failed");
                    err
                })?;
            }
        }
        self.repo.delete(id).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::file_store::FileUpload;
    use crate::application::use_cases::projects::create_project::CreateProject;
    use crate::application::use_cases::projects::testing::{
        InMemoryFileStore, InMemoryRepo, sample_project,
    };

    #[tokio::test]
    async fn removes_row_and_stored_file() {
        let repo = InMemoryRepo::default();
        let files = InMemoryFileStore::default();
        let create = CreateProject {
            repo: &repo,
            files: &files,
        };
        let upload = FileUpload {
            filename: Some("doc.pdf".into()),
            content_type: Some("application/pdf".into()),
            bytes: b"%PDF".to_vec(),
        };
        let created = create.execute(sample_project(), Some(upload)).await.unwrap();
        let file_key = created.neuf_file.as_ref().unwrap().file_key.clone();

        let remove = RemoveProject {
            repo: &repo,
            files: &files,
        };
        assert!(remove.execute(created.id).await.unwrap());
        assert!(repo.load(created.id).await.unwrap().is_none());
        assert!(!files.contains(&file_key));
    }

    #[tokio::test]
    async fn missing_project_reports_not_found() {
        let repo = InMemoryRepo::default();
        let files = InMemoryFileStore::default();
        let remove = RemoveProject {
            repo: &repo,
            files: &files,
        };
        assert!(!remove.execute(42).await.unwrap());
    }
}
