use crate::application::ports::file_store::{FileStore, FileUpload};
use crate::application::ports::project_repository::ProjectRepository;
use crate::domain::projects::project::{Project, ProjectFile};

pub struct CreateProject<'a, R, F>
where
    R: ProjectRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub repo: &'a R,
    pub files: &'a F,
}

impl<'a, R, F> CreateProject<'a, R, F>
where
    R: ProjectRepository + ?Sized,
    F: FileStore + ?Sized,
{
    /// Stores the optional upload first, then inserts the row carrying the
    /// assigned file key. Returns the project with its generated id.
    pub async fn execute(
        &self,
        mut project: Project,
        upload: Option<FileUpload>,
    ) -> anyhow::Result<Project> {
        if let Some(upload) = upload {
            let file_key = self.files.store(&upload).await.map_err(|err| {
                tracing::error!(error = ?err, "file_store_failed");
                err
            })?;
            project.neuf_file = Some(ProjectFile::from_key(file_key));
        }
        let id = self.repo.insert(&project).await?;
        project.id = id;
        Ok(project)
    }
}
