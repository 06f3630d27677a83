use crate::application::ports::file_store::{FileStore, UrlScope};
use crate::application::ports::project_repository::ProjectRepository;
use crate::application::use_cases::projects::hydrate::hydrate_attachment;
use crate::domain::projects::project::Project;

pub struct GetProject<'a, R, F>
where
    R: ProjectRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub repo: &'a R,
    pub files: &'a F,
}

impl<'a, R, F> GetProject<'a, R, F>
where
    R: ProjectRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub async fn execute(&self, id: i32, scope: UrlScope) -> anyhow::Result<Option<Project>> {
        let Some(mut project) = self.repo.load(id).await? else {
            return Ok(None);
        };
        hydrate_attachment(self.files, scope, &mut project).await?;
        Ok(Some(project))
    }
}
