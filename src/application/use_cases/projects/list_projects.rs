use crate::application::ports::file_store::{FileStore, UrlScope};
use crate::application::ports::project_repository::ProjectRepository;
use crate::application::use_cases::projects::hydrate::hydrate_attachment;
use crate::domain::projects::project::Project;

pub struct ListProjects<'a, R, F>
where
    R: ProjectRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub repo: &'a R,
    pub files: &'a F,
}

impl<'a, R, F> ListProjects<'a, R, F>
where
    R: ProjectRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub async fn execute(&self, scope: UrlScope) -> anyhow::Result<Vec<Project>> {
        let mut projects = self.repo.select_all().await?;
        for project in projects.iter_mut() {
            hydrate_attachment(self.files, scope, project).await?;
        }
        Ok(projects)
    }
}
