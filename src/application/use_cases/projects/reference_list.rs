use crate::application::ports::project_repository::ProjectRepository;
use crate::domain::projects::project::ReferenceItem;

pub struct GetReferenceList<'a, R: ProjectRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ProjectRepository + ?Sized> GetReferenceList<'a, R> {
    pub async fn execute(&self) -> anyhow::Result<Vec<ReferenceItem>> {
        self.repo.select_reference_list().await
    }
}
