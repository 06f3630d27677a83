use crate::application::ports::project_repository::{ProjectRepository, SortMode};

pub struct ListProjectIds<'a, R: ProjectRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ProjectRepository + ?Sized> ListProjectIds<'a, R> {
    pub async fn execute(
        &self,
        filters: &[(String, String)],
        order_by: Option<&str>,
        sort: SortMode,
    ) -> anyhow::Result<Vec<i32>> {
        self.repo.select_id_list(filters, order_by, sort).await
    }
}
