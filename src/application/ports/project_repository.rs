use async_trait::async_trait;

use crate::domain::projects::project::{Project, ReferenceItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Asc,
    Desc,
}

impl SortMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Some(SortMode::Asc),
            "desc" => Some(SortMode::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortMode::Asc => "ASC",
            SortMode::Desc => "DESC",
        }
    }
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Inserts a project and returns the generated primary key.
    async fn insert(&self, project: &Project) -> anyhow::Result<i32>;
    async fn load(&self, id: i32) -> anyhow::Result<Option<Project>>;
    /// Updates every data column of the row identified by `project.id`.
    async fn store(&self, project: &Project) -> anyhow::Result<()>;
    async fn delete(&self, id: i32) -> anyhow::Result<()>;
    async fn select_all(&self) -> anyhow::Result<Vec<Project>>;
    /// Id projection with optional per-column substring filters and optional
    /// ordering. Filter and order-by names not in the column allow-list are
    /// ignored.
    async fn select_id_list(
        &self,
        filters: &[(String, String)],
        order_by: Option<&str>,
        sort: SortMode,
    ) -> anyhow::Result<Vec<i32>>;
    async fn select_reference_list(&self) -> anyhow::Result<Vec<ReferenceItem>>;
    /// Batch lookup by id list. The result order is whatever the database
    /// returns; callers needing the input order re-sort themselves.
    async fn select_by_ids(&self, ids: &[i32]) -> anyhow::Result<Vec<Project>>;
}
