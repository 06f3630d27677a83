use async_trait::async_trait;
use once_cell::sync::Lazy;
use sqlx::Row;
use sqlx::postgres::PgRow;
use std::collections::HashSet;

use crate::application::ports::project_repository::{ProjectRepository, SortMode};
use crate::domain::projects::project::{Project, ProjectFile, ReferenceItem};
use crate::infrastructure::db::PgPool;

const SQL_SELECT_ALL: &str = "SELECT id_project, un_entier, deux_sh, trois_md, quatre_lg, \
     cinq_mail, six_url, sept_date, huit_b, neuf_file FROM project_table";
const SQL_SELECT_ALL_IDS: &str = "SELECT id_project FROM project_table";

/// Columns accepted as filter or order-by targets. Anything else coming from
/// request parameters is dropped before it can reach the statement text.
static KNOWN_COLUMNS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "id_project",
        "un_entier",
        "deux_sh",
        "trois_md",
        "quatre_lg",
        "cinq_mail",
        "six_url",
        "sept_date",
        "huit_b",
        "neuf_file",
    ])
});

pub struct SqlxProjectRepository {
    pub pool: PgPool,
}

impl SqlxProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn project_from_row(row: &PgRow) -> Project {
    let file_key: Option<String> = row.get("neuf_file");
    Project {
        id: row.get("id_project"),
        un_entier: row.get("un_entier"),
        deux_sh: row.get("deux_sh"),
        trois_md: row.get("trois_md"),
        quatre_lg: row.get("quatre_lg"),
        cinq_mail: row.get("cinq_mail"),
        six_url: row.get("six_url"),
        sept_date: row.get("sept_date"),
        huit_b: row.get("huit_b"),
        neuf_file: file_key
            .filter(|k| !k.is_empty())
            .map(ProjectFile::from_key),
    }
}

/// "$1, $2, ..., $n" for a dynamic IN clause.
fn in_placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepository {
    async fn insert(&self, project: &Project) -> anyhow::Result<i32> {
        let row = sqlx::query(
            r#"INSERT INTO project_table
               ( un_entier, deux_sh, trois_md, quatre_lg, cinq_mail, six_url, sept_date, huit_b, neuf_file )
               VALUES ( $1, $2, $3, $4, $5, $6, $7, $8, $9 )
               RETURNING id_project"#,
        )
        .bind(project.un_entier)
        .bind(&project.deux_sh)
        .bind(&project.trois_md)
        .bind(&project.quatre_lg)
        .bind(&project.cinq_mail)
        .bind(&project.six_url)
        .bind(project.sept_date)
        .bind(project.huit_b)
        .bind(project.neuf_file.as_ref().map(|f| f.file_key.as_str()))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("id_project"))
    }

    async fn load(&self, id: i32) -> anyhow::Result<Option<Project>> {
        let sql = format!("{SQL_SELECT_ALL} WHERE id_project = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(project_from_row))
    }

    async fn store(&self, project: &Project) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE project_table
               SET un_entier = $1, deux_sh = $2, trois_md = $3, quatre_lg = $4,
                   cinq_mail = $5, six_url = $6, sept_date = $7, huit_b = $8, neuf_file = $9
               WHERE id_project = $10"#,
        )
        .bind(project.un_entier)
        .bind(&project.deux_sh)
        .bind(&project.trois_md)
        .bind(&project.quatre_lg)
        .bind(&project.cinq_mail)
        .bind(&project.six_url)
        .bind(project.sept_date)
        .bind(project.huit_b)
        .bind(project.neuf_file.as_ref().map(|f| f.file_key.as_str()))
        .bind(project.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: i32) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM project_table WHERE id_project = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn select_all(&self) -> anyhow::Result<Vec<Project>> {
        let rows = sqlx::query(SQL_SELECT_ALL).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(project_from_row).collect())
    }

    async fn select_id_list(
        &self,
        filters: &[(String, String)],
        order_by: Option<&str>,
        sort: SortMode,
    ) -> anyhow::Result<Vec<i32>> {
        let mut sql = String::from(SQL_SELECT_ALL_IDS);
        let mut values: Vec<&str> = Vec::new();
        for (column, value) in filters {
            if value.trim().is_empty() || !KNOWN_COLUMNS.contains(column.as_str()) {
                continue;
            }
            let keyword = if values.is_empty() { "WHERE" } else { "AND" };
            values.push(value);
            // Column names are allow-listed above; only values are bound.
            sql.push_str(&format!(
                " {keyword} {column}::text ILIKE ${}",
                values.len()
            ));
        }
        if let Some(column) = order_by {
            if KNOWN_COLUMNS.contains(column) {
                sql.push_str(&format!(" ORDER BY {column} {}", sort.as_sql()));
            }
        }

        let mut query = sqlx::query_scalar::<_, i32>(&sql);
        for value in values {
            query = query.bind(format!("%{value}%"));
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn select_reference_list(&self) -> anyhow::Result<Vec<ReferenceItem>> {
        let rows = sqlx::query("SELECT id_project, deux_sh FROM project_table")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(|r| ReferenceItem {
                code: r.get("id_project"),
                name: r.get("deux_sh"),
            })
            .collect())
    }

    async fn select_by_ids(&self, ids: &[i32]) -> anyhow::Result<Vec<Project>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "{SQL_SELECT_ALL} WHERE id_project IN ( {} )",
            in_placeholders(ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(project_from_row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_placeholders_numbers_from_one() {
        assert_eq!(in_placeholders(1), "$1");
        assert_eq!(in_placeholders(3), "$1, $2, $3");
    }

    #[test]
    fn known_columns_reject_injection_targets() {
        assert!(KNOWN_COLUMNS.contains("deux_sh"));
        assert!(!KNOWN_COLUMNS.contains("deux_sh; DROP TABLE project_table"));
        assert!(!KNOWN_COLUMNS.contains("password"));
    }
}
