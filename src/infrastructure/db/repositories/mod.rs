pub mod project_repository_sqlx;
