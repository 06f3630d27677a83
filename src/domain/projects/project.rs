use chrono::NaiveDate;

/// A single row of `project_table`. Column names follow the original schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: i32,
    pub un_entier: i32,
    pub deux_sh: String,
    pub trois_md: String,
    pub quatre_lg: String,
    pub cinq_mail: String,
    pub six_url: String,
    pub sept_date: NaiveDate,
    pub huit_b: bool,
    pub neuf_file: Option<ProjectFile>,
}

/// Attachment reference carried by a project. Only the key persists in the
/// row; title/size/content type/url are hydrated from the file store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFile {
    pub file_key: String,
    pub title: Option<String>,
    pub size: Option<i64>,
    pub content_type: Option<String>,
    pub url: Option<String>,
}

impl ProjectFile {
    pub fn from_key(file_key: impl Into<String>) -> Self {
        Self {
            file_key: file_key.into(),
            ..Default::default()
        }
    }
}

/// (id, label) pair used to fill selection combos.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceItem {
    pub code: i32,
    pub name: String,
}
