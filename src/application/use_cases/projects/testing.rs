//! In-memory port doubles shared by the use-case tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::application::ports::file_store::{FileStore, FileUpload, StoredFileMeta, UrlScope};
use crate::application::ports::project_repository::{ProjectRepository, SortMode};
use crate::domain::projects::project::{Project, ProjectFile, ReferenceItem};

pub fn sample_project() -> Project {
    Project {
        id: 0,
        un_entier: 1,
        deux_sh: "DeuxSh1".into(),
        trois_md: "TroisMd1".into(),
        quatre_lg: "QuatreLg1".into(),
        cinq_mail: "un@example.com".into(),
        six_url: "https://example.com/un".into(),
        sept_date: NaiveDate::from_ymd_opt(1970, 1, 12).unwrap(),
        huit_b: true,
        neuf_file: None,
    }
}

#[derive(Default)]
pub struct InMemoryRepo {
    rows: Mutex<HashMap<i32, Project>>,
    next_id: Mutex<i32>,
}

impl InMemoryRepo {
    pub fn insert_sync(&self, mut project: Project) -> i32 {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        project.id = *next;
        self.rows.lock().unwrap().insert(project.id, project);
        *next
    }

    fn column_text(project: &Project, column: &str) -> Option<String> {
        match column {
            "un_entier" => Some(project.un_entier.to_string()),
            "deux_sh" => Some(project.deux_sh.clone()),
            "trois_md" => Some(project.trois_md.clone()),
            "quatre_lg" => Some(project.quatre_lg.clone()),
            "cinq_mail" => Some(project.cinq_mail.clone()),
            "six_url" => Some(project.six_url.clone()),
            "sept_date" => Some(project.sept_date.to_string()),
            "huit_b" => Some(project.huit_b.to_string()),
            _ => None,
        }
    }
}

#[async_trait]
impl ProjectRepository for InMemoryRepo {
    async fn insert(&self, project: &Project) -> anyhow::Result<i32> {
        Ok(self.insert_sync(project.clone()))
    }

    async fn load(&self, id: i32) -> anyhow::Result<Option<Project>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn store(&self, project: &Project) -> anyhow::Result<()> {
        self.rows
            .lock()
            .unwrap()
            .insert(project.id, project.clone());
        Ok(())
    }

    async fn delete(&self, id: i32) -> anyhow::Result<()> {
        self.rows.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn select_all(&self) -> anyhow::Result<Vec<Project>> {
        let mut all: Vec<Project> = self.rows.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|p| p.id);
        Ok(all)
    }

    async fn select_id_list(
        &self,
        filters: &[(String, String)],
        order_by: Option<&str>,
        sort: SortMode,
    ) -> anyhow::Result<Vec<i32>> {
        let mut matching: Vec<Project> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|p| {
                filters.iter().all(|(column, needle)| {
                    needle.trim().is_empty()
                        || Self::column_text(p, column)
                            .map(|text| text.to_lowercase().contains(&needle.to_lowercase()))
                            .unwrap_or(true)
                })
            })
            .cloned()
            .collect();
        match order_by {
            Some(column) => matching.sort_by_key(|p| Self::column_text(p, column)),
            None => matching.sort_by_key(|p| p.id),
        }
        if sort == SortMode::Desc {
            matching.reverse();
        }
        Ok(matching.into_iter().map(|p| p.id).collect())
    }

    async fn select_reference_list(&self) -> anyhow::Result<Vec<ReferenceItem>> {
        let mut all: Vec<Project> = self.rows.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|p| p.id);
        Ok(all
            .into_iter()
            .map(|p| ReferenceItem {
                code: p.id,
                name: p.deux_sh,
            })
            .collect())
    }

    async fn select_by_ids(&self, ids: &[i32]) -> anyhow::Result<Vec<Project>> {
        let rows = self.rows.lock().unwrap();
        // Deliberately iterate the store, not the id list, so callers cannot
        // rely on database ordering.
        let mut keys: Vec<i32> = rows.keys().copied().collect();
        keys.sort_unstable();
        Ok(keys
            .into_iter()
            .filter(|id| ids.contains(id))
            .filter_map(|id| rows.get(&id).cloned())
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryFileStore {
    files: Mutex<HashMap<String, (StoredFileMeta, Vec<u8>)>>,
}

impl InMemoryFileStore {
    pub fn contains(&self, file_key: &str) -> bool {
        self.files.lock().unwrap().contains_key(file_key)
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn store(&self, upload: &FileUpload) -> anyhow::Result<String> {
        let file_key = Uuid::new_v4().to_string();
        let meta = StoredFileMeta {
            file_key: file_key.clone(),
            title: upload.filename.clone().unwrap_or_else(|| "file.bin".into()),
            size: upload.bytes.len() as i64,
            content_type: upload.content_type.clone(),
        };
        self.files
            .lock()
            .unwrap()
            .insert(file_key.clone(), (meta, upload.bytes.clone()));
        Ok(file_key)
    }

    async fn get_file_metadata(&self, file_key: &str) -> anyhow::Result<Option<StoredFileMeta>> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .get(file_key)
            .map(|(meta, _)| meta.clone()))
    }

    async fn read_bytes(&self, file_key: &str) -> anyhow::Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(file_key)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| anyhow::anyhow!("not_found"))
    }

    async fn delete(&self, file_key: &str) -> anyhow::Result<()> {
        self.files.lock().unwrap().remove(file_key);
        Ok(())
    }

    fn download_url(&self, scope: UrlScope, file_key: &str) -> String {
        match scope {
            UrlScope::BackOffice => format!("/api/admin/projects/files/{file_key}"),
            UrlScope::FrontOffice => format!("/api/projects/files/{file_key}"),
        }
    }
}

pub fn attach(project: &mut Project, file_key: &str) {
    project.neuf_file = Some(ProjectFile::from_key(file_key));
}
