use crate::application::ports::file_store::{FileStore, FileUpload};
use crate::application::ports::project_repository::ProjectRepository;
use crate::domain::projects::project::{Project, ProjectFile};

pub struct UpdateProject<'a, R, F>
where
    R: ProjectRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub repo: &'a R,
    pub files: &'a F,
}

impl<'a, R, F> UpdateProject<'a, R, F>
where
    R: ProjectRepository + ?Sized,
    F: FileStore + ?Sized,
{
    /// When a replacement upload is present the previous stored file is
    /// deleted before the new one is written, so a rejected update never
    /// strands the old attachment.
    pub async fn execute(
        &self,
        mut project: Project,
        upload: Option<FileUpload>,
    ) -> anyhow::Result<Project> {
        if let Some(upload) = upload {
            if let Some(current) = project.neuf_file.as_ref() {
                if !current.file_key.is_empty() {
                    self.files.delete(&current.file_key).await.map_err(|err| {
                        tracing::error!(error = ?err, file_key = %current.file_key, "file_delete_failed");
                        err
                    })?;
                }
            }
            let file_key = self.files.store(&upload).await.map_err(|err| {
                tracing::error!(error = ?err, "file_store_failed");
                err
            })?;
            project.neuf_file = Some(ProjectFile::from_key(file_key));
        }
        self.repo.store(&project).await?;
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::file_store::UrlScope;
    use crate::application::use_cases::projects::create_project::CreateProject;
    use crate::application::use_cases::projects::get_project::GetProject;
    use crate::application::use_cases::projects::testing::{
        InMemoryFileStore, InMemoryRepo, sample_project,
    };
    use chrono::NaiveDate;

    #[tokio::test]
    async fn create_then_update_round_trip() {
        let repo = InMemoryRepo::default();
        let files = InMemoryFileStore::default();

        let create = CreateProject {
            repo: &repo,
            files: &files,
        };
        let created = create.execute(sample_project(), None).await.unwrap();
        assert!(created.id > 0);

        let get = GetProject {
            repo: &repo,
            files: &files,
        };
        let stored = get
            .execute(created.id, UrlScope::BackOffice)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, created);

        let mut changed = stored.clone();
        changed.un_entier = 2;
        changed.deux_sh = "DeuxSh2".into();
        changed.trois_md = "TroisMd2".into();
        changed.quatre_lg = "QuatreLg2".into();
        changed.cinq_mail = "deux@example.com".into();
        changed.six_url = "https://example.com/deux".into();
        changed.sept_date = NaiveDate::from_ymd_opt(1970, 1, 24).unwrap();
        changed.huit_b = false;

        let update = UpdateProject {
            repo: &repo,
            files: &files,
        };
        let updated = update.execute(changed.clone(), None).await.unwrap();
        let stored = get
            .execute(updated.id, UrlScope::BackOffice)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, changed);
    }

    #[tokio::test]
    async fn replacing_upload_deletes_previous_file() {
        let repo = InMemoryRepo::default();
        let files = InMemoryFileStore::default();
        let create = CreateProject {
            repo: &repo,
            files: &files,
        };
        let first = FileUpload {
            filename: Some("first.txt".into()),
            content_type: Some("text/plain".into()),
            bytes: b"one".to_vec(),
        };
        let created = create.execute(sample_project(), Some(first)).await.unwrap();
        let old_key = created.neuf_file.as_ref().unwrap().file_key.clone();
        assert!(files.contains(&old_key));

        let second = FileUpload {
            filename: Some("second.txt".into()),
            content_type: Some("text/plain".into()),
            bytes: b"two".to_vec(),
        };
        let update = UpdateProject {
            repo: &repo,
            files: &files,
        };
        let updated = update.execute(created, Some(second)).await.unwrap();
        let new_key = updated.neuf_file.as_ref().unwrap().file_key.clone();

        assert_ne!(old_key, new_key);
        assert!(!files.contains(&old_key));
        assert!(files.contains(&new_key));
    }
}
