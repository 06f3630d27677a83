use std::collections::HashMap;

use crate::application::ports::file_store::{FileStore, UrlScope};
use crate::application::ports::project_repository::ProjectRepository;
use crate::application::use_cases::projects::hydrate::hydrate_attachment;
use crate::domain::projects::project::Project;

pub struct GetProjectsByIds<'a, R, F>
where
    R: ProjectRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub repo: &'a R,
    pub files: &'a F,
}

impl<'a, R, F> GetProjectsByIds<'a, R, F>
where
    R: ProjectRepository + ?Sized,
    F: FileStore + ?Sized,
{
    /// Batch-loads the given ids, hydrates attachments, and restores the
    /// caller's id order. Ids with no matching row are skipped.
    pub async fn execute(&self, ids: &[i32], scope: UrlScope) -> anyhow::Result<Vec<Project>> {
        let mut projects = self.repo.select_by_ids(ids).await?;
        for project in projects.iter_mut() {
            hydrate_attachment(self.files, scope, project).await?;
        }
        let position: HashMap<i32, usize> =
            ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        projects.sort_by_key(|p| position.get(&p.id).copied().unwrap_or(usize::MAX));
        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::projects::testing::{InMemoryFileStore, InMemoryRepo};
    use crate::application::use_cases::projects::testing::sample_project;

    #[tokio::test]
    async fn preserves_requested_id_order() {
        let repo = InMemoryRepo::default();
        let files = InMemoryFileStore::default();
        let mut ids = Vec::new();
        for n in 0..4 {
            let mut p = sample_project();
            p.un_entier = n;
            ids.push(repo.insert_sync(p));
        }

        let uc = GetProjectsByIds {
            repo: &repo,
            files: &files,
        };
        let want = vec![ids[2], ids[0], ids[3], ids[1]];
        let got = uc.execute(&want, UrlScope::BackOffice).await.unwrap();
        let got_ids: Vec<i32> = got.iter().map(|p| p.id).collect();
        assert_eq!(got_ids, want);
    }

    #[tokio::test]
    async fn skips_unknown_ids() {
        let repo = InMemoryRepo::default();
        let files = InMemoryFileStore::default();
        let id = repo.insert_sync(sample_project());

        let uc = GetProjectsByIds {
            repo: &repo,
            files: &files,
        };
        let got = uc.execute(&[9999, id], UrlScope::FrontOffice).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, id);
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let repo = InMemoryRepo::default();
        let files = InMemoryFileStore::default();
        let uc = GetProjectsByIds {
            repo: &repo,
            files: &files,
        };
        let got = uc.execute(&[], UrlScope::BackOffice).await.unwrap();
        assert!(got.is_empty());
    }
}
