pub mod create_project;
pub mod get_project;
pub mod get_projects_by_ids;
pub mod hydrate;
pub mod list_project_ids;
pub mod list_projects;
pub mod reference_list;
pub mod remove_project;
pub mod update_project;

#[cfg(test)]
pub(crate) mod testing;
