pub mod file_store;
pub mod project_repository;
pub mod token_service;
