use std::sync::Arc;

use crate::application::ports::file_store::FileStore;
use crate::application::ports::project_repository::ProjectRepository;
use crate::application::ports::token_service::TokenService;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

pub struct AppServices {
    project_repo: Arc<dyn ProjectRepository>,
    file_store: Arc<dyn FileStore>,
    token_service: Arc<dyn TokenService>,
}

impl AppServices {
    pub fn new(
        project_repo: Arc<dyn ProjectRepository>,
        file_store: Arc<dyn FileStore>,
        token_service: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            project_repo,
            file_store,
            token_service,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn project_repo(&self) -> Arc<dyn ProjectRepository> {
        self.services.project_repo.clone()
    }

    pub fn file_store(&self) -> Arc<dyn FileStore> {
        self.services.file_store.clone()
    }

    pub fn token_service(&self) -> Arc<dyn TokenService> {
        self.services.token_service.clone()
    }
}
