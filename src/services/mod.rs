//! Business logic services

pub mod circulation;
pub mod directory;
pub mod fines;
pub mod notify;
pub mod reconciliation;

use std::sync::Arc;

use crate::{config::CirculationConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub circulation: circulation::CirculationService,
    pub fines: fines::FinesService,
    pub reconciliation: reconciliation::ReconciliationService,
}

impl Services {
    /// Create all services with the given repository and default collaborators
    pub fn new(repository: Repository, circulation: CirculationConfig) -> Self {
        let directory: Arc<dyn directory::UserDirectory> =
            Arc::new(directory::PgUserDirectory::new(repository.pool.clone()));
        let notifier: Arc<dyn notify::Notifier> = Arc::new(notify::LogNotifier);
        Self::with_collaborators(repository, circulation, directory, notifier)
    }

    /// Create services with explicit collaborators (used by tests)
    pub fn with_collaborators(
        repository: Repository,
        circulation: CirculationConfig,
        directory: Arc<dyn directory::UserDirectory>,
        notifier: Arc<dyn notify::Notifier>,
    ) -> Self {
        Self {
            circulation: circulation::CirculationService::new(
                repository.clone(),
                circulation,
                directory,
                notifier,
            ),
            fines: fines::FinesService::new(repository.clone()),
            reconciliation: reconciliation::ReconciliationService::new(repository),
        }
    }
}
