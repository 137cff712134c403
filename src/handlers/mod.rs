pub mod health;
pub mod modeles;
pub mod motifs;

use std::sync::Arc;

use crate::db::DbPool;
use crate::services::{ModeleService, MotifService};
use crate::storage::ObjectStore;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub modeles: Arc<ModeleService>,
    pub motifs: Arc<MotifService>,
    pub storage: Arc<dyn ObjectStore>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, storage: Arc<dyn ObjectStore>) -> Self {
        let modeles = Arc::new(ModeleService::new(db.clone(), storage.clone()));
        let motifs = Arc::new(MotifService::new(db, storage.clone(), modeles.clone()));
        Self {
            modeles,
            motifs,
            storage,
        }
    }
}
