use std::sync::Arc;

use crate::audit::ActionsService;
use crate::db::Database;
use crate::user_auth::UserAuthService;

/// Shared gateway state
#[derive(Clone)]
pub struct AppState {
    /// Credential verification and token issuance
    pub user_auth: Arc<UserAuthService>,
    /// Action audit log
    pub actions: ActionsService,
    /// PostgreSQL pool, absent when running on in-memory stores
    pub pg_db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(
        user_auth: Arc<UserAuthService>,
        actions: ActionsService,
        pg_db: Option<Arc<Database>>,
    ) -> Self {
        Self {
            user_auth,
            actions,
            pg_db,
        }
    }
}
