use std::{fmt, sync::Arc};

use hearth_core::service::{AuthService, ListingService};
use hearth_core::storage::FileStorage;

use crate::auth::token::TokenSigner;
use crate::infra::config::Config;

/// Shared per-request state: configuration plus the service and storage
/// handles every handler works through.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthService>,
    pub listings: Arc<ListingService>,
    pub storage: Arc<dyn FileStorage>,
    pub tokens: Arc<TokenSigner>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
