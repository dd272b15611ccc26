use std::sync::Arc;

use reminder_shared::config::ServiceConfig;

pub mod reminder_handlers;

/// Router state: configuration read at startup plus the two collaborators
pub struct AppState<A: ?Sized, S: ?Sized> {
    pub config: Arc<ServiceConfig>,
    pub auth: Arc<A>,
    pub store: Arc<S>,
}

impl<A: ?Sized, S: ?Sized> AppState<A, S> {
    pub fn new(config: ServiceConfig, auth: Arc<A>, store: Arc<S>) -> Self {
        Self {
            config: Arc::new(config),
            auth,
            store,
        }
    }
}

// Manual impl: cloning only bumps the Arcs, A and S need not be Clone
impl<A: ?Sized, S: ?Sized> Clone for AppState<A, S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            auth: self.auth.clone(),
            store: self.store.clone(),
        }
    }
}
