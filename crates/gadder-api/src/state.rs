use std::sync::Arc;

use tracing::error;

use gadder_core::{CoreError, Gadder};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub core: Gadder,
}

impl AppStateInner {
    pub fn new(core: Gadder) -> AppState {
        Arc::new(Self { core })
    }
}

/// Runs a synchronous core operation off the async runtime.
pub async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Gadder) -> Result<T, CoreError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.core))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::internal("internal server error")
        })?
        .map_err(ApiError::from)
}
