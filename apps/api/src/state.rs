use std::sync::Arc;

use crate::auth::{PasswordService, TokenService};
use crate::projection::Projector;
use crate::repository::Repository;
use crate::storage::BlobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub blobs: Arc<dyn BlobStore>,
    pub tokens: TokenService,
    pub passwords: PasswordService,
    /// Body limit applied to the upload route only.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn projector(&self) -> Projector<'_> {
        Projector::new(self.repo.as_ref())
    }
}
