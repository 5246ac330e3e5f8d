//! Shaping between stored records and wire payloads.
//!
//! `outbound` expands foreign keys into nested representations and computes
//! derived values on every read. `inbound` turns request bodies into the
//! writable field sets, leaving actor-derived columns to the handlers.

pub mod inbound;
pub mod outbound;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::errors::{AppError, NON_FIELD_ERRORS};

pub use inbound::Write;
pub use outbound::Projector;

/// JSON body extractor whose rejections use the validation error shape.
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    AppError::validation(NON_FIELD_ERRORS, rejection.body_text())
}
