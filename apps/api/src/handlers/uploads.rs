use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::auth::Actor;
use crate::errors::{AppError, FieldErrors};
use crate::storage::{content_type_for, has_allowed_extension, Bucket};
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[derive(Serialize)]
pub struct UploadResponse {
    pub reference: String,
}

/// POST /api/uploads/:bucket (multipart, field `file`)
pub async fn upload(
    actor: Actor,
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let bucket: Bucket = bucket.parse().map_err(AppError::NotFound)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(FILE_FIELD, e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::validation(FILE_FIELD, "No file name was submitted."))?;
        let allowed = bucket.allowed_extensions();
        if !has_allowed_extension(&file_name, allowed) {
            return Err(AppError::validation(
                FILE_FIELD,
                format!(
                    "File extension is not allowed. Allowed extensions are: {}.",
                    allowed.join(", ")
                ),
            ));
        }

        let body = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(FILE_FIELD, e.body_text()))?;
        if body.is_empty() {
            return Err(AppError::validation(FILE_FIELD, "The submitted file is empty."));
        }

        let key = bucket.object_key(&file_name);
        let size = body.len();
        state
            .blobs
            .put(&key, body, &content_type_for(&file_name))
            .await?;

        info!("User {} uploaded {key} ({size} bytes)", actor.user_id);
        return Ok((StatusCode::CREATED, Json(UploadResponse { reference: key })));
    }

    Err(AppError::Validation(FieldErrors::single(
        FILE_FIELD,
        "No file was submitted.",
    )))
}
