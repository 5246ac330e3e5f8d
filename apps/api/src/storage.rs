//! Blob storage for uploaded files. Entities only ever hold the returned
//! object key.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

pub const RESUME_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("upload to {key} failed: {reason}")]
    Upload { key: String, reason: String },

    #[error("blob store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StorageError>;
}

/// Logical upload destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    CompanyLogos,
    Resumes,
    ProfilePics,
}

impl Bucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::CompanyLogos => "company_logos",
            Bucket::Resumes => "resumes",
            Bucket::ProfilePics => "profile_pics",
        }
    }

    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            Bucket::Resumes => RESUME_EXTENSIONS,
            Bucket::CompanyLogos | Bucket::ProfilePics => IMAGE_EXTENSIONS,
        }
    }

    /// `<bucket>/<uuid>-<sanitised name>`
    pub fn object_key(self, file_name: &str) -> String {
        format!("{}/{}-{}", self.as_str(), Uuid::new_v4(), sanitize_file_name(file_name))
    }
}

impl FromStr for Bucket {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "company_logos" => Ok(Bucket::CompanyLogos),
            "resumes" => Ok(Bucket::Resumes),
            "profile_pics" => Ok(Bucket::ProfilePics),
            other => Err(format!("Unknown upload bucket \"{other}\"")),
        }
    }
}

/// Lower-cased extension of the final path segment, if any.
pub fn extension(name: &str) -> Option<String> {
    let file = name.rsplit('/').next().unwrap_or(name);
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn has_allowed_extension(name: &str, allowed: &[&str]) -> bool {
    extension(name).is_some_and(|ext| allowed.contains(&ext.as_str()))
}

/// Keeps the base name only, replacing anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn content_type_for(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// S3 / MinIO backed store; every object goes into one configured bucket.
pub struct S3BlobStore {
    client: S3Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        info!("Uploaded s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects.lock().ok()?.get(key).cloned()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StorageError> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| StorageError::Unavailable("blob store lock poisoned".into()))?;
        objects.insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }
}
