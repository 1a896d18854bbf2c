//! Remote object storage gateway
//!
//! Uploads rendered artifacts to a Cloudinary-compatible HTTP API and
//! destroys previously uploaded objects by public id. No retry logic lives
//! here; transient network errors surface as failures. The API base URL is
//! injectable so tests can point the gateway at a local stub server.

use crate::request::STORAGE_FOLDER;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info};

/// Default API endpoint of the hosted storage service
pub const DEFAULT_STORAGE_BASE_URL: &str = "https://api.cloudinary.com";

/// Credentials and endpoint for the storage account
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// API base URL; overridable for tests against a stub server
    pub base_url: String,
}

impl StorageConfig {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Self {
        Self {
            cloud_name,
            api_key,
            api_secret,
            base_url: DEFAULT_STORAGE_BASE_URL.to_string(),
        }
    }
}

/// Successful upload: both fields always present, never partially populated
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResult {
    pub secure_url: String,
    pub public_id: String,
}

/// Outcome of a destroy call. Destroying an already-absent object is success
/// (idempotent delete), so `NotFound` is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    Destroyed,
    NotFound,
}

/// Upload/destroy capability over remote object storage
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Upload the file at `local_path` under the logical storage folder,
    /// using the extension-stripped `desired_name` as the stable identifier.
    /// Overwrite is enabled and the object is typed as an image.
    async fn upload(&self, local_path: &Path, desired_name: &str) -> Result<UploadResult>;

    /// Destroy the image object at `public_id`.
    async fn destroy(&self, public_id: &str) -> Result<DestroyOutcome>;
}

/// Gateway speaking the Cloudinary upload/destroy HTTP API
pub struct CloudinaryStorage {
    http: reqwest::Client,
    config: StorageConfig,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        // Explicit image resource typing lives in the URL path
        format!(
            "{}/v1_1/{}/image/{}",
            self.config.base_url, self.config.cloud_name, action
        )
    }

    /// Sign the given (name, value) pairs: sorted by name, joined as a query
    /// string, secret appended, SHA-256 hex digest.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = params.to_vec();
        sorted.sort_by_key(|(name, _)| *name);
        let to_sign: Vec<String> = sorted
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        let mut hasher = Sha256::new();
        hasher.update(to_sign.join("&"));
        hasher.update(&self.config.api_secret);
        hex::encode(hasher.finalize())
    }
}

fn unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .to_string()
}

#[async_trait]
impl StorageGateway for CloudinaryStorage {
    async fn upload(&self, local_path: &Path, desired_name: &str) -> Result<UploadResult> {
        let public_id = Path::new(desired_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(desired_name)
            .to_string();
        let timestamp = unix_seconds();
        let signature = self.sign(&[
            ("folder", STORAGE_FOLDER),
            ("overwrite", "true"),
            ("public_id", &public_id),
            ("timestamp", &timestamp),
        ]);

        let bytes = tokio::fs::read(local_path)
            .await
            .map_err(|e| Error::UploadFailure(format!("Failed to read artifact: {}", e)))?;
        let size = bytes.len();

        let file_part = reqwest::multipart::Part::bytes(bytes)
            .file_name(desired_name.to_string())
            .mime_str("image/jpeg")
            .map_err(|e| Error::UploadFailure(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .text("folder", STORAGE_FOLDER)
            .text("public_id", public_id)
            .text("overwrite", "true");

        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, name = desired_name, "upload request failed");
                Error::UploadFailure(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, name = desired_name, "storage rejected upload");
            return Err(Error::UploadFailure(format!(
                "storage returned {}: {}",
                status, body
            )));
        }

        let result: UploadResult = response
            .json()
            .await
            .map_err(|e| Error::UploadFailure(format!("Malformed upload response: {}", e)))?;

        info!(
            public_id = %result.public_id,
            size_bytes = size,
            "upload successful"
        );
        Ok(result)
    }

    async fn destroy(&self, public_id: &str) -> Result<DestroyOutcome> {
        let timestamp = unix_seconds();
        let signature = self.sign(&[("public_id", public_id), ("timestamp", &timestamp)]);

        let response = self
            .http
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", public_id),
                ("timestamp", &timestamp),
                ("api_key", &self.config.api_key),
                ("signature", &signature),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, public_id, "destroy request failed");
                Error::DeletionFailure(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!(%status, public_id, "storage rejected destroy");
            return Err(Error::DeletionFailure(format!(
                "storage returned {}",
                status
            )));
        }

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| Error::DeletionFailure(format!("Malformed destroy response: {}", e)))?;

        match body.result.as_str() {
            "ok" => {
                info!(public_id, "object destroyed");
                Ok(DestroyOutcome::Destroyed)
            }
            "not found" => {
                info!(public_id, "object already absent");
                Ok(DestroyOutcome::NotFound)
            }
            other => {
                error!(public_id, result = other, "unexpected destroy result");
                Err(Error::DeletionFailure(format!(
                    "unexpected destroy result \"{}\"",
                    other
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_sorted_and_stable() {
        let gateway = CloudinaryStorage::new(StorageConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
            base_url: "http://localhost".into(),
        });

        let a = gateway.sign(&[("timestamp", "1"), ("public_id", "p")]);
        let b = gateway.sign(&[("public_id", "p"), ("timestamp", "1")]);
        assert_eq!(a, b);

        let mut hasher = Sha256::new();
        hasher.update("public_id=p&timestamp=1secret");
        assert_eq!(a, hex::encode(hasher.finalize()));
    }

    #[test]
    fn endpoint_carries_image_resource_type() {
        let gateway = CloudinaryStorage::new(StorageConfig::new(
            "demo".into(),
            "key".into(),
            "secret".into(),
        ));
        assert_eq!(
            gateway.endpoint("upload"),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
        assert_eq!(
            gateway.endpoint("destroy"),
            "https://api.cloudinary.com/v1_1/demo/image/destroy"
        );
    }
}
