//! Pipeline orchestration
//!
//! Generation runs a linear sequence of stages with no back-edges:
//! validate -> compose -> render -> upload -> cleanup. Cleanup always runs
//! once a scratch path has been derived, on success and failure alike, and
//! its own errors are logged but never override the primary verdict.
//! Deletion is a separate two-stage pipeline: validate name -> destroy.

use crate::layout::compose_document;
use crate::rasterizer::Rasterizer;
use crate::request::{artifact_file_name, DeletionPayload, GenerationPayload};
use crate::storage::StorageGateway;
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Successful generation: the public URL and the stable storage identifier
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub image_url: String,
    pub file_name: String,
}

/// Sequences the generation and deletion pipelines over injected collaborators
pub struct Pipeline {
    rasterizer: Arc<dyn Rasterizer>,
    storage: Arc<dyn StorageGateway>,
    scratch_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        storage: Arc<dyn StorageGateway>,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            rasterizer,
            storage,
            scratch_dir,
        }
    }

    /// Run the full generation pipeline for a raw request body.
    pub async fn generate(&self, payload: GenerationPayload) -> Result<GeneratedImage> {
        // Validating: nothing expensive happens before this succeeds
        let request = payload.validate()?;

        // Composing: pure and infallible over validated input
        let document = compose_document(&request);

        let file_name = artifact_file_name(unix_millis());
        let artifact = self.scratch_dir.join(&file_name);
        debug!(file_name = %file_name, "starting render");

        let verdict = self.render_and_upload(document, &artifact, &file_name).await;

        // CleaningUp: exactly once, regardless of the verdict
        self.cleanup(&artifact).await;

        match &verdict {
            Ok(generated) => info!(image_url = %generated.image_url, "generation succeeded"),
            Err(e) => warn!(stage = e.category(), error = %e, "generation failed"),
        }
        verdict
    }

    async fn render_and_upload(
        &self,
        document: String,
        artifact: &Path,
        file_name: &str,
    ) -> Result<GeneratedImage> {
        // Rendering: the capture is blocking (it drives an external browser
        // process), so it runs on the blocking pool
        let rasterizer = Arc::clone(&self.rasterizer);
        let output = artifact.to_path_buf();
        tokio::task::spawn_blocking(move || rasterizer.capture(&document, &output))
            .await
            .map_err(|e| Error::RenderFailure(format!("Render task aborted: {}", e)))??;

        // Uploading: only reached when rendering produced a complete artifact
        let uploaded = self.storage.upload(artifact, file_name).await?;

        Ok(GeneratedImage {
            image_url: uploaded.secure_url,
            file_name: uploaded.public_id,
        })
    }

    /// Best-effort removal of the scratch artifact. A missing file is fine
    /// (rendering may have failed before writing); any other error is logged
    /// and swallowed so it cannot mask the pipeline verdict.
    async fn cleanup(&self, artifact: &Path) {
        match tokio::fs::remove_file(artifact).await {
            Ok(()) => debug!(path = %artifact.display(), "scratch artifact removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %artifact.display(), error = %e, "failed to remove scratch artifact"),
        }
    }

    /// Run the deletion pipeline: validate the filename, then destroy the
    /// derived storage object. Destroying an already-absent object succeeds.
    pub async fn delete(&self, payload: DeletionPayload) -> Result<String> {
        let request = payload.validate()?;
        let public_id = request.public_id();

        // Both destroy outcomes are success under idempotent-delete semantics
        let outcome = self.storage.destroy(&public_id).await?;
        info!(public_id = %public_id, ?outcome, "deletion succeeded");
        Ok(request.file_name)
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
