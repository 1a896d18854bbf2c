//! Headless rasterization of composed documents
//!
//! The `Rasterizer` trait is the seam between the pipeline and the rendering
//! engine, so orchestration tests can substitute a stub. The real
//! implementation drives headless Chrome via the `headless_chrome` crate:
//! one isolated browser process per capture, torn down on every exit path
//! because the browser and tab are owned values scoped to the call.

use crate::{Error, Result, CANVAS_HEIGHT, CANVAS_WIDTH, JPEG_QUALITY};
use base64::Engine as Base64Engine;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

/// Configuration for the Chrome-backed rasterizer
#[derive(Debug, Clone)]
pub struct RasterizerConfig {
    /// Explicit path to the Chrome/Chromium executable; autodetected if unset
    pub chrome_path: Option<PathBuf>,
    /// Budget for navigation plus image loading, in milliseconds
    pub load_timeout_ms: u64,
    /// Quiescence period after the last image finishes loading, before capture
    pub stability_window_ms: u64,
}

impl Default for RasterizerConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            load_timeout_ms: 30000,
            stability_window_ms: 500,
        }
    }
}

/// Turns a composed document into a fixed-size JPEG on local storage
pub trait Rasterizer: Send + Sync {
    /// Render `document` and write the 1080x1080 JPEG capture to `output`.
    ///
    /// On failure no file path is reported as usable; a half-written file may
    /// exist transiently and is the pipeline's cleanup responsibility.
    fn capture(&self, document: &str, output: &Path) -> Result<()>;
}

/// Rasterizer backed by a headless Chrome instance per capture
pub struct ChromeRasterizer {
    config: RasterizerConfig,
}

impl ChromeRasterizer {
    pub fn new(config: RasterizerConfig) -> Self {
        Self { config }
    }

    fn launch(&self) -> Result<Browser> {
        let mut builder = LaunchOptions::default_builder();
        builder
            .headless(true)
            .window_size(Some((CANVAS_WIDTH, CANVAS_HEIGHT)));
        if let Some(path) = &self.config.chrome_path {
            builder.path(Some(path.clone()));
        }
        let launch_options = builder
            .build()
            .map_err(|e| Error::RenderFailure(format!("Failed to build launch options: {}", e)))?;

        Browser::new(launch_options)
            .map_err(|e| Error::RenderFailure(format!("Failed to launch browser: {}", e)))
    }
}

impl Rasterizer for ChromeRasterizer {
    fn capture(&self, document: &str, output: &Path) -> Result<()> {
        let browser = self.launch()?;
        let tab = browser
            .new_tab()
            .map_err(|e| Error::RenderFailure(format!("Failed to create tab: {}", e)))?;

        // Load the composed document as a self-contained data URL
        let encoded =
            Base64Engine::encode(&base64::engine::general_purpose::STANDARD, document);
        let url = format!("data:text/html;base64,{}", encoded);

        tab.navigate_to(&url)
            .map_err(|e| Error::RenderFailure(format!("Navigation failed: {}", e)))?;
        tab.wait_until_navigated()
            .map_err(|e| Error::RenderFailure(format!("Wait for navigation failed: {}", e)))?;

        // Block until the background and logo images have finished loading so
        // a partially painted page is never captured.
        let deadline = Instant::now() + Duration::from_millis(self.config.load_timeout_ms);
        loop {
            let eval = tab
                .evaluate(
                    r#"document.readyState === 'complete'
                        && Array.from(document.images).every(function(img) { return img.complete; })"#,
                    false,
                )
                .map_err(|e| Error::RenderFailure(format!("Stability check failed: {}", e)))?;

            if eval.value.as_ref().and_then(|v| v.as_bool()) == Some(true) {
                break;
            }
            if Instant::now() >= deadline {
                return Err(Error::RenderFailure(format!(
                    "Page did not become stable within {}ms",
                    self.config.load_timeout_ms
                )));
            }
            std::thread::sleep(Duration::from_millis(100));
        }

        // Quiescence window between load completion and capture
        std::thread::sleep(Duration::from_millis(self.config.stability_window_ms));

        let clip = Page::Viewport {
            x: 0.0,
            y: 0.0,
            width: CANVAS_WIDTH as f64,
            height: CANVAS_HEIGHT as f64,
            scale: 1.0,
        };
        let jpeg = tab
            .capture_screenshot(
                Page::CaptureScreenshotFormatOption::Jpeg,
                Some(JPEG_QUALITY),
                Some(clip),
                true,
            )
            .map_err(|e| Error::RenderFailure(format!("Screenshot failed: {}", e)))?;

        std::fs::write(output, &jpeg)
            .map_err(|e| Error::RenderFailure(format!("Failed to write capture: {}", e)))?;

        debug!(output = %output.display(), bytes = jpeg.len(), "capture written");
        Ok(())
    }
}
