//! Request payloads and input validation
//!
//! Incoming bodies are deserialized into loose payload structs first, then
//! validated into immutable request types. Validation reports the first
//! failing field so nothing downstream ever sees a half-formed request.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use url::Url;

/// Default highlight color applied when `focusTextColor` is omitted
pub const DEFAULT_FOCUS_COLOR: &str = "#FF6B35";

/// Default paragraph direction
pub const DEFAULT_DIRECTION: Direction = Direction::Ltr;

/// Default document locale
pub const DEFAULT_LANGUAGE: &str = "en";

/// Logical storage folder all generated images live under
pub const STORAGE_FOLDER: &str = "processed_images";

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());

static ARTIFACT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^processed_image_\d+\.jpg$").unwrap());

/// Reading direction of the composed card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    /// Value of the HTML `dir` attribute
    pub fn dir_attr(&self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

/// Raw generation body as received over the wire.
///
/// All fields are optional at this layer so that missing or malformed values
/// produce our own validation errors rather than a deserializer rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPayload {
    pub image_url: Option<String>,
    pub logo_url: Option<String>,
    pub text01: Option<String>,
    pub focus_text: Option<String>,
    pub text02: Option<String>,
    pub direction: Option<String>,
    pub language: Option<String>,
    pub focus_text_color: Option<String>,
}

/// A validated, normalized generation request. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub image_url: Url,
    pub logo_url: Url,
    pub text01: String,
    pub focus_text: String,
    pub text02: String,
    pub direction: Direction,
    pub language: String,
    pub focus_text_color: String,
}

impl GenerationPayload {
    /// Validate the payload and apply defaults for the optional fields.
    ///
    /// Fields are checked in declaration order and the first failure wins.
    pub fn validate(self) -> Result<GenerationRequest> {
        let image_url = require_absolute_url("imageUrl", self.image_url)?;
        let logo_url = require_absolute_url("logoUrl", self.logo_url)?;
        let text01 = require_text("text01", self.text01)?;
        let focus_text = require_text("focusText", self.focus_text)?;
        let text02 = require_text("text02", self.text02)?;

        let direction = match self.direction.as_deref() {
            None => DEFAULT_DIRECTION,
            Some("ltr") => Direction::Ltr,
            Some("rtl") => Direction::Rtl,
            Some(other) => {
                return Err(Error::InvalidInput(format!(
                    "direction must be \"ltr\" or \"rtl\", got \"{}\"",
                    other
                )))
            }
        };

        let language = match self.language {
            None => DEFAULT_LANGUAGE.to_string(),
            Some(lang) if !lang.trim().is_empty() => lang,
            Some(_) => {
                return Err(Error::InvalidInput(
                    "language must be a non-empty locale tag".into(),
                ))
            }
        };

        let focus_text_color = match self.focus_text_color {
            None => DEFAULT_FOCUS_COLOR.to_string(),
            Some(color) if HEX_COLOR_RE.is_match(&color) => color,
            Some(color) => {
                return Err(Error::InvalidInput(format!(
                    "focusTextColor must be a #RGB or #RRGGBB hex color, got \"{}\"",
                    color
                )))
            }
        };

        Ok(GenerationRequest {
            image_url,
            logo_url,
            text01,
            focus_text,
            text02,
            direction,
            language,
            focus_text_color,
        })
    }
}

fn require_absolute_url(field: &str, value: Option<String>) -> Result<Url> {
    let raw = value.ok_or_else(|| Error::InvalidInput(format!("{} is required", field)))?;
    let url = Url::parse(&raw)
        .map_err(|_| Error::InvalidInput(format!("{} must be an absolute URL", field)))?;
    // Fetchable image sources only: a scheme alone (mailto:, data:) is not enough
    if !url.has_host() {
        return Err(Error::InvalidInput(format!(
            "{} must be an absolute URL",
            field
        )));
    }
    Ok(url)
}

fn require_text(field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(Error::InvalidInput(format!(
            "{} must be a non-empty string",
            field
        ))),
    }
}

/// Raw deletion body as received over the wire
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionPayload {
    pub file_name: Option<String>,
}

/// A validated deletion request referencing a previously generated artifact
#[derive(Debug, Clone)]
pub struct DeletionRequest {
    pub file_name: String,
}

impl DeletionPayload {
    /// Accept only filenames the generation pipeline could have produced.
    /// Anything else (path traversal attempts included) is rejected before
    /// any storage call is made.
    pub fn validate(self) -> Result<DeletionRequest> {
        let file_name = self
            .file_name
            .ok_or_else(|| Error::InvalidInput("fileName is required".into()))?;
        if !ARTIFACT_NAME_RE.is_match(&file_name) {
            return Err(Error::InvalidInput(format!(
                "fileName must match processed_image_<timestamp>.jpg, got \"{}\"",
                file_name
            )));
        }
        Ok(DeletionRequest { file_name })
    }
}

impl DeletionRequest {
    /// Storage identifier derived from the filename: the logical folder plus
    /// the extension-stripped name.
    pub fn public_id(&self) -> String {
        let stem = self.file_name.trim_end_matches(".jpg");
        format!("{}/{}", STORAGE_FOLDER, stem)
    }
}

/// Artifact filename for a generation run started at `unix_ms`
pub fn artifact_file_name(unix_ms: u128) -> String {
    format!("processed_image_{}.jpg", unix_ms)
}
