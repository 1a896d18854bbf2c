//! Postframe
//!
//! A social post image rendering service. A request carries a background
//! photo URL, a logo URL, and three text fragments (one highlighted "focus"
//! fragment); the service composes them into a fixed 1080x1080 card,
//! rasterizes the card to JPEG with headless Chrome, uploads the result to
//! remote object storage, and returns the public URL. A companion operation
//! deletes a previously generated image by validated filename.
//!
//! # Pipeline
//!
//! Generation is a linear pipeline: validate -> compose -> render -> upload
//! -> cleanup. The composed document is deterministic for identical inputs,
//! the renderer session and the scratch artifact are both scoped resources
//! released on every exit path, and local cleanup always runs regardless of
//! the upload outcome.
//!
//! The rendering engine and the storage service sit behind the `Rasterizer`
//! and `StorageGateway` traits so orchestration can be tested with stubs.

pub mod error;
pub use error::{Error, Result};

pub mod request;

pub mod layout;

pub mod rasterizer;

pub mod storage;

pub mod pipeline;

pub mod server;

/// Fixed canvas width in pixels
pub const CANVAS_WIDTH: u32 = 1080;

/// Fixed canvas height in pixels
pub const CANVAS_HEIGHT: u32 = 1080;

/// JPEG capture quality (maximum)
pub const JPEG_QUALITY: u32 = 100;
