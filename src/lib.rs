//! sceneshot
//!
//! An HTTP service that renders 2D canvas scenes to images. A request posts a
//! fabric.js scene document plus dimensions; the service boots a headless
//! Chrome instance, renders the scene on a canvas inside a generated page,
//! screenshots the canvas element, and returns it as a base64 data URL.
//!
//! Rasterization, font shaping, and image encoding are all delegated to the
//! browser and fabric.js; this crate is the orchestration around them:
//! request validation, page templating, browser lifecycle, a bounded
//! completion wait, and response formatting.
//!
//! # Example
//!
//! ```no_run
//! use sceneshot::handlers::AppState;
//! use sceneshot::{ChromeRenderer, RendererConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let state = AppState {
//!     renderer: Arc::new(ChromeRenderer::new(RendererConfig::default())),
//! };
//! sceneshot::server::run_server("127.0.0.1:8080".parse()?, state).await
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod renderer;
pub mod scene;
pub mod server;

pub use error::{Error, Result};
pub use renderer::{ChromeRenderer, RenderedImage, SceneRenderer};
pub use scene::{RenderFormat, RenderRequest};

/// Configuration for the Chrome-backed renderer
///
/// The defaults mirror the service's production bounds: 10 seconds for the
/// bootstrap page to load and 15 seconds for the in-page render to signal
/// completion.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Bound on navigation and page load
    pub content_load_timeout: Duration,
    /// Bound on the wait for the page's completion signal
    pub completion_timeout: Duration,
    /// Explicit Chrome binary path; autodetected when `None`
    pub chrome_binary: Option<PathBuf>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            content_load_timeout: Duration::from_secs(10),
            completion_timeout: Duration::from_secs(15),
            chrome_binary: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RendererConfig::default();
        assert_eq!(config.content_load_timeout, Duration::from_secs(10));
        assert_eq!(config.completion_timeout, Duration::from_secs(15));
        assert!(config.chrome_binary.is_none());
    }
}
