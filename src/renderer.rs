//! Browser lifecycle and screenshot capture (uses the `headless_chrome` crate)
//!
//! Each render launches a fresh headless Chrome instance, drives exactly one
//! tab through the bootstrap page, captures the canvas container element, and
//! closes the browser before returning. There is no pooling and no reuse
//! across requests.

use crate::bootstrap;
use crate::scene::{RenderFormat, RenderRequest};
use crate::{Error, RendererConfig, Result};
use base64::Engine as Base64Engine;
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, warn};
use std::sync::mpsc;
use std::sync::Arc;

/// Outcome reported by the page through the completion binding
type PageSignal = std::result::Result<(), String>;

/// A captured screenshot together with the format it was encoded in
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub format: RenderFormat,
}

/// Backend seam for rendering a scene into an image.
///
/// The production implementation drives headless Chrome; tests substitute
/// counting or failing stand-ins to exercise the HTTP layer without a
/// browser.
pub trait SceneRenderer: Send + Sync {
    fn render(&self, request: &RenderRequest) -> Result<RenderedImage>;
}

/// Renderer backed by a per-request headless Chrome instance
pub struct ChromeRenderer {
    config: RendererConfig,
}

impl ChromeRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }
}

impl SceneRenderer for ChromeRenderer {
    fn render(&self, request: &RenderRequest) -> Result<RenderedImage> {
        let session = ChromeSession::launch(&self.config, request)?;
        // Hold the outcome so the browser is closed on every path after a
        // successful launch, then report it.
        let outcome = session.capture(&self.config, request);
        session.close();
        outcome
    }
}

/// One launched browser plus the channel the page signals completion on.
///
/// Owned exclusively by a single in-flight render; `close` is called exactly
/// once whichever way `capture` exits.
struct ChromeSession {
    browser: Browser,
    tab: Arc<Tab>,
    signal_rx: mpsc::Receiver<PageSignal>,
}

impl ChromeSession {
    fn launch(config: &RendererConfig, request: &RenderRequest) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((request.scaled_width(), request.scaled_height())))
            .path(config.chrome_binary.clone())
            .build()
            .map_err(|e| {
                Error::InitializationError(format!("Failed to build launch options: {}", e))
            })?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::InitializationError(format!("Failed to create tab: {}", e)))?;

        tab.set_default_timeout(config.content_load_timeout);

        // Bridge the page's completion callback onto a channel so the wait
        // below is an explicit bounded receive, not global-flag polling.
        let (signal_tx, signal_rx) = mpsc::channel::<PageSignal>();
        tab.expose_function(
            bootstrap::COMPLETION_BINDING,
            Arc::new(move |payload: serde_json::Value| {
                let _ = signal_tx.send(parse_page_signal(payload));
            }),
        )
        .map_err(|e| {
            Error::InitializationError(format!("Failed to expose completion binding: {}", e))
        })?;

        Ok(Self {
            browser,
            tab,
            signal_rx,
        })
    }

    fn capture(&self, config: &RendererConfig, request: &RenderRequest) -> Result<RenderedImage> {
        let html = bootstrap::bootstrap_html(request.scene()?, request.width, request.height);
        let data_url = format!(
            "data:text/html;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(html)
        );

        self.tab
            .navigate_to(&data_url)
            .map_err(|e| Error::LoadError(format!("Navigation failed: {}", e)))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::LoadError(format!("Wait for navigation failed: {}", e)))?;

        match self.signal_rx.recv_timeout(config.completion_timeout) {
            Ok(Ok(())) => debug!("scene rendered, capturing {:?}", request.format),
            Ok(Err(detail)) => return Err(Error::RenderError(detail)),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                return Err(Error::Timeout(config.completion_timeout.as_millis() as u64))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(Error::RenderError(
                    "completion channel closed before the page signalled".into(),
                ))
            }
        }

        let element = self
            .tab
            .wait_for_element(bootstrap::CANVAS_CONTAINER_SELECTOR)
            .map_err(|_| Error::ElementNotFound)?;

        // Capture the container element only, not the full page. The clip's
        // scale field applies the device scale factor to the output pixels;
        // logical scene coordinates are unaffected.
        let mut clip = element
            .get_box_model()
            .map_err(|e| Error::RenderError(format!("Failed to measure canvas element: {}", e)))?
            .content_viewport();
        clip.scale = request.scale;

        let format_option = match request.format {
            RenderFormat::Png => Page::CaptureScreenshotFormatOption::Png,
            RenderFormat::Jpeg => Page::CaptureScreenshotFormatOption::Jpeg,
        };

        let bytes = self
            .tab
            .capture_screenshot(
                format_option,
                request.format.encoder_quality(request.quality),
                Some(clip),
                true,
            )
            .map_err(|e| Error::RenderError(format!("Screenshot failed: {}", e)))?;

        Ok(RenderedImage {
            bytes,
            format: request.format,
        })
    }

    /// Drop the tab and browser explicitly so the child process is
    /// terminated promptly.
    fn close(self) {
        drop(self.tab);
        drop(self.browser);
        debug!("browser closed");
    }
}

/// Decode the JSON payload posted by the bootstrap page's `done` callback
fn parse_page_signal(payload: serde_json::Value) -> PageSignal {
    // The binding delivers a JSON string; tolerate an already-parsed object.
    let msg = if let Some(s) = payload.as_str() {
        match serde_json::from_str::<serde_json::Value>(s) {
            Ok(v) => v,
            Err(_) => serde_json::Value::String(s.to_string()),
        }
    } else {
        payload
    };

    if msg.get("ok").and_then(|v| v.as_bool()) == Some(true) {
        Ok(())
    } else {
        let detail = msg
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("page reported failure without detail")
            .to_string();
        warn!("page reported rendering failure: {}", detail);
        Err(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_signal_success() {
        let payload = serde_json::Value::String(r#"{"ok":true}"#.to_string());
        assert_eq!(parse_page_signal(payload), Ok(()));
    }

    #[test]
    fn page_signal_error_carries_detail() {
        let payload =
            serde_json::Value::String(r#"{"ok":false,"error":"fabric is not defined"}"#.to_string());
        assert_eq!(
            parse_page_signal(payload),
            Err("fabric is not defined".to_string())
        );
    }

    #[test]
    fn page_signal_tolerates_parsed_objects() {
        assert_eq!(parse_page_signal(json!({ "ok": true })), Ok(()));
        assert!(parse_page_signal(json!({ "ok": false })).is_err());
        assert!(parse_page_signal(json!("garbage")).is_err());
    }
}
