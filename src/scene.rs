//! Render request model and validation
//!
//! The scene document itself is opaque to this crate: it is handed verbatim
//! to fabric.js inside the page. Only the surrounding parameters (dimensions,
//! output format, quality, scale) are interpreted here.

use crate::{Error, Result};
use serde::Deserialize;

/// Maximum logical canvas dimension accepted per axis.
pub const MAX_DIMENSION: u32 = 4096;

/// Maximum device scale factor.
pub const MAX_SCALE: f64 = 4.0;

/// Maximum scaled (pixel) dimension per axis after applying `scale`.
pub const MAX_SCALED_DIMENSION: u32 = 8192;

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_quality() -> f64 {
    1.0
}

fn default_scale() -> f64 {
    1.0
}

/// Output image format for the captured screenshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    #[default]
    Png,
    Jpeg,
}

impl RenderFormat {
    /// Media type used in the returned data URL prefix
    pub fn media_type(self) -> &'static str {
        match self {
            RenderFormat::Png => "image/png",
            RenderFormat::Jpeg => "image/jpeg",
        }
    }

    /// Map the request quality fraction to the encoder's 0-100 scale.
    /// PNG is lossless and ignores quality entirely.
    pub fn encoder_quality(self, quality: f64) -> Option<u32> {
        match self {
            RenderFormat::Png => None,
            RenderFormat::Jpeg => Some((quality * 100.0).round().clamp(0.0, 100.0) as u32),
        }
    }
}

/// One render request, as posted to `/api/render`
#[derive(Debug, Clone, Deserialize)]
pub struct RenderRequest {
    /// Opaque fabric.js scene document. Required; validated, never interpreted.
    #[serde(default)]
    pub canvas_data: Option<serde_json::Value>,

    /// Logical canvas width in CSS pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Logical canvas height in CSS pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Output image format
    #[serde(default)]
    pub format: RenderFormat,

    /// Encoder quality fraction in [0, 1]; only used for JPEG
    #[serde(default = "default_quality")]
    pub quality: f64,

    /// Device scale factor; the output image is `width*scale` x `height*scale`
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl RenderRequest {
    /// Validate the request before any browser is launched.
    ///
    /// Upper bounds on dimensions and scale are enforced here so a single
    /// request cannot demand an arbitrarily large viewport.
    pub fn validate(&self) -> Result<()> {
        match &self.canvas_data {
            None => return Err(Error::InvalidRequest("canvas_data is required".into())),
            Some(scene) if scene.is_null() => {
                return Err(Error::InvalidRequest("canvas_data is required".into()))
            }
            Some(_) => {}
        }

        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidRequest(
                "width and height must be positive".into(),
            ));
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(Error::InvalidRequest(format!(
                "width and height must not exceed {}",
                MAX_DIMENSION
            )));
        }

        if !(self.scale > 0.0) {
            return Err(Error::InvalidRequest("scale must be positive".into()));
        }
        if self.scale > MAX_SCALE {
            return Err(Error::InvalidRequest(format!(
                "scale must not exceed {}",
                MAX_SCALE
            )));
        }
        if self.scaled_width() > MAX_SCALED_DIMENSION || self.scaled_height() > MAX_SCALED_DIMENSION
        {
            return Err(Error::InvalidRequest(format!(
                "scaled dimensions must not exceed {} pixels",
                MAX_SCALED_DIMENSION
            )));
        }

        if !(0.0..=1.0).contains(&self.quality) {
            return Err(Error::InvalidRequest(
                "quality must be between 0 and 1".into(),
            ));
        }

        Ok(())
    }

    /// Scene document, or an error if it was absent
    pub fn scene(&self) -> Result<&serde_json::Value> {
        self.canvas_data
            .as_ref()
            .ok_or_else(|| Error::InvalidRequest("canvas_data is required".into()))
    }

    /// Output width in device pixels
    pub fn scaled_width(&self) -> u32 {
        (f64::from(self.width) * self.scale).round() as u32
    }

    /// Output height in device pixels
    pub fn scaled_height(&self) -> u32 {
        (f64::from(self.height) * self.scale).round() as u32
    }
}
