//! Raster collaborator: turns a declarative layout tree into PNG bytes.
//!
//! The pipeline is scene -> SVG -> [`usvg`] parse -> [`resvg`] rasterize ->
//! PNG encode. Text nodes resolve against the system font database, loaded
//! once per [`Renderer`].

use std::sync::Arc;

use thiserror::Error;
use usvg::fontdb;

mod raster;
mod scene;

pub use scene::{Color, Node, Scene};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("svg did not parse: {0}")]
    InvalidSvg(#[from] usvg::Error),
    #[error("failed to allocate {width}x{height} pixmap")]
    Allocation { width: u32, height: u32 },
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Clone)]
pub struct Renderer {
    fontdb: Arc<fontdb::Database>,
}

impl Renderer {
    /// Enumerating system fonts walks the filesystem; construct once and
    /// clone the handle.
    pub fn new() -> Self {
        let mut fonts = fontdb::Database::new();
        fonts.load_system_fonts();
        tracing::debug!(faces = fonts.len(), "system font database loaded");
        Self {
            fontdb: Arc::new(fonts),
        }
    }

    pub fn render(&self, scene: &Scene) -> Result<Vec<u8>, RenderError> {
        let svg = scene.to_svg();
        raster::rasterize_to_png(&svg, scene.width, scene.height, &self.fontdb)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
