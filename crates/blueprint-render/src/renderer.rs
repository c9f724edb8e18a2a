//! Renderer trait abstraction.

use blueprint_core::{Scene, SerializableColor};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid output size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for rendering one scene into a pixel buffer.
pub struct RenderContext<'a> {
    /// The scene to render.
    pub scene: &'a Scene,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Scale from canvas units to pixels.
    pub scale_factor: f64,
    /// Overrides the scene background.
    pub background_color: Option<Color>,
    pub anti_alias: bool,
}

impl<'a> RenderContext<'a> {
    /// Render at the scene's own size.
    pub fn new(scene: &'a Scene) -> Self {
        Self::with_output_size(
            scene,
            scene.size.width.max(0.0).ceil() as u32,
            scene.size.height.max(0.0).ceil() as u32,
        )
    }

    /// Render into a fixed-size buffer, independent of the canvas size.
    pub fn with_output_size(scene: &'a Scene, width: u32, height: u32) -> Self {
        Self {
            scene,
            width,
            height,
            scale_factor: 1.0,
            background_color: None,
            anti_alias: true,
        }
    }

    /// Scale the scene to fill the output buffer.
    pub fn fit_to_output(mut self) -> Self {
        let sx = f64::from(self.width) / self.scene.size.width;
        let sy = f64::from(self.height) / self.scene.size.height;
        let scale = sx.min(sy);
        if scale.is_finite() && scale > 0.0 {
            self.scale_factor = scale;
        }
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    /// Effective background color.
    pub fn background(&self) -> SerializableColor {
        self.background_color
            .map(SerializableColor::from)
            .unwrap_or(self.scene.background)
    }
}

/// Straight (non-premultiplied) RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    /// RGBA pixel data (4 bytes per pixel).
    pub rgba_data: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl RenderedImage {
    /// Pixel at `(x, y)`, if inside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<SerializableColor> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba_data.get(offset..offset + 4)?;
        Some(SerializableColor::new(px[0], px[1], px[2], px[3]))
    }

    /// Encode as PNG bytes.
    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            let mut writer = encoder
                .write_header()
                .map_err(|e| RendererError::Encode(e.to_string()))?;
            writer
                .write_image_data(&self.rgba_data)
                .map_err(|e| RendererError::Encode(e.to_string()))?;
        }
        Ok(png_data)
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Rasterize the context's scene.
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<RenderedImage>;

    /// Rasterize and encode as PNG.
    fn render_png(&mut self, ctx: &RenderContext) -> RenderResult<Vec<u8>> {
        self.render(ctx)?.to_png()
    }
}
