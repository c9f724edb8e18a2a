//! BlueprintBoard Render Library
//!
//! Renderer abstraction and implementations for BlueprintBoard scenes.
//! The default implementation uses tiny-skia for CPU rasterization.

mod renderer;

#[cfg(feature = "skia-renderer")]
mod skia_impl;

pub use renderer::{RenderContext, RenderResult, RenderedImage, Renderer, RendererError};

#[cfg(feature = "skia-renderer")]
pub use skia_impl::SkiaRenderer;
