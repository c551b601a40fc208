//! Capmark Render Library
//!
//! Graphics backends for the capmark annotation engine. The default backend
//! builds a Vello scene and measures text with Parley.

mod renderer;

#[cfg(feature = "vello-renderer")]
mod measure;
#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use renderer::{RenderResult, Renderer, RendererError, check_canvas_size};

#[cfg(feature = "vello-renderer")]
pub use measure::ParleyMeasurer;
#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloContext;
