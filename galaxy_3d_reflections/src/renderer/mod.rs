//! Renderer module — the rendering backend seam.
//!
//! The reflection core never draws anything itself. It allocates render
//! targets, clears them, and asks a `Renderer` to draw the scene from a
//! camera. Backends (GPU, console, test recorders) implement the trait.

mod renderer;

#[cfg(test)]
pub(crate) mod mock_renderer;

pub use renderer::{
    Renderer, CullingScope,
    RenderTargetId, RenderTargetDesc, TextureFormat,
    CLEAR_TRANSPARENT,
};
