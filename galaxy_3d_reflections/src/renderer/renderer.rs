/// Renderer trait and render target descriptions.
///
/// A renderer is shared between every mirror of a scene behind an
/// `Arc<Mutex<dyn Renderer>>`. It owns the render targets (mirrors only
/// hold `RenderTargetId`s) and carries one piece of global pipeline state
/// the reflection core needs to control: the culling inversion flag.

use crate::camera::{Camera, DebugVertex, LayerMask};
use crate::error::Result;

/// Fully transparent black, the color mirror targets are cleared to
pub const CLEAR_TRANSPARENT: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

/// Opaque handle to a renderer-owned render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderTargetId(u64);

impl RenderTargetId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Color formats available for render targets
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    B8G8R8A8_UNORM,
    R16G16B16A16_SFLOAT,
}

impl TextureFormat {
    /// Bytes per pixel
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::R8G8B8A8_UNORM
            | TextureFormat::R8G8B8A8_SRGB
            | TextureFormat::B8G8R8A8_UNORM => 4,
            TextureFormat::R16G16B16A16_SFLOAT => 8,
        }
    }
}

/// Descriptor for creating an offscreen render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Color format
    pub format: TextureFormat,
    /// Depth buffer precision in bits (0 = no depth buffer)
    pub depth_bits: u32,
}

impl RenderTargetDesc {
    /// Square RGBA8 target with a 24-bit depth buffer
    pub fn square(size: u32) -> Self {
        Self {
            width: size,
            height: size,
            format: TextureFormat::R8G8B8A8_UNORM,
            depth_bits: 24,
        }
    }

    /// Color storage size in bytes
    pub fn color_bytes(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.format.bytes_per_pixel() as u64
    }
}

impl Default for RenderTargetDesc {
    fn default() -> Self {
        Self::square(512)
    }
}

/// Rendering backend
///
/// Implementations must be thread-safe (Send + Sync).
pub trait Renderer: Send + Sync {
    /// Allocate an offscreen render target
    ///
    /// # Arguments
    ///
    /// * `desc` - Size and format of the target
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<RenderTargetId>;

    /// Release a render target. Unknown ids are an error.
    fn release_render_target(&mut self, target: RenderTargetId) -> Result<()>;

    /// Fill a render target with a solid color
    fn clear_render_target(&mut self, target: RenderTargetId, color: [f32; 4]) -> Result<()>;

    /// Draw the scene as seen by `camera` into the camera's target
    /// (or the screen when it has none), honoring its culling mask and
    /// the current culling inversion flag
    fn render_view(&mut self, camera: &Camera) -> Result<()>;

    /// Current culling inversion flag
    fn invert_culling(&self) -> bool;

    /// Set the culling inversion flag (reverses which triangle winding
    /// counts as front-facing)
    fn set_invert_culling(&mut self, invert: bool);

    /// Submit a line list on the given layer. Backends without debug
    /// drawing ignore it.
    fn draw_debug_lines(&mut self, _vertices: &[DebugVertex], _layer: LayerMask) -> Result<()> {
        Ok(())
    }
}

/// Scoped culling inversion for one view.
///
/// Entering the scope toggles the renderer's inversion flag when the view
/// is mirrored; dropping it puts back the value it found. Nested scopes
/// compose, so a view mirrored twice draws with normal culling.
///
/// # Example
///
/// ```ignore
/// let mut scope = CullingScope::begin(renderer, camera.is_projection_mirrored());
/// scope.render_view(camera)?;
/// // flag restored here, also when render_view failed
/// ```
pub struct CullingScope<'a> {
    renderer: &'a mut dyn Renderer,
    previous: bool,
}

impl<'a> CullingScope<'a> {
    pub fn begin(renderer: &'a mut dyn Renderer, mirrored: bool) -> Self {
        let previous = renderer.invert_culling();
        renderer.set_invert_culling(previous ^ mirrored);
        Self { renderer, previous }
    }

    /// Draw a view with the scoped culling state
    pub fn render_view(&mut self, camera: &Camera) -> Result<()> {
        self.renderer.render_view(camera)
    }

    /// Flag value that will be restored on drop
    pub fn previous(&self) -> bool {
        self.previous
    }
}

impl Drop for CullingScope<'_> {
    fn drop(&mut self) {
        self.renderer.set_invert_culling(self.previous);
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
