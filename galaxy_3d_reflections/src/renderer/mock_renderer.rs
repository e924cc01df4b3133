/// Mock Renderer for unit tests (no GPU required)
///
/// Records every call, tracks what each render target currently holds,
/// and exposes the culling inversion flag seen by each draw so recursion
/// order and culling restoration can be asserted.

use rustc_hash::FxHashMap;
use crate::camera::{Camera, CameraPose, DebugVertex, LayerMask};
use crate::error::Result;
use crate::engine_bail;
use super::renderer::{Renderer, RenderTargetDesc, RenderTargetId};

const SOURCE: &str = "galaxy3d::MockRenderer";

/// Content of a mock render target
#[derive(Debug, Clone, PartialEq)]
pub enum TargetContents {
    /// Never cleared nor drawn into
    Undefined,
    /// Last cleared to this color
    Cleared([f32; 4]),
    /// Last drawn by this camera
    Rendered(String),
}

#[derive(Debug, Clone)]
pub struct MockTarget {
    pub desc: RenderTargetDesc,
    pub contents: TargetContents,
}

/// Recorded draw
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCall {
    pub camera: String,
    pub target: Option<RenderTargetId>,
    pub pose: CameraPose,
    pub inverted: bool,
    pub mirrored: bool,
}

#[derive(Debug, Default)]
pub struct MockRenderer {
    next_target: u64,
    targets: FxHashMap<RenderTargetId, MockTarget>,
    released: Vec<RenderTargetId>,
    invert_culling: bool,
    renders: Vec<RenderCall>,
    clears: Vec<RenderTargetId>,
    debug_vertices: usize,
    debug_layers: Vec<LayerMask>,
    fail_allocation: bool,
    fail_render_for: Option<String>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `create_render_target` fail
    pub fn set_fail_allocation(&mut self, fail: bool) {
        self.fail_allocation = fail;
    }

    /// Make draws of the named camera fail
    pub fn set_fail_render_for(&mut self, camera: Option<&str>) {
        self.fail_render_for = camera.map(str::to_string);
    }

    pub fn renders(&self) -> &[RenderCall] {
        &self.renders
    }

    /// Camera names in draw order
    pub fn rendered_cameras(&self) -> Vec<String> {
        self.renders.iter().map(|call| call.camera.clone()).collect()
    }

    pub fn clears(&self) -> &[RenderTargetId] {
        &self.clears
    }

    pub fn target(&self, id: RenderTargetId) -> Option<&MockTarget> {
        self.targets.get(&id)
    }

    pub fn live_target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn released_targets(&self) -> &[RenderTargetId] {
        &self.released
    }

    pub fn debug_vertex_count(&self) -> usize {
        self.debug_vertices
    }

    pub fn debug_layers(&self) -> &[LayerMask] {
        &self.debug_layers
    }

    /// Forget recorded draws and clears (targets are kept)
    pub fn reset_calls(&mut self) {
        self.renders.clear();
        self.clears.clear();
        self.debug_vertices = 0;
        self.debug_layers.clear();
    }
}

impl Renderer for MockRenderer {
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<RenderTargetId> {
        if self.fail_allocation {
            engine_bail!(SOURCE, "Out of render target memory");
        }
        self.next_target += 1;
        let id = RenderTargetId::new(self.next_target);
        self.targets.insert(id, MockTarget {
            desc: *desc,
            contents: TargetContents::Undefined,
        });
        Ok(id)
    }

    fn release_render_target(&mut self, target: RenderTargetId) -> Result<()> {
        if self.targets.remove(&target).is_none() {
            engine_bail!(SOURCE, InvalidResource => "Render target {:?} does not exist", target);
        }
        self.released.push(target);
        Ok(())
    }

    fn clear_render_target(&mut self, target: RenderTargetId, color: [f32; 4]) -> Result<()> {
        match self.targets.get_mut(&target) {
            Some(entry) => entry.contents = TargetContents::Cleared(color),
            None => engine_bail!(SOURCE, InvalidResource => "Render target {:?} does not exist", target),
        }
        self.clears.push(target);
        Ok(())
    }

    fn render_view(&mut self, camera: &Camera) -> Result<()> {
        if self.fail_render_for.as_deref() == Some(camera.name()) {
            engine_bail!(SOURCE, "Draw of '{}' failed", camera.name());
        }
        if let Some(target) = camera.target() {
            match self.targets.get_mut(&target) {
                Some(entry) => entry.contents = TargetContents::Rendered(camera.name().to_string()),
                None => engine_bail!(SOURCE, InvalidResource => "Render target {:?} does not exist", target),
            }
        }
        self.renders.push(RenderCall {
            camera: camera.name().to_string(),
            target: camera.target(),
            pose: camera.pose(),
            inverted: self.invert_culling,
            mirrored: camera.is_projection_mirrored(),
        });
        Ok(())
    }

    fn invert_culling(&self) -> bool {
        self.invert_culling
    }

    fn set_invert_culling(&mut self, invert: bool) {
        self.invert_culling = invert;
    }

    fn draw_debug_lines(&mut self, vertices: &[DebugVertex], layer: LayerMask) -> Result<()> {
        self.debug_vertices += vertices.len();
        self.debug_layers.push(layer);
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_renderer_tests.rs"]
mod tests;
