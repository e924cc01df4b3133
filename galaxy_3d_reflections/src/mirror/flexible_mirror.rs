/// FlexibleMirror — a mirror that knows what it can see.
///
/// On top of a plain `Mirror` it keeps the local bounds of its surface and
/// a portal frustum: the volume its reflection camera sees through the
/// mirror rectangle. The reflection manager uses that frustum to decide
/// which other mirrors appear inside this one.

use glam::Vec3;
use crate::camera::{CameraKey, CameraSet, Frustum, LayerMask};
use crate::error::Result;
use crate::renderer::{Renderer, RenderTargetDesc, CLEAR_TRANSPARENT};
use crate::scene::{AABB, MirrorSurface};
use crate::{engine_bail, engine_err};
use super::mirror::{Mirror, ReflectiveSurface};

const SOURCE: &str = "galaxy3d::FlexibleMirror";

/// Translucent cyan
pub const DEFAULT_FRUSTUM_COLOR: [f32; 4] = [0.0, 1.0, 1.0, 0.25];

/// Visibility operations of mirrors that track a frustum
pub trait FrustumAware {
    /// Rebuild the portal frustum from the reflection camera's current pose
    fn update_frustum(&mut self, cameras: &CameraSet) -> Result<()>;

    /// Current portal frustum (`None` before initialization)
    fn frustum(&self) -> Option<&Frustum>;

    /// Surface bounds in world space (`None` before initialization)
    fn world_bounds(&self) -> Option<AABB>;

    /// Clear the render target to transparent black
    fn clear_render_target(&self, renderer: &mut dyn Renderer) -> Result<()>;
}

#[derive(Debug)]
pub struct FlexibleMirror {
    mirror: Mirror,
    bounds: Option<AABB>,
    frustum: Option<Frustum>,
    frustum_color: [f32; 4],
    frustum_layer: LayerMask,
}

impl FlexibleMirror {
    pub fn new(name: impl Into<String>, surface: MirrorSurface, frustum_color: [f32; 4]) -> Self {
        Self {
            mirror: Mirror::new(name, surface),
            bounds: None,
            frustum: None,
            frustum_color,
            frustum_layer: LayerMask::empty(),
        }
    }

    /// Initialize the underlying mirror, capture the surface bounds and
    /// build a first frustum from the source camera.
    ///
    /// # Arguments
    ///
    /// * `frustum_layer` - Layer the frustum visualization is drawn on
    pub fn initialize(
        &mut self,
        source: CameraKey,
        cameras: &mut CameraSet,
        renderer: &mut dyn Renderer,
        target: &RenderTargetDesc,
        frustum_layer: LayerMask,
    ) -> Result<()> {
        let bounds = self.mirror.surface().local_bounds().ok_or_else(|| {
            engine_err!(SOURCE, InitializationFailed =>
                "Mirror '{}' has no surface geometry", self.mirror.name())
        })?;

        self.mirror.initialize(source, cameras, renderer, target)?;
        self.bounds = Some(bounds);
        self.frustum_layer = frustum_layer;

        let frustum = Frustum::from_mirror(self, source, cameras)?;
        self.frustum = Some(frustum);
        Ok(())
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    pub fn mirror_mut(&mut self) -> &mut Mirror {
        &mut self.mirror
    }

    pub fn name(&self) -> &str {
        self.mirror.name()
    }

    /// Bounds captured at initialization, in surface space
    pub fn local_bounds(&self) -> Option<AABB> {
        self.bounds
    }

    pub fn frustum_color(&self) -> [f32; 4] {
        self.frustum_color
    }

    pub fn frustum_layer(&self) -> LayerMask {
        self.frustum_layer
    }

    /// World-space rectangle the reflection is seen through.
    ///
    /// The rectangle spans the local bounds in X and Z at their mid height,
    /// wound in order around the surface normal.
    pub fn portal_corners(&self) -> Result<[Vec3; 4]> {
        let Some(bounds) = self.bounds else {
            engine_bail!(SOURCE, InvalidState =>
                "Mirror '{}' has no bounds: not initialized", self.mirror.name());
        };

        let y = (bounds.min.y + bounds.max.y) * 0.5;
        let world = self.mirror.surface().world_matrix();
        Ok([
            Vec3::new(bounds.min.x, y, bounds.min.z),
            Vec3::new(bounds.max.x, y, bounds.min.z),
            Vec3::new(bounds.max.x, y, bounds.max.z),
            Vec3::new(bounds.min.x, y, bounds.max.z),
        ].map(|corner| world.transform_point3(corner)))
    }
}

impl ReflectiveSurface for FlexibleMirror {
    fn update_pose(&mut self, cameras: &mut CameraSet) -> Result<()> {
        self.mirror.update_pose(cameras)
    }

    fn render(&self, cameras: &CameraSet, renderer: &mut dyn Renderer) -> Result<()> {
        self.mirror.render(cameras, renderer)
    }

    fn destroy(&mut self, cameras: &mut CameraSet, renderer: &mut dyn Renderer) -> Result<()> {
        self.frustum = None;
        self.mirror.destroy(cameras, renderer)
    }
}

impl FrustumAware for FlexibleMirror {
    fn update_frustum(&mut self, cameras: &CameraSet) -> Result<()> {
        self.mirror.require_live("update frustum of")?;
        let camera = self.mirror.reflection_camera()?;
        let frustum = Frustum::from_mirror(self, camera, cameras)?;
        self.frustum = Some(frustum);
        Ok(())
    }

    fn frustum(&self) -> Option<&Frustum> {
        self.frustum.as_ref()
    }

    fn world_bounds(&self) -> Option<AABB> {
        self.bounds
            .map(|bounds| bounds.transformed(self.mirror.surface().world_matrix()))
    }

    fn clear_render_target(&self, renderer: &mut dyn Renderer) -> Result<()> {
        self.mirror.require_live("clear")?;
        match self.mirror.render_target() {
            Some(target) => renderer.clear_render_target(target, CLEAR_TRANSPARENT),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "flexible_mirror_tests.rs"]
mod tests;
