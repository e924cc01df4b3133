/// Mirror — a reflective surface and the camera that renders its reflection.
///
/// Lifecycle: `Idle` (constructed) → `Initialized` (reflection camera and
/// render target exist) → `Active` (first pose update done) → `Destroyed`.
/// Rendering or destroying an `Idle` mirror is a precondition violation and
/// fails loudly instead of doing nothing.

use crate::camera::{CameraKey, CameraPose, CameraSet, look_rotation};
use crate::error::Result;
use crate::reflection::{MirrorPlane, reflect_camera};
use crate::renderer::{CullingScope, Renderer, RenderTargetDesc, RenderTargetId};
use crate::scene::MirrorSurface;
use crate::{engine_bail, engine_debug, engine_err, engine_info};

const SOURCE: &str = "galaxy3d::Mirror";

/// Lifecycle state of a mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorState {
    Idle,
    Initialized,
    Active,
    Destroyed,
}

/// Per-frame operations every mirror supports
pub trait ReflectiveSurface {
    /// Recompute the reflection camera pose and projection from the
    /// current source camera and mirror plane
    fn update_pose(&mut self, cameras: &mut CameraSet) -> Result<()>;

    /// Draw the reflection camera's view into the mirror's render target
    fn render(&self, cameras: &CameraSet, renderer: &mut dyn Renderer) -> Result<()>;

    /// Release the render target and the reflection camera. Calling it on
    /// an already destroyed mirror does nothing.
    fn destroy(&mut self, cameras: &mut CameraSet, renderer: &mut dyn Renderer) -> Result<()>;
}

#[derive(Debug)]
pub struct Mirror {
    name: String,
    surface: MirrorSurface,
    source_camera: Option<CameraKey>,
    reflection_camera: Option<CameraKey>,
    render_target: Option<RenderTargetId>,
    state: MirrorState,
}

impl Mirror {
    pub fn new(name: impl Into<String>, surface: MirrorSurface) -> Self {
        Self {
            name: name.into(),
            surface,
            source_camera: None,
            reflection_camera: None,
            render_target: None,
            state: MirrorState::Idle,
        }
    }

    /// Create the reflection camera and its render target.
    ///
    /// The reflection camera copies the source camera's settings, is named
    /// after the mirror, draws one priority step before its source, and
    /// starts at the mirror position looking along the surface normal. The
    /// render target is bound as the surface texture.
    ///
    /// # Arguments
    ///
    /// * `source` - Camera this mirror reflects
    /// * `cameras` - Camera set receiving the reflection camera
    /// * `renderer` - Backend allocating the render target
    /// * `target` - Render target size and format
    pub fn initialize(
        &mut self,
        source: CameraKey,
        cameras: &mut CameraSet,
        renderer: &mut dyn Renderer,
        target: &RenderTargetDesc,
    ) -> Result<()> {
        if self.state != MirrorState::Idle {
            engine_bail!(SOURCE, InvalidState =>
                "Mirror '{}' is already initialized ({:?})", self.name, self.state);
        }

        let source_camera = cameras.camera(source)?;
        let priority = source_camera.priority().checked_sub(1).ok_or_else(|| {
            engine_err!(SOURCE, InvalidState =>
                "Mirror '{}' cannot draw before camera '{}' (priority {})",
                self.name, source_camera.name(), source_camera.priority())
        })?;
        let mut reflection = source_camera.clone_as(format!("{} Camera", self.name));
        reflection.set_priority(priority);
        reflection.set_pose(CameraPose::new(
            self.surface.position(),
            look_rotation(self.surface.normal(), self.surface.forward()),
        ));

        let render_target = renderer.create_render_target(target)?;
        reflection.set_target(Some(render_target));

        self.reflection_camera = Some(cameras.insert(reflection));
        self.render_target = Some(render_target);
        self.source_camera = Some(source);
        self.surface.bind_texture(Some(render_target));
        self.state = MirrorState::Initialized;

        engine_debug!(SOURCE, "Mirror '{}' allocated render target {:?} ({}x{})",
            self.name, render_target, target.width, target.height);
        engine_info!(SOURCE, "Mirror '{}' initialized", self.name);
        Ok(())
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surface(&self) -> &MirrorSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut MirrorSurface {
        &mut self.surface
    }

    pub fn state(&self) -> MirrorState {
        self.state
    }

    /// Initialized or active
    pub fn is_live(&self) -> bool {
        matches!(self.state, MirrorState::Initialized | MirrorState::Active)
    }

    /// Camera currently being reflected
    pub fn source_camera(&self) -> Option<CameraKey> {
        self.source_camera
    }

    /// Retarget the mirror at another camera.
    pub fn set_source_camera(&mut self, source: CameraKey) {
        self.source_camera = Some(source);
    }

    /// Key of the reflection camera
    pub fn reflection_camera(&self) -> Result<CameraKey> {
        self.reflection_camera.ok_or_else(|| {
            engine_err!(SOURCE, InvalidState => "Mirror '{}' has no reflection camera ({:?})",
                self.name, self.state)
        })
    }

    pub fn render_target(&self) -> Option<RenderTargetId> {
        self.render_target
    }

    /// Current reflection plane
    pub fn plane(&self) -> MirrorPlane {
        self.surface.mirror_plane()
    }

    /// Fail unless initialized or active.
    pub(crate) fn require_live(&self, operation: &str) -> Result<()> {
        match self.state {
            MirrorState::Initialized | MirrorState::Active => Ok(()),
            MirrorState::Idle => engine_bail!(SOURCE, InvalidState =>
                "Cannot {} mirror '{}': not initialized", operation, self.name),
            MirrorState::Destroyed => engine_bail!(SOURCE, InvalidState =>
                "Cannot {} mirror '{}': already destroyed", operation, self.name),
        }
    }
}

impl ReflectiveSurface for Mirror {
    fn update_pose(&mut self, cameras: &mut CameraSet) -> Result<()> {
        self.require_live("update")?;
        let source = self.source_camera.ok_or_else(|| {
            engine_err!(SOURCE, InvalidState => "Mirror '{}' has no source camera", self.name)
        })?;
        let reflection = self.reflection_camera()?;

        let source_camera = cameras.camera(source)?;
        let view = reflect_camera(&source_camera.pose(), source_camera.projection_matrix(), &self.plane());

        let camera = cameras.camera_mut(reflection)?;
        camera.set_pose(view.pose);
        camera.set_projection(view.projection);

        self.state = MirrorState::Active;
        Ok(())
    }

    fn render(&self, cameras: &CameraSet, renderer: &mut dyn Renderer) -> Result<()> {
        self.require_live("render")?;
        let camera = cameras.camera(self.reflection_camera()?)?;

        let mut scope = CullingScope::begin(renderer, camera.is_projection_mirrored());
        scope.render_view(camera)
    }

    fn destroy(&mut self, cameras: &mut CameraSet, renderer: &mut dyn Renderer) -> Result<()> {
        match self.state {
            MirrorState::Destroyed => return Ok(()),
            MirrorState::Idle => engine_bail!(SOURCE, InvalidState =>
                "Cannot destroy mirror '{}': not initialized", self.name),
            MirrorState::Initialized | MirrorState::Active => {}
        }

        // Mark destroyed first so a failed release is not retried
        self.state = MirrorState::Destroyed;
        self.surface.bind_texture(None);
        if let Some(key) = self.reflection_camera.take() {
            cameras.remove(key);
        }
        if let Some(target) = self.render_target.take() {
            renderer.release_render_target(target)?;
            engine_debug!(SOURCE, "Mirror '{}' released render target {:?}", self.name, target);
        }

        engine_info!(SOURCE, "Mirror '{}' destroyed", self.name);
        Ok(())
    }
}

#[cfg(test)]
#[path = "mirror_tests.rs"]
mod tests;
