//! Recursive mirror-in-mirror reflections.
//!
//! Every frame the manager finds the mirrors inside the main camera's
//! frustum and draws each of them. Drawing a mirror first draws, depth
//! first, every other mirror inside that mirror's portal frustum, with the
//! nested mirror temporarily reflecting the outer mirror's reflection
//! camera. Nesting stops after `max_recursion_depth` levels. A mirror is
//! never nested directly inside itself.
//!
//! Nested draws move reflection cameras and retarget mirrors. Each level
//! captures a `RestorePoint` after computing its own pose and puts it back
//! after every nested draw (and before its own render), so whatever a
//! nested level did is invisible to the level above. Restoration also
//! happens when a nested draw fails.

use std::sync::{Arc, Mutex};
use crate::camera::{Camera, CameraKey, CameraSet, Frustum};
use crate::config::{ReflectionSettings, SceneConfig};
use crate::error::Result;
use crate::mirror::{FlexibleMirror, FrustumAware, ReflectiveSurface, RestorePoint};
use crate::renderer::Renderer;
use crate::scene::MirrorSurface;
use crate::{engine_bail, engine_debug, engine_err, engine_error, engine_info, engine_trace};
use super::frame_phases::FramePhases;
use super::{lock_renderer, lock_renderer_for_teardown};
use super::visibility_report::VisibilityReport;

const SOURCE: &str = "galaxy3d::ReflectionManager";

pub struct ReflectionManager {
    renderer: Arc<Mutex<dyn Renderer>>,
    cameras: CameraSet,
    main_camera: CameraKey,
    main_frustum: Option<Frustum>,
    mirrors: Vec<FlexibleMirror>,
    settings: ReflectionSettings,
    /// Mirrors in the main frustum, computed by `update`
    visible: Vec<usize>,
    report: VisibilityReport,
    initialized: bool,
}

impl ReflectionManager {
    /// Create a manager with no mirrors yet.
    ///
    /// The frustum visualization layer is removed from the main camera's
    /// culling mask.
    pub fn new(
        renderer: Arc<Mutex<dyn Renderer>>,
        main_camera: Camera,
        settings: ReflectionSettings,
    ) -> Self {
        let mut main_camera = main_camera;
        main_camera.set_culling_mask(main_camera.culling_mask() - settings.frustum_layer);

        let mut cameras = CameraSet::new();
        let main_camera = cameras.insert(main_camera);
        Self {
            renderer,
            cameras,
            main_camera,
            main_frustum: None,
            mirrors: Vec::new(),
            settings,
            visible: Vec::new(),
            report: VisibilityReport::new(),
            initialized: false,
        }
    }

    /// Build and initialize a manager from a scene file.
    pub fn from_config(config: &SceneConfig, renderer: Arc<Mutex<dyn Renderer>>) -> Result<Self> {
        config.validate()?;
        let mut manager = Self::new(renderer, config.camera.build(), config.settings()?);
        for mirror in &config.mirrors {
            manager.add_mirror(mirror.name.clone(), mirror.surface(), mirror.frustum_color)?;
        }
        manager.initialize()?;
        Ok(manager)
    }

    /// Register a mirror. Only allowed before `initialize`.
    ///
    /// # Returns
    ///
    /// Index of the mirror
    pub fn add_mirror(
        &mut self,
        name: impl Into<String>,
        surface: MirrorSurface,
        frustum_color: [f32; 4],
    ) -> Result<usize> {
        let name = name.into();
        if self.initialized {
            engine_bail!(SOURCE, InvalidState => "Cannot add mirror '{}' after initialization", name);
        }
        if self.mirror_index(&name).is_some() {
            engine_bail!(SOURCE, InvalidResource => "Mirror '{}' already exists", name);
        }
        self.mirrors.push(FlexibleMirror::new(name, surface, frustum_color));
        Ok(self.mirrors.len() - 1)
    }

    /// Initialize every mirror against the main camera and build the main
    /// frustum.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            engine_bail!(SOURCE, InvalidState => "Reflection manager already initialized");
        }
        let renderer = Arc::clone(&self.renderer);
        let mut renderer = lock_renderer(&renderer, SOURCE)?;

        for mirror in &mut self.mirrors {
            mirror.initialize(
                self.main_camera,
                &mut self.cameras,
                &mut *renderer,
                &self.settings.render_target,
                self.settings.frustum_layer,
            )?;
        }
        self.main_frustum = Some(Frustum::from_camera(
            self.main_camera,
            &self.cameras,
            self.settings.main_frustum_color,
            self.settings.frustum_layer,
        )?);

        self.initialized = true;
        engine_info!(SOURCE, "Reflection manager initialized with {} mirror(s), max depth {}",
            self.mirrors.len(), self.settings.max_recursion_depth);
        Ok(())
    }

    /// Destroy every mirror. Safe to call more than once.
    pub fn shutdown(&mut self) -> Result<()> {
        let renderer = Arc::clone(&self.renderer);
        let mut renderer = lock_renderer_for_teardown(&renderer, SOURCE);
        for mirror in &mut self.mirrors {
            if mirror.mirror().is_live() {
                mirror.destroy(&mut self.cameras, &mut *renderer)?;
            }
        }
        self.visible.clear();
        Ok(())
    }

    // ===== ACCESSORS =====

    pub fn cameras(&self) -> &CameraSet {
        &self.cameras
    }

    pub fn main_camera_key(&self) -> CameraKey {
        self.main_camera
    }

    pub fn main_camera(&self) -> Result<&Camera> {
        self.cameras.camera(self.main_camera)
    }

    /// The main camera, to move it between frames
    pub fn main_camera_mut(&mut self) -> Result<&mut Camera> {
        self.cameras.camera_mut(self.main_camera)
    }

    pub fn main_frustum(&self) -> Option<&Frustum> {
        self.main_frustum.as_ref()
    }

    pub fn mirrors(&self) -> &[FlexibleMirror] {
        &self.mirrors
    }

    pub fn mirror(&self, index: usize) -> Option<&FlexibleMirror> {
        self.mirrors.get(index)
    }

    /// Mutable mirror access, to move a mirror between frames
    pub fn mirror_mut(&mut self, index: usize) -> Option<&mut FlexibleMirror> {
        self.mirrors.get_mut(index)
    }

    pub fn mirror_index(&self, name: &str) -> Option<usize> {
        self.mirrors.iter().position(|mirror| mirror.name() == name)
    }

    pub fn settings(&self) -> &ReflectionSettings {
        &self.settings
    }

    pub fn set_max_recursion_depth(&mut self, depth: u32) {
        self.settings.max_recursion_depth = depth;
    }

    pub fn set_show_frustums(&mut self, show: bool) {
        self.settings.show_frustums = show;
    }

    /// What was seen and drawn during the last frame
    pub fn report(&self) -> &VisibilityReport {
        &self.report
    }

    /// Indices of the mirrors found in the main frustum by the last `update`
    pub fn visible_mirrors(&self) -> &[usize] {
        &self.visible
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn require_initialized(&self) -> Result<()> {
        if !self.initialized {
            engine_bail!(SOURCE, InvalidState => "Reflection manager is not initialized");
        }
        Ok(())
    }

    // ===== RECURSIVE DRAWING =====

    /// Draw mirror `index` with `depth_remaining` nested levels below it.
    ///
    /// The mirror's source camera must already be set. On return, the
    /// mirror's source camera and that camera's pose are the ones captured
    /// after this mirror computed its own pose.
    pub(crate) fn draw_mirror(
        &mut self,
        index: usize,
        depth_remaining: u32,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        let mirror = &mut self.mirrors[index];
        mirror.update_pose(&mut self.cameras)?;
        mirror.update_frustum(&self.cameras)?;
        let restore_point = RestorePoint::capture(mirror.mirror(), &self.cameras)?;

        let nested = if depth_remaining > 0 {
            self.draw_reflected_mirrors(index, depth_remaining, &restore_point, renderer)
        } else {
            Ok(())
        };

        // Unconditional: the level above must see its own state again
        let mirror = &mut self.mirrors[index];
        restore_point.restore(mirror.mirror_mut(), &mut self.cameras)?;
        nested?;

        mirror.render(&self.cameras, renderer)?;
        self.report.record_render(mirror.name(), depth_remaining);
        Ok(())
    }

    /// Draw every other mirror inside mirror `index`'s frustum, one level
    /// deeper.
    fn draw_reflected_mirrors(
        &mut self,
        index: usize,
        depth_remaining: u32,
        restore_point: &RestorePoint,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        let viewer = self.mirrors[index].mirror().reflection_camera()?;
        let nested_depth = depth_remaining - 1;

        for other in 0..self.mirrors.len() {
            if other == index {
                continue;
            }
            let Some(frustum) = self.mirrors[index].frustum() else {
                break;
            };
            if !frustum.contains_mirror(&self.mirrors[other]) {
                continue;
            }

            engine_trace!(SOURCE, "{} can see {} (depth {})",
                self.mirrors[index].name(), self.mirrors[other].name(), nested_depth);
            self.report.record_visibility(self.mirrors[index].name(), self.mirrors[other].name(), nested_depth);

            self.mirrors[other].mirror_mut().set_source_camera(viewer);
            let result = self.draw_mirror(other, nested_depth, renderer);

            let restored = self.restore_after_nested(index, restore_point);
            result?;
            restored?;
        }
        Ok(())
    }

    /// Undo a nested draw: put back mirror `index`'s source and recompute
    /// its pose and frustum, which the nested level may have overwritten.
    fn restore_after_nested(&mut self, index: usize, restore_point: &RestorePoint) -> Result<()> {
        let mirror = &mut self.mirrors[index];
        restore_point.restore(mirror.mirror_mut(), &mut self.cameras)?;
        mirror.update_pose(&mut self.cameras)?;
        mirror.update_frustum(&self.cameras)
    }

    fn submit_frustums(&self, renderer: &mut dyn Renderer) -> Result<()> {
        let mut vertices = Vec::new();
        if let Some(frustum) = &self.main_frustum {
            vertices.extend(frustum.debug_lines());
        }
        // Frustums of mirrors not drawn this frame are left over from an earlier one
        for mirror in self.mirrors.iter().filter(|mirror| self.report.was_rendered(mirror.name())) {
            if let Some(frustum) = mirror.frustum() {
                vertices.extend(frustum.debug_lines());
            }
        }
        engine_debug!(SOURCE, "Submitting {} frustum line vertices", vertices.len());
        renderer.draw_debug_lines(&vertices, self.settings.frustum_layer)
    }
}

impl FramePhases for ReflectionManager {
    /// Refresh the main frustum and find the directly visible mirrors.
    fn update(&mut self) -> Result<()> {
        self.require_initialized()?;
        let frustum = self.main_frustum.as_mut().ok_or_else(|| {
            engine_err!(SOURCE, InvalidState => "Main frustum missing")
        })?;
        frustum.refresh(&self.cameras)?;

        let frustum = &*frustum;
        self.visible = self.mirrors
            .iter()
            .enumerate()
            .filter(|(_, mirror)| frustum.contains_mirror(mirror))
            .map(|(index, _)| index)
            .collect();
        Ok(())
    }

    /// Clear every mirror target, then draw each visible mirror with the
    /// full recursion budget. Frustum wireframes cover the main camera and
    /// the mirrors drawn this frame.
    fn draw(&mut self) -> Result<()> {
        self.require_initialized()?;
        let renderer = Arc::clone(&self.renderer);
        let mut renderer = lock_renderer(&renderer, SOURCE)?;

        self.report.begin_frame();
        for mirror in &self.mirrors {
            mirror.clear_render_target(&mut *renderer)?;
        }

        let viewer = self.cameras.camera(self.main_camera)?.name().to_string();
        let depth = self.settings.max_recursion_depth;
        let visible = std::mem::take(&mut self.visible);
        let mut result = Ok(());
        for &index in &visible {
            engine_trace!(SOURCE, "{} can see {} (depth {})", viewer, self.mirrors[index].name(), depth);
            self.report.record_visibility(&viewer, self.mirrors[index].name(), depth);

            self.mirrors[index].mirror_mut().set_source_camera(self.main_camera);
            result = self.draw_mirror(index, depth, &mut *renderer);
            if result.is_err() {
                break;
            }
        }
        self.visible = visible;
        result?;

        if self.settings.show_frustums {
            self.submit_frustums(&mut *renderer)?;
        }
        Ok(())
    }
}

impl Drop for ReflectionManager {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            engine_error!(SOURCE, "Reflection manager shutdown failed: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "reflection_manager_tests.rs"]
mod tests;
