//! Fixed mirror chain.
//!
//! Mirror 0 reflects the main camera; mirror i reflects mirror i−1's
//! reflection camera. Poses propagate forward along the chain during
//! `update`, and `draw` renders from the last mirror back to the first so
//! each mirror's texture is ready before the mirror that shows it draws.

use std::sync::{Arc, Mutex};
use crate::camera::{Camera, CameraKey, CameraSet};
use crate::config::SceneConfig;
use crate::error::Result;
use crate::mirror::{Mirror, ReflectiveSurface};
use crate::renderer::{Renderer, RenderTargetDesc};
use crate::scene::MirrorSurface;
use crate::{engine_bail, engine_error, engine_info};
use super::frame_phases::FramePhases;
use super::{lock_renderer, lock_renderer_for_teardown};

const SOURCE: &str = "galaxy3d::MirrorChain";

pub struct MirrorChain {
    renderer: Arc<Mutex<dyn Renderer>>,
    cameras: CameraSet,
    main_camera: CameraKey,
    mirrors: Vec<Mirror>,
    render_target: RenderTargetDesc,
    initialized: bool,
}

impl MirrorChain {
    /// Create an empty chain in front of `main_camera`.
    pub fn new(
        renderer: Arc<Mutex<dyn Renderer>>,
        main_camera: Camera,
        render_target: RenderTargetDesc,
    ) -> Self {
        let mut cameras = CameraSet::new();
        let main_camera = cameras.insert(main_camera);
        Self {
            renderer,
            cameras,
            main_camera,
            mirrors: Vec::new(),
            render_target,
            initialized: false,
        }
    }

    /// Build and initialize a chain from a scene file, mirrors in file order.
    pub fn from_config(config: &SceneConfig, renderer: Arc<Mutex<dyn Renderer>>) -> Result<Self> {
        config.validate()?;
        let settings = config.settings()?;
        let mut chain = Self::new(renderer, config.camera.build(), settings.render_target);
        for mirror in &config.mirrors {
            chain.add_mirror(mirror.name.clone(), mirror.surface())?;
        }
        chain.initialize()?;
        Ok(chain)
    }

    /// Append a mirror to the end of the chain.
    ///
    /// # Returns
    ///
    /// Position of the mirror in the chain
    pub fn add_mirror(&mut self, name: impl Into<String>, surface: MirrorSurface) -> Result<usize> {
        let name = name.into();
        if self.initialized {
            engine_bail!(SOURCE, InvalidState => "Cannot add mirror '{}' after initialization", name);
        }
        if self.mirrors.iter().any(|mirror| mirror.name() == name) {
            engine_bail!(SOURCE, InvalidResource => "Mirror '{}' already exists", name);
        }
        self.mirrors.push(Mirror::new(name, surface));
        Ok(self.mirrors.len() - 1)
    }

    /// Initialize every mirror, wiring each one to its predecessor.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            engine_bail!(SOURCE, InvalidState => "Mirror chain already initialized");
        }
        let renderer = Arc::clone(&self.renderer);
        let mut renderer = lock_renderer(&renderer, SOURCE)?;

        let mut source = self.main_camera;
        for mirror in &mut self.mirrors {
            mirror.initialize(source, &mut self.cameras, &mut *renderer, &self.render_target)?;
            source = mirror.reflection_camera()?;
        }

        self.initialized = true;
        engine_info!(SOURCE, "Mirror chain initialized with {} mirror(s)", self.mirrors.len());
        Ok(())
    }

    /// Destroy every mirror. Safe to call more than once.
    pub fn shutdown(&mut self) -> Result<()> {
        let renderer = Arc::clone(&self.renderer);
        let mut renderer = lock_renderer_for_teardown(&renderer, SOURCE);
        for mirror in &mut self.mirrors {
            if mirror.is_live() {
                mirror.destroy(&mut self.cameras, &mut *renderer)?;
            }
        }
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

    pub fn main_camera_mut(&mut self) -> Result<&mut Camera> {
        self.cameras.camera_mut(self.main_camera)
    }

    pub fn mirrors(&self) -> &[Mirror] {
        &self.mirrors
    }

    pub fn mirror_count(&self) -> usize {
        self.mirrors.len()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn require_initialized(&self) -> Result<()> {
        if !self.initialized {
            engine_bail!(SOURCE, InvalidState => "Mirror chain is not initialized");
        }
        Ok(())
    }
}

impl FramePhases for MirrorChain {
    fn update(&mut self) -> Result<()> {
        self.require_initialized()?;
        for mirror in &mut self.mirrors {
            mirror.update_pose(&mut self.cameras)?;
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        self.require_initialized()?;
        let renderer = Arc::clone(&self.renderer);
        let mut renderer = lock_renderer(&renderer, SOURCE)?;
        for mirror in self.mirrors.iter().rev() {
            mirror.render(&self.cameras, &mut *renderer)?;
        }
        Ok(())
    }
}

impl Drop for MirrorChain {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            engine_error!(SOURCE, "Mirror chain shutdown failed: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "mirror_chain_tests.rs"]
mod tests;
