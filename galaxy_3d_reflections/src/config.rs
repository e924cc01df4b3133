//! Scene configuration
//!
//! A reflection scene is described in TOML: the primary camera, the
//! mirrors, and the settings of the reflection pass. `SceneConfig` is the
//! serde model of that file; `ReflectionSettings` is the validated runtime
//! form the managers consume.
//!
//! ```toml
//! max_recursion_depth = 3
//! render_target_size = 256
//!
//! [camera]
//! position = [0.0, 0.0, 5.0]
//! target = [0.0, 0.0, 0.0]
//!
//! [[mirrors]]
//! name = "Left"
//! position = [0.0, 0.0, 0.0]
//! rotation_degrees = [90.0, 0.0, 0.0]
//! size = [2.0, 2.0]
//! ```

use std::path::Path;
use glam::{EulerRot, Mat4, Quat, Vec3};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use crate::camera::{Camera, LayerMask};
use crate::error::Result;
use crate::mirror::DEFAULT_FRUSTUM_COLOR;
use crate::renderer::RenderTargetDesc;
use crate::scene::MirrorSurface;
use crate::{engine_bail, engine_err};

const SOURCE: &str = "galaxy3d::Config";

/// Default bound on nested reflections
pub const DEFAULT_MAX_RECURSION_DEPTH: u32 = 10;

/// Largest accepted recursion depth
pub const MAX_RECURSION_DEPTH_LIMIT: u32 = 64;

/// Default mirror render target edge in pixels
pub const DEFAULT_RENDER_TARGET_SIZE: u32 = 512;

/// Largest accepted render target edge in pixels
pub const MAX_RENDER_TARGET_SIZE: u32 = 8192;

/// Default layer for frustum visualization
pub const DEFAULT_FRUSTUM_LAYER: u32 = 8;

/// Translucent white
pub const DEFAULT_CAMERA_FRUSTUM_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.25];

// ===== RUNTIME SETTINGS =====

/// Validated settings of the reflection pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectionSettings {
    /// How many mirror-in-mirror levels are drawn below the directly
    /// visible mirrors (0 = direct reflections only)
    pub max_recursion_depth: u32,
    /// Size and format of every mirror's render target
    pub render_target: RenderTargetDesc,
    /// Layer frustum visualization is drawn on, hidden from the main camera
    pub frustum_layer: LayerMask,
    /// Submit frustum wireframes each frame
    pub show_frustums: bool,
    /// Wireframe color of the main camera frustum
    pub main_frustum_color: [f32; 4],
}

impl Default for ReflectionSettings {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            render_target: RenderTargetDesc::square(DEFAULT_RENDER_TARGET_SIZE),
            frustum_layer: LayerMask::from_bits_retain(1 << DEFAULT_FRUSTUM_LAYER),
            show_frustums: false,
            main_frustum_color: DEFAULT_CAMERA_FRUSTUM_COLOR,
        }
    }
}

// ===== FILE MODEL =====

/// Whole scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub max_recursion_depth: u32,
    pub render_target_size: u32,
    pub frustum_layer: u32,
    pub show_frustums: bool,
    pub camera: CameraConfig,
    pub mirrors: Vec<MirrorConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            render_target_size: DEFAULT_RENDER_TARGET_SIZE,
            frustum_layer: DEFAULT_FRUSTUM_LAYER,
            show_frustums: false,
            camera: CameraConfig::default(),
            mirrors: Vec::new(),
        }
    }
}

/// Primary camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub name: String,
    pub position: [f32; 3],
    /// Point the camera looks at
    pub target: [f32; 3],
    pub up: [f32; 3],
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub priority: i32,
    pub frustum_color: [f32; 4],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            name: "Main Camera".to_string(),
            position: [0.0, 1.0, 5.0],
            target: [0.0, 1.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fov_y_degrees: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
            priority: 0,
            frustum_color: DEFAULT_CAMERA_FRUSTUM_COLOR,
        }
    }
}

impl CameraConfig {
    /// Build the described camera
    pub fn build(&self) -> Camera {
        let mut camera = Camera::perspective(
            self.name.clone(),
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
        camera.set_position(Vec3::from_array(self.position));
        camera.look_at(Vec3::from_array(self.target), Vec3::from_array(self.up));
        camera.set_priority(self.priority);
        camera
    }
}

/// One planar mirror
///
/// The surface is a `size[0]` × `size[1]` rectangle in the mirror's local
/// XZ plane; local +Y is the reflecting side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorConfig {
    pub name: String,
    #[serde(default)]
    pub position: [f32; 3],
    /// XYZ Euler angles in degrees
    #[serde(default)]
    pub rotation_degrees: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    #[serde(default = "default_size")]
    pub size: [f32; 2],
    #[serde(default = "default_frustum_color")]
    pub frustum_color: [f32; 4],
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_size() -> [f32; 2] {
    [1.0, 1.0]
}

fn default_frustum_color() -> [f32; 4] {
    DEFAULT_FRUSTUM_COLOR
}

impl MirrorConfig {
    /// Mirror named `name` with every other field at its default
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: [0.0; 3],
            rotation_degrees: [0.0; 3],
            scale: default_scale(),
            size: default_size(),
            frustum_color: default_frustum_color(),
        }
    }

    pub fn rotation(&self) -> Quat {
        let [x, y, z] = self.rotation_degrees.map(f32::to_radians);
        Quat::from_euler(EulerRot::XYZ, x, y, z)
    }

    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::from_array(self.scale),
            self.rotation(),
            Vec3::from_array(self.position),
        )
    }

    /// Build the described surface
    pub fn surface(&self) -> MirrorSurface {
        MirrorSurface::plane(self.world_matrix(), self.size[0], self.size[1])
    }
}

// ===== LOADING =====

impl SceneConfig {
    /// Read and validate a TOML scene file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            engine_err!(SOURCE, InvalidConfig => "Cannot read '{}': {}", path.display(), e)
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate a TOML scene
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: SceneConfig = toml::from_str(contents).map_err(|e| {
            engine_err!(SOURCE, InvalidConfig => "Parse error: {}", e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            engine_err!(SOURCE, InvalidConfig => "Serialization error: {}", e)
        })
    }

    /// Check every value the reflection pass depends on.
    pub fn validate(&self) -> Result<()> {
        if self.max_recursion_depth > MAX_RECURSION_DEPTH_LIMIT {
            engine_bail!(SOURCE, InvalidConfig => "max_recursion_depth {} exceeds {}",
                self.max_recursion_depth, MAX_RECURSION_DEPTH_LIMIT);
        }
        if self.render_target_size == 0 || self.render_target_size > MAX_RENDER_TARGET_SIZE {
            engine_bail!(SOURCE, InvalidConfig => "render_target_size {} must be in 1..={}",
                self.render_target_size, MAX_RENDER_TARGET_SIZE);
        }
        // Layer 0 holds the scene itself
        if self.frustum_layer == 0 || self.frustum_layer >= LayerMask::LAYER_COUNT {
            engine_bail!(SOURCE, InvalidConfig => "frustum_layer {} must be in 1..{}",
                self.frustum_layer, LayerMask::LAYER_COUNT);
        }

        let camera = &self.camera;
        if !(camera.near > 0.0 && camera.far > camera.near) {
            engine_bail!(SOURCE, InvalidConfig => "Camera '{}' needs 0 < near < far (got {} / {})",
                camera.name, camera.near, camera.far);
        }
        if !(camera.fov_y_degrees > 0.0 && camera.fov_y_degrees < 180.0) || camera.aspect <= 0.0 {
            engine_bail!(SOURCE, InvalidConfig => "Camera '{}' has an invalid projection", camera.name);
        }
        if Vec3::from_array(camera.target) == Vec3::from_array(camera.position) {
            engine_bail!(SOURCE, InvalidConfig => "Camera '{}' target equals its position", camera.name);
        }
        // Every mirror of a chain draws one priority step before the previous one
        let lowest = i32::try_from(self.mirrors.len())
            .ok()
            .and_then(|steps| camera.priority.checked_sub(steps));
        if lowest.is_none() {
            engine_bail!(SOURCE, InvalidConfig => "Camera '{}' priority {} leaves no room for {} mirror(s)",
                camera.name, camera.priority, self.mirrors.len());
        }

        let mut names = FxHashSet::default();
        for mirror in &self.mirrors {
            if mirror.name.is_empty() {
                engine_bail!(SOURCE, InvalidConfig => "Mirror name cannot be empty");
            }
            if !names.insert(mirror.name.as_str()) {
                engine_bail!(SOURCE, InvalidConfig => "Duplicate mirror name '{}'", mirror.name);
            }
            if mirror.size.iter().any(|&extent| extent <= 0.0) {
                engine_bail!(SOURCE, InvalidConfig => "Mirror '{}' must have a positive size", mirror.name);
            }
            if mirror.scale.iter().any(|&factor| factor == 0.0) {
                engine_bail!(SOURCE, InvalidConfig => "Mirror '{}' has a zero scale", mirror.name);
            }
        }
        Ok(())
    }

    /// Runtime settings of the reflection pass
    pub fn settings(&self) -> Result<ReflectionSettings> {
        let frustum_layer = LayerMask::layer(self.frustum_layer).ok_or_else(|| {
            engine_err!(SOURCE, InvalidConfig => "frustum_layer {} out of range", self.frustum_layer)
        })?;
        Ok(ReflectionSettings {
            max_recursion_depth: self.max_recursion_depth,
            render_target: RenderTargetDesc::square(self.render_target_size),
            frustum_layer,
            show_frustums: self.show_frustums,
            main_frustum_color: self.camera.frustum_color,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
