/// Camera — a viewpoint that renders into the screen or a render target.
///
/// Cameras are either the primary viewer (owned by the scene for the
/// application's lifetime) or reflection cameras (owned by exactly one
/// mirror). Both live in a `CameraSet` and are referenced by key, so a
/// mirror can point at whichever camera it currently reflects.
///
/// Conventions are right-handed: the camera looks down its local −Z axis
/// with local +Y as up.

use glam::{Mat3, Mat4, Quat, Vec3};
use crate::renderer::RenderTargetId;
use super::layer::LayerMask;

/// World-space position and orientation of a camera.
///
/// Plain copyable data: this is what restore points snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// World position
    pub position: Vec3,
    /// World orientation
    pub rotation: Quat,
}

impl CameraPose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Unit forward direction (local −Z in world space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Unit up direction (local +Y in world space)
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

/// Orientation looking along `forward` with the given `up` hint.
///
/// The right-handed counterpart of a look-rotation: the returned rotation
/// maps −Z onto `forward` and +Y onto the component of `up` orthogonal to
/// it. When `up` is parallel to `forward`, an arbitrary orthonormal up
/// is chosen instead.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let back = -forward.normalize_or_zero();
    if back == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    let mut right = up.cross(back);
    if right.length_squared() < 1e-12 {
        right = back.any_orthonormal_vector();
    }
    let right = right.normalize();
    let up = back.cross(right);

    Quat::from_mat3(&Mat3::from_cols(right, up, back)).normalize()
}

/// A camera: pose, projection, draw priority and output.
#[derive(Debug, Clone)]
pub struct Camera {
    name: String,
    pose: CameraPose,
    projection: Mat4,
    near: f32,
    far: f32,
    priority: i32,
    culling_mask: LayerMask,
    target: Option<RenderTargetId>,
}

impl Camera {
    /// Create a perspective camera at the origin looking down −Z.
    ///
    /// # Arguments
    ///
    /// * `fov_y` - Vertical field of view in radians
    /// * `aspect` - Width / height
    /// * `near`, `far` - Clip distances (0 < near < far)
    pub fn perspective(name: impl Into<String>, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            name: name.into(),
            pose: CameraPose::default(),
            projection: Mat4::perspective_rh(fov_y, aspect, near, far),
            near,
            far,
            priority: 0,
            culling_mask: LayerMask::all(),
            target: None,
        }
    }

    /// Copy this camera's configuration under a new name.
    ///
    /// The copy keeps pose, projection, priority and culling mask, but not
    /// the render target: outputs are never shared between cameras.
    pub fn clone_as(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
            ..self.clone()
        }
    }

    // ===== GETTERS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn rotation(&self) -> Quat {
        self.pose.rotation
    }

    pub fn forward(&self) -> Vec3 {
        self.pose.forward()
    }

    pub fn up(&self) -> Vec3 {
        self.pose.up()
    }

    /// Projection matrix (possibly mirrored on X).
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    /// View matrix (inverse of the camera's world transform).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.pose.rotation, self.pose.position).inverse()
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    /// Draw priority. Lower values draw first.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Layers this camera draws.
    pub fn culling_mask(&self) -> LayerMask {
        self.culling_mask
    }

    /// Render target this camera writes into (`None` = screen).
    pub fn target(&self) -> Option<RenderTargetId> {
        self.target
    }

    /// True when the projection's horizontal scale is negative, i.e. the
    /// image is flipped left-right and triangle winding is reversed.
    pub fn is_projection_mirrored(&self) -> bool {
        self.projection.x_axis.x < 0.0
    }

    // ===== SETTERS =====

    pub fn set_pose(&mut self, pose: CameraPose) {
        self.pose = pose;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.pose.position = position;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.pose.rotation = rotation;
    }

    /// Orient the camera toward `target` with the given up hint.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.pose.rotation = look_rotation(target - self.pose.position, up);
    }

    /// Replace the projection matrix. Near/far stay as configured.
    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub fn set_culling_mask(&mut self, mask: LayerMask) {
        self.culling_mask = mask;
    }

    pub fn set_target(&mut self, target: Option<RenderTargetId>) {
        self.target = target;
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
