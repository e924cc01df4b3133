/// Reflection transform — mirrored camera pose and projection.
///
/// A reflection camera is obtained by reflecting three reference points of
/// the source camera (its position, a point one unit up, a point one unit
/// forward) through the mirror plane, then rebuilding a proper rotation
/// from the reflected points. The handedness flip that a reflection
/// implies is carried by the projection instead: its X axis is negated,
/// which mirrors the image and reverses triangle winding.

use glam::{Mat4, Vec3};
use crate::camera::{CameraPose, look_rotation};

/// Below this |normal · direction| a ray is treated as parallel to the plane
const PARALLEL_EPSILON: f32 = 1e-6;

/// Plane in point + unit normal form.
///
/// Derived on demand from a mirror's world transform (the mirror's local
/// +Y axis is its surface normal); never stored across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorPlane {
    point: Vec3,
    normal: Vec3,
}

impl MirrorPlane {
    /// Build a plane through `point` with the given normal.
    ///
    /// The normal is normalized; a zero normal produces a degenerate plane
    /// for which every reflection falls back to the original point.
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize_or_zero(),
        }
    }

    /// Plane of a mirror with the given world transform.
    ///
    /// Point = world translation, normal = world direction of local +Y.
    pub fn from_world_matrix(world: &Mat4) -> Self {
        Self::new(world.w_axis.truncate(), world.transform_vector3(Vec3::Y))
    }

    pub fn point(&self) -> Vec3 {
        self.point
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Signed distance of `p` to the plane (positive on the normal side).
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p - self.point)
    }

    /// Distance along `direction` from `origin` to the plane.
    ///
    /// Returns `None` when the ray is parallel to the plane. The distance is
    /// signed: negative values mean the plane lies behind the origin.
    pub fn raycast(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let denom = self.normal.dot(direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        Some(self.normal.dot(self.point - origin) / denom)
    }

    /// Mirror `p` through the plane.
    ///
    /// Casts a ray from `p` against the normal and places the result at
    /// twice the hit distance. A ray that never meets the plane leaves the
    /// point where it is.
    pub fn reflect_point(&self, p: Vec3) -> Vec3 {
        let direction = -self.normal;
        match self.raycast(p, direction) {
            Some(distance) => p + direction * (distance * 2.0),
            None => p,
        }
    }
}

/// Output of the reflection transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectedView {
    /// Reflection camera world pose
    pub pose: CameraPose,
    /// Source projection mirrored on X
    pub projection: Mat4,
}

/// Source projection with its horizontal axis negated.
pub fn mirror_projection(projection: &Mat4) -> Mat4 {
    *projection * Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0))
}

/// Reflect a camera across a mirror plane.
///
/// # Arguments
///
/// * `source` - World pose of the camera being reflected
/// * `projection` - Its projection matrix
/// * `plane` - Mirror plane
pub fn reflect_camera(source: &CameraPose, projection: &Mat4, plane: &MirrorPlane) -> ReflectedView {
    let position = source.position;
    let up_point = position + source.up();
    let forward_point = position + source.forward();

    let reflected_position = plane.reflect_point(position);
    let reflected_up = plane.reflect_point(up_point);
    let reflected_forward = plane.reflect_point(forward_point);

    let rotation = look_rotation(
        reflected_forward - reflected_position,
        reflected_up - reflected_position,
    );

    ReflectedView {
        pose: CameraPose::new(reflected_position, rotation),
        projection: mirror_projection(projection),
    }
}

#[cfg(test)]
#[path = "reflection_transform_tests.rs"]
mod tests;
