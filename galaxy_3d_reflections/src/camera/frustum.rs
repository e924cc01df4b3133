/// Frustum — six clipping planes for visibility culling.
///
/// Each plane is represented as a Vec4 (A, B, C, D) where:
/// - (A, B, C) is the inward-pointing normal
/// - D is the signed distance
/// - A point P is inside the frustum if dot(plane, P_homogeneous) >= 0 for all planes
///
/// Two kinds of frustum exist:
/// - camera frustums, extracted from a camera's view-projection matrix
/// - portal frustums, the volume a reflection camera sees *through* its
///   mirror: four side planes from the camera position through the mirror
///   rectangle edges, the mirror plane as near plane, and the camera's far
///   distance as far plane
///
/// A frustum remembers what it was built from, so `refresh()` can rebuild
/// it after the cameras moved.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use crate::error::Result;
use crate::mirror::{FlexibleMirror, FrustumAware};
use crate::reflection::MirrorPlane;
use crate::scene::AABB;
use super::camera_set::{CameraKey, CameraSet};
use super::layer::LayerMask;

/// Frustum plane indices
///
/// For portal frustums the four side planes follow the mirror rectangle
/// edges in order instead of screen directions.
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Planes whose normal is shorter than this collapse to pass-all
const DEGENERATE_EPSILON: f32 = 1e-6;

/// NDC corners in (near ×4, far ×4) order, depth range 0..1
const NDC_CORNERS: [Vec3; 8] = [
    Vec3::new(-1.0, -1.0, 0.0),
    Vec3::new(1.0, -1.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(-1.0, 1.0, 0.0),
    Vec3::new(-1.0, -1.0, 1.0),
    Vec3::new(1.0, -1.0, 1.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(-1.0, 1.0, 1.0),
];

/// Corner index pairs forming the 12 edges of a frustum
const EDGES: [(usize, usize); 12] = [
    (0, 1), (1, 2), (2, 3), (3, 0),
    (4, 5), (5, 6), (6, 7), (7, 4),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

/// Line-list vertex for frustum visualization.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// What a frustum is rebuilt from
#[derive(Debug, Clone, Copy, PartialEq)]
enum FrustumOrigin {
    Camera(CameraKey),
    Portal {
        camera: CameraKey,
        corners: [Vec3; 4],
        plane: MirrorPlane,
    },
}

/// Six frustum planes for culling, plus their visualization data.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    /// Frustum planes: left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
    corners: [Vec3; 8],
    origin: FrustumOrigin,
    color: [f32; 4],
    layer: LayerMask,
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Uses the Gribb & Hartmann method. Works for both perspective
    /// and orthographic projections, mirrored or not.
    pub fn planes_from_view_projection(vp: &Mat4) -> [Vec4; 6] {
        let m = vp.to_cols_array_2d();

        // Gribb & Hartmann: extract planes from rows of the VP matrix
        let mut planes = [
            // Left:   row3 + row0
            Vec4::new(m[0][3] + m[0][0], m[1][3] + m[1][0], m[2][3] + m[2][0], m[3][3] + m[3][0]),
            // Right:  row3 - row0
            Vec4::new(m[0][3] - m[0][0], m[1][3] - m[1][0], m[2][3] - m[2][0], m[3][3] - m[3][0]),
            // Bottom: row3 + row1
            Vec4::new(m[0][3] + m[0][1], m[1][3] + m[1][1], m[2][3] + m[2][1], m[3][3] + m[3][1]),
            // Top:    row3 - row1
            Vec4::new(m[0][3] - m[0][1], m[1][3] - m[1][1], m[2][3] - m[2][1], m[3][3] - m[3][1]),
            // Near:   row3 + row2
            Vec4::new(m[0][3] + m[0][2], m[1][3] + m[1][2], m[2][3] + m[2][2], m[3][3] + m[3][2]),
            // Far:    row3 - row2
            Vec4::new(m[0][3] - m[0][2], m[1][3] - m[1][2], m[2][3] - m[2][2], m[3][3] - m[3][2]),
        ];

        // Normalize each plane so that (A, B, C) is a unit vector
        for plane in &mut planes {
            let normal_len = plane.truncate().length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }

        planes
    }

    /// Frustum of a camera.
    ///
    /// # Arguments
    ///
    /// * `camera` - Camera the frustum follows
    /// * `cameras` - Set owning the camera
    /// * `color` - Visualization color
    /// * `layer` - Layer the visualization is drawn on
    pub fn from_camera(
        camera: CameraKey,
        cameras: &CameraSet,
        color: [f32; 4],
        layer: LayerMask,
    ) -> Result<Self> {
        let mut frustum = Self {
            planes: [Vec4::ZERO; 6],
            corners: [Vec3::ZERO; 8],
            origin: FrustumOrigin::Camera(camera),
            color,
            layer,
        };
        frustum.refresh(cameras)?;
        Ok(frustum)
    }

    /// Portal frustum of a mirror as seen from `camera`.
    ///
    /// Uses the mirror's current world rectangle and the mirror's own
    /// visualization color and layer.
    pub fn from_mirror(mirror: &FlexibleMirror, camera: CameraKey, cameras: &CameraSet) -> Result<Self> {
        let mut frustum = Self {
            planes: [Vec4::ZERO; 6],
            corners: [Vec3::ZERO; 8],
            origin: FrustumOrigin::Portal {
                camera,
                corners: mirror.portal_corners()?,
                plane: mirror.mirror().surface().mirror_plane(),
            },
            color: mirror.frustum_color(),
            layer: mirror.frustum_layer(),
        };
        frustum.refresh(cameras)?;
        Ok(frustum)
    }

    /// Recompute planes and corners from the current camera pose.
    pub fn refresh(&mut self, cameras: &CameraSet) -> Result<()> {
        match self.origin {
            FrustumOrigin::Camera(key) => {
                let camera = cameras.camera(key)?;
                let vp = camera.view_projection_matrix();
                self.planes = Self::planes_from_view_projection(&vp);

                let inverse = vp.inverse();
                for (corner, ndc) in self.corners.iter_mut().zip(NDC_CORNERS.iter()) {
                    *corner = inverse.project_point3(*ndc);
                }
            }
            FrustumOrigin::Portal { camera, corners, plane } => {
                let camera = cameras.camera(camera)?;
                let apex = camera.position();
                self.planes = portal_planes(apex, camera.forward(), camera.far(), &corners, &plane);

                for i in 0..4 {
                    self.corners[i] = corners[i];
                    let ray = (corners[i] - apex).normalize_or_zero();
                    self.corners[i + 4] = apex + ray * camera.far();
                }
            }
        }
        Ok(())
    }

    /// Test if an AABB intersects this frustum.
    ///
    /// Uses the "positive vertex" test: for each plane, find the AABB corner
    /// most in the direction of the plane normal. If that corner is outside,
    /// the AABB is fully outside.
    ///
    /// Returns `true` if the AABB is (potentially) inside or intersecting.
    /// May return false positives (conservative), never false negatives.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        for plane in &self.planes {
            let normal = plane.truncate();

            // Find the positive vertex (corner most aligned with the normal)
            let p_vertex = Vec3::new(
                if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );

            // If the positive vertex is outside this plane, the AABB is fully outside
            if normal.dot(p_vertex) + plane.w < 0.0 {
                return false;
            }
        }

        true
    }

    /// True when the mirror's world bounds intersect this frustum.
    ///
    /// A mirror without bounds (never initialized) is never visible.
    pub fn contains_mirror(&self, mirror: &FlexibleMirror) -> bool {
        mirror
            .world_bounds()
            .is_some_and(|bounds| self.intersects_aabb(&bounds))
    }

    /// World-space corners: near ×4 then far ×4.
    pub fn corners(&self) -> &[Vec3; 8] {
        &self.corners
    }

    /// Key of the camera the frustum follows
    pub fn camera(&self) -> CameraKey {
        match self.origin {
            FrustumOrigin::Camera(key) => key,
            FrustumOrigin::Portal { camera, .. } => camera,
        }
    }

    /// True for frustums seen through a mirror
    pub fn is_portal(&self) -> bool {
        matches!(self.origin, FrustumOrigin::Portal { .. })
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    pub fn layer(&self) -> LayerMask {
        self.layer
    }

    /// Edges as a line list (24 vertices) in the frustum color.
    pub fn debug_lines(&self) -> Vec<DebugVertex> {
        let mut vertices = Vec::with_capacity(EDGES.len() * 2);
        for &(a, b) in &EDGES {
            for index in [a, b] {
                vertices.push(DebugVertex {
                    position: self.corners[index].to_array(),
                    color: self.color,
                });
            }
        }
        vertices
    }
}

/// Inward plane through `point` with `normal`
fn plane_through(normal: Vec3, point: Vec3) -> Vec4 {
    normal.extend(-normal.dot(point))
}

/// Planes of the volume seen from `apex` through a quad.
fn portal_planes(
    apex: Vec3,
    forward: Vec3,
    far: f32,
    corners: &[Vec3; 4],
    plane: &MirrorPlane,
) -> [Vec4; 6] {
    let mut planes = [Vec4::ZERO; 6];
    let apex_distance = plane.signed_distance(apex);

    // Apex on the mirror plane: the side planes collapse, keep them pass-all
    if apex_distance.abs() > DEGENERATE_EPSILON {
        let centroid = (corners[0] + corners[1] + corners[2] + corners[3]) * 0.25;
        for i in 0..4 {
            let a = corners[i] - apex;
            let b = corners[(i + 1) % 4] - apex;
            let normal = a.cross(b);
            if normal.length_squared() < DEGENERATE_EPSILON * DEGENERATE_EPSILON {
                continue;
            }
            let mut normal = normal.normalize();
            if normal.dot(centroid - apex) < 0.0 {
                normal = -normal;
            }
            planes[i] = plane_through(normal, apex);
        }
    }

    // Near: the mirror itself, keeping the side away from the apex
    let mut near_normal = plane.normal();
    if apex_distance > 0.0 {
        near_normal = -near_normal;
    }
    planes[PLANE_NEAR] = plane_through(near_normal, plane.point());

    // Far: camera far distance along its forward axis
    let far_point = apex + forward * far;
    planes[PLANE_FAR] = plane_through(-forward, far_point);

    planes
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
