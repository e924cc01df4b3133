/// MirrorSurface — the reflective geometry a mirror draws its texture onto.
///
/// A surface is a set of local-space vertices plus a world transform. The
/// surface's local +Y axis is the reflecting normal; planar mirrors lie in
/// their local XZ plane. The texture slot receives the render target the
/// mirror's reflection camera draws into.

use glam::{Mat4, Vec3};
use crate::reflection::MirrorPlane;
use crate::renderer::RenderTargetId;
use super::aabb::AABB;

#[derive(Debug, Clone)]
pub struct MirrorSurface {
    world_matrix: Mat4,
    vertices: Vec<Vec3>,
    texture: Option<RenderTargetId>,
}

impl MirrorSurface {
    /// Create a surface from arbitrary local-space vertices.
    pub fn new(world_matrix: Mat4, vertices: Vec<Vec3>) -> Self {
        Self {
            world_matrix,
            vertices,
            texture: None,
        }
    }

    /// Flat rectangle of `width` × `depth` centered on the local origin
    /// in the XZ plane.
    pub fn plane(world_matrix: Mat4, width: f32, depth: f32) -> Self {
        let hw = width * 0.5;
        let hd = depth * 0.5;
        Self::new(world_matrix, vec![
            Vec3::new(-hw, 0.0, -hd),
            Vec3::new(hw, 0.0, -hd),
            Vec3::new(hw, 0.0, hd),
            Vec3::new(-hw, 0.0, hd),
        ])
    }

    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Move the surface. Bounds are local, so they follow automatically.
    pub fn set_world_matrix(&mut self, world_matrix: Mat4) {
        self.world_matrix = world_matrix;
    }

    /// Local-space vertices
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Render target currently bound as the surface texture
    pub fn texture(&self) -> Option<RenderTargetId> {
        self.texture
    }

    pub fn bind_texture(&mut self, texture: Option<RenderTargetId>) {
        self.texture = texture;
    }

    /// World position (translation of the world matrix)
    pub fn position(&self) -> Vec3 {
        self.world_matrix.w_axis.truncate()
    }

    /// World reflecting normal (local +Y), normalized
    pub fn normal(&self) -> Vec3 {
        self.world_matrix.transform_vector3(Vec3::Y).normalize_or_zero()
    }

    /// World direction of local −Z, used as the up hint of the reflection
    /// camera's initial orientation
    pub fn forward(&self) -> Vec3 {
        self.world_matrix.transform_vector3(Vec3::NEG_Z).normalize_or_zero()
    }

    /// Plane the surface reflects through
    pub fn mirror_plane(&self) -> MirrorPlane {
        MirrorPlane::from_world_matrix(&self.world_matrix)
    }

    /// Local-space bounds of the vertices, `None` without geometry
    pub fn local_bounds(&self) -> Option<AABB> {
        AABB::from_points(&self.vertices)
    }
}

#[cfg(test)]
#[path = "surface_tests.rs"]
mod tests;
