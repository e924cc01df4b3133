//! Scene geometry for reflective surfaces.
//!
//! Bounding boxes and the mirror surface a reflection is drawn onto.

mod aabb;
mod surface;

pub use aabb::AABB;
pub use surface::MirrorSurface;
