//! Reflection math — mirror planes and reflected camera views.
//!
//! Pure functions with no state: given a source camera pose and a mirror
//! plane, compute where the reflection camera sits and how it projects.

mod reflection_transform;

pub use reflection_transform::{
    MirrorPlane, ReflectedView,
    reflect_camera, mirror_projection,
};
