//! Camera module — cameras, the camera arena, layers and frustums.
//!
//! Cameras are plain data owned by a `CameraSet`. Mirrors, frustums and
//! managers refer to them through `CameraKey`s, which lets a mirror switch
//! the camera it reflects without any aliasing.

mod camera;
mod camera_set;
mod frustum;
mod layer;

pub use camera::{Camera, CameraPose, look_rotation};
pub use camera_set::{CameraKey, CameraSet};
pub use frustum::{
    Frustum, DebugVertex,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
pub use layer::LayerMask;
