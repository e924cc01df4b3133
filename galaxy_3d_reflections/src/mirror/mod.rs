//! Mirror module — reflective surfaces and their reflection cameras.
//!
//! - `Mirror`: a surface plus the camera that renders its reflection
//! - `FlexibleMirror`: a mirror that also tracks its bounds and portal
//!   frustum, which is what recursive mirror-in-mirror drawing needs
//! - `RestorePoint`: snapshot of the mutable state a recursive draw touches

mod mirror;
mod flexible_mirror;
mod restore_point;

pub use mirror::{Mirror, MirrorState, ReflectiveSurface};
pub use flexible_mirror::{FlexibleMirror, FrustumAware, DEFAULT_FRUSTUM_COLOR};
pub use restore_point::RestorePoint;
