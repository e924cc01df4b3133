/// RestorePoint — undo record for one level of recursive mirror drawing.
///
/// Drawing a mirror nested inside another temporarily retargets mirrors at
/// other reflection cameras and moves those cameras. A restore point is
/// captured right after a mirror computed its pose, and applied after each
/// nested draw so the level above sees exactly the state it left.

use crate::camera::{CameraKey, CameraPose, CameraSet};
use crate::error::Result;
use crate::engine_err;
use super::mirror::Mirror;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestorePoint {
    source_camera: CameraKey,
    pose: CameraPose,
}

impl RestorePoint {
    /// Snapshot the mirror's source camera and that camera's pose.
    pub fn capture(mirror: &Mirror, cameras: &CameraSet) -> Result<Self> {
        let source_camera = mirror.source_camera().ok_or_else(|| {
            engine_err!("galaxy3d::RestorePoint", InvalidState =>
                "Mirror '{}' has no source camera", mirror.name())
        })?;
        Ok(Self {
            source_camera,
            pose: cameras.pose(source_camera)?,
        })
    }

    /// Put the snapshot back.
    pub fn restore(&self, mirror: &mut Mirror, cameras: &mut CameraSet) -> Result<()> {
        mirror.set_source_camera(self.source_camera);
        cameras.set_pose(self.source_camera, self.pose)
    }

    pub fn source_camera(&self) -> CameraKey {
        self.source_camera
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }
}

#[cfg(test)]
#[path = "restore_point_tests.rs"]
mod tests;
