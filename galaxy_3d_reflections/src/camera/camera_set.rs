/// CameraSet — single owner of every camera in a reflection scene.
///
/// Cameras are shared, mutable resources: the primary viewer is reflected
/// by several mirrors, and a mirror's reflection camera is in turn the
/// source of other mirrors. Instead of aliasing references, every camera
/// lives here and everything else holds a `CameraKey`.

use slotmap::{new_key_type, SlotMap};
use crate::error::Result;
use crate::engine_err;
use super::camera::{Camera, CameraPose};

new_key_type! {
    /// Stable key for a Camera within a CameraSet.
    ///
    /// Keys remain valid even after other cameras are removed.
    pub struct CameraKey;
}

/// Arena of cameras addressed by `CameraKey`.
#[derive(Debug, Default)]
pub struct CameraSet {
    cameras: SlotMap<CameraKey, Camera>,
}

impl CameraSet {
    pub fn new() -> Self {
        Self {
            cameras: SlotMap::with_key(),
        }
    }

    /// Add a camera and return its key.
    pub fn insert(&mut self, camera: Camera) -> CameraKey {
        self.cameras.insert(camera)
    }

    /// Remove a camera. Returns it, or None if the key is stale.
    pub fn remove(&mut self, key: CameraKey) -> Option<Camera> {
        self.cameras.remove(key)
    }

    pub fn get(&self, key: CameraKey) -> Option<&Camera> {
        self.cameras.get(key)
    }

    pub fn get_mut(&mut self, key: CameraKey) -> Option<&mut Camera> {
        self.cameras.get_mut(key)
    }

    /// Look up a camera, failing with `InvalidResource` for stale keys.
    pub fn camera(&self, key: CameraKey) -> Result<&Camera> {
        self.cameras.get(key).ok_or_else(|| {
            engine_err!("galaxy3d::CameraSet", InvalidResource => "Camera {:?} does not exist", key)
        })
    }

    /// Mutable lookup, failing with `InvalidResource` for stale keys.
    pub fn camera_mut(&mut self, key: CameraKey) -> Result<&mut Camera> {
        self.cameras.get_mut(key).ok_or_else(|| {
            engine_err!("galaxy3d::CameraSet", InvalidResource => "Camera {:?} does not exist", key)
        })
    }

    /// Current pose of a camera.
    pub fn pose(&self, key: CameraKey) -> Result<CameraPose> {
        Ok(self.camera(key)?.pose())
    }

    /// Overwrite the pose of a camera.
    pub fn set_pose(&mut self, key: CameraKey, pose: CameraPose) -> Result<()> {
        self.camera_mut(key)?.set_pose(pose);
        Ok(())
    }

    pub fn contains(&self, key: CameraKey) -> bool {
        self.cameras.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Iterate over all cameras.
    pub fn iter(&self) -> impl Iterator<Item = (CameraKey, &Camera)> {
        self.cameras.iter()
    }

    /// Keys of all cameras sorted by draw priority (lowest first).
    ///
    /// Reflection cameras sort ahead of the camera they reflect.
    pub fn keys_by_priority(&self) -> Vec<CameraKey> {
        let mut keys: Vec<CameraKey> = self.cameras.keys().collect();
        keys.sort_by_key(|&key| self.cameras[key].priority());
        keys
    }
}

#[cfg(test)]
#[path = "camera_set_tests.rs"]
mod tests;
