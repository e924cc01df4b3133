//! Manager module — per-frame orchestration of mirrors.
//!
//! - `MirrorChain`: fixed chain where each mirror reflects the previous
//!   mirror's reflection camera
//! - `ReflectionManager`: visibility-driven recursive mirror-in-mirror
//!   drawing with bounded depth
//!
//! Both own their cameras and mirrors and share the renderer.

mod frame_phases;
mod mirror_chain;
mod reflection_manager;
mod visibility_report;

pub use frame_phases::FramePhases;
pub use mirror_chain::MirrorChain;
pub use reflection_manager::ReflectionManager;
pub use visibility_report::{VisibilityReport, VisibilityEntry, RenderRecord};

use std::sync::{Arc, Mutex, MutexGuard};
use crate::error::Result;
use crate::renderer::Renderer;
use crate::{engine_err, engine_warn};

/// Lock the shared renderer, turning poisoning into an error.
pub(crate) fn lock_renderer<'a>(
    renderer: &'a Arc<Mutex<dyn Renderer>>,
    source: &str,
) -> Result<MutexGuard<'a, dyn Renderer + 'static>> {
    renderer
        .lock()
        .map_err(|_| engine_err!(source, "Renderer lock poisoned"))
}

/// Lock the shared renderer for teardown. A poisoned lock is recovered:
/// render targets must be released whatever happened while it was held.
pub(crate) fn lock_renderer_for_teardown<'a>(
    renderer: &'a Arc<Mutex<dyn Renderer>>,
    source: &str,
) -> MutexGuard<'a, dyn Renderer + 'static> {
    renderer.lock().unwrap_or_else(|poisoned| {
        engine_warn!(source, "Renderer lock poisoned, releasing render targets anyway");
        poisoned.into_inner()
    })
}
