/*!
# Galaxy 3D Reflections

Recursive planar mirror reflections for the Galaxy 3D engine.

Each mirror owns a reflection camera that renders into an offscreen target
bound as the mirror's texture. Reflection cameras are obtained by reflecting
a source camera through the mirror plane; the handedness flip is carried by
a horizontally mirrored projection, and culling is inverted while a mirrored
view draws.

## Architecture

- **Camera**: cameras, the `CameraSet` arena, layers and frustums
- **Mirror**: `Mirror` (lifecycle + reflection camera) and `FlexibleMirror`
  (bounds + portal frustum)
- **Reflection**: mirror planes and the reflection transform
- **Renderer**: backend trait, render target handles, scoped culling
  inversion
- **Manager**: `MirrorChain` (fixed chain) and `ReflectionManager`
  (visibility-driven recursion with bounded depth)
- **Config**: TOML scene description

Backends implement `galaxy3d::render::Renderer`.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod camera;
pub mod config;
pub mod manager;
pub mod mirror;
pub mod reflection;
pub mod renderer;
pub mod scene;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Global services
    pub use crate::engine::Engine;

    // Managers
    pub use crate::manager::{
        FramePhases, MirrorChain, ReflectionManager,
        VisibilityReport, VisibilityEntry, RenderRecord,
    };

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, format_entry};
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Mirror sub-module: surfaces, mirrors and reflection math
    pub mod mirror {
        pub use crate::mirror::*;
        pub use crate::reflection::*;
        pub use crate::scene::*;
    }

    // Render sub-module
    pub mod render {
        pub use crate::renderer::*;
    }

    // Configuration sub-module
    pub mod config {
        pub use crate::config::*;
    }
}

// Re-export math library at crate root
pub use glam;
