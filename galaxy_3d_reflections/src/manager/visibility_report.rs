/// Visibility report — what each viewer saw during one frame.
///
/// Filled by `ReflectionManager::draw()`: one entry each time a viewer (the
/// main camera or a mirror) found another mirror inside its frustum, and
/// one render record per mirror draw, in draw order.

use std::fmt;

/// "`viewer` can see `mirror`", with the recursion depth the visible
/// mirror was drawn at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityEntry {
    pub viewer: String,
    pub mirror: String,
    pub depth_remaining: u32,
}

/// One mirror draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRecord {
    pub mirror: String,
    pub depth_remaining: u32,
}

#[derive(Debug, Clone, Default)]
pub struct VisibilityReport {
    frame: u64,
    entries: Vec<VisibilityEntry>,
    renders: Vec<RenderRecord>,
}

impl VisibilityReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame, dropping the previous frame's records.
    pub fn begin_frame(&mut self) {
        self.frame += 1;
        self.entries.clear();
        self.renders.clear();
    }

    pub fn record_visibility(&mut self, viewer: &str, mirror: &str, depth_remaining: u32) {
        self.entries.push(VisibilityEntry {
            viewer: viewer.to_string(),
            mirror: mirror.to_string(),
            depth_remaining,
        });
    }

    pub fn record_render(&mut self, mirror: &str, depth_remaining: u32) {
        self.renders.push(RenderRecord {
            mirror: mirror.to_string(),
            depth_remaining,
        });
    }

    /// Number of frames begun so far
    pub fn frame_index(&self) -> u64 {
        self.frame
    }

    pub fn entries(&self) -> &[VisibilityEntry] {
        &self.entries
    }

    /// Mirror draws in the order they happened
    pub fn renders(&self) -> &[RenderRecord] {
        &self.renders
    }

    pub fn render_count(&self) -> usize {
        self.renders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.renders.is_empty()
    }

    /// True if `viewer` saw `mirror` at any depth this frame
    pub fn can_see(&self, viewer: &str, mirror: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.viewer == viewer && entry.mirror == mirror)
    }

    /// True if `mirror` was drawn this frame
    pub fn was_rendered(&self, mirror: &str) -> bool {
        self.renders.iter().any(|record| record.mirror == mirror)
    }
}

impl fmt::Display for VisibilityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} can see {}", self.viewer, self.mirror)
    }
}

impl fmt::Display for VisibilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "visibility_report_tests.rs"]
mod tests;
