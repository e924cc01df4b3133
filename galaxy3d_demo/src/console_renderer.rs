//! Console backend: prints every renderer call instead of drawing.

use colored::Colorize;
use galaxy_3d_reflections::galaxy3d::camera::{Camera, DebugVertex, LayerMask};
use galaxy_3d_reflections::galaxy3d::render::{Renderer, RenderTargetDesc, RenderTargetId};
use galaxy_3d_reflections::galaxy3d::{Error, Result};
use std::collections::HashSet;

#[derive(Default)]
pub struct ConsoleRenderer {
    next_id: u64,
    live: HashSet<RenderTargetId>,
    invert_culling: bool,
    /// Print clears and debug line submissions too
    verbose: bool,
    draws: usize,
}

impl ConsoleRenderer {
    pub fn new(verbose: bool) -> Self {
        Self { verbose, ..Self::default() }
    }

    /// Number of `render_view` calls since the last call to this method
    pub fn take_draw_count(&mut self) -> usize {
        std::mem::take(&mut self.draws)
    }

    fn require_live(&self, target: RenderTargetId) -> Result<()> {
        if !self.live.contains(&target) {
            return Err(Error::InvalidResource(format!("Unknown render target {}", target.raw())));
        }
        Ok(())
    }
}

impl Renderer for ConsoleRenderer {
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<RenderTargetId> {
        self.next_id += 1;
        let id = RenderTargetId::new(self.next_id);
        self.live.insert(id);
        println!("  {} target #{} {}x{} {:?} ({} KiB)", "alloc".green(), id.raw(),
            desc.width, desc.height, desc.format, desc.color_bytes() / 1024);
        Ok(id)
    }

    fn release_render_target(&mut self, target: RenderTargetId) -> Result<()> {
        self.require_live(target)?;
        self.live.remove(&target);
        println!("  {} target #{}", "free".red(), target.raw());
        Ok(())
    }

    fn clear_render_target(&mut self, target: RenderTargetId, _color: [f32; 4]) -> Result<()> {
        self.require_live(target)?;
        if self.verbose {
            println!("  {} target #{}", "clear".dimmed(), target.raw());
        }
        Ok(())
    }

    fn render_view(&mut self, camera: &Camera) -> Result<()> {
        if let Some(target) = camera.target() {
            self.require_live(target)?;
        }
        self.draws += 1;

        let destination = camera
            .target()
            .map(|target| format!("target #{}", target.raw()))
            .unwrap_or_else(|| "screen".to_string());
        let culling = if self.invert_culling { "inverted".yellow() } else { "normal".normal() };
        let position = camera.position();
        println!("  {} {:<14} -> {:<10} at ({:>6.2}, {:>6.2}, {:>6.2}) culling {}",
            "draw".cyan(), camera.name(), destination, position.x, position.y, position.z, culling);
        Ok(())
    }

    fn invert_culling(&self) -> bool {
        self.invert_culling
    }

    fn set_invert_culling(&mut self, invert: bool) {
        self.invert_culling = invert;
    }

    fn draw_debug_lines(&mut self, vertices: &[DebugVertex], layer: LayerMask) -> Result<()> {
        if self.verbose {
            println!("  {} {} line vertices on layer {:#x}", "lines".magenta(), vertices.len(), layer.bits());
        }
        Ok(())
    }
}
