/// Frame phases of a mirror manager.
///
/// `update` runs once per frame after the cameras moved, `draw` once per
/// frame before the main camera renders.

use crate::error::Result;

pub trait FramePhases {
    /// Recompute poses (and, where applicable, visibility)
    fn update(&mut self) -> Result<()>;

    /// Render every mirror that needs it
    fn draw(&mut self) -> Result<()>;

    /// `update` then `draw`
    fn run_frame(&mut self) -> Result<()> {
        self.update()?;
        self.draw()
    }
}
