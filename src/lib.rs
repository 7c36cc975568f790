//! Tapflash - a full-screen touch toy.
//!
//! Every tap recolors the screen and drops a short-lived circle under the
//! finger. Holding a press flashes the screen white, a stopwatch starts on
//! the first touch, and the background blinks yellow or pink every two
//! seconds once the session runs.
//!
//! The visual core ([`TapVisualizer`]) never touches the window or GPU
//! directly. It drives a [`Canvas`], a [`TextRasterizer`] and a
//! [`Scheduler`], so it can be exercised headless with [`Scene`] and
//! [`TimerQueue`].
//!
//! # Example
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     tapflash::run(
//!         tapflash::WindowConfig::default(),
//!         tapflash::VisualizerConfig::default(),
//!     )
//! }
//! ```

mod canvas;
mod color;
mod config;
mod error;
mod font;
mod graphics;
mod input;
mod platform;
mod pt;
mod scene;
mod scheduler;
mod stopwatch;
mod text;
mod visualizer;
mod window;

use winit::event_loop::EventLoop;

pub use canvas::{Canvas, Primitive, PrimitiveId, Shape, TextRasterizer};
pub use color::Rgba;
pub use config::{VisualizerConfig, WindowConfig};
pub use error::{Error, Result};
pub use font::{FONT_ENV, FontSet, load_font_from_bytes, load_font_from_file};
pub use input::{PointerEvent, PointerTracker, TouchPhase};
pub use pt::Pt;
pub use scene::Scene;
pub use scheduler::{Due, Scheduler, Task, TaskId, TimerQueue};
pub use stopwatch::{Stopwatch, format_elapsed};
pub use text::{GlyphRasterizer, TextTexture};
pub use visualizer::{Circle, Context, Tap, TapVisualizer};

/// Opens the window and runs the toy until it is closed.
///
/// Returns an error if the event loop, window, surface or GPU device could
/// not be set up.
pub fn run(window: WindowConfig, visualizer: VisualizerConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().map_err(Error::EventLoop)?;
    let mut app = window::App::new(window, visualizer);
    event_loop.run_app(&mut app).map_err(Error::EventLoop)?;
    match app.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
