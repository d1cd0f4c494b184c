//! Terminal rendering crate - the external renderer collaborator.
//!
//! Consumes `State` values and produces terminal output; the core never
//! depends on anything in here.

pub mod fb;
pub mod renderer;
pub mod view;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use renderer::TerminalRenderer;
pub use view::{CanvasView, Viewport};
