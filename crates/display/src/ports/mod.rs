//! Port traits at the seams between the event loop, the dispatcher and the display.
//!
//! - `presentation`: the slots a display exposes
//! - `link`: inbound frame delivery and outbound command sending

pub mod link;
pub mod presentation;

pub use link::{CommandSink, FrameHandler, SendError};
pub use presentation::{PresentationSurface, SlotContent, StatusIndicator};
