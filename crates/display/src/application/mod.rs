//! Application layer: turning device frames into slot writes, and the
//! outbound traffic a display generates on its own.

pub mod commands;
pub mod dispatcher;
pub mod liveness;
pub mod tag_view;

pub use commands::parse_console_command;
pub use dispatcher::Dispatcher;
pub use liveness::LivenessEmitter;
pub use tag_view::render_tag;
