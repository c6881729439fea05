//! Presentation Port - the named slots a display exposes.
//!
//! Each slot holds only the most recent value written to it. Implementations
//! decide how a slot is drawn (terminal, in-memory board, ...); the dispatcher
//! only ever writes.

/// Content for the tag-info slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotContent {
    /// Plain text, shown verbatim.
    Text(String),
    /// Markup with `<br>` line breaks and `<strong>` emphasis.
    Markup(String),
}

impl SlotContent {
    pub fn as_str(&self) -> &str {
        match self {
            SlotContent::Text(s) | SlotContent::Markup(s) => s,
        }
    }
}

/// Visual state of the backend-link status dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIndicator {
    Connected,
    Disconnected,
}

impl StatusIndicator {
    pub fn from_connected(connected: bool) -> Self {
        if connected {
            StatusIndicator::Connected
        } else {
            StatusIndicator::Disconnected
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            StatusIndicator::Connected => "#4caf50",
            StatusIndicator::Disconnected => "#f44336",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait PresentationSurface: Send {
    /// Tag-info slot (rich text).
    fn show_tag_info(&mut self, content: SlotContent);

    /// Status-indicator slot.
    fn show_link_status(&mut self, indicator: StatusIndicator);

    /// Memory slot, e.g. `"120k free"`.
    fn show_memory(&mut self, text: String);

    /// Weight slot, e.g. `"42g"`.
    fn show_weight(&mut self, text: String);

    /// Tag-presence slot.
    fn show_tag_presence(&mut self, present: bool);
}
