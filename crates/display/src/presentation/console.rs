//! Terminal surface: one line per slot update.

use std::io::{self, Write};

use crate::ports::{PresentationSurface, SlotContent, StatusIndicator};
use crate::presentation::slot_board::SlotBoard;

pub struct ConsoleSurface<W> {
    out: W,
    board: SlotBoard,
}

impl ConsoleSurface<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            board: SlotBoard::new(),
        }
    }

    /// Board mirroring everything written to this surface.
    pub fn board(&self) -> SlotBoard {
        self.board.clone()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, slot: &str, text: &str) {
        if let Err(e) = writeln!(self.out, "[{slot}] {text}").and_then(|()| self.out.flush()) {
            tracing::warn!("Failed to write {} slot: {}", slot, e);
        }
    }
}

impl<W: Write + Send> PresentationSurface for ConsoleSurface<W> {
    fn show_tag_info(&mut self, content: SlotContent) {
        let text = match &content {
            SlotContent::Text(text) => text.clone(),
            SlotContent::Markup(markup) => plain_text(markup),
        };
        self.line("tag", &text);
        self.board.show_tag_info(content);
    }

    fn show_link_status(&mut self, indicator: StatusIndicator) {
        let label = match indicator {
            StatusIndicator::Connected => "FilaMan connected",
            StatusIndicator::Disconnected => "FilaMan disconnected",
        };
        self.line("status", &format!("{label} ({})", indicator.color()));
        self.board.show_link_status(indicator);
    }

    fn show_memory(&mut self, text: String) {
        self.line("memory", &text);
        self.board.show_memory(text);
    }

    fn show_weight(&mut self, text: String) {
        self.line("weight", &text);
        self.board.show_weight(text);
    }

    fn show_tag_presence(&mut self, present: bool) {
        self.line("reader", if present { "tag present" } else { "no tag" });
        self.board.show_tag_presence(present);
    }
}

/// Flatten tag markup for a terminal: `<br>` becomes ` | `, other tags are
/// dropped and entities decoded.
pub fn plain_text(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('>') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let tag = &rest[start + 1..start + end];
        if tag.eq_ignore_ascii_case("br") || tag.eq_ignore_ascii_case("br/") {
            out.push_str(" | ");
        }
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);

    out.trim_end_matches(" | ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}
