//! Tag-info slot rendering.

use spooldesk_shared::{NfcPayload, TagReading};

use crate::ports::SlotContent;

pub const NO_TAG_TEXT: &str = "No tag detected";

const TAG_HEADER: &str = "<strong>Tag detected:</strong><br>";

/// Render an `nfcData` payload for the tag-info slot.
///
/// Reader status text and the no-tag fallback are plain text; tag documents
/// are markup.
pub fn render_tag(payload: Option<&NfcPayload>) -> SlotContent {
    let reading = payload
        .map(NfcPayload::reading)
        .unwrap_or(TagReading::Empty);

    match reading {
        TagReading::Error(text) | TagReading::Info(text) => SlotContent::Text(text),
        TagReading::Empty => SlotContent::Text(NO_TAG_TEXT.to_string()),
        TagReading::Spool {
            id,
            brand,
            material,
        } => {
            let mut html = String::from(TAG_HEADER);
            html.push_str(&format!("Spool ID: {}<br>", escape(&id)));
            if let Some(brand) = brand {
                html.push_str(&format!("Brand: {}<br>", escape(&brand)));
            }
            if let Some(material) = material {
                html.push_str(&format!("Material: {}<br>", escape(&material)));
            }
            SlotContent::Markup(html)
        }
        TagReading::Location { id } => {
            SlotContent::Markup(format!("{TAG_HEADER}Location ID: {}<br>", escape(&id)))
        }
        TagReading::Unrecognized => SlotContent::Markup(format!("{TAG_HEADER}Unknown Tag Format")),
    }
}

/// Tag contents come from writable media; keep them out of the markup.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
