//! Operator commands typed into the console.

use spooldesk_shared::{ClientMessage, ReconnectTarget, TagKind};

/// Parse one console line into a device command.
///
/// Recognised forms: `tare`, `calibrate`, `autotare on|off`,
/// `reconnect`, `write spool|location <json>`.
pub fn parse_console_command(line: &str) -> Option<ClientMessage> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match (verb.to_ascii_lowercase().as_str(), rest) {
        ("tare", "") => Some(ClientMessage::tare()),
        ("calibrate", "") => Some(ClientMessage::calibrate()),
        ("autotare", "on") => Some(ClientMessage::set_auto_tare(true)),
        ("autotare", "off") => Some(ClientMessage::set_auto_tare(false)),
        ("reconnect", "") => Some(ClientMessage::Reconnect {
            payload: ReconnectTarget::Filaman,
        }),
        ("write", args) => parse_write(args),
        _ => None,
    }
}

fn parse_write(args: &str) -> Option<ClientMessage> {
    let (kind, document) = args.split_once(char::is_whitespace)?;
    let tag_type = match kind {
        "spool" => TagKind::Spool,
        "location" => TagKind::Location,
        _ => return None,
    };
    let payload: serde_json::Value = serde_json::from_str(document.trim()).ok()?;
    payload.is_object().then_some(ClientMessage::WriteNfcTag { tag_type, payload })
}
