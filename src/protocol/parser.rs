//! Line codec
//!
//! Parses inbound lines into `ClientEvent` and encodes `ServerEvent` as lines.

use crate::error::ProtocolError;
use crate::protocol::{ClientEvent, ServerEvent};

/// Parse one inbound line. The trailing `\r\n` does not count toward `max_length`.
pub fn parse_event(line: &str, max_length: usize) -> Result<ClientEvent, ProtocolError> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.len() > max_length {
        return Err(ProtocolError::TooLong { max: max_length });
    }
    Ok(serde_json::from_str(trimmed)?)
}

/// Parse one raw inbound line, rejecting bytes that are not UTF-8.
pub fn parse_line(bytes: &[u8], max_length: usize) -> Result<ClientEvent, ProtocolError> {
    let line = std::str::from_utf8(bytes).map_err(|_| ProtocolError::InvalidUtf8)?;
    parse_event(line, max_length)
}

/// Encode an outbound event as a single newline-terminated line.
pub fn encode_event(event: &ServerEvent) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(event)?;
    line.push('\n');
    Ok(line)
}
