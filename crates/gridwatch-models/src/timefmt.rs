use chrono::NaiveDateTime;

/// Canonical wire format for all temporal tool inputs.
pub const WIRE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format for all temporal output values (ISO-8601, no offset).
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a wire-format timestamp (`YYYY-MM-DD HH:MM:SS`), strictly.
pub fn parse_wire(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, WIRE_FORMAT)
}

/// Serialize a timestamp as ISO-8601.
pub fn to_iso(dt: &NaiveDateTime) -> String {
    dt.format(ISO_FORMAT).to_string()
}

/// Convert a wire-format timestamp to its ISO-8601 output form.
/// Returns the input unchanged if it does not parse; response shaping must
/// never fail on data the store already accepted.
pub fn wire_to_iso(text: &str) -> String {
    match parse_wire(text) {
        Ok(dt) => to_iso(&dt),
        Err(_) => text.to_string(),
    }
}
