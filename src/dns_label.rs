//! Conversion of single domain labels between Unicode text and their
//! ASCII-compatible (Punycode) wire form.

use crate::error::DnsError;

/// RFC 1035: labels are at most 63 octets on the wire
pub const MAX_LABEL_LEN: usize = 63;

const ACE_PREFIX: &str = "xn--";

/// Convert one Unicode label into the bytes written after its length prefix
pub fn to_wire_label(text: &str) -> Result<Vec<u8>, DnsError> {
    if text.is_empty() {
        return Err(DnsError::Encoding("empty label".to_string()));
    }

    let ascii = if text.is_ascii() {
        text.to_string()
    } else {
        idna::domain_to_ascii(text)
            .map_err(|e| DnsError::Encoding(format!("cannot encode label {:?}: {:?}", text, e)))?
    };

    // IDNA mapping may turn ideographic full stops into separators
    if ascii.is_empty() || ascii.contains('.') {
        return Err(DnsError::Encoding(format!(
            "label {:?} does not map to a single label",
            text
        )));
    }

    if ascii.len() > MAX_LABEL_LEN {
        return Err(DnsError::Encoding(format!(
            "label {:?} is {} bytes, limit is {}",
            text,
            ascii.len(),
            MAX_LABEL_LEN
        )));
    }

    Ok(ascii.into_bytes())
}

/// Convert wire label bytes back to text, decoding `xn--` labels.
/// Unassigned code points are passed through.
pub fn from_wire_label(bytes: &[u8]) -> Result<String, DnsError> {
    let text = std::str::from_utf8(bytes)
        .ok()
        .filter(|s| s.is_ascii())
        .ok_or_else(|| DnsError::Encoding("label is not ASCII".to_string()))?;

    let has_ace_prefix = text.len() >= ACE_PREFIX.len()
        && text.as_bytes()[..ACE_PREFIX.len()].eq_ignore_ascii_case(ACE_PREFIX.as_bytes());

    if !has_ace_prefix {
        return Ok(text.to_string());
    }

    idna::punycode::decode_to_string(&text[ACE_PREFIX.len()..])
        .filter(|decoded| !decoded.is_empty())
        .ok_or_else(|| DnsError::Encoding(format!("invalid punycode label {:?}", text)))
}
