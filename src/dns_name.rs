use std::collections::{HashMap, HashSet};

use bytes::BufMut;
use tracing::warn;

use crate::dns_bytes::{read_slice, read_u16, read_u8};
use crate::dns_label::{from_wire_label, to_wire_label, MAX_LABEL_LEN};
use crate::error::DnsError;

/// RFC 1035: a name takes at most 255 octets on the wire
pub const MAX_NAME_LEN: usize = 255;

/// Shown in place of a label that cannot be decoded
pub const REPLACEMENT_LABEL: &str = "\u{FFFD}";

const POINTER_MASK: u8 = 0xC0;

/// Names already resolved during one decode pass, keyed by the offset they
/// start at.
#[derive(Debug, Default)]
pub struct NameCache {
    names: HashMap<usize, CachedName>,
}

#[derive(Debug, Clone)]
struct CachedName {
    text: String,
    // Offset right after the name's own encoding
    end: usize,
    // Wire length of all labels, terminator excluded
    wire_len: usize,
}

impl NameCache {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Part of a name read from one contiguous run of labels
struct Segment {
    start: usize,
    first_label: usize,
    end: usize,
}

/// Parse a domain name from DNS message format, following compression
/// pointers. Returns the name and the offset just past its own encoding;
/// pointer targets never move the returned offset beyond the pointer.
pub fn read_name(
    bytes: &[u8],
    start: usize,
    cache: &mut NameCache,
) -> Result<(String, usize), DnsError> {
    if let Some(hit) = cache.names.get(&start) {
        return Ok((hit.text.clone(), hit.end));
    }

    let mut labels: Vec<(String, usize)> = Vec::new();
    let mut segments: Vec<Segment> = Vec::new();
    let mut visited = HashSet::from([start]);
    let mut segment_start = (start, 0);
    let mut wire_len = 0;
    let mut offset = start;
    // Cached suffix reached through a pointer
    let mut suffix: Option<CachedName> = None;

    loop {
        let length = read_u8(bytes, offset)?;

        if length == 0 {
            segments.push(Segment {
                start: segment_start.0,
                first_label: segment_start.1,
                end: offset + 1,
            });
            break;
        }

        if length & POINTER_MASK == POINTER_MASK {
            let target = (read_u16(bytes, offset)? & 0x3FFF) as usize;
            segments.push(Segment {
                start: segment_start.0,
                first_label: segment_start.1,
                end: offset + 2,
            });

            if target >= offset {
                return Err(DnsError::MalformedName {
                    offset,
                    reason: "compression pointer does not point backward",
                });
            }
            if !visited.insert(target) {
                return Err(DnsError::MalformedName {
                    offset,
                    reason: "compression pointer loop",
                });
            }

            if let Some(hit) = cache.names.get(&target) {
                wire_len += hit.wire_len;
                if wire_len + 1 > MAX_NAME_LEN {
                    return Err(DnsError::MalformedName {
                        offset,
                        reason: "name exceeds 255 bytes",
                    });
                }
                suffix = Some(hit.clone());
                break;
            }

            segment_start = (target, labels.len());
            offset = target;
            continue;
        }

        if length as usize > MAX_LABEL_LEN {
            return Err(DnsError::MalformedName {
                offset,
                reason: "unsupported label type",
            });
        }

        wire_len += 1 + length as usize;
        if wire_len + 1 > MAX_NAME_LEN {
            return Err(DnsError::MalformedName {
                offset,
                reason: "name exceeds 255 bytes",
            });
        }

        let raw = read_slice(bytes, offset + 1, length as usize)?;
        let label = from_wire_label(raw).unwrap_or_else(|e| {
            warn!(offset, error = %e, "undecodable label, substituting placeholder");
            REPLACEMENT_LABEL.to_string()
        });
        labels.push((label, 1 + length as usize));
        offset += 1 + length as usize;
    }

    // Every segment resolves to its own labels plus whatever followed it
    for segment in segments.iter().rev() {
        let own = &labels[segment.first_label..];
        let mut parts: Vec<&str> = own.iter().map(|(label, _)| label.as_str()).collect();
        let mut segment_wire_len: usize = own.iter().map(|(_, len)| len).sum();
        if let Some(tail) = &suffix {
            if tail.text != "." {
                parts.push(&tail.text);
            }
            segment_wire_len += tail.wire_len;
        }
        let text = if parts.is_empty() {
            ".".to_string() // Root domain
        } else {
            parts.join(".")
        };
        cache.names.insert(
            segment.start,
            CachedName {
                text,
                end: segment.end,
                wire_len: segment_wire_len,
            },
        );
    }

    cache
        .names
        .get(&start)
        .map(|hit| (hit.text.clone(), hit.end))
        .ok_or(DnsError::MalformedName {
            offset: start,
            reason: "name could not be resolved",
        })
}

/// Write a host name as length-prefixed labels terminated with a null byte.
/// Example: "example.com" -> [7]example[3]com[0]
/// A single trailing dot is accepted; any other empty label is an error.
pub fn encode_domain_name(name: &str, buf: &mut impl BufMut) -> Result<usize, DnsError> {
    let trimmed = name.strip_suffix('.').unwrap_or(name);
    if trimmed.is_empty() {
        return Err(DnsError::Encoding(format!("invalid host name {:?}", name)));
    }

    let mut encoded = Vec::new();
    for label in trimmed.split('.') {
        let wire = to_wire_label(label)?;
        encoded.push(wire.len() as u8);
        encoded.extend_from_slice(&wire);
    }

    // Null terminator
    encoded.push(0);

    if encoded.len() > MAX_NAME_LEN {
        return Err(DnsError::Encoding(format!(
            "host name {:?} exceeds {} bytes",
            name, MAX_NAME_LEN
        )));
    }

    buf.put_slice(&encoded);
    Ok(encoded.len())
}
