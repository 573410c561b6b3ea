use std::fmt;
use std::net::Ipv4Addr;

use bytes::BufMut;

use crate::dns_bytes::{read_slice, read_u16};
use crate::dns_name::{encode_domain_name, read_name, NameCache};
use crate::error::DnsError;

/// DNS Question Section
/// Format: QNAME + QTYPE (2 bytes) + QCLASS (2 bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuestion {
    pub name: String, // Domain name (e.g., "example.com")
    pub qtype: u16,   // Query type (A, CNAME, ...)
    pub qclass: u16,  // Query class (usually IN for Internet)
}

/// DNS Answer/Resource Record Section
/// Format: NAME + TYPE (2 bytes) + CLASS (2 bytes) + TTL (4 bytes) + RDLENGTH (2 bytes) + RDATA
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsAnswer {
    pub name: String, // Name of the question this record answers
    pub rtype: u16,   // Record type
    pub rclass: u16,  // Record class
    pub data: RecordData,
}

/// Decoded RDATA
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    Address(Ipv4Addr),
    CanonicalName(String),
    Unrecognized { length: u16 },
}

/// Record types this client understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A = 1,     // IPv4 address
    CNAME = 5, // Canonical name
}

impl RecordType {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(RecordType::A),
            5 => Some(RecordType::CNAME),
            _ => None,
        }
    }

    pub fn to_u16(self) -> u16 {
        self as u16
    }

    /// Short tag used in reports, "U" for anything unknown
    pub fn label(value: u16) -> &'static str {
        match Self::from_u16(value) {
            Some(RecordType::A) => "A",
            Some(RecordType::CNAME) => "CNAME",
            None => "U",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordClass {
    IN = 1, // Internet
}

impl RecordClass {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(RecordClass::IN),
            _ => None,
        }
    }

    pub fn to_u16(self) -> u16 {
        self as u16
    }

    /// Short tag used in reports, "U" for anything unknown
    pub fn label(value: u16) -> &'static str {
        match Self::from_u16(value) {
            Some(RecordClass::IN) => "IP",
            None => "U",
        }
    }
}

impl DnsQuestion {
    /// Internet-class address question for `name`
    pub fn address(name: impl Into<String>) -> Self {
        DnsQuestion {
            name: name.into(),
            qtype: RecordType::A.to_u16(),
            qclass: RecordClass::IN.to_u16(),
        }
    }

    /// Parse a DNS question from bytes starting at the given offset
    /// Returns the question and the new offset after parsing
    pub fn from_bytes(
        bytes: &[u8],
        offset: usize,
        names: &mut NameCache,
    ) -> Result<(Self, usize), DnsError> {
        let (name, offset) = read_name(bytes, offset, names)?;
        let qtype = read_u16(bytes, offset)?;
        let qclass = read_u16(bytes, offset + 2)?;

        Ok((
            DnsQuestion {
                name,
                qtype,
                qclass,
            },
            offset + 4,
        ))
    }

    /// Append the question to an outgoing message, returning the bytes written
    pub fn write_to(&self, buf: &mut impl BufMut) -> Result<usize, DnsError> {
        let name_len = encode_domain_name(&self.name, buf)?;
        buf.put_u16(self.qtype);
        buf.put_u16(self.qclass);
        Ok(name_len + 4)
    }
}

impl fmt::Display for DnsQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) -> {}",
            RecordType::label(self.qtype),
            RecordClass::label(self.qclass),
            self.name
        )
    }
}

impl DnsAnswer {
    /// Parse a resource record starting at the given offset
    /// Returns the answer and the offset just past its RDATA
    pub fn from_bytes(
        bytes: &[u8],
        offset: usize,
        names: &mut NameCache,
    ) -> Result<(Self, usize), DnsError> {
        let (name, offset) = read_name(bytes, offset, names)?;
        let rtype = read_u16(bytes, offset)?;
        let rclass = read_u16(bytes, offset + 2)?;
        // TTL (4 bytes) is not reported
        let rdlength = read_u16(bytes, offset + 8)?;

        let data_offset = offset + 10;
        let rdata = read_slice(bytes, data_offset, rdlength as usize)?;
        let data_end = data_offset + rdlength as usize;

        let data = match RecordType::from_u16(rtype) {
            Some(RecordType::A) => {
                let octets: [u8; 4] =
                    rdata.try_into().map_err(|_| DnsError::MalformedRecord {
                        offset: data_offset,
                        reason: "A record data is not 4 bytes",
                    })?;
                RecordData::Address(Ipv4Addr::from(octets))
            }
            Some(RecordType::CNAME) => {
                let (target, name_end) = read_name(bytes, data_offset, names)?;
                if name_end > data_end {
                    return Err(DnsError::MalformedRecord {
                        offset: data_offset,
                        reason: "CNAME target overruns record data",
                    });
                }
                RecordData::CanonicalName(target)
            }
            None => RecordData::Unrecognized { length: rdlength },
        };

        Ok((
            DnsAnswer {
                name,
                rtype,
                rclass,
                data,
            },
            data_end,
        ))
    }

    /// Rendered record value: dotted address, CNAME target or a marker
    pub fn text(&self) -> String {
        self.data.to_string()
    }
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::Address(addr) => write!(f, "{}", addr),
            RecordData::CanonicalName(name) => f.write_str(name),
            RecordData::Unrecognized { length } => write!(f, "<unrecognized, {} bytes>", length),
        }
    }
}

impl fmt::Display for DnsAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}) -> {}",
            self.name,
            RecordType::label(self.rtype),
            RecordClass::label(self.rclass),
            self.text()
        )
    }
}
