use std::borrow::Cow;
use std::fmt;

use bytes::BufMut;

use crate::dns_bytes::{bit_at, read_u16};
use crate::error::DnsError;

pub const HEADER_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsHeader {
    pub id: u16,
    pub flags: DnsFlags,
    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DnsFlags {
    pub qr: bool,              // Query/Response (false = query, true = response)
    pub opcode: u8,            // Operation code (0 = standard query)
    pub aa: bool,              // Authoritative Answer
    pub tc: bool,              // Truncation
    pub rd: bool,              // Recursion Desired
    pub ra: bool,              // Recursion Available
    pub z: u8,                 // Reserved (must be 0)
    pub rcode: u8,             // Response code (0 = no error, 1 = format error, etc.)
}

impl DnsFlags {
    /// Flags for an outgoing standard query with recursion desired
    pub fn query(authoritative_only: bool) -> Self {
        DnsFlags {
            rd: true,
            aa: authoritative_only,
            ..Default::default()
        }
    }

    pub fn to_bytes(self) -> [u8; 2] {
        let mut high: u8 = 0;
        if self.qr { high |= 1 << 7; }            // QR
        high |= (self.opcode & 0xF) << 3;         // OPCODE
        if self.aa { high |= 1 << 2; }            // AA
        if self.tc { high |= 1 << 1; }            // TC
        if self.rd { high |= 1; }                 // RD

        let mut low: u8 = 0;
        if self.ra { low |= 1 << 7; }             // RA
        low |= (self.z & 0x7) << 4;               // Z (reserved)
        low |= self.rcode & 0xF;                  // RCODE

        [high, low]
    }

    pub fn from_bytes([high, low]: [u8; 2]) -> Self {
        DnsFlags {
            qr: bit_at(high, 7) == 1,
            opcode: (high >> 3) & 0xF,
            aa: bit_at(high, 2) == 1,
            tc: bit_at(high, 1) == 1,
            rd: bit_at(high, 0) == 1,
            ra: bit_at(low, 7) == 1,
            z: (low >> 4) & 0x7,
            rcode: low & 0xF,
        }
    }
}

impl DnsHeader {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DnsError> {
        let flags = read_u16(bytes, 2)?.to_be_bytes();

        Ok(DnsHeader {
            id: read_u16(bytes, 0)?,
            flags: DnsFlags::from_bytes(flags),
            question_count: read_u16(bytes, 4)?,
            answer_count: read_u16(bytes, 6)?,
            authority_count: read_u16(bytes, 8)?,
            additional_count: read_u16(bytes, 10)?,
        })
    }

    pub fn write_to(&self, buf: &mut impl BufMut) {
        buf.put_u16(self.id);
        buf.put_slice(&self.flags.to_bytes());
        buf.put_u16(self.question_count);
        buf.put_u16(self.answer_count);
        buf.put_u16(self.authority_count);
        buf.put_u16(self.additional_count);
    }
}

/// RCODE carried in the low nibble of the second flag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    NoError,
    FormatError,
    ServerFailure,
    NameError,
    NotImplemented,
    Refused,
    Unknown(u8),
}

impl ResponseCode {
    pub fn from_u8(value: u8) -> Self {
        match value & 0xF {
            0 => ResponseCode::NoError,
            1 => ResponseCode::FormatError,
            2 => ResponseCode::ServerFailure,
            3 => ResponseCode::NameError,
            4 => ResponseCode::NotImplemented,
            5 => ResponseCode::Refused,
            other => ResponseCode::Unknown(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            ResponseCode::NoError => 0,
            ResponseCode::FormatError => 1,
            ResponseCode::ServerFailure => 2,
            ResponseCode::NameError => 3,
            ResponseCode::NotImplemented => 4,
            ResponseCode::Refused => 5,
            ResponseCode::Unknown(code) => code,
        }
    }

    pub fn is_error(self) -> bool {
        self != ResponseCode::NoError
    }

    /// Human readable report for the code
    pub fn description(self) -> Cow<'static, str> {
        let text = match self {
            ResponseCode::NoError => "No error",
            ResponseCode::FormatError => {
                "Format error - the name server was unable to interpret the query"
            }
            ResponseCode::ServerFailure => {
                "Server failure - the name server was unable to process this query due to a problem with the name server"
            }
            ResponseCode::NameError => {
                "Name error - domain name referenced in the query does not exist"
            }
            ResponseCode::NotImplemented => {
                "Not implemented - the name server does not support the requested kind of query"
            }
            ResponseCode::Refused => {
                "Refused - the name server refuses to perform the specified operation for policy reasons"
            }
            ResponseCode::Unknown(code) => {
                return Cow::Owned(format!(
                    "Unknown error - the return code is an unknown value: ({})",
                    code
                ))
            }
        };
        Cow::Borrowed(text)
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}
