use std::fmt;

use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::config::Config;
use crate::dns_header::{DnsFlags, DnsHeader, ResponseCode, HEADER_LEN};
use crate::dns_name::NameCache;
use crate::dns_question_and_answer::{DnsAnswer, DnsQuestion};
use crate::error::DnsError;

/// Fixed capacity of an outgoing query
pub const QUERY_CAPACITY: usize = 256;

/// A decoded response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: u16,
    pub is_response: bool,
    pub authoritative: bool,
    pub truncated: bool,
    pub return_code: ResponseCode,
    pub questions: Vec<DnsQuestion>,
    pub answers: Vec<DnsAnswer>,
}

impl Message {
    /// Err when the server reported an error or cut the message short
    pub fn status(&self) -> Result<(), DnsError> {
        if self.return_code.is_error() {
            return Err(DnsError::Server(self.return_code));
        }
        if self.truncated {
            return Err(DnsError::Truncation);
        }
        Ok(())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Err(e) = self.status() {
            return write!(f, "{}", e);
        }

        writeln!(f, "{}", if self.is_response { "Response" } else { "Query" })?;
        writeln!(
            f,
            "{}",
            if self.authoritative {
                "Authoritative Answers:"
            } else {
                "Non-Authoritative Answers:"
            }
        )?;

        for answer in &self.answers {
            writeln!(f, "\t{}", answer)?;
        }

        Ok(())
    }
}

/// Build the query datagram asking for the A record of every host name
pub fn build_query(config: &Config, host_names: &[String]) -> Result<Bytes, DnsError> {
    if host_names.is_empty() {
        return Err(DnsError::Config("Missing host name".to_string()));
    }

    let question_count = u16::try_from(host_names.len()).map_err(|_| {
        DnsError::Config(format!("too many host names: {}", host_names.len()))
    })?;

    let header = DnsHeader {
        id: fastrand::u16(..),
        flags: DnsFlags::query(config.authoritative_only),
        question_count,
        answer_count: 0,
        authority_count: 0,
        additional_count: 0,
    };

    let mut query = BytesMut::with_capacity(QUERY_CAPACITY);
    header.write_to(&mut query);

    for host_name in host_names {
        let mut question = BytesMut::new();
        DnsQuestion::address(host_name.as_str()).write_to(&mut question)?;

        let needed = query.len() + question.len();
        if needed > QUERY_CAPACITY {
            return Err(DnsError::BufferOverflow {
                needed,
                capacity: QUERY_CAPACITY,
            });
        }
        query.extend_from_slice(&question);
    }

    debug!(
        id = header.id,
        questions = question_count,
        bytes = query.len(),
        "encoded query"
    );

    Ok(query.freeze())
}

/// Decode a response datagram.
/// A server error or truncation stops decoding after the header; the
/// returned message then carries no questions or answers.
pub fn parse_response(buf: &[u8]) -> Result<Message, DnsError> {
    let header = DnsHeader::from_bytes(buf)?;
    let flags = header.flags;

    let mut message = Message {
        id: header.id,
        is_response: flags.qr,
        authoritative: flags.aa,
        truncated: flags.tc,
        return_code: ResponseCode::from_u8(flags.rcode),
        questions: Vec::new(),
        answers: Vec::new(),
    };

    if message.return_code.is_error() || message.truncated {
        debug!(
            id = header.id,
            rcode = message.return_code.to_u8(),
            truncated = flags.tc,
            "response short-circuited"
        );
        return Ok(message);
    }

    let mut names = NameCache::new();
    let mut offset = HEADER_LEN;

    for _ in 0..header.question_count {
        let (question, new_offset) = DnsQuestion::from_bytes(buf, offset, &mut names)?;
        message.questions.push(question);
        offset = new_offset;
    }

    for _ in 0..header.answer_count {
        let (answer, new_offset) = DnsAnswer::from_bytes(buf, offset, &mut names)?;
        message.answers.push(answer);
        offset = new_offset;
    }

    debug!(
        id = header.id,
        questions = message.questions.len(),
        answers = message.answers.len(),
        consumed = offset,
        "decoded response"
    );

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns_question_and_answer::RecordData;

    fn hosts(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    /// Response to one question for example.com with a CNAME and an A record
    fn sample_response() -> Vec<u8> {
        let mut buf = vec![
            0x12, 0x34, // ID
            0x81, 0x80, // QR, RD | RA
            0x00, 0x01, // QDCOUNT
            0x00, 0x02, // ANCOUNT
            0x00, 0x00, 0x00, 0x00,
        ];
        // Question: example.com A IN (offset 12)
        buf.extend_from_slice(&[
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm', 0, 0, 1, 0, 1,
        ]);
        // CNAME: example.com -> www.example.com
        buf.extend_from_slice(&[0xC0, 12, 0, 5, 0, 1, 0, 0, 0, 60, 0, 6]);
        buf.extend_from_slice(&[3, b'w', b'w', b'w', 0xC0, 12]);
        // A: www.example.com -> 93.184.216.34, name points at the CNAME target (offset 41)
        buf.extend_from_slice(&[0xC0, 41, 0, 1, 0, 1, 0, 0, 0, 60, 0, 4, 93, 184, 216, 34]);
        buf
    }

    #[test]
    fn test_query_layout() {
        let config = Config::default();
        let query = build_query(&config, &hosts(&["www.example.com"])).unwrap();

        assert_eq!(&query[2..12], &[0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            &query[12..],
            &[
                3, b'w', b'w', b'w', 7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o',
                b'm', 0, 0, 1, 0, 1
            ]
        );
    }

    #[test]
    fn test_query_roundtrip() {
        let config = Config::default();
        let names = hosts(&["www.example.com", "bücher.de"]);
        let query = build_query(&config, &names).unwrap();

        let message = parse_response(&query).unwrap();
        assert!(!message.is_response);
        assert_eq!(message.questions.len(), 2);
        assert_eq!(message.questions[0], DnsQuestion::address("www.example.com"));
        assert_eq!(message.questions[1], DnsQuestion::address("bücher.de"));
        assert!(message.answers.is_empty());
    }

    #[test]
    fn test_authoritative_flag_roundtrip() {
        let config = Config {
            authoritative_only: true,
            ..Config::default()
        };
        let query = build_query(&config, &hosts(&["example.com"])).unwrap();
        assert_eq!(query[2] & 0x04, 0x04);

        let mut response = query.to_vec();
        response[2] |= 0x80;
        let message = parse_response(&response).unwrap();
        assert!(message.is_response);
        assert!(message.authoritative);
    }

    #[test]
    fn test_query_requires_hosts() {
        assert!(matches!(
            build_query(&Config::default(), &[]),
            Err(DnsError::Config(_))
        ));
    }

    #[test]
    fn test_query_rejects_bad_label() {
        assert!(matches!(
            build_query(&Config::default(), &hosts(&["www..com"])),
            Err(DnsError::Encoding(_))
        ));
    }

    #[test]
    fn test_query_overflow() {
        let long = format!("{}.com", "a".repeat(60));
        let names: Vec<String> = std::iter::repeat(long).take(4).collect();
        match build_query(&Config::default(), &names) {
            Err(DnsError::BufferOverflow { needed, capacity }) => {
                assert_eq!(capacity, QUERY_CAPACITY);
                assert!(needed > QUERY_CAPACITY);
            }
            other => panic!("expected overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_sample_response() {
        let message = parse_response(&sample_response()).unwrap();
        assert_eq!(message.id, 0x1234);
        assert!(message.is_response);
        assert!(!message.authoritative);
        assert_eq!(message.questions, vec![DnsQuestion::address("example.com")]);
        assert_eq!(message.answers.len(), 2);
        assert_eq!(message.answers[0].name, message.questions[0].name);
        assert_eq!(
            message.answers[0].data,
            RecordData::CanonicalName("www.example.com".to_string())
        );
        assert_eq!(message.answers[1].name, "www.example.com");
        assert_eq!(message.answers[1].text(), "93.184.216.34");
    }

    #[test]
    fn test_render_answers() {
        let message = parse_response(&sample_response()).unwrap();
        assert_eq!(
            message.to_string(),
            "Response\n\
             Non-Authoritative Answers:\n\
             \texample.com: CNAME (IP) -> www.example.com\n\
             \twww.example.com: A (IP) -> 93.184.216.34\n"
        );
    }

    #[test]
    fn test_rcode_short_circuits() {
        let mut buf = sample_response();
        buf[3] = 0x83;
        // Garbage after the header must not be touched
        buf.truncate(HEADER_LEN);

        let message = parse_response(&buf).unwrap();
        assert_eq!(message.return_code, ResponseCode::NameError);
        assert!(message.questions.is_empty());
        assert!(message.answers.is_empty());
        assert_eq!(
            message.to_string(),
            "Name error - domain name referenced in the query does not exist"
        );
        assert!(matches!(
            message.status(),
            Err(DnsError::Server(ResponseCode::NameError))
        ));
    }

    #[test]
    fn test_unknown_rcode() {
        let mut buf = sample_response();
        buf[3] = 0x0B;
        let message = parse_response(&buf).unwrap();
        assert_eq!(
            message.to_string(),
            "Unknown error - the return code is an unknown value: (11)"
        );
    }

    #[test]
    fn test_truncation_short_circuits() {
        let mut buf = sample_response();
        buf[2] |= 0x02;
        buf.truncate(HEADER_LEN);

        let message = parse_response(&buf).unwrap();
        assert!(message.truncated);
        assert!(message.answers.is_empty());
        assert_eq!(message.to_string(), "ERROR: Truncated message");
        assert!(matches!(message.status(), Err(DnsError::Truncation)));
    }

    #[test]
    fn test_every_truncation_fails_cleanly() {
        let buf = sample_response();
        for len in 0..buf.len() {
            match parse_response(&buf[..len]) {
                Err(DnsError::TruncatedBuffer { .. }) => {}
                other => panic!("length {}: expected truncated buffer, got {:?}", len, other),
            }
        }
    }

    #[test]
    fn test_self_pointer_in_answer() {
        let mut buf = sample_response();
        // Point the first answer's name at itself (offset 29)
        buf[29] = 0xC0;
        buf[30] = 29;
        assert!(matches!(
            parse_response(&buf),
            Err(DnsError::MalformedName { offset: 29, .. })
        ));
    }

    #[test]
    fn test_authoritative_banner() {
        let mut buf = sample_response();
        buf[2] |= 0x04;
        let rendered = parse_response(&buf).unwrap().to_string();
        assert!(rendered.starts_with("Response\nAuthoritative Answers:\n"));
    }
}
