use crate::error::DnsError;

/// Borrow `needed` bytes at `offset`, failing instead of reading past the end
pub fn read_slice(bytes: &[u8], offset: usize, needed: usize) -> Result<&[u8], DnsError> {
    offset
        .checked_add(needed)
        .and_then(|end| bytes.get(offset..end))
        .ok_or(DnsError::TruncatedBuffer {
            offset,
            needed,
            len: bytes.len(),
        })
}

pub fn read_u8(bytes: &[u8], offset: usize) -> Result<u8, DnsError> {
    Ok(read_slice(bytes, offset, 1)?[0])
}

/// Read a big-endian u16 at `offset`
pub fn read_u16(bytes: &[u8], offset: usize) -> Result<u16, DnsError> {
    let field = read_slice(bytes, offset, 2)?;
    Ok(u16::from_be_bytes([field[0], field[1]]))
}

/// Single bit of `byte`, position 0 being the least significant bit
pub fn bit_at(byte: u8, position: u8) -> u8 {
    (byte >> position) & 0x1
}
