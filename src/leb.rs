use crate::error::DexError;

// DEX encodes a u32 in at most 5 LEB chunks; anything longer is corrupt.
const MAX_LEB_BYTES: usize = 5;

pub(crate) fn decode_uleb128(encoded: &[u8]) -> Result<(u32, usize), DexError> {
    let mut value: u64 = 0;
    let mut count = 0;

    for &byte in encoded.iter().take(MAX_LEB_BYTES) {
        value |= ((byte & 0x7F) as u64) << (7 * count);
        count += 1;

        if byte & 0x80 == 0 {
            return Ok((value as u32, count));
        }
    }

    if encoded.len() < MAX_LEB_BYTES {
        fail!("unexpected end of stream reading uleb128");
    }
    fail!("uleb128 longer than 5 bytes")
}

/// uleb128p1: the encoded value minus one, so -1 (NO_INDEX) encodes as 0.
pub(crate) fn decode_uleb128p1(encoded: &[u8]) -> Result<(i32, usize), DexError> {
    let (v, c) = decode_uleb128(encoded)?;
    Ok((v as i32 - 1, c))
}

pub(crate) fn decode_sleb128(encoded: &[u8]) -> Result<(i32, usize), DexError> {
    let mut value: i32 = 0;
    let mut shift = 0;
    let mut count = 0;

    for &byte in encoded.iter().take(MAX_LEB_BYTES) {
        value |= ((byte & 0x7F) as i32) << shift;
        shift += 7;
        count += 1;

        if byte & 0x80 == 0 {
            if shift < 32 && (byte & 0x40) != 0 {
                value |= -1 << shift;
            }
            return Ok((value, count));
        }
    }

    if encoded.len() < MAX_LEB_BYTES {
        fail!("unexpected end of stream reading sleb128");
    }
    fail!("sleb128 longer than 5 bytes")
}

#[cfg(test)]
pub(crate) fn encode_uleb128(value: u32) -> Vec<u8> {
    let mut result = Vec::new();
    let mut remaining = value;

    loop {
        let mut byte = (remaining & 0x7F) as u8;
        remaining >>= 7;

        if remaining != 0 {
            byte |= 0x80;
        }
        result.push(byte);

        if remaining == 0 {
            return result;
        }
    }
}

#[cfg(test)]
pub(crate) fn encode_uleb128p1(value: i32) -> Vec<u8> {
    encode_uleb128((value + 1) as u32)
}

#[cfg(test)]
pub(crate) fn encode_sleb128(value: i32) -> Vec<u8> {
    let mut result = Vec::new();
    let mut remaining = value;

    loop {
        let mut byte = (remaining & 0x7F) as u8;
        remaining >>= 7;

        let more = !((remaining == 0 && (byte & 0x40) == 0) || (remaining == -1 && (byte & 0x40) != 0));
        if more {
            byte |= 0x80;
        }
        result.push(byte);

        if !more {
            return result;
        }
    }
}
