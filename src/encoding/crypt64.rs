//! Little-endian crypt base64 over `./0-9A-Za-z`.
//!
//! Used by yescrypt for settings, salts and keys, and by Sun MD5 crypt for
//! its checksum. Groups of up to three bytes are packed least significant
//! bits first into groups of up to four characters.

/// crypt(3) itoa64 table.
pub const ITOA64: &[u8; 64] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

fn atoi64(c: u8) -> Option<u32> {
    let value = match c {
        b'.' => 0,
        b'/' => 1,
        b'0'..=b'9' => c - b'0' + 2,
        b'A'..=b'Z' => c - b'A' + 12,
        b'a'..=b'z' => c - b'a' + 38,
        _ => return None,
    };
    Some(u32::from(value))
}

/// Encodes bytes, emitting 2, 3 or 4 characters per group of 1, 2 or 3 bytes.
pub fn encode64(src: &[u8]) -> String {
    let mut dst = String::with_capacity(src.len().div_ceil(3) * 4);

    for group in src.chunks(3) {
        let mut value = 0u32;
        for (i, byte) in group.iter().enumerate() {
            value |= u32::from(*byte) << (8 * i);
        }

        let bits = 8 * group.len() as u32;
        let mut emitted = 0;
        while emitted < bits {
            dst.push(char::from(ITOA64[(value & 0x3f) as usize]));
            value >>= 6;
            emitted += 6;
        }
    }

    dst
}

/// Decodes a string produced by [`encode64`].
///
/// Returns `None` for characters outside the table, groups too short to hold
/// a byte, or non-zero leftover bits.
pub fn decode64(src: &str) -> Option<Vec<u8>> {
    let mut dst = Vec::with_capacity(src.len() * 3 / 4);

    for group in src.as_bytes().chunks(4) {
        let mut value = 0u32;
        let mut bits = 0u32;

        for c in group {
            value |= atoi64(*c)? << bits;
            bits += 6;
        }

        if bits < 12 {
            return None;
        }

        while bits >= 8 {
            dst.push(value as u8);
            value >>= 8;
            bits -= 8;
        }

        if value != 0 {
            return None;
        }
    }

    Some(dst)
}

/// Appends the variable-length encoding of `src - min` to `dst`.
///
/// Small values take one character; larger values take progressively more.
/// Returns `None` when `src < min` or the value cannot be represented.
pub fn encode64_uint32(dst: &mut String, src: u32, min: u32) -> Option<()> {
    if src < min {
        return None;
    }

    let mut src = src - min;
    let (mut start, mut end, mut chars, mut bits) = (0u32, 47u32, 1u32, 0u32);

    loop {
        let count = (end + 1 - start) << bits;
        if src < count {
            break;
        }
        if start >= 63 {
            return None;
        }
        start = end + 1;
        end = start + (62 - end) / 2;
        src -= count;
        chars += 1;
        bits += 6;
    }

    dst.push(char::from(ITOA64[(start + (src >> bits)) as usize]));

    while chars > 1 {
        chars -= 1;
        bits -= 6;
        dst.push(char::from(ITOA64[((src >> bits) & 0x3f) as usize]));
    }

    Some(())
}

/// Reads one value written by [`encode64_uint32`], returning it and the unread input.
pub fn decode64_uint32(src: &[u8], min: u32) -> Option<(u32, &[u8])> {
    let (first, mut rest) = src.split_first()?;
    let c = atoi64(*first)?;

    let (mut start, mut end, mut chars, mut bits) = (0u32, 47u32, 1u32, 0u32);
    let mut value = min;

    while c > end {
        value = value.checked_add((end + 1 - start) << bits)?;
        start = end + 1;
        end = start + (62 - end) / 2;
        chars += 1;
        bits += 6;
    }

    value = value.checked_add((c - start) << bits)?;

    while chars > 1 {
        chars -= 1;
        let (next, tail) = rest.split_first()?;
        let c = atoi64(*next)?;
        bits -= 6;
        value = value.checked_add(c << bits)?;
        rest = tail;
    }

    Some((value, rest))
}
