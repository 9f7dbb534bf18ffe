//! Unsigned LEB128 integers.
//!
//! Seven value bits per byte, least significant group first. The high bit
//! of each byte is set when another byte follows.

/// Append `value` to `out`.
pub fn write(out: &mut Vec<u8>, mut value: u32) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Decode one value starting at `*pos`, advancing `*pos` past it.
///
/// Returns `None` on truncated input or when the encoding does not fit in
/// a `u32`. `*pos` is left unchanged on failure.
pub fn read(bytes: &[u8], pos: &mut usize) -> Option<u32> {
    let mut value = 0u32;
    let mut shift = 0u32;
    let mut cursor = *pos;
    loop {
        let byte = *bytes.get(cursor)?;
        cursor += 1;
        let group = u32::from(byte & 0x7f);
        if shift == 28 && group > 0x0f {
            return None;
        }
        value |= group << shift;
        if byte & 0x80 == 0 {
            *pos = cursor;
            return Some(value);
        }
        shift += 7;
        if shift > 28 {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_encodings() {
        let mut out = Vec::new();
        write(&mut out, 0);
        write(&mut out, 127);
        write(&mut out, 128);
        write(&mut out, 300);
        assert_eq!(out, vec![0x00, 0x7f, 0x80, 0x01, 0xac, 0x02]);

        let mut pos = 0;
        assert_eq!(read(&out, &mut pos), Some(0));
        assert_eq!(read(&out, &mut pos), Some(127));
        assert_eq!(read(&out, &mut pos), Some(128));
        assert_eq!(read(&out, &mut pos), Some(300));
        assert_eq!(pos, out.len());
    }

    #[test]
    fn test_u32_max() {
        let mut out = Vec::new();
        write(&mut out, u32::MAX);
        assert_eq!(out, vec![0xff, 0xff, 0xff, 0xff, 0x0f]);
        assert_eq!(read(&out, &mut 0), Some(u32::MAX));
    }

    #[test]
    fn test_truncated_and_overlong() {
        let mut pos = 0;
        assert_eq!(read(&[0x80, 0x80], &mut pos), None);
        assert_eq!(pos, 0);
        // Sixth byte would be needed.
        assert_eq!(read(&[0xff, 0xff, 0xff, 0xff, 0xff, 0x01], &mut pos), None);
        // Fifth byte carries bits beyond u32.
        assert_eq!(read(&[0xff, 0xff, 0xff, 0xff, 0x1f], &mut pos), None);
        assert_eq!(read(&[], &mut pos), None);
    }
}
