//! Length checks and fixed-width text fields.
use crate::constants::image;
use crate::error::{Error, Result};

pub fn ensure_len(buf: &[u8], needed: usize) -> Result<()> {
    if buf.len() < needed {
        return Err(Error::BufferTooShort {
            needed,
            actual: buf.len(),
        });
    }
    Ok(())
}

/// Rejects a provisioning layout larger than the store.
pub fn check_budget(total: usize) -> Result<()> {
    if total > image::MAX_SIZE {
        return Err(Error::LayoutOverflow {
            total,
            limit: image::MAX_SIZE,
        });
    }
    Ok(())
}

/// Checks that `value` fits a field of `width` bytes, terminator included.
pub fn validate_fixed_str(field: &'static str, value: &str, width: usize) -> Result<()> {
    let max = width - 1;
    if value.len() > max {
        return Err(Error::FieldTooLong {
            field,
            len: value.len(),
            max,
        });
    }
    if value.bytes().any(|b| b == 0) {
        return Err(Error::MalformedString { field });
    }
    Ok(())
}

/// Writes `value` NUL-padded to `width` bytes at `offset`.
pub fn write_fixed_str(
    buf: &mut [u8],
    offset: usize,
    field: &'static str,
    value: &str,
    width: usize,
) -> Result<()> {
    validate_fixed_str(field, value, width)?;
    ensure_len(buf, offset + width)?;
    let slot = &mut buf[offset..offset + width];
    slot.fill(0);
    slot[..value.len()].copy_from_slice(value.as_bytes());
    Ok(())
}

/// Reads a NUL-terminated field of `width` bytes at `offset`.
pub fn read_fixed_str(buf: &[u8], offset: usize, field: &'static str, width: usize) -> Result<String> {
    ensure_len(buf, offset + width)?;
    let slot = &buf[offset..offset + width];
    let end = slot
        .iter()
        .position(|&b| b == 0)
        .ok_or(Error::MalformedString { field })?;
    std::str::from_utf8(&slot[..end])
        .map(str::to_owned)
        .map_err(|_| Error::MalformedString { field })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_with_nul() {
        let mut buf = [0xffu8; 10];
        write_fixed_str(&mut buf, 1, "codename", "abc", 5).unwrap();
        assert_eq!(buf, [0xff, b'a', b'b', b'c', 0, 0, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(read_fixed_str(&buf, 1, "codename", 5).unwrap(), "abc");
    }

    #[test]
    fn rejects_rather_than_truncates() {
        let mut buf = [0u8; 8];
        let err = write_fixed_str(&mut buf, 0, "cpu_arch", "abcdef", 5).unwrap_err();
        assert!(matches!(
            err,
            Error::FieldTooLong { field: "cpu_arch", len: 6, max: 4 }
        ));
        assert_eq!(buf, [0u8; 8]);
    }

    #[test]
    fn full_width_value_keeps_terminator() {
        let mut buf = [0xffu8; 5];
        write_fixed_str(&mut buf, 0, "cpu_type", "abcd", 5).unwrap();
        assert_eq!(buf[4], 0);
    }

    #[test]
    fn missing_terminator_is_malformed() {
        let buf = *b"abcde";
        assert!(matches!(
            read_fixed_str(&buf, 0, "codename", 5),
            Err(Error::MalformedString { field: "codename" })
        ));
    }

    #[test]
    fn interior_nul_is_malformed() {
        assert!(validate_fixed_str("codename", "a\0b", 5).is_err());
    }

    #[test]
    fn budget() {
        assert!(check_budget(256).is_ok());
        assert!(matches!(
            check_budget(257),
            Err(Error::LayoutOverflow { total: 257, limit: 256 })
        ));
    }
}
