//! Bounds-checked read/write helpers over guest linear memory slices.
//!
//! Guest pointers are 32-bit unsigned offsets. Every access validates
//! `[offset, offset+len)` against the slice length before touching it and
//! reports `HostError::OutOfBounds` instead of panicking.

use std::ops::Range;

use crate::error::HostError;

/// Resolve `[offset, offset+len)` to an index range within `size` bytes.
pub fn range(offset: u32, len: u64, size: usize) -> Option<Range<usize>> {
    let start = offset as u64;
    let end = start.checked_add(len)?;
    if end > size as u64 {
        return None;
    }
    Some(start as usize..end as usize)
}

/// Borrow `len` bytes of `mem` starting at `offset`.
pub fn read_bytes(mem: &[u8], offset: u32, len: usize) -> Result<&[u8], HostError> {
    let r = range(offset, len as u64, mem.len())
        .ok_or_else(|| HostError::out_of_bounds(offset, len as u64, mem.len()))?;
    Ok(&mem[r])
}

/// Write `data` into `mem` starting at `offset`.
pub fn write_bytes(mem: &mut [u8], offset: u32, data: &[u8]) -> Result<(), HostError> {
    let r = range(offset, data.len() as u64, mem.len())
        .ok_or_else(|| HostError::out_of_bounds(offset, data.len() as u64, mem.len()))?;
    mem[r].copy_from_slice(data);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range() {
        assert_eq!(range(0, 100, 100), Some(0..100));
        assert_eq!(range(0, 101, 100), None);
        assert_eq!(range(100, 0, 100), Some(100..100));
        assert_eq!(range(u32::MAX, u64::MAX, usize::MAX), None);
    }

    #[test]
    fn test_read_bytes_basic() {
        let mem = vec![10, 20, 30, 40, 50];
        assert_eq!(read_bytes(&mem, 1, 3).unwrap(), &[20, 30, 40]);
    }

    #[test]
    fn test_read_bytes_out_of_bounds() {
        let mem = vec![10, 20, 30];
        assert!(read_bytes(&mem, 1, 3).is_err());
        assert!(read_bytes(&mem, u32::MAX, 1).is_err());
    }

    #[test]
    fn test_write_bytes_basic() {
        let mut mem = vec![0; 8];
        write_bytes(&mut mem, 2, &[0xAA, 0xBB]).unwrap();
        assert_eq!(mem[2], 0xAA);
        assert_eq!(mem[3], 0xBB);
    }

    #[test]
    fn test_write_bytes_out_of_bounds() {
        let mut mem = vec![0; 4];
        let err = write_bytes(&mut mem, 2, &[1, 2, 3]).unwrap_err();
        assert_eq!(err, HostError::out_of_bounds(2, 3, 4));
        assert_eq!(mem, vec![0; 4]);
    }
}
