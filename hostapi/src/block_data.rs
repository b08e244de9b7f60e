//! Raw block payload served to the guest.
//!
//! The payload is decoded once when the harness starts and is immutable
//! afterwards. The dispatcher shares it read-only behind an `Arc`.

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{ConfigLoadError, HostError};
use crate::hex;
use crate::memory::range;

/// Owner of the decoded block payload for one harness run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockDataStore {
    payload: Vec<u8>,
}

impl BlockDataStore {
    pub fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }

    /// Decode flat hex text. Whitespace anywhere in the text is ignored.
    pub fn from_hex_text(text: &str) -> Self {
        let stripped = hex::strip_whitespace(text);
        Self::new(hex::decode_lenient(&stripped))
    }

    /// Read and decode a raw block-payload hex file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigLoadError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigLoadError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_hex_text(&text);
        debug!("loaded {} bytes of block data from {}", store.len(), path.display());
        Ok(store)
    }

    /// Payload length as reported to the guest.
    ///
    /// Payloads are bounded by the 32-bit guest address space in practice;
    /// larger ones saturate.
    pub fn size(&self) -> u32 {
        u32::try_from(self.payload.len()).unwrap_or(u32::MAX)
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Copy `payload[src_offset..src_offset+length]` to `dst[out_offset..]`.
    ///
    /// A zero `length` never faults, whatever the offsets.
    pub fn copy(
        &self,
        dst: &mut [u8],
        out_offset: u32,
        src_offset: u32,
        length: u32,
    ) -> Result<(), HostError> {
        if length == 0 {
            return Ok(());
        }
        let src = range(src_offset, length as u64, self.payload.len()).ok_or_else(|| {
            HostError::source_out_of_range(src_offset, length, self.payload.len())
        })?;
        let out = range(out_offset, length as u64, dst.len())
            .ok_or_else(|| HostError::out_of_bounds(out_offset, length as u64, dst.len()))?;
        dst[out].copy_from_slice(&self.payload[src]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_size_after_whitespace_removal() {
        let store = BlockDataStore::from_hex_text("f9 02\n11a0\n  42d5\n");
        assert_eq!(store.size(), 6);
        assert_eq!(store.as_bytes(), &[0xf9, 0x02, 0x11, 0xa0, 0x42, 0xd5]);
    }

    #[test]
    fn test_copy_prefix() {
        let store = BlockDataStore::new(vec![1, 2, 3, 4, 5]);
        let mut mem = vec![0u8; 16];
        store.copy(&mut mem, 8, 0, 3).unwrap();
        assert_eq!(&mem[8..11], &[1, 2, 3]);
        assert!(mem[..8].iter().all(|b| *b == 0));
        assert_eq!(mem[11], 0);
    }

    #[test]
    fn test_copy_honours_src_offset() {
        let store = BlockDataStore::new(vec![1, 2, 3, 4, 5]);
        let mut mem = vec![0u8; 4];
        store.copy(&mut mem, 0, 2, 3).unwrap();
        assert_eq!(&mem[..3], &[3, 4, 5]);
    }

    #[test]
    fn test_zero_length_copy_is_noop() {
        let store = BlockDataStore::new(vec![1, 2, 3]);
        let mut mem = vec![9u8; 4];
        store.copy(&mut mem, 1000, 1000, 0).unwrap();
        assert_eq!(mem, vec![9u8; 4]);
    }

    #[test]
    fn test_copy_source_out_of_range() {
        let store = BlockDataStore::new(vec![1, 2, 3]);
        let mut mem = vec![0u8; 16];
        let err = store.copy(&mut mem, 0, 2, 2).unwrap_err();
        assert!(matches!(err, HostError::SourceOutOfRange { .. }));
        assert!(mem.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_copy_destination_out_of_bounds() {
        let store = BlockDataStore::new(vec![1, 2, 3]);
        let mut mem = vec![0u8; 4];
        let err = store.copy(&mut mem, 2, 0, 3).unwrap_err();
        assert!(matches!(err, HostError::OutOfBounds { .. }));
    }

    #[test]
    fn test_copy_offset_overflow() {
        let store = BlockDataStore::new(vec![1, 2, 3]);
        let mut mem = vec![0u8; 4];
        assert!(store.copy(&mut mem, u32::MAX, 0, 2).is_err());
        assert!(store.copy(&mut mem, 0, u32::MAX, 2).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "aabb").unwrap();
        writeln!(file, "cc").unwrap();
        let store = BlockDataStore::from_file(file.path()).unwrap();
        assert_eq!(store.as_bytes(), &[0xaa, 0xbb, 0xcc]);
    }

    #[test]
    fn test_from_missing_file() {
        let err = BlockDataStore::from_file(Path::new("/nonexistent/block.hex")).unwrap_err();
        assert!(matches!(err, ConfigLoadError::FileNotFound { .. }));
    }
}
