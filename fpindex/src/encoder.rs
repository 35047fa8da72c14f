/// Encodes raw hash codes into the compact byte form stored alongside them
/// in per-track views.
///
/// Any lossless, order-preserving encoding works; the index never decodes
/// the result. Implementations must be safe for concurrent use.
pub trait HashEncoder: Send + Sync {
    /// Encodes `hashes` into `byte_len` bytes.
    /// `byte_len` is always a multiple of `hashes.len()`.
    fn encode(&self, hashes: &[u64], byte_len: usize) -> Vec<u8>;
}

/// Default [`HashEncoder`]: fixed-width little-endian concatenation.
///
/// Each code occupies `byte_len / hashes.len()` bytes. Codes wider than that
/// are truncated to their low bytes; widths beyond 8 are zero-padded.
pub struct CompactEncoder;

impl HashEncoder for CompactEncoder {
    fn encode(&self, hashes: &[u64], byte_len: usize) -> Vec<u8> {
        if hashes.is_empty() {
            return Vec::new();
        }
        let width = byte_len / hashes.len();
        let mut out = Vec::with_capacity(byte_len);
        for &code in hashes {
            let le = code.to_le_bytes();
            out.extend_from_slice(&le[..width.min(8)]);
            out.resize(out.len() + width.saturating_sub(8), 0);
        }
        out
    }
}
