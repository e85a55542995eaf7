//! Strategy persistence codec
//!
//! Fixed-layout byte record used to checkpoint strategy rates:
//!
//! ```text
//! offset  0..8   wealth tax rate   (IEEE-754 double, big-endian)
//! offset  8..16  profit tax rate   (IEEE-754 double, big-endian)
//! offset 16..20  unused padding    (zero)
//! ```
//!
//! The 20-byte record length matches existing checkpoints byte for byte. Only
//! the first 16 bytes carry data; decoders accept any record of at least 16.

use thiserror::Error;

/// Length of an encoded strategy record
pub const RECORD_LEN: usize = 20;

/// Bytes of the record that carry data
pub const PAYLOAD_LEN: usize = 16;

/// Errors raised when decoding a strategy record
#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
    #[error("Strategy record truncated: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
}

/// Encode the two rates as a strategy record
pub fn encode_rates(wealth_tax_rate: f64, profit_tax_rate: f64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(RECORD_LEN);
    buf.extend_from_slice(&wealth_tax_rate.to_be_bytes());
    buf.extend_from_slice(&profit_tax_rate.to_be_bytes());
    buf.resize(RECORD_LEN, 0);
    buf
}

/// Decode `(wealth_tax_rate, profit_tax_rate)` from a strategy record
pub fn decode_rates(content: &[u8]) -> Result<(f64, f64), CodecError> {
    if content.len() < PAYLOAD_LEN {
        return Err(CodecError::Truncated {
            expected: PAYLOAD_LEN,
            actual: content.len(),
        });
    }
    Ok((read_f64(content, 0), read_f64(content, 8)))
}

// Caller guarantees offset + 8 <= content.len()
fn read_f64(content: &[u8], offset: usize) -> f64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&content[offset..offset + 8]);
    f64::from_be_bytes(raw)
}
