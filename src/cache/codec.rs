//! Compression Codec Module
//!
//! Compresses serialized payloads that exceed the configured size threshold.
//!
//! Two codecs are available:
//! - `Lz4`: block compression via `lz4_flex` (default)
//! - `RunLength`: a lightweight run-length scheme for text with long runs of
//!   repeated characters, such as indented JSON
//!
//! # Run-length format
//! Runs of [`MIN_RUN`] or more identical characters are written as
//! `<count><char>`. Every literal ASCII digit or `\` (including the char after
//! a count) is written as `\<char>` so counts can be told apart from data.

use std::fmt;
use std::str::FromStr;

use crate::error::{GatewayError, Result};

/// Shortest run that gets collapsed into `<count><char>`.
pub const MIN_RUN: usize = 4;

/// Largest payload a decoder will produce; larger claims are treated as
/// corruption.
pub const MAX_DECODED_BYTES: usize = 256 * 1024 * 1024;

const ESCAPE: char = '\\';

// == Compression Codec ==
/// Algorithm used to compress large payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompressionCodec {
    /// LZ4 block format with the uncompressed size prepended.
    #[default]
    Lz4,
    /// Escaped run-length encoding over the serialized text.
    RunLength,
}

impl CompressionCodec {
    // == Compress ==
    /// Compresses serialized text into its stored byte form.
    pub fn compress(&self, text: &str) -> Vec<u8> {
        match self {
            CompressionCodec::Lz4 => lz4_flex::compress_prepend_size(text.as_bytes()),
            CompressionCodec::RunLength => rle_encode(text).into_bytes(),
        }
    }

    // == Decompress ==
    /// Restores serialized text from its stored byte form.
    ///
    /// Returns `GatewayError::Decompression` if the bytes are corrupt.
    pub fn decompress(&self, bytes: &[u8]) -> Result<String> {
        match self {
            CompressionCodec::Lz4 => {
                let claimed = bytes
                    .get(..4)
                    .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize)
                    .ok_or_else(|| GatewayError::Decompression("lz4: truncated header".to_string()))?;
                if claimed > MAX_DECODED_BYTES {
                    return Err(GatewayError::Decompression(format!(
                        "lz4: claimed size {} exceeds limit",
                        claimed
                    )));
                }
                let raw = lz4_flex::decompress_size_prepended(bytes)
                    .map_err(|e| GatewayError::Decompression(format!("lz4: {}", e)))?;
                String::from_utf8(raw)
                    .map_err(|e| GatewayError::Decompression(format!("lz4 output: {}", e)))
            }
            CompressionCodec::RunLength => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| GatewayError::Decompression(format!("rle input: {}", e)))?;
                rle_decode(text)
            }
        }
    }
}

impl fmt::Display for CompressionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionCodec::Lz4 => write!(f, "lz4"),
            CompressionCodec::RunLength => write!(f, "rle"),
        }
    }
}

impl FromStr for CompressionCodec {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lz4" => Ok(CompressionCodec::Lz4),
            "rle" | "run-length" | "runlength" => Ok(CompressionCodec::RunLength),
            other => Err(GatewayError::InvalidRequest(format!(
                "Unknown compression codec: {}",
                other
            ))),
        }
    }
}

// == Run-Length Encoding ==
fn needs_escape(c: char) -> bool {
    c.is_ascii_digit() || c == ESCAPE
}

fn push_literal(out: &mut String, c: char) {
    if needs_escape(c) {
        out.push(ESCAPE);
    }
    out.push(c);
}

/// Encodes `input` with the escaped run-length scheme.
pub fn rle_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        let mut run = 1usize;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }

        if run >= MIN_RUN {
            out.push_str(&run.to_string());
            push_literal(&mut out, c);
        } else {
            for _ in 0..run {
                push_literal(&mut out, c);
            }
        }
    }

    out
}

/// Decodes text produced by [`rle_encode`].
pub fn rle_decode(input: &str) -> Result<String> {
    let mut out = String::with_capacity(input.len() * 2);
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ESCAPE {
            let escaped = chars
                .next()
                .ok_or_else(|| GatewayError::Decompression("dangling escape".to_string()))?;
            if !needs_escape(escaped) {
                return Err(GatewayError::Decompression(format!(
                    "invalid escape sequence: \\{}",
                    escaped
                )));
            }
            out.push(escaped);
        } else if c.is_ascii_digit() {
            let mut digits = String::from(c);
            while let Some(d) = chars.peek().copied().filter(|d| d.is_ascii_digit()) {
                digits.push(d);
                chars.next();
            }
            let count: usize = digits
                .parse()
                .map_err(|_| GatewayError::Decompression(format!("bad run length: {}", digits)))?;
            if count < MIN_RUN || count > MAX_DECODED_BYTES.saturating_sub(out.len()) {
                return Err(GatewayError::Decompression(format!(
                    "run length {} out of range",
                    count
                )));
            }

            let mut repeated = chars
                .next()
                .ok_or_else(|| GatewayError::Decompression("run without character".to_string()))?;
            if repeated == ESCAPE {
                repeated = chars.next().ok_or_else(|| {
                    GatewayError::Decompression("dangling escape after run".to_string())
                })?;
            }
            out.extend(std::iter::repeat(repeated).take(count));
        } else {
            out.push(c);
        }
    }

    Ok(out)
}
