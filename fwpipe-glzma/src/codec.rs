/*!
 * LZMA framing compatible with EDK2's LzmaCompress
 *
 * An encoded file is a 13-byte header followed by a raw LZMA1 stream:
 *
 * | offset | size | field                                  |
 * |--------|------|----------------------------------------|
 * | 0      | 1    | properties byte `(pb * 5 + lp) * 9 + lc` |
 * | 1      | 4    | dictionary size, little endian         |
 * | 5      | 8    | uncompressed size, little endian       |
 *
 * With the x86 filter the BCJ transform runs in front of LZMA1 in the same
 * filter chain. The header does not record it, so the decoder must be told.
 */

use std::io::{Read, Write};

use thiserror::Error;
use tracing::debug;
use xz2::read::XzDecoder;
use xz2::stream::{Filters, LzmaOptions, Stream};
use xz2::write::XzEncoder;

pub const HEADER_LEN: usize = 13;

const DICT_SIZE: u32 = 1 << 24;
const PRESET: u32 = 6;
const UNKNOWN_SIZE: u64 = u64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encode,
    Decode,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Encode => "encode",
            Mode::Decode => "decode",
        }
    }
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("input is {len} bytes, shorter than the 13-byte LZMA header")]
    TruncatedHeader { len: usize },

    #[error("invalid LZMA properties byte 0x{0:02x}")]
    InvalidProperties(u8),

    #[error("stream ended after {produced} bytes, header declares {expected}")]
    ShortOutput { expected: u64, produced: usize },

    #[error("liblzma rejected the stream settings")]
    Lzma(#[from] xz2::stream::Error),

    #[error("LZMA stream error")]
    Io(#[from] std::io::Error),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Literal context, literal position and position bits plus dictionary size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Properties {
    lc: u32,
    lp: u32,
    pb: u32,
    dict_size: u32,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            lc: 3,
            lp: 0,
            pb: 2,
            dict_size: DICT_SIZE,
        }
    }
}

impl Properties {
    fn from_byte(byte: u8, dict_size: u32) -> CodecResult<Self> {
        if byte >= 9 * 5 * 5 {
            return Err(CodecError::InvalidProperties(byte));
        }
        let mut v = u32::from(byte);
        let lc = v % 9;
        v /= 9;
        Ok(Self {
            lc,
            lp: v % 5,
            pb: v / 5,
            dict_size,
        })
    }

    fn to_byte(self) -> u8 {
        ((self.pb * 5 + self.lp) * 9 + self.lc) as u8
    }

    fn options(&self) -> CodecResult<LzmaOptions> {
        let mut options = LzmaOptions::new_preset(PRESET)?;
        options
            .dict_size(self.dict_size)
            .literal_context_bits(self.lc)
            .literal_position_bits(self.lp)
            .position_bits(self.pb);
        Ok(options)
    }
}

fn raw_stream(props: &Properties, x86: bool, mode: Mode) -> CodecResult<Stream> {
    // the options must outlive the filter chain until the stream copies them
    let options = props.options()?;
    let mut filters = Filters::new();
    if x86 {
        filters.x86();
    }
    filters.lzma1(&options);
    let stream = match mode {
        Mode::Encode => Stream::new_raw_encoder(&filters)?,
        Mode::Decode => Stream::new_raw_decoder(&filters)?,
    };
    Ok(stream)
}

pub fn run(mode: Mode, input: &[u8], x86: bool) -> CodecResult<Vec<u8>> {
    match mode {
        Mode::Encode => encode(input, x86),
        Mode::Decode => decode(input, x86),
    }
}

pub fn encode(input: &[u8], x86: bool) -> CodecResult<Vec<u8>> {
    let props = Properties::default();

    let mut header = Vec::with_capacity(HEADER_LEN + input.len() / 2);
    header.push(props.to_byte());
    header.extend_from_slice(&props.dict_size.to_le_bytes());
    header.extend_from_slice(&(input.len() as u64).to_le_bytes());

    let mut encoder = XzEncoder::new_stream(header, raw_stream(&props, x86, Mode::Encode)?);
    encoder.write_all(input)?;
    let out = encoder.finish()?;
    debug!(
        "encoded {} bytes into {} (x86 filter: {})",
        input.len(),
        out.len(),
        x86
    );
    Ok(out)
}

pub fn decode(input: &[u8], x86: bool) -> CodecResult<Vec<u8>> {
    if input.len() < HEADER_LEN {
        return Err(CodecError::TruncatedHeader { len: input.len() });
    }
    let (header, body) = input.split_at(HEADER_LEN);

    let mut dict_size = [0u8; 4];
    dict_size.copy_from_slice(&header[1..5]);
    let mut size = [0u8; 8];
    size.copy_from_slice(&header[5..HEADER_LEN]);
    let props = Properties::from_byte(header[0], u32::from_le_bytes(dict_size))?;
    let expected = u64::from_le_bytes(size);

    let mut decoder = XzDecoder::new_stream(body, raw_stream(&props, x86, Mode::Decode)?);
    let mut out = Vec::new();
    if expected == UNKNOWN_SIZE {
        decoder.read_to_end(&mut out)?;
    } else {
        // Streams written with a known size may omit the end marker.
        decoder.by_ref().take(expected).read_to_end(&mut out)?;
        if (out.len() as u64) < expected {
            return Err(CodecError::ShortOutput {
                expected,
                produced: out.len(),
            });
        }
    }
    debug!(
        "decoded {} bytes into {} (x86 filter: {})",
        input.len(),
        out.len(),
        x86
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Something resembling x86 code: relative calls between filler bytes.
    fn x86_like(len: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(len);
        let mut i: u32 = 0;
        while data.len() < len {
            data.extend_from_slice(&[0x55, 0x48, 0x89, 0xe5]);
            data.push(0xe8);
            data.extend_from_slice(&(0x100 + i * 16).to_le_bytes()[..3]);
            data.push(0x00);
            data.extend_from_slice(&[0x5d, 0xc3, 0x90]);
            i += 1;
        }
        data.truncate(len);
        data
    }

    #[test]
    fn test_header_layout() {
        let input = b"hello hello hello hello".to_vec();
        let encoded = encode(&input, false).unwrap();

        assert_eq!(encoded[0], 0x5d);
        assert_eq!(&encoded[1..5], &DICT_SIZE.to_le_bytes());
        assert_eq!(&encoded[5..13], &(input.len() as u64).to_le_bytes());
    }

    #[test]
    fn test_roundtrip_plain() {
        let input = x86_like(64 * 1024);
        let encoded = encode(&input, false).unwrap();
        assert!(encoded.len() < input.len());
        assert_eq!(decode(&encoded, false).unwrap(), input);
    }

    #[test]
    fn test_roundtrip_x86() {
        let input = x86_like(64 * 1024);
        let encoded = encode(&input, true).unwrap();
        assert_eq!(decode(&encoded, true).unwrap(), input);
    }

    #[test]
    fn test_x86_filter_changes_stream() {
        let input = x86_like(4096);
        let filtered = encode(&input, true).unwrap();
        assert_ne!(filtered, encode(&input, false).unwrap());

        // without the filter on decode the branch targets stay converted
        let mismatched = decode(&filtered, false).unwrap();
        assert_eq!(mismatched.len(), input.len());
        assert_ne!(mismatched, input);
    }

    #[test]
    fn test_empty_input() {
        let encoded = encode(&[], false).unwrap();
        assert_eq!(&encoded[5..13], &0u64.to_le_bytes());
        assert!(decode(&encoded, false).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_header() {
        let err = decode(&[0x5d, 0, 0], false).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedHeader { len: 3 }));
    }

    #[test]
    fn test_invalid_properties() {
        let mut encoded = encode(b"abc", false).unwrap();
        encoded[0] = 225;
        assert!(matches!(
            decode(&encoded, false).unwrap_err(),
            CodecError::InvalidProperties(225)
        ));
    }

    #[test]
    fn test_truncated_body_fails() {
        let input = x86_like(32 * 1024);
        let encoded = encode(&input, false).unwrap();
        let cut = &encoded[..HEADER_LEN + (encoded.len() - HEADER_LEN) / 2];
        assert!(decode(cut, false).is_err());
    }

    #[test]
    fn test_properties_byte() {
        let props = Properties::from_byte(0x5d, DICT_SIZE).unwrap();
        assert_eq!(props, Properties::default());
        assert_eq!(props.to_byte(), 0x5d);
    }
}
