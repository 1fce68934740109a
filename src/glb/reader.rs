//! Binary glTF container reader.

use byteorder::{ByteOrder, LittleEndian};

use super::format::*;
use crate::util::{Error, Result};

/// Chunks of a decoded binary container, borrowed from the input bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Container<'a> {
    /// JSON document payload.
    pub json: &'a [u8],
    /// Binary buffer payload, if the container carries one.
    pub bin: Option<&'a [u8]>,
}

/// Header fields of a binary container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub version: u32,
    pub length: u32,
}

/// Parse and validate the 12-byte header.
pub fn read_header(bytes: &[u8]) -> Result<Header> {
    if !has_glb_magic(bytes) {
        return Err(Error::InvalidMagic);
    }
    if bytes.len() < HEADER_SIZE {
        return Err(Error::invalid(format!(
            "binary glTF header truncated: {} of {} bytes",
            bytes.len(),
            HEADER_SIZE
        )));
    }

    let version = LittleEndian::read_u32(&bytes[VERSION_OFFSET..]);
    if version != GLB_VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    let length = LittleEndian::read_u32(&bytes[LENGTH_OFFSET..]);
    if length as usize != bytes.len() {
        return Err(Error::LengthMismatch { declared: length as usize, actual: bytes.len() });
    }

    Ok(Header { version, length })
}

/// Split a binary container into its JSON chunk and optional BIN chunk.
///
/// The JSON chunk must come first and appear once; at most one BIN chunk
/// is accepted. Chunks of other types are skipped.
pub fn decode_container(bytes: &[u8]) -> Result<Container<'_>> {
    read_header(bytes)?;

    let size = bytes.len();
    let mut json = None;
    let mut bin = None;
    let mut pos = HEADER_SIZE;
    let mut index = 0;

    while pos < size {
        if pos + CHUNK_HEADER_SIZE > size {
            return Err(Error::ChunkOutOfBounds { index, offset: pos, length: CHUNK_HEADER_SIZE, size });
        }
        let length = LittleEndian::read_u32(&bytes[pos..]) as usize;
        let kind = LittleEndian::read_u32(&bytes[pos + 4..]);
        let start = pos + CHUNK_HEADER_SIZE;
        let end = start
            .checked_add(length)
            .filter(|&end| end <= size)
            .ok_or(Error::ChunkOutOfBounds { index, offset: pos, length, size })?;
        let payload = &bytes[start..end];

        match kind {
            CHUNK_JSON if index == 0 => json = Some(payload),
            CHUNK_JSON => return Err(Error::invalid("binary glTF contains more than one JSON chunk")),
            _ if index == 0 => return Err(Error::MissingJsonChunk),
            CHUNK_BIN if bin.is_some() => return Err(Error::DuplicateBinChunk),
            CHUNK_BIN => bin = Some(payload),
            other => {
                tracing::debug!(chunk = index, tag = format_args!("{other:#010x}"), "skipping unknown chunk");
            }
        }

        pos = start + aligned_len(length);
        index += 1;
    }

    let json = json.ok_or(Error::MissingJsonChunk)?;
    Ok(Container { json, bin })
}
