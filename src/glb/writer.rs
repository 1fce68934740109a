//! Binary glTF container writer.

use byteorder::{LittleEndian, WriteBytesExt};

use super::format::*;
use crate::util::{Error, Result};

fn chunk_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::invalid(format!("chunk of {len} bytes exceeds 4 GiB")))
}

/// Write one chunk. The length field counts the padding.
fn push_chunk(out: &mut Vec<u8>, kind: u32, payload: &[u8], pad: u8) -> Result<()> {
    let padded = aligned_len(payload.len());
    out.write_u32::<LittleEndian>(chunk_len(padded)?)?;
    out.write_u32::<LittleEndian>(kind)?;
    out.extend_from_slice(payload);
    out.resize(out.len() + padded - payload.len(), pad);
    Ok(())
}

/// Total encoded size of a container with the given payloads.
pub fn encoded_len(json_len: usize, bin_len: Option<usize>) -> usize {
    HEADER_SIZE
        + CHUNK_HEADER_SIZE
        + aligned_len(json_len)
        + bin_len.map_or(0, |n| CHUNK_HEADER_SIZE + aligned_len(n))
}

/// Frame a JSON payload and optional binary payload as a binary container.
///
/// Payloads are padded to a 4-byte boundary with spaces after JSON and zeros
/// after BIN. Each chunk length includes its padding, so chunk headers sit
/// exactly where the length fields point.
pub fn encode_container(json: &[u8], bin: Option<&[u8]>) -> Result<Vec<u8>> {
    let total = encoded_len(json.len(), bin.map(<[u8]>::len));
    let total32 = u32::try_from(total)
        .map_err(|_| Error::invalid(format!("binary glTF of {total} bytes exceeds 4 GiB")))?;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(GLB_MAGIC);
    out.write_u32::<LittleEndian>(GLB_VERSION)?;
    out.write_u32::<LittleEndian>(total32)?;

    push_chunk(&mut out, CHUNK_JSON, json, JSON_PADDING)?;
    if let Some(bin) = bin {
        push_chunk(&mut out, CHUNK_BIN, bin, BIN_PADDING)?;
    }

    debug_assert_eq!(out.len(), total);
    Ok(out)
}
