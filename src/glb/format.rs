//! Binary glTF format constants.

/// Magic bytes at the start of a binary glTF file.
pub const GLB_MAGIC: &[u8; 4] = b"glTF";

/// Current container version.
pub const GLB_VERSION: u32 = 2;

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 12;

/// Size of a chunk header (length + type) in bytes.
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Offset of the version in the header.
pub const VERSION_OFFSET: usize = 4;

/// Offset of the total length in the header.
pub const LENGTH_OFFSET: usize = 8;

/// Chunk type tag of the JSON chunk ("JSON" read as u32 LE).
pub const CHUNK_JSON: u32 = u32::from_le_bytes(*b"JSON");

/// Chunk type tag of the binary buffer chunk ("BIN\0" read as u32 LE).
pub const CHUNK_BIN: u32 = u32::from_le_bytes(*b"BIN\0");

/// Chunk payload alignment.
pub const CHUNK_ALIGNMENT: usize = 4;

/// Padding byte after the JSON payload (keeps the chunk valid JSON).
pub const JSON_PADDING: u8 = b' ';

/// Padding byte after the binary payload.
pub const BIN_PADDING: u8 = 0;

/// Round `len` up to the chunk alignment.
#[inline]
pub const fn aligned_len(len: usize) -> usize {
    (len + CHUNK_ALIGNMENT - 1) & !(CHUNK_ALIGNMENT - 1)
}

/// Check whether a byte slice starts with the binary container magic.
#[inline]
pub fn has_glb_magic(bytes: &[u8]) -> bool {
    bytes.len() >= GLB_MAGIC.len() && &bytes[..GLB_MAGIC.len()] == GLB_MAGIC
}
