//! Buffer and buffer view schemas.

use serde::{Deserialize, Serialize};

use super::{is_default, Extensible};

gl_enum! {
    /// Binding target hint of a buffer view.
    BufferTarget ("bufferView.target") {
        /// Vertex attributes
        ArrayBuffer = 34962,
        /// Vertex indices
        ElementArrayBuffer = 34963,
    }
}

/// A buffer of raw binary data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// External path or `data:` URI. `None` for the BIN chunk of a binary container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    pub byte_length: usize,
    #[serde(flatten)]
    pub ext: Extensible,
    /// Loaded bytes; empty until resolved.
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Buffer {
    /// Create a buffer that owns `data`.
    pub fn from_data(uri: Option<String>, data: Vec<u8>) -> Self {
        Self {
            name: None,
            uri,
            byte_length: data.len(),
            ext: Extensible::default(),
            data,
        }
    }

    /// True once the declared bytes are present.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.data.len() == self.byte_length
    }
}

/// A contiguous byte range of a buffer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub buffer: usize,
    #[serde(default, skip_serializing_if = "is_default")]
    pub byte_offset: usize,
    pub byte_length: usize,
    /// Distance between element starts; absent means tightly packed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_stride: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<BufferTarget>,
    #[serde(flatten)]
    pub ext: Extensible,
}

impl BufferView {
    /// Create a view over `byte_length` bytes at `byte_offset`.
    pub fn new(buffer: usize, byte_offset: usize, byte_length: usize) -> Self {
        Self { buffer, byte_offset, byte_length, ..Default::default() }
    }

    /// Stride in bytes, 0 when tightly packed.
    #[inline]
    pub fn stride(&self) -> usize {
        self.byte_stride.unwrap_or(0)
    }

    /// One past the last byte of this view inside its buffer, `None` when
    /// offset plus length does not fit a `usize`.
    #[inline]
    pub fn end(&self) -> Option<usize> {
        self.byte_offset.checked_add(self.byte_length)
    }
}
