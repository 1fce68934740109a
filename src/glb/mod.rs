//! Binary glTF (.glb) container framing.
//!
//! ## File Structure
//!
//! ```text
//! +----------------------+
//! | Magic: "glTF"        |  4 bytes
//! +----------------------+
//! | Version              |  4 bytes (u32 LE, = 2)
//! +----------------------+
//! | Total length         |  4 bytes (u32 LE)
//! +----------------------+
//! | Chunk length         |  4 bytes (u32 LE)  \
//! | Chunk type ("JSON")  |  4 bytes           |  first chunk
//! | Payload + padding    |  aligned to 4      /
//! +----------------------+
//! | Chunk length         |                    \
//! | Chunk type ("BIN\0") |                    |  optional
//! | Payload + padding    |                    /
//! +----------------------+
//! ```
//!
//! A chunk length counts the payload plus its padding.

mod format;
mod reader;
mod writer;

pub use format::*;
pub use reader::*;
pub use writer::*;
