//! Resolution of buffer and image payloads.
//!
//! A payload comes from one of three places:
//!
//! 1. a `data:<mime>;base64,...` URI, decoded in place
//! 2. a buffer view of an already loaded buffer (images only)
//! 3. a path relative to the document's directory, percent-decoded
//!
//! Binary containers add a fourth: buffer 0 without a URI is bound to the
//! BIN chunk.

mod buffers;
mod images;
mod uri;

pub use buffers::*;
pub use images::*;
pub use uri::*;
