//! Typed views over accessor data.
//!
//! Element `i` of an accessor lives at
//!
//! ```text
//! view.byteOffset + accessor.byteOffset + i * stride
//! ```
//!
//! where `stride` is the view's `byteStride`, or the tightly packed element
//! size when the view has none. Reads are computed per element; nothing is
//! decoded eagerly.
//!
//! - [`AccessorView`] - Elements widened to `f32`, with normalization and sparse overlay
//! - [`IndexView`] - Scalar unsigned integer elements widened to `u32`

mod layout;
mod view;

pub use layout::Element;
pub use view::*;
