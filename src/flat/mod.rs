//! Flattened, renderer-facing scene representation.
//!
//! A [`FlatScene`] owns plain arrays of cameras, materials, textures,
//! primitives and mesh instances that refer to each other by index. It
//! holds copies of all numeric data, so it outlives the [`Asset`] it came
//! from.
//!
//! - [`flatten`] - Asset hierarchy to flat scene
//! - [`unflatten`] - Flat scene to a new asset with one buffer
//! - [`SpatialQuery`] - Query interface for acceleration structures
//!
//! [`Asset`]: crate::model::Asset

mod flatten;
mod query;
mod types;
mod unflatten;

pub use flatten::*;
pub use query::*;
pub use types::*;
pub use unflatten::*;
