//! Utility types and functions.
//!
//! This module contains fundamental types used throughout the library:
//! - [`ComponentType`] - Scalar storage types of accessor data
//! - [`AccessorType`] / [`DataType`] - Tensor shape and full element type
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam

mod component;
mod data_type;
mod error;
mod math;

pub use component::*;
pub use data_type::*;
pub use error::*;
pub use math::*;
