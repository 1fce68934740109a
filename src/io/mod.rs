//! File-level load and save.
//!
//! # Example
//!
//! ```ignore
//! use gltf_io::prelude::*;
//!
//! let asset = load("scene.gltf", &LoadOptions::default())?;
//! let flat = flatten(&asset, None)?;
//! let rebuilt = unflatten(&flat, "scene_flat")?;
//! save("scene_flat.glb", &rebuilt, &SaveOptions::default())?;
//! ```

mod options;
mod reader;
mod writer;

pub use options::*;
pub use reader::*;
pub use writer::*;
