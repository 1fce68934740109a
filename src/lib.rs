//! # glTF I/O
//!
//! Reader, writer and flattened scene model for glTF 2.0 (`.gltf` text and
//! `.glb` binary container).
//!
//! ## Modules
//!
//! - [`util`] - Basic types (component and element types, errors, bounds)
//! - [`glb`] - Low-level binary container codec
//! - [`model`] - Typed glTF object model
//! - [`accessor`] - Typed reads of accessor elements, including sparse data
//! - [`resource`] - Buffer and image resolution (data URIs, files)
//! - [`transform`] - Local and world transforms, scene graph walks
//! - [`flat`] - Flattened scene, conversion both ways, spatial queries
//! - [`io`] - File-level load and save
//!
//! ## Example
//!
//! ```ignore
//! use gltf_io::prelude::*;
//!
//! let asset = load("scene.glb", &LoadOptions::default())?;
//! let flat = flatten(&asset, None)?;
//! for inst in &flat.meshes {
//!     println!("{} primitives at {:?}", inst.primitives.len(), inst.xform);
//! }
//! ```

pub mod util;
pub mod glb;
pub mod model;
pub mod accessor;
pub mod resource;
pub mod transform;
pub mod flat;
pub mod io;

pub use util::{Error, ErrorKind, Result};
pub use model::Asset;
pub use io::{load, load_from_slice, save, LoadOptions, SaveOptions};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{AccessorType, ComponentType, Error, ErrorKind, Result};
    pub use crate::model::Asset;
    pub use crate::accessor::{AccessorView, IndexView};
    pub use crate::io::{load, load_from_slice, save, LoadOptions, SaveOptions};
    pub use crate::flat::{
        flatten, unflatten, BruteForce, FlatCamera, FlatMaterial, FlatMesh, FlatPrimitive,
        FlatScene, FlatTexture, Ray, SpatialQuery,
    };
    pub use crate::transform::{local_matrix, world_matrices};
}
