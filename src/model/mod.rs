//! glTF 2.0 object model.
//!
//! Mirrors the JSON document: every top-level array of the root object
//! becomes a `Vec` on [`Asset`], and cross references are plain indices
//! into those arrays. Loaded binary payloads live next to the JSON fields
//! (`Buffer::data`, `Image::data`) and are skipped by serde.
//!
//! - [`Asset`] - Root object and index validation
//! - [`Accessor`] / [`BufferView`] / [`Buffer`] - Binary data layout
//! - [`Node`] / [`Transform`] / [`Scene`] - Hierarchy
//! - [`Mesh`] / [`Primitive`] - Geometry
//! - [`Material`] / [`Texture`] / [`Image`] / [`Sampler`] - Appearance
//! - [`Camera`], [`Animation`], [`Skin`]

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declare a GL enumeration stored as an integer in JSON.
macro_rules! gl_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($field:literal) {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "u32", into = "u32")]
        #[repr(u32)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value),+
        }

        impl TryFrom<u32> for $name {
            type Error = crate::util::Error;

            fn try_from(v: u32) -> Result<Self, Self::Error> {
                match v {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(crate::util::Error::schema(format!("invalid {} value {}", $field, v))),
                }
            }
        }

        impl From<$name> for u32 {
            fn from(v: $name) -> Self {
                v as u32
            }
        }
    };
}

mod accessor;
mod animation;
mod buffer;
mod camera;
mod material;
mod mesh;
mod node;
mod root;
mod scene;
mod skin;
mod texture;

pub use accessor::*;
pub use animation::*;
pub use buffer::*;
pub use camera::*;
pub use material::*;
pub use mesh::*;
pub use node::*;
pub use root::*;
pub use scene::*;
pub use skin::*;
pub use texture::*;

/// Extension bag carried by every glTF object.
///
/// `extensions` and `extras` are the schema's own escape hatches; any other
/// key the model does not know is kept in `unknown` and written back on save.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Extensible {
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Value>,
    #[serde(flatten)]
    pub unknown: Map<String, Value>,
}

impl Extensible {
    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty() && self.extras.is_none() && self.unknown.is_empty()
    }
}

pub(crate) fn is_default<T: Default + PartialEq>(v: &T) -> bool {
    *v == T::default()
}

pub(crate) fn one() -> f32 {
    1.0
}

pub(crate) fn is_one(v: &f32) -> bool {
    *v == 1.0
}
