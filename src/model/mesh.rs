//! Mesh and primitive schemas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{is_default, Extensible};

gl_enum! {
    /// Primitive topology.
    Mode ("primitive.mode") {
        Points = 0,
        Lines = 1,
        LineLoop = 2,
        LineStrip = 3,
        Triangles = 4,
        TriangleStrip = 5,
        TriangleFan = 6,
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::Triangles
    }
}

/// Common attribute semantics.
pub mod semantic {
    pub const POSITION: &str = "POSITION";
    pub const NORMAL: &str = "NORMAL";
    pub const TANGENT: &str = "TANGENT";
    pub const TEXCOORD_0: &str = "TEXCOORD_0";
    pub const COLOR_0: &str = "COLOR_0";
    pub const JOINTS_0: &str = "JOINTS_0";
    pub const WEIGHTS_0: &str = "WEIGHTS_0";
    /// Application-specific per-vertex radius for point and line primitives.
    pub const RADIUS: &str = "RADIUS";
}

/// A set of primitives to be rendered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mesh {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
    /// Default morph target weights.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weights: Vec<f32>,
    #[serde(flatten)]
    pub ext: Extensible,
}

/// Geometry to be rendered with one material.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Primitive {
    /// Attribute semantic to accessor index.
    pub attributes: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<usize>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub mode: Mode,
    /// Morph targets, each mapping semantics to displacement accessors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<BTreeMap<String, usize>>,
    #[serde(flatten)]
    pub ext: Extensible,
}

impl Primitive {
    /// Accessor index for a semantic.
    pub fn attribute(&self, semantic: &str) -> Option<usize> {
        self.attributes.get(semantic).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_json() {
        let json = r#"{"attributes":{"POSITION":0,"NORMAL":1},"indices":2,"mode":1}"#;
        let p: Primitive = serde_json::from_str(json).unwrap();
        assert_eq!(p.attribute(semantic::POSITION), Some(0));
        assert_eq!(p.attribute(semantic::TEXCOORD_0), None);
        assert_eq!(p.mode, Mode::Lines);
        assert_eq!(p.indices, Some(2));
    }

    #[test]
    fn test_default_mode_is_triangles() {
        let p: Primitive = serde_json::from_str(r#"{"attributes":{}}"#).unwrap();
        assert_eq!(p.mode, Mode::Triangles);
        let v = serde_json::to_value(&p).unwrap();
        assert!(v.get("mode").is_none());
    }

    #[test]
    fn test_mesh_requires_primitives() {
        assert!(serde_json::from_str::<Mesh>(r#"{"name":"m"}"#).is_err());
        assert!(serde_json::from_str::<Primitive>(r#"{"attributes":{},"mode":9}"#).is_err());
    }
}
