//! Node schema and its local transform.

use serde::{Deserialize, Serialize};

use super::Extensible;
use crate::util::{mat4_from_array, mat4_to_array, Mat4, Mat4Array, Quat, Vec3};

/// Local transform of a node.
///
/// A node is either in matrix mode or in TRS mode; the two are never
/// combined. Animated nodes must be in TRS mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transform {
    /// Column-major 4x4 matrix.
    Matrix(Mat4),
    /// Translation, unit quaternion rotation (x, y, z, w) and scale.
    Trs { translation: Vec3, rotation: Quat, scale: Vec3 },
}

impl Transform {
    /// Identity in TRS mode.
    pub const IDENTITY: Self = Self::Trs {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// TRS transform from its parts.
    pub fn trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self::Trs { translation, rotation, scale }
    }

    /// True for matrix mode.
    pub fn is_matrix(&self) -> bool {
        matches!(self, Self::Matrix(_))
    }

    /// Local matrix: the stored matrix, or `T * R * S`.
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Self::Matrix(m) => m,
            Self::Trs { translation, rotation, scale } => {
                Mat4::from_translation(translation) * Mat4::from_quat(rotation) * Mat4::from_scale(scale)
            }
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A node in the hierarchy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode", into = "RawNode")]
pub struct Node {
    pub name: Option<String>,
    pub camera: Option<usize>,
    pub children: Vec<usize>,
    pub skin: Option<usize>,
    pub mesh: Option<usize>,
    pub transform: Transform,
    /// Morph target weights of the instantiated mesh.
    pub weights: Vec<f32>,
    pub ext: Extensible,
}

impl Node {
    /// Named node with identity transform.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Default::default() }
    }
}

/// Node as laid out in JSON, with the transform split across four keys.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    camera: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    skin: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    matrix: Option<Mat4Array>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mesh: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rotation: Option<[f32; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    translation: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    weights: Vec<f32>,
    #[serde(flatten)]
    ext: Extensible,
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        // A matrix takes precedence over any TRS keys.
        let transform = match raw.matrix {
            Some(m) => Transform::Matrix(mat4_from_array(&m)),
            None => Transform::Trs {
                translation: raw.translation.map_or(Vec3::ZERO, Vec3::from_array),
                rotation: raw.rotation.map_or(Quat::IDENTITY, Quat::from_array),
                scale: raw.scale.map_or(Vec3::ONE, Vec3::from_array),
            },
        };
        Self {
            name: raw.name,
            camera: raw.camera,
            children: raw.children,
            skin: raw.skin,
            mesh: raw.mesh,
            transform,
            weights: raw.weights,
            ext: raw.ext,
        }
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        let mut raw = RawNode {
            name: node.name,
            camera: node.camera,
            children: node.children,
            skin: node.skin,
            mesh: node.mesh,
            weights: node.weights,
            ext: node.ext,
            ..Default::default()
        };
        match node.transform {
            Transform::Matrix(m) => raw.matrix = Some(mat4_to_array(&m)),
            Transform::Trs { translation, rotation, scale } => {
                raw.translation = (translation != Vec3::ZERO).then(|| translation.to_array());
                raw.rotation = (rotation != Quat::IDENTITY).then(|| rotation.to_array());
                raw.scale = (scale != Vec3::ONE).then(|| scale.to_array());
            }
        }
        raw
    }
}
