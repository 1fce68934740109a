//! Skin schema.

use serde::{Deserialize, Serialize};

use super::Extensible;

/// Joints and inverse bind matrices used for vertex skinning.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// MAT4 float accessor with one matrix per joint; identity when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_bind_matrices: Option<usize>,
    /// Common root of the joint hierarchy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skeleton: Option<usize>,
    pub joints: Vec<usize>,
    #[serde(flatten)]
    pub ext: Extensible,
}
