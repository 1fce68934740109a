//! Animation schema.

use serde::{Deserialize, Serialize};

use super::{is_default, Extensible};

/// Node property targeted by a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
    Weights,
}

/// Keyframe interpolation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    #[serde(rename = "CUBICSPLINE")]
    CubicSpline,
}

/// Node and property an animation channel writes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelTarget {
    /// Absent when an extension supplies the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<usize>,
    pub path: TargetPath,
    #[serde(flatten)]
    pub ext: Extensible,
}

/// Connects a sampler to a target property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    /// Index into the animation's own samplers.
    pub sampler: usize,
    pub target: ChannelTarget,
    #[serde(flatten)]
    pub ext: Extensible,
}

/// Keyframe times and values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationSampler {
    /// Accessor of keyframe times.
    pub input: usize,
    #[serde(default, skip_serializing_if = "is_default")]
    pub interpolation: Interpolation,
    /// Accessor of keyframe values.
    pub output: usize,
    #[serde(flatten)]
    pub ext: Extensible,
}

/// Keyframe animation of node properties.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub channels: Vec<Channel>,
    pub samplers: Vec<AnimationSampler>,
    #[serde(flatten)]
    pub ext: Extensible,
}
