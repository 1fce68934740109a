//! Material schema (metallic-roughness model).

use serde::{Deserialize, Serialize};

use super::{is_default, is_one, one, Extensible};

/// How the alpha channel of the base color is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

/// Reference to a texture and the texcoord set it samples with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureInfo {
    pub index: usize,
    #[serde(default, skip_serializing_if = "is_default")]
    pub tex_coord: usize,
    #[serde(flatten)]
    pub ext: Extensible,
}

impl TextureInfo {
    pub fn new(index: usize) -> Self {
        Self { index, ..Default::default() }
    }
}

/// Normal map reference with its strength.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalTextureInfo {
    pub index: usize,
    #[serde(default, skip_serializing_if = "is_default")]
    pub tex_coord: usize,
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub scale: f32,
    #[serde(flatten)]
    pub ext: Extensible,
}

impl NormalTextureInfo {
    pub fn new(index: usize) -> Self {
        Self { index, tex_coord: 0, scale: 1.0, ext: Extensible::default() }
    }
}

/// Occlusion map reference with its strength.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcclusionTextureInfo {
    pub index: usize,
    #[serde(default, skip_serializing_if = "is_default")]
    pub tex_coord: usize,
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub strength: f32,
    #[serde(flatten)]
    pub ext: Extensible,
}

impl OcclusionTextureInfo {
    pub fn new(index: usize) -> Self {
        Self { index, tex_coord: 0, strength: 1.0, ext: Extensible::default() }
    }
}

fn white() -> [f32; 4] {
    [1.0; 4]
}

fn is_white(v: &[f32; 4]) -> bool {
    *v == [1.0; 4]
}

/// Metallic-roughness parameter block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMetallicRoughness {
    #[serde(default = "white", skip_serializing_if = "is_white")]
    pub base_color_factor: [f32; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_color_texture: Option<TextureInfo>,
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub metallic_factor: f32,
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub roughness_factor: f32,
    /// Blue channel is metalness, green channel is roughness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metallic_roughness_texture: Option<TextureInfo>,
    #[serde(flatten)]
    pub ext: Extensible,
}

impl Default for PbrMetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: white(),
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
            ext: Extensible::default(),
        }
    }
}

/// Material appearance of a primitive.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_texture: Option<NormalTextureInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occlusion_texture: Option<OcclusionTextureInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emissive_texture: Option<TextureInfo>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub emissive_factor: [f32; 3],
    #[serde(default, skip_serializing_if = "is_default")]
    pub alpha_mode: AlphaMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_cutoff: Option<f32>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub double_sided: bool,
    #[serde(flatten)]
    pub ext: Extensible,
}

impl Material {
    /// Parameter block, or the schema defaults when absent.
    pub fn pbr(&self) -> PbrMetallicRoughness {
        self.pbr_metallic_roughness.clone().unwrap_or_default()
    }

    /// Every texture index this material references.
    pub fn texture_indices(&self) -> impl Iterator<Item = usize> + '_ {
        let pbr = self.pbr_metallic_roughness.as_ref();
        [
            pbr.and_then(|p| p.base_color_texture.as_ref()).map(|t| t.index),
            pbr.and_then(|p| p.metallic_roughness_texture.as_ref()).map(|t| t.index),
            self.normal_texture.as_ref().map(|t| t.index),
            self.occlusion_texture.as_ref().map(|t| t.index),
            self.emissive_texture.as_ref().map(|t| t.index),
        ]
        .into_iter()
        .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_defaults() {
        let m: Material = serde_json::from_str(r#"{"pbrMetallicRoughness":{}}"#).unwrap();
        let pbr = m.pbr();
        assert_eq!(pbr.base_color_factor, [1.0; 4]);
        assert_eq!(pbr.metallic_factor, 1.0);
        assert_eq!(pbr.roughness_factor, 1.0);
        assert_eq!(m.emissive_factor, [0.0; 3]);
        assert_eq!(m.alpha_mode, AlphaMode::Opaque);
    }

    #[test]
    fn test_material_json() {
        let json = r#"{
            "name": "red",
            "pbrMetallicRoughness": {
                "baseColorFactor": [1, 0, 0, 1],
                "baseColorTexture": {"index": 2},
                "metallicFactor": 0,
                "roughnessFactor": 0.5
            },
            "normalTexture": {"index": 1, "scale": 0.5},
            "emissiveFactor": [0.1, 0.2, 0.3],
            "alphaMode": "MASK",
            "alphaCutoff": 0.25
        }"#;
        let m: Material = serde_json::from_str(json).unwrap();
        let pbr = m.pbr();
        assert_eq!(pbr.base_color_factor, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(pbr.metallic_factor, 0.0);
        assert_eq!(pbr.roughness_factor, 0.5);
        assert_eq!(m.normal_texture.as_ref().unwrap().scale, 0.5);
        assert_eq!(m.alpha_mode, AlphaMode::Mask);
        assert_eq!(m.texture_indices().collect::<Vec<_>>(), vec![2, 1]);

        let back: Material = serde_json::from_str(&serde_json::to_string(&m).unwrap()).unwrap();
        assert_eq!(back, m);
    }
}
