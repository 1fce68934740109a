//! Flattened scene entities.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{is_default, Primitive};
use crate::util::{BBox3f, Mat4, Vec3};

/// Default vertical field of view, `2 * atan(0.5)`.
pub const DEFAULT_YFOV: f32 = 0.927_295_2;

/// Camera with its world transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlatCamera {
    pub name: String,
    pub xform: Mat4,
    pub ortho: bool,
    /// Width over height.
    pub aspect: f32,
    /// Vertical field of view in radians, or vertical size when orthographic.
    pub yfov: f32,
    pub near: f32,
    /// `None` for an infinite perspective projection, or an orthographic
    /// one without a far plane (written as `f32::MAX`).
    pub far: Option<f32>,
}

impl Default for FlatCamera {
    fn default() -> Self {
        Self {
            name: String::new(),
            xform: Mat4::IDENTITY,
            ortho: false,
            aspect: 1.0,
            yfov: DEFAULT_YFOV,
            near: 0.01,
            far: None,
        }
    }
}

/// Texture with resolved pixels.
///
/// One of `datab` (8-bit) and `dataf` (float) holds
/// `width * height * ncomp` values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatTexture {
    pub name: String,
    /// Source path, empty for embedded images.
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub ncomp: u32,
    #[serde(skip)]
    pub datab: Vec<u8>,
    #[serde(skip)]
    pub dataf: Vec<f32>,
}

impl FlatTexture {
    /// 1x1 opaque white RGBA.
    pub fn white(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            width: 1,
            height: 1,
            ncomp: 4,
            datab: vec![255; 4],
            dataf: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.datab.is_empty() && self.dataf.is_empty()
    }
}

/// Metallic-roughness material with texture references into
/// [`FlatScene::textures`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlatMaterial {
    pub name: String,
    pub emission: [f32; 3],
    /// Linear RGB plus opacity.
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emission_txt: Option<usize>,
    pub base_color_txt: Option<usize>,
    pub metallic_roughness_txt: Option<usize>,
    pub normal_txt: Option<usize>,
    pub occlusion_txt: Option<usize>,
}

impl Default for FlatMaterial {
    fn default() -> Self {
        Self {
            name: String::new(),
            emission: [0.0; 3],
            base_color: [1.0; 4],
            metallic: 1.0,
            roughness: 1.0,
            emission_txt: None,
            base_color_txt: None,
            metallic_roughness_txt: None,
            normal_txt: None,
            occlusion_txt: None,
        }
    }
}

impl FlatMaterial {
    /// Reflectance at normal incidence of dielectrics.
    const DIELECTRIC_F0: f32 = 0.04;

    /// Diffuse color: base color with the metallic part removed.
    pub fn diffuse(&self) -> [f32; 3] {
        let k = 1.0 - self.metallic;
        [self.base_color[0] * k, self.base_color[1] * k, self.base_color[2] * k]
    }

    /// Specular color: 4% for dielectrics, base color for metals.
    pub fn specular(&self) -> [f32; 3] {
        let m = self.metallic;
        let f0 = Self::DIELECTRIC_F0;
        [
            f0 + (self.base_color[0] - f0) * m,
            f0 + (self.base_color[1] - f0) * m,
            f0 + (self.base_color[2] - f0) * m,
        ]
    }

    #[inline]
    pub fn opacity(&self) -> f32 {
        self.base_color[3]
    }
}

/// Indexed geometry in object space.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatPrimitive {
    /// Name of the enclosing mesh.
    pub name: String,
    /// Index into [`FlatScene::materials`].
    pub material: Option<usize>,
    pub pos: Vec<[f32; 3]>,
    pub norm: Vec<[f32; 3]>,
    pub texcoord: Vec<[f32; 2]>,
    /// RGBA; alpha is 1 for RGB sources.
    pub color: Vec<[f32; 4]>,
    pub radius: Vec<f32>,
    pub points: Vec<u32>,
    pub lines: Vec<[u32; 2]>,
    pub triangles: Vec<[u32; 3]>,
}

impl FlatPrimitive {
    /// Object-space bounds of the vertex positions.
    pub fn bounds(&self) -> BBox3f {
        BBox3f::from_points(self.pos.iter().map(|&p| Vec3::from_array(p)))
    }

    /// Total number of point, line and triangle elements.
    pub fn num_elements(&self) -> usize {
        self.points.len() + self.lines.len() + self.triangles.len()
    }
}

/// Key under a primitive's `extras` linking it back to its flat primitive.
pub(crate) const PART_KEY: &str = "flatPrimitive";

/// Marks one glTF primitive as part `part` of `parts` written for flat
/// primitive `index`. Parts share their vertex attributes and differ only
/// in mode and indices. `empty` marks a primitive that carries vertices
/// but no elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PrimitivePart {
    pub index: usize,
    pub part: usize,
    pub parts: usize,
    #[serde(default, skip_serializing_if = "is_default")]
    pub empty: bool,
}

impl PrimitivePart {
    pub fn read(p: &Primitive) -> Option<Self> {
        let v = p.ext.extras.as_ref()?.get(PART_KEY)?;
        serde_json::from_value(v.clone()).ok()
    }

    pub fn write(self, p: &mut Primitive) {
        let mut extras = serde_json::Map::new();
        if let Ok(v) = serde_json::to_value(self) {
            extras.insert(PART_KEY.to_string(), v);
        }
        p.ext.extras = Some(Value::Object(extras));
    }
}

/// Placement of shared primitives in the world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlatMesh {
    pub name: String,
    pub xform: Mat4,
    /// Indices into [`FlatScene::primitives`].
    pub primitives: Vec<usize>,
}

impl Default for FlatMesh {
    fn default() -> Self {
        Self { name: String::new(), xform: Mat4::IDENTITY, primitives: Vec::new() }
    }
}

/// Renderer-facing scene: flat arrays cross-referenced by index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatScene {
    pub name: String,
    pub cameras: Vec<FlatCamera>,
    pub materials: Vec<FlatMaterial>,
    pub textures: Vec<FlatTexture>,
    pub primitives: Vec<FlatPrimitive>,
    pub meshes: Vec<FlatMesh>,
}

impl FlatScene {
    /// World-space bounds of every mesh instance.
    pub fn bounds(&self) -> BBox3f {
        let mut b = BBox3f::EMPTY;
        for mesh in &self.meshes {
            for &p in &mesh.primitives {
                if let Some(prim) = self.primitives.get(p) {
                    let pb = prim.bounds();
                    if !pb.is_empty() {
                        b.expand_by_box(&pb.transformed(&mesh.xform));
                    }
                }
            }
        }
        b
    }

    /// Number of triangles drawn, counting every mesh instance.
    pub fn num_triangles(&self) -> usize {
        self.meshes
            .iter()
            .flat_map(|m| m.primitives.iter())
            .filter_map(|&p| self.primitives.get(p))
            .map(|p| p.triangles.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_yfov() {
        assert!((DEFAULT_YFOV - 2.0 * 0.5f32.atan()).abs() < 1e-6);
    }

    #[test]
    fn test_material_helpers() {
        let m = FlatMaterial { base_color: [1.0, 0.5, 0.0, 0.25], metallic: 0.0, ..Default::default() };
        assert_eq!(m.diffuse(), [1.0, 0.5, 0.0]);
        assert_eq!(m.specular(), [0.04; 3]);
        assert_eq!(m.opacity(), 0.25);

        let metal = FlatMaterial { base_color: [0.9, 0.6, 0.2, 1.0], metallic: 1.0, ..Default::default() };
        assert_eq!(metal.diffuse(), [0.0; 3]);
        assert_eq!(metal.specular(), [0.9, 0.6, 0.2]);
    }

    #[test]
    fn test_scene_bounds() {
        let prim = FlatPrimitive {
            pos: vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]],
            triangles: vec![[0, 1, 0]],
            ..Default::default()
        };
        assert_eq!(prim.bounds().max, Vec3::ONE);

        let scene = FlatScene {
            primitives: vec![prim],
            meshes: vec![
                FlatMesh { primitives: vec![0], ..Default::default() },
                FlatMesh {
                    xform: Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)),
                    primitives: vec![0],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let b = scene.bounds();
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::new(6.0, 1.0, 1.0));
        assert_eq!(scene.num_triangles(), 2);
    }

    #[test]
    fn test_white_texture() {
        let t = FlatTexture::white("t", "");
        assert!(!t.is_empty());
        assert_eq!(t.datab.len(), (t.width * t.height * t.ncomp) as usize);
    }
}
