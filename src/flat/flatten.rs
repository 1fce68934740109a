//! Hierarchy to flat scene conversion.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::types::*;
use crate::accessor::{AccessorView, IndexView};
use crate::model::{semantic, Asset, CameraType, Mode, Primitive};
use crate::transform::walk;
use crate::util::{Error, Mat4, Result};

/// Flatten one scene of `asset`.
///
/// `scene` selects the scene; `None` uses the document's default scene, or
/// the first scene when none is declared. A document without scenes is
/// flattened from its parentless nodes.
///
/// World transforms are kept on the [`FlatMesh`] and [`FlatCamera`]
/// entries; vertex positions stay in object space. Materials, textures and
/// the primitives of a mesh are emitted once, however many nodes use them.
#[tracing::instrument(skip_all, fields(scene = ?scene))]
pub fn flatten(asset: &Asset, scene: Option<usize>) -> Result<FlatScene> {
    let selected = scene.or(asset.scene).or_else(|| (!asset.scenes.is_empty()).then_some(0));
    let (name, roots) = match selected {
        Some(i) => {
            let s = asset.scene(i)?;
            (s.name.clone().unwrap_or_default(), s.nodes.clone())
        }
        None => (String::new(), asset.root_nodes()),
    };

    let mut ctx = Flattener {
        asset,
        out: FlatScene { name, ..Default::default() },
        materials: HashMap::new(),
        textures: HashMap::new(),
        meshes: HashMap::new(),
    };

    walk(asset, &roots, |v| {
        let node = &asset.nodes[v.node];
        if let Some(c) = node.camera {
            ctx.camera(c, node.name.as_deref(), v.world)?;
        }
        if let Some(m) = node.mesh {
            ctx.mesh(m, node.name.as_deref(), v.world)?;
        }
        Ok(())
    })?;

    let out = ctx.out;
    debug!(
        cameras = out.cameras.len(),
        materials = out.materials.len(),
        textures = out.textures.len(),
        primitives = out.primitives.len(),
        meshes = out.meshes.len(),
        "flattened scene"
    );
    Ok(out)
}

/// Conversion state: output arrays plus source-index to flat-index maps.
struct Flattener<'a> {
    asset: &'a Asset,
    out: FlatScene,
    materials: HashMap<usize, usize>,
    textures: HashMap<usize, usize>,
    meshes: HashMap<usize, Vec<usize>>,
}

impl Flattener<'_> {
    fn camera(&mut self, index: usize, node_name: Option<&str>, world: Mat4) -> Result<()> {
        let cam = self.asset.camera(index)?;
        let mut fc = FlatCamera {
            name: cam.name.as_deref().or(node_name).unwrap_or_default().to_string(),
            xform: world,
            ..Default::default()
        };
        match cam.camera_type {
            CameraType::Perspective => {
                let p = cam
                    .perspective
                    .as_ref()
                    .ok_or_else(|| Error::schema(format!("camera {index} lacks perspective parameters")))?;
                fc.yfov = p.yfov;
                fc.aspect = p.aspect_ratio.unwrap_or(1.0);
                fc.near = p.znear;
                fc.far = p.zfar;
            }
            CameraType::Orthographic => {
                let o = cam
                    .orthographic
                    .as_ref()
                    .ok_or_else(|| Error::schema(format!("camera {index} lacks orthographic parameters")))?;
                fc.ortho = true;
                fc.yfov = o.ymag;
                fc.aspect = if o.ymag != 0.0 { o.xmag / o.ymag } else { 1.0 };
                fc.near = o.znear;
                fc.far = (o.zfar != f32::MAX).then_some(o.zfar);
            }
        }
        self.out.cameras.push(fc);
        Ok(())
    }

    fn mesh(&mut self, index: usize, node_name: Option<&str>, world: Mat4) -> Result<()> {
        let asset = self.asset;
        let mesh = asset.mesh(index)?;
        let primitives = match self.meshes.get(&index) {
            Some(prims) => prims.clone(),
            None => {
                let mesh_name = mesh.name.clone().unwrap_or_default();
                let mut prims = Vec::with_capacity(mesh.primitives.len());
                for group in part_groups(&mesh.primitives) {
                    let fp = self.primitive(group, &mesh_name)?;
                    prims.push(self.out.primitives.len());
                    self.out.primitives.push(fp);
                }
                self.meshes.insert(index, prims.clone());
                prims
            }
        };
        self.out.meshes.push(FlatMesh {
            name: node_name.or(mesh.name.as_deref()).unwrap_or_default().to_string(),
            xform: world,
            primitives,
        });
        Ok(())
    }

    /// Build one flat primitive from a group of glTF primitives sharing
    /// their vertex attributes. The vertices come from the first; every
    /// member contributes its elements.
    fn primitive(&mut self, group: &[Primitive], name: &str) -> Result<FlatPrimitive> {
        let asset = self.asset;
        let p = &group[0];
        let mut fp = FlatPrimitive { name: name.to_string(), ..Default::default() };

        if let Some(m) = p.material {
            fp.material = Some(self.material(m)?);
        }
        if let Some(v) = attribute(asset, p, semantic::POSITION)? {
            fp.pos = v.to_arrays::<3>(0.0);
        }
        if let Some(v) = attribute(asset, p, semantic::NORMAL)? {
            fp.norm = v.to_arrays::<3>(0.0);
        }
        if let Some(v) = attribute(asset, p, semantic::TEXCOORD_0)? {
            fp.texcoord = v.to_arrays::<2>(0.0);
        }
        if let Some(v) = attribute(asset, p, semantic::COLOR_0)? {
            fp.color = v.to_arrays::<4>(1.0);
        }
        if let Some(v) = attribute(asset, p, semantic::RADIUS)? {
            fp.radius = v.to_scalars();
        }

        if PrimitivePart::read(p).is_some_and(|t| t.empty) {
            return Ok(fp);
        }
        for member in group {
            let indices = match member.indices {
                Some(i) => match IndexView::new(asset, i) {
                    Ok(v) => v.to_vec(),
                    Err(Error::BufferNotLoaded(b)) => {
                        warn!(accessor = i, buffer = b, "indices unavailable, buffer not loaded");
                        Vec::new()
                    }
                    Err(e) => return Err(e),
                },
                // Unindexed: one element per vertex actually read.
                None => (0..fp.pos.len() as u32).collect(),
            };
            convert_topology(member.mode, &indices, &mut fp);
        }
        Ok(fp)
    }

    fn material(&mut self, index: usize) -> Result<usize> {
        if let Some(&flat) = self.materials.get(&index) {
            return Ok(flat);
        }
        let asset = self.asset;
        let m = asset.material(index)?;
        let pbr = m.pbr();
        let mut fm = FlatMaterial {
            name: m.name.clone().unwrap_or_default(),
            emission: m.emissive_factor,
            base_color: pbr.base_color_factor,
            metallic: pbr.metallic_factor,
            roughness: pbr.roughness_factor,
            ..Default::default()
        };
        fm.emission_txt = self.texture_opt(m.emissive_texture.as_ref().map(|t| t.index))?;
        fm.base_color_txt = self.texture_opt(pbr.base_color_texture.as_ref().map(|t| t.index))?;
        fm.metallic_roughness_txt = self.texture_opt(pbr.metallic_roughness_texture.as_ref().map(|t| t.index))?;
        fm.normal_txt = self.texture_opt(m.normal_texture.as_ref().map(|t| t.index))?;
        fm.occlusion_txt = self.texture_opt(m.occlusion_texture.as_ref().map(|t| t.index))?;

        let flat = self.out.materials.len();
        self.out.materials.push(fm);
        self.materials.insert(index, flat);
        Ok(flat)
    }

    fn texture_opt(&mut self, index: Option<usize>) -> Result<Option<usize>> {
        index.map(|i| self.texture(i)).transpose()
    }

    fn texture(&mut self, index: usize) -> Result<usize> {
        if let Some(&flat) = self.textures.get(&index) {
            return Ok(flat);
        }
        let asset = self.asset;
        let tex = asset.texture(index)?;
        let image = tex.source.map(|s| asset.image(s)).transpose()?;

        let path = image
            .and_then(|img| img.uri.as_deref())
            .filter(|u| !crate::resource::is_data_uri(u))
            .unwrap_or_default();
        let name = tex
            .name
            .as_deref()
            .or(image.and_then(|img| img.name.as_deref()))
            .unwrap_or(path)
            .to_string();

        let ft = match image {
            Some(img) if !img.data.is_empty() => FlatTexture {
                name,
                path: path.to_string(),
                width: img.data.width,
                height: img.data.height,
                ncomp: img.data.ncomp,
                datab: img.data.datab.clone(),
                dataf: img.data.dataf.clone(),
            },
            _ => {
                warn!(texture = index, "texture pixels unavailable, using white placeholder");
                FlatTexture::white(name, path)
            }
        };

        let flat = self.out.textures.len();
        self.out.textures.push(ft);
        self.textures.insert(index, flat);
        Ok(flat)
    }
}

/// Split a mesh's primitives into runs that came from one flat primitive.
///
/// A run is a complete sequence of tagged parts with identical attributes
/// and material; anything else stands alone.
fn part_groups(prims: &[Primitive]) -> Vec<&[Primitive]> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < prims.len() {
        let first = &prims[i];
        let len = match PrimitivePart::read(first) {
            Some(t) if t.part == 0 && t.parts > 1 && i + t.parts <= prims.len() => {
                let whole = prims[i + 1..i + t.parts].iter().enumerate().all(|(k, q)| {
                    PrimitivePart::read(q) == Some(PrimitivePart { part: k + 1, ..t })
                        && q.attributes == first.attributes
                        && q.material == first.material
                });
                if whole { t.parts } else { 1 }
            }
            _ => 1,
        };
        out.push(&prims[i..i + len]);
        i += len;
    }
    out
}

/// View over a primitive attribute; `None` when absent or when its buffer
/// was not loaded.
fn attribute<'a>(asset: &'a Asset, p: &Primitive, name: &str) -> Result<Option<AccessorView<'a>>> {
    let Some(index) = p.attribute(name) else { return Ok(None) };
    match AccessorView::new(asset, index) {
        Ok(v) => Ok(Some(v)),
        Err(Error::BufferNotLoaded(b)) => {
            warn!(attribute = name, accessor = index, buffer = b, "attribute unavailable, buffer not loaded");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Expand an index list of any topology into points, segments or triangles.
pub fn convert_topology(mode: Mode, idx: &[u32], fp: &mut FlatPrimitive) {
    let n = idx.len();
    match mode {
        Mode::Points => fp.points.extend_from_slice(idx),
        Mode::Lines => fp.lines.extend(idx.chunks_exact(2).map(|c| [c[0], c[1]])),
        Mode::LineStrip => fp.lines.extend(idx.windows(2).map(|w| [w[0], w[1]])),
        Mode::LineLoop if n >= 2 => {
            fp.lines.extend(idx.windows(2).map(|w| [w[0], w[1]]));
            fp.lines.push([idx[n - 1], idx[0]]);
        }
        Mode::LineLoop => {}
        Mode::Triangles => fp.triangles.extend(idx.chunks_exact(3).map(|c| [c[0], c[1], c[2]])),
        Mode::TriangleStrip => {
            fp.triangles.extend(idx.windows(3).enumerate().map(|(i, w)| {
                if i % 2 == 0 {
                    [w[0], w[1], w[2]]
                } else {
                    [w[0], w[2], w[1]]
                }
            }));
        }
        Mode::TriangleFan if n >= 3 => {
            fp.triangles.extend((1..n - 1).map(|i| [idx[0], idx[i], idx[i + 1]]));
        }
        Mode::TriangleFan => {}
    }
}
