//! Flat scene to hierarchy conversion.

use std::collections::HashMap;

use tracing::debug;

use super::types::*;
use crate::model::{
    semantic, Accessor, Asset, AssetInfo, Buffer, BufferTarget, BufferView, Camera, Image, Material, Mesh,
    Mode, Node, NormalTextureInfo, OcclusionTextureInfo, PbrMetallicRoughness, Primitive, Scene, Texture,
    TextureInfo, Transform, GLTF_VERSION,
};
use crate::util::{AccessorType, ComponentType, Error, Result};

/// Generator string written into `asset.generator`.
pub fn generator() -> String {
    format!(
        "{} {} ({} {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("GLTF_IO_BUILD_DATE"),
        env!("GLTF_IO_BUILD_TIME")
    )
}

/// Build a new document from a flat scene.
///
/// All geometry is packed into one buffer with URI `<stem>.bin`. Vertex
/// attributes are stored as floats; indices use the smallest unsigned type
/// that holds their largest value. Every mesh instance and camera becomes a
/// root node with a matrix transform, all listed by a single scene.
#[tracing::instrument(skip_all, fields(stem = buffer_stem))]
pub fn unflatten(flat: &FlatScene, buffer_stem: &str) -> Result<Asset> {
    let mut asset = Asset {
        asset: AssetInfo {
            version: GLTF_VERSION.to_string(),
            generator: Some(generator()),
            ..Default::default()
        },
        ..Default::default()
    };
    let mut packer = Packer::default();

    for (i, ft) in flat.textures.iter().enumerate() {
        let uri = if ft.path.is_empty() {
            let stem = if ft.name.is_empty() { format!("texture{i}") } else { ft.name.clone() };
            if ft.dataf.is_empty() { format!("{stem}.png") } else { format!("{stem}.hdr") }
        } else {
            ft.path.clone()
        };
        let mut image = Image { uri: Some(uri), ..Default::default() };
        image.data.width = ft.width;
        image.data.height = ft.height;
        image.data.ncomp = ft.ncomp;
        image.data.datab = ft.datab.clone();
        image.data.dataf = ft.dataf.clone();
        asset.images.push(image);
        asset.textures.push(Texture {
            name: (!ft.name.is_empty()).then(|| ft.name.clone()),
            source: Some(i),
            ..Default::default()
        });
    }

    for fm in &flat.materials {
        asset.materials.push(material(fm, flat.textures.len())?);
    }

    // Each flat primitive becomes one glTF primitive per element kind,
    // tagged so that flatten can merge them again.
    let mut packed = Vec::with_capacity(flat.primitives.len());
    for (i, fp) in flat.primitives.iter().enumerate() {
        if let Some(m) = fp.material {
            Error::check_index("primitive material", m, flat.materials.len())?;
        }
        packed.push(packer.primitive(&mut asset, i, fp)?);
    }

    let mut shared: HashMap<&[usize], usize> = HashMap::new();
    for fmesh in &flat.meshes {
        let mesh = match shared.get(fmesh.primitives.as_slice()) {
            Some(&m) => m,
            None => {
                let mut prims = Vec::new();
                for &p in &fmesh.primitives {
                    Error::check_index("mesh primitive", p, packed.len())?;
                    prims.extend(packed[p].iter().cloned());
                }
                let name = fmesh
                    .primitives
                    .first()
                    .map(|&p| flat.primitives[p].name.clone())
                    .filter(|n| !n.is_empty())
                    .or_else(|| (!fmesh.name.is_empty()).then(|| fmesh.name.clone()));
                asset.meshes.push(Mesh { name, primitives: prims, ..Default::default() });
                let m = asset.meshes.len() - 1;
                shared.insert(fmesh.primitives.as_slice(), m);
                m
            }
        };
        asset.nodes.push(Node {
            name: (!fmesh.name.is_empty()).then(|| fmesh.name.clone()),
            mesh: Some(mesh),
            transform: Transform::Matrix(fmesh.xform),
            ..Default::default()
        });
    }

    for fc in &flat.cameras {
        let mut cam = if fc.ortho {
            // No far plane is written as the largest finite distance.
            Camera::orthographic(fc.aspect * fc.yfov, fc.yfov, fc.near, fc.far.unwrap_or(f32::MAX))
        } else {
            Camera::perspective(fc.yfov, Some(fc.aspect), fc.near, fc.far)
        };
        let name = (!fc.name.is_empty()).then(|| fc.name.clone());
        cam.name = name.clone();
        asset.cameras.push(cam);
        asset.nodes.push(Node {
            name,
            camera: Some(asset.cameras.len() - 1),
            transform: Transform::Matrix(fc.xform),
            ..Default::default()
        });
    }

    asset.scenes.push(Scene {
        name: (!flat.name.is_empty()).then(|| flat.name.clone()),
        nodes: (0..asset.nodes.len()).collect(),
        ..Default::default()
    });
    asset.scene = Some(0);

    if !packer.data.is_empty() {
        let uri = if buffer_stem.ends_with(".bin") {
            buffer_stem.to_string()
        } else {
            format!("{buffer_stem}.bin")
        };
        let mut buffer = Buffer::from_data(Some(uri), packer.data);
        buffer.name = Some(buffer_stem.trim_end_matches(".bin").to_string());
        asset.buffers.push(buffer);
    }

    debug!(
        nodes = asset.nodes.len(),
        meshes = asset.meshes.len(),
        accessors = asset.accessors.len(),
        bytes = asset.buffers.first().map_or(0, |b| b.byte_length),
        "unflattened scene"
    );
    Ok(asset)
}

fn material(fm: &FlatMaterial, num_textures: usize) -> Result<Material> {
    let tex = |t: Option<usize>| -> Result<Option<usize>> {
        t.map(|i| Error::check_index("material texture", i, num_textures)).transpose()
    };
    Ok(Material {
        name: (!fm.name.is_empty()).then(|| fm.name.clone()),
        pbr_metallic_roughness: Some(PbrMetallicRoughness {
            base_color_factor: fm.base_color,
            base_color_texture: tex(fm.base_color_txt)?.map(TextureInfo::new),
            metallic_factor: fm.metallic,
            roughness_factor: fm.roughness,
            metallic_roughness_texture: tex(fm.metallic_roughness_txt)?.map(TextureInfo::new),
            ..Default::default()
        }),
        normal_texture: tex(fm.normal_txt)?.map(NormalTextureInfo::new),
        occlusion_texture: tex(fm.occlusion_txt)?.map(OcclusionTextureInfo::new),
        emissive_texture: tex(fm.emission_txt)?.map(TextureInfo::new),
        emissive_factor: fm.emission,
        ..Default::default()
    })
}

/// Appends arrays to the single output buffer.
#[derive(Default)]
struct Packer {
    data: Vec<u8>,
}

impl Packer {
    /// Append `bytes` as a new 4-byte aligned buffer view.
    fn view(&mut self, asset: &mut Asset, bytes: &[u8], target: BufferTarget) -> usize {
        while self.data.len() % 4 != 0 {
            self.data.push(0);
        }
        let mut view = BufferView::new(0, self.data.len(), bytes.len());
        view.target = Some(target);
        self.data.extend_from_slice(bytes);
        asset.buffer_views.push(view);
        asset.buffer_views.len() - 1
    }

    /// Pack a float attribute; `None` when the array is empty.
    fn attribute<const N: usize>(&mut self, asset: &mut Asset, values: &[[f32; N]]) -> Option<usize>
    where
        [f32; N]: bytemuck::Pod,
    {
        if values.is_empty() {
            return None;
        }
        let shape = AccessorType::vector(N)?;
        let bytes: &[u8] = bytemuck::cast_slice(values);
        let view = self.view(asset, bytes, BufferTarget::ArrayBuffer);
        asset.accessors.push(Accessor::new(view, ComponentType::Float, shape, values.len()));
        Some(asset.accessors.len() - 1)
    }

    /// Pack indices with the smallest fitting component type.
    fn indices(&mut self, asset: &mut Asset, values: &[u32]) -> usize {
        let max = values.iter().copied().max().unwrap_or(0);
        let ctype = ComponentType::smallest_index_type(max);
        let bytes: Vec<u8> = match ctype {
            ComponentType::UnsignedByte => values.iter().map(|&v| v as u8).collect(),
            ComponentType::UnsignedShort => values.iter().flat_map(|&v| (v as u16).to_le_bytes()).collect(),
            _ => values.iter().flat_map(|&v| v.to_le_bytes()).collect(),
        };
        let view = self.view(asset, &bytes, BufferTarget::ElementArrayBuffer);
        asset.accessors.push(Accessor::new(view, ctype, AccessorType::Scalar, values.len()));
        asset.accessors.len() - 1
    }

    fn primitive(&mut self, asset: &mut Asset, index: usize, fp: &FlatPrimitive) -> Result<Vec<Primitive>> {
        let n = fp.pos.len();
        let check = |name: &str, len: usize| -> Result<()> {
            if len == 0 || len == n {
                Ok(())
            } else {
                Err(Error::schema(format!(
                    "flat primitive {index}: {name} has {len} entries for {n} positions"
                )))
            }
        };
        check("norm", fp.norm.len())?;
        check("texcoord", fp.texcoord.len())?;
        check("color", fp.color.len())?;
        check("radius", fp.radius.len())?;
        let max_index = fp
            .points
            .iter()
            .chain(fp.lines.iter().flatten())
            .chain(fp.triangles.iter().flatten())
            .copied()
            .max();
        if let Some(m) = max_index {
            Error::check_index("flat vertex", m as usize, n)?;
        }

        let mut base = Primitive { material: fp.material, ..Default::default() };
        if let Some(a) = self.attribute(asset, &fp.pos) {
            let (min, max) = bounds(&fp.pos);
            asset.accessors[a].min = min.to_vec();
            asset.accessors[a].max = max.to_vec();
            base.attributes.insert(semantic::POSITION.to_string(), a);
        }
        if let Some(a) = self.attribute(asset, &fp.norm) {
            base.attributes.insert(semantic::NORMAL.to_string(), a);
        }
        if let Some(a) = self.attribute(asset, &fp.texcoord) {
            base.attributes.insert(semantic::TEXCOORD_0.to_string(), a);
        }
        if let Some(a) = self.attribute(asset, &fp.color) {
            base.attributes.insert(semantic::COLOR_0.to_string(), a);
        }
        let radius: Vec<[f32; 1]> = fp.radius.iter().map(|&r| [r]).collect();
        if let Some(a) = self.attribute(asset, &radius) {
            base.attributes.insert(semantic::RADIUS.to_string(), a);
        }

        let mut out = Vec::new();
        if !fp.points.is_empty() {
            let idx = self.indices(asset, &fp.points);
            out.push(Primitive { indices: Some(idx), mode: Mode::Points, ..base.clone() });
        }
        if !fp.lines.is_empty() {
            let flat: Vec<u32> = fp.lines.iter().flatten().copied().collect();
            let idx = self.indices(asset, &flat);
            out.push(Primitive { indices: Some(idx), mode: Mode::Lines, ..base.clone() });
        }
        if !fp.triangles.is_empty() {
            let flat: Vec<u32> = fp.triangles.iter().flatten().copied().collect();
            let idx = self.indices(asset, &flat);
            out.push(Primitive { indices: Some(idx), mode: Mode::Triangles, ..base.clone() });
        }
        if out.is_empty() {
            // Vertices without elements: an unindexed primitive that
            // flatten reads back without generating elements.
            let mut p = Primitive { mode: Mode::Points, ..base };
            PrimitivePart { index, part: 0, parts: 1, empty: true }.write(&mut p);
            out.push(p);
        } else if out.len() > 1 {
            let parts = out.len();
            for (part, p) in out.iter_mut().enumerate() {
                PrimitivePart { index, part, parts, empty: false }.write(p);
            }
        }
        Ok(out)
    }
}

fn bounds(pos: &[[f32; 3]]) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for p in pos {
        for k in 0..3 {
            min[k] = min[k].min(p[k]);
            max[k] = max[k].max(p[k]);
        }
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{AccessorView, IndexView};
    use crate::util::Mat4;

    fn triangle() -> FlatPrimitive {
        FlatPrimitive {
            name: "tri".into(),
            pos: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            norm: vec![[0.0, 0.0, 1.0]; 3],
            triangles: vec![[0, 1, 2]],
            ..Default::default()
        }
    }

    #[test]
    fn test_single_buffer_and_alignment() {
        let flat = FlatScene {
            primitives: vec![triangle()],
            meshes: vec![FlatMesh { name: "m".into(), primitives: vec![0], ..Default::default() }],
            ..Default::default()
        };
        let asset = unflatten(&flat, "scene").unwrap();
        assert_eq!(asset.buffers.len(), 1);
        assert_eq!(asset.buffers[0].uri.as_deref(), Some("scene.bin"));
        assert!(asset.buffer_views.iter().all(|v| v.byte_offset % 4 == 0));
        asset.validate().unwrap();

        let prim = &asset.meshes[0].primitives[0];
        assert_eq!(prim.mode, Mode::Triangles);
        let pos = prim.attribute(semantic::POSITION).unwrap();
        assert_eq!(asset.accessors[pos].min, vec![0.0, 0.0, 0.0]);
        assert_eq!(asset.accessors[pos].max, vec![1.0, 1.0, 0.0]);
        let idx = IndexView::new(&asset, prim.indices.unwrap()).unwrap();
        assert_eq!(asset.accessors[prim.indices.unwrap()].component_type, ComponentType::UnsignedByte);
        assert_eq!(idx.to_vec(), vec![0, 1, 2]);
        let n = AccessorView::new(&asset, prim.attribute(semantic::NORMAL).unwrap()).unwrap();
        assert_eq!(n.to_arrays::<3>(0.0), vec![[0.0, 0.0, 1.0]; 3]);
    }

    #[test]
    fn test_index_type_selection() {
        let mut p = triangle();
        p.pos = vec![[0.0; 3]; 300];
        p.triangles = vec![[0, 1, 299]];
        let flat = FlatScene {
            primitives: vec![p],
            meshes: vec![FlatMesh { primitives: vec![0], ..Default::default() }],
            ..Default::default()
        };
        let asset = unflatten(&flat, "s.bin").unwrap();
        assert_eq!(asset.buffers[0].uri.as_deref(), Some("s.bin"));
        let i = asset.meshes[0].primitives[0].indices.unwrap();
        assert_eq!(asset.accessors[i].component_type, ComponentType::UnsignedShort);
    }

    #[test]
    fn test_shared_mesh_and_matrix_nodes() {
        let xform = Mat4::from_translation([1.0, 2.0, 3.0].into());
        let flat = FlatScene {
            primitives: vec![triangle()],
            meshes: vec![
                FlatMesh { name: "a".into(), primitives: vec![0], ..Default::default() },
                FlatMesh { name: "b".into(), xform, primitives: vec![0] },
            ],
            cameras: vec![FlatCamera { name: "cam".into(), ..Default::default() }],
            ..Default::default()
        };
        let asset = unflatten(&flat, "s").unwrap();
        assert_eq!(asset.meshes.len(), 1);
        assert_eq!(asset.nodes.len(), 3);
        assert_eq!(asset.nodes[1].transform, Transform::Matrix(xform));
        assert!(asset.nodes.iter().all(|n| n.transform.is_matrix()));
        assert_eq!(asset.nodes[2].camera, Some(0));
        assert_eq!(asset.scenes[0].nodes, vec![0, 1, 2]);
        assert!(asset.asset.generator.as_deref().unwrap().starts_with("gltf-io"));
    }

    #[test]
    fn test_mixed_elements_split() {
        let mut p = triangle();
        p.lines = vec![[0, 1]];
        p.points = vec![2];
        let flat = FlatScene {
            primitives: vec![p],
            meshes: vec![FlatMesh { primitives: vec![0], ..Default::default() }],
            ..Default::default()
        };
        let asset = unflatten(&flat, "s").unwrap();
        let modes: Vec<Mode> = asset.meshes[0].primitives.iter().map(|p| p.mode).collect();
        assert_eq!(modes, vec![Mode::Points, Mode::Lines, Mode::Triangles]);
        let pos: Vec<_> = asset.meshes[0].primitives.iter().map(|p| p.attribute(semantic::POSITION)).collect();
        assert!(pos.iter().all(|&a| a == pos[0]));
        let parts: Vec<_> = asset.meshes[0].primitives.iter().filter_map(PrimitivePart::read).collect();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().enumerate().all(|(k, t)| t.index == 0 && t.part == k && t.parts == 3));
    }

    #[test]
    fn test_elementless_primitive_marked() {
        let mut p = triangle();
        p.triangles.clear();
        let flat = FlatScene {
            primitives: vec![triangle(), p],
            meshes: vec![FlatMesh { primitives: vec![0, 1], ..Default::default() }],
            ..Default::default()
        };
        let asset = unflatten(&flat, "s").unwrap();
        let prims = &asset.meshes[0].primitives;
        assert_eq!(prims.len(), 2);
        // A single-kind primitive needs no tag.
        assert_eq!(prims[0].ext.extras, None);
        assert_eq!(prims[1].indices, None);
        assert_eq!(
            PrimitivePart::read(&prims[1]),
            Some(PrimitivePart { index: 1, part: 0, parts: 1, empty: true })
        );
        assert_eq!(
            prims[1].ext.extras,
            Some(serde_json::json!({"flatPrimitive": {"index": 1, "part": 0, "parts": 1, "empty": true}}))
        );
    }

    #[test]
    fn test_bad_references() {
        let mut p = triangle();
        p.triangles = vec![[0, 1, 3]];
        let flat = FlatScene { primitives: vec![p], ..Default::default() };
        assert!(unflatten(&flat, "s").is_err());

        let mut p = triangle();
        p.norm.pop();
        let flat = FlatScene { primitives: vec![p], ..Default::default() };
        assert!(unflatten(&flat, "s").is_err());

        let flat = FlatScene {
            meshes: vec![FlatMesh { primitives: vec![5], ..Default::default() }],
            ..Default::default()
        };
        assert!(unflatten(&flat, "s").is_err());
    }
}
