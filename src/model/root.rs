//! Root object of a glTF document.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::*;
use crate::util::{Error, Result};

/// Version string written into new documents.
pub const GLTF_VERSION: &str = "2.0";

/// Metadata about the document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    /// Targeted glTF version, `major.minor`.
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
    #[serde(flatten)]
    pub ext: Extensible,
}

impl Default for AssetInfo {
    fn default() -> Self {
        Self {
            version: GLTF_VERSION.to_string(),
            generator: None,
            copyright: None,
            min_version: None,
            ext: Extensible::default(),
        }
    }
}

/// A whole glTF document plus its loaded binary payloads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub asset: AssetInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions_used: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions_required: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessors: Vec<Accessor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub animations: Vec<Animation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffers: Vec<Buffer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffer_views: Vec<BufferView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cameras: Vec<Camera>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<Material>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meshes: Vec<Mesh>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samplers: Vec<Sampler>,
    /// Default scene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenes: Vec<Scene>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skins: Vec<Skin>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub textures: Vec<Texture>,
    #[serde(flatten)]
    pub ext: Extensible,
    /// Directory relative URIs are resolved against; set by the loader.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Asset {
    /// Parse a JSON document. Buffers and images are left unloaded.
    pub fn from_json(json: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Serialize the document to compact JSON.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Serialize the document to indented JSON.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn accessor(&self, index: usize) -> Result<&Accessor> {
        Error::check_index("accessor", index, self.accessors.len()).map(|i| &self.accessors[i])
    }

    pub fn buffer(&self, index: usize) -> Result<&Buffer> {
        Error::check_index("buffer", index, self.buffers.len()).map(|i| &self.buffers[i])
    }

    pub fn buffer_view(&self, index: usize) -> Result<&BufferView> {
        Error::check_index("bufferView", index, self.buffer_views.len()).map(|i| &self.buffer_views[i])
    }

    pub fn camera(&self, index: usize) -> Result<&Camera> {
        Error::check_index("camera", index, self.cameras.len()).map(|i| &self.cameras[i])
    }

    pub fn image(&self, index: usize) -> Result<&Image> {
        Error::check_index("image", index, self.images.len()).map(|i| &self.images[i])
    }

    pub fn material(&self, index: usize) -> Result<&Material> {
        Error::check_index("material", index, self.materials.len()).map(|i| &self.materials[i])
    }

    pub fn mesh(&self, index: usize) -> Result<&Mesh> {
        Error::check_index("mesh", index, self.meshes.len()).map(|i| &self.meshes[i])
    }

    pub fn node(&self, index: usize) -> Result<&Node> {
        Error::check_index("node", index, self.nodes.len()).map(|i| &self.nodes[i])
    }

    pub fn scene(&self, index: usize) -> Result<&Scene> {
        Error::check_index("scene", index, self.scenes.len()).map(|i| &self.scenes[i])
    }

    pub fn texture(&self, index: usize) -> Result<&Texture> {
        Error::check_index("texture", index, self.textures.len()).map(|i| &self.textures[i])
    }

    /// Bytes covered by a buffer view. Fails when the owning buffer is not loaded.
    pub fn view_bytes(&self, index: usize) -> Result<&[u8]> {
        let view = self.buffer_view(index)?;
        let buffer = self.buffer(view.buffer)?;
        if !buffer.is_loaded() {
            return Err(Error::BufferNotLoaded(view.buffer));
        }
        view.end()
            .and_then(|end| buffer.data.get(view.byte_offset..end))
            .ok_or_else(|| {
                Error::schema(format!(
                    "bufferView {} range {}+{} exceeds buffer {} length {}",
                    index,
                    view.byte_offset,
                    view.byte_length,
                    view.buffer,
                    buffer.data.len()
                ))
            })
    }

    /// Parent of every node that has one.
    pub fn parents(&self) -> Vec<Option<usize>> {
        let mut parents = vec![None; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            for &c in &node.children {
                if let Some(p) = parents.get_mut(c) {
                    *p = Some(i);
                }
            }
        }
        parents
    }

    /// Nodes no other node lists as a child, in index order.
    pub fn root_nodes(&self) -> Vec<usize> {
        self.parents()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Check every cross reference and the buffer view extents against the
    /// declared buffer lengths.
    pub fn validate(&self) -> Result<()> {
        let check = |kind: &'static str, index: usize, count: usize| -> Result<()> {
            Error::check_index(kind, index, count).map(|_| ())
        };
        let check_opt = |kind: &'static str, index: Option<usize>, count: usize| -> Result<()> {
            index.map_or(Ok(()), |i| check(kind, i, count))
        };

        if self.asset.version.split('.').next() != Some("2") {
            return Err(Error::schema(format!("unsupported asset version '{}'", self.asset.version)));
        }

        for (i, view) in self.buffer_views.iter().enumerate() {
            check("bufferView.buffer", view.buffer, self.buffers.len())?;
            let len = self.buffers[view.buffer].byte_length;
            match view.end() {
                Some(end) if end <= len => {}
                _ => {
                    return Err(Error::schema(format!(
                        "bufferView {} range {}+{} exceeds buffer {} length {}",
                        i, view.byte_offset, view.byte_length, view.buffer, len
                    )));
                }
            }
            if let Some(stride) = view.byte_stride {
                if !(4..=252).contains(&stride) || stride % 4 != 0 {
                    return Err(Error::schema(format!("bufferView {i} has invalid byteStride {stride}")));
                }
            }
        }

        for a in &self.accessors {
            check_opt("accessor.bufferView", a.buffer_view, self.buffer_views.len())?;
            if let Some(s) = &a.sparse {
                check("sparse.indices.bufferView", s.indices.buffer_view, self.buffer_views.len())?;
                check("sparse.values.bufferView", s.values.buffer_view, self.buffer_views.len())?;
                if !s.indices.component_type.is_unsigned_integer() {
                    return Err(Error::InvalidComponentType {
                        value: s.indices.component_type.into(),
                        context: "sparse.indices",
                    });
                }
            }
        }

        for mesh in &self.meshes {
            for p in &mesh.primitives {
                for &a in p.attributes.values() {
                    check("primitive.attributes", a, self.accessors.len())?;
                }
                for target in &p.targets {
                    for &a in target.values() {
                        check("primitive.targets", a, self.accessors.len())?;
                    }
                }
                check_opt("primitive.indices", p.indices, self.accessors.len())?;
                check_opt("primitive.material", p.material, self.materials.len())?;
                if let Some(i) = p.indices {
                    let ctype = self.accessors[i].component_type;
                    if !ctype.is_unsigned_integer() {
                        return Err(Error::InvalidComponentType {
                            value: ctype.into(),
                            context: "primitive.indices",
                        });
                    }
                }
            }
        }

        for m in &self.materials {
            for t in m.texture_indices() {
                check("material texture", t, self.textures.len())?;
            }
        }

        for t in &self.textures {
            check_opt("texture.sampler", t.sampler, self.samplers.len())?;
            check_opt("texture.source", t.source, self.images.len())?;
        }

        for img in &self.images {
            check_opt("image.bufferView", img.buffer_view, self.buffer_views.len())?;
        }

        for node in &self.nodes {
            check_opt("node.camera", node.camera, self.cameras.len())?;
            check_opt("node.mesh", node.mesh, self.meshes.len())?;
            check_opt("node.skin", node.skin, self.skins.len())?;
            for &c in &node.children {
                check("node.children", c, self.nodes.len())?;
            }
        }

        for skin in &self.skins {
            check_opt("skin.inverseBindMatrices", skin.inverse_bind_matrices, self.accessors.len())?;
            check_opt("skin.skeleton", skin.skeleton, self.nodes.len())?;
            for &j in &skin.joints {
                check("skin.joints", j, self.nodes.len())?;
            }
        }

        for anim in &self.animations {
            for ch in &anim.channels {
                check("channel.sampler", ch.sampler, anim.samplers.len())?;
                check_opt("channel.target.node", ch.target.node, self.nodes.len())?;
            }
            for s in &anim.samplers {
                check("animation.sampler.input", s.input, self.accessors.len())?;
                check("animation.sampler.output", s.output, self.accessors.len())?;
            }
        }

        for scene in &self.scenes {
            for &n in &scene.nodes {
                check("scene.nodes", n, self.nodes.len())?;
            }
        }
        check_opt("scene", self.scene, self.scenes.len())?;

        Ok(())
    }
}
