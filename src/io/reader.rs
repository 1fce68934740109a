//! Loading `.gltf` and `.glb` files.

use std::path::Path;

use tracing::debug;

use super::LoadOptions;
use crate::glb::{decode_container, has_glb_magic};
use crate::model::Asset;
use crate::resource::{load_buffers, load_images};
use crate::util::{Error, Result};

/// Load a document from disk.
///
/// Binary containers are recognized by their magic bytes, whatever the
/// file extension. Relative URIs resolve against the file's directory.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load(path: impl AsRef<Path>, opts: &LoadOptions) -> Result<Asset> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::ResourceNotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })?;
    let base_dir = path.parent().map(Path::to_path_buf);
    load_from_slice(&bytes, base_dir.as_deref(), opts)
}

/// Load a document held in memory. `base_dir` resolves relative URIs.
pub fn load_from_slice(bytes: &[u8], base_dir: Option<&Path>, opts: &LoadOptions) -> Result<Asset> {
    let (json, bin) = if has_glb_magic(bytes) {
        let c = decode_container(bytes)?;
        (c.json, c.bin)
    } else {
        (bytes, None)
    };

    let mut asset = Asset::from_json(json)?;
    asset.base_dir = base_dir.map(Path::to_path_buf);
    debug!(
        binary = bin.is_some(),
        nodes = asset.nodes.len(),
        meshes = asset.meshes.len(),
        buffers = asset.buffers.len(),
        "parsed document"
    );

    if opts.load_buffers {
        load_buffers(&mut asset, bin, opts.skip_missing)?;
    }
    if opts.load_images {
        load_images(&mut asset, opts.skip_missing)?;
    }
    Ok(asset)
}
