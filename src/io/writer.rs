//! Saving `.gltf` and `.glb` files.

use std::path::Path;

use tracing::debug;

use super::SaveOptions;
use crate::glb::encode_container;
use crate::model::Asset;
use crate::resource::{embed_buffers, save_buffers, save_images};
use crate::util::{Error, Result};

/// True when `path` names a binary container.
pub fn is_binary_path(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("glb"))
}

/// Save a document. The `.glb` extension selects the binary container.
///
/// In a binary container, buffer 0 without a URI becomes the BIN chunk. Any
/// other URI-less buffer is embedded as a `data:` URI. External buffers and
/// images are written next to `path`.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn save(path: impl AsRef<Path>, asset: &Asset, opts: &SaveOptions) -> Result<()> {
    let path = path.as_ref();
    let dir = path.parent();
    let bytes = to_bytes(asset, is_binary_path(path), opts.save_buffers)?;
    std::fs::write(path, &bytes)?;
    debug!(bytes = bytes.len(), "wrote document");

    if opts.save_buffers {
        save_buffers(asset, dir)?;
    }
    if opts.save_images {
        save_images(asset, dir)?;
    }
    Ok(())
}

/// Encode a document as text JSON or as a binary container.
///
/// With `embed`, URI-less and `data:` buffers are re-encoded from their
/// current contents.
pub fn to_bytes(asset: &Asset, binary: bool, embed: bool) -> Result<Vec<u8>> {
    let bin_index = (binary && asset.buffers.first().is_some_and(|b| b.uri.is_none())).then_some(0);

    let mut out = asset.clone();
    if embed {
        embed_buffers(&mut out, bin_index)?;
    }

    if !binary {
        return out.to_json_pretty();
    }
    let bin = match bin_index {
        Some(i) => {
            let b = &asset.buffers[i];
            if !b.is_loaded() {
                return Err(Error::BufferNotLoaded(i));
            }
            Some(b.data.as_slice())
        }
        None => None,
    };
    encode_container(&out.to_json()?, bin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glb::decode_container;
    use crate::model::Buffer;

    fn two_buffers() -> Asset {
        Asset {
            buffers: vec![Buffer::from_data(None, vec![1, 2, 3]), Buffer::from_data(None, vec![4])],
            ..Default::default()
        }
    }

    #[test]
    fn test_binary_uses_first_buffer_as_bin() {
        let bytes = to_bytes(&two_buffers(), true, true).unwrap();
        let c = decode_container(&bytes).unwrap();
        assert_eq!(c.bin, Some(&[1u8, 2, 3, 0][..]));
        let doc = Asset::from_json(c.json).unwrap();
        assert_eq!(doc.buffers[0].uri, None);
        assert_eq!(doc.buffers[1].uri.as_deref(), Some("data:application/octet-stream;base64,BA=="));
    }

    #[test]
    fn test_text_embeds_everything() {
        let bytes = to_bytes(&two_buffers(), false, true).unwrap();
        let doc = Asset::from_json(&bytes).unwrap();
        assert!(doc.buffers.iter().all(|b| b.uri.as_deref().is_some_and(|u| u.starts_with("data:"))));
    }

    #[test]
    fn test_unloaded_bin_buffer() {
        let mut a = two_buffers();
        a.buffers[0].data.clear();
        assert!(matches!(to_bytes(&a, true, false), Err(Error::BufferNotLoaded(0))));
    }

    #[test]
    fn test_binary_extension() {
        assert!(is_binary_path(Path::new("a/b.GLB")));
        assert!(!is_binary_path(Path::new("a/b.gltf")));
    }
}
