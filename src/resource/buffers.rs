//! Buffer payload resolution and writing.

use std::path::Path;

use tracing::{debug, warn};

use super::uri::{encode_data_uri, is_data_uri, read_uri, uri_path, OCTET_STREAM};
use crate::model::Asset;
use crate::util::{Error, Result};

/// Fill `data` of every buffer.
///
/// Buffer 0 without a URI takes the BIN chunk of a binary container. Data
/// URIs are decoded in place; other URIs are read relative to `base_dir`.
/// With `skip_missing`, a resource that cannot be resolved leaves the buffer
/// empty instead of failing.
pub fn load_buffers(asset: &mut Asset, bin: Option<&[u8]>, skip_missing: bool) -> Result<()> {
    let base_dir = asset.base_dir.clone();
    for (i, buffer) in asset.buffers.iter_mut().enumerate() {
        let data = match (&buffer.uri, bin) {
            (None, Some(bin)) if i == 0 => bin.to_vec(),
            (None, _) => {
                return Err(Error::schema(format!("buffer {i} has no uri and no BIN chunk to bind")));
            }
            (Some(uri), _) => match read_uri(uri, base_dir.as_deref()) {
                Ok(data) => data,
                Err(e) if skip_missing && e.is_recoverable() => {
                    warn!(buffer = i, error = %e, "skipping missing buffer");
                    buffer.data.clear();
                    continue;
                }
                Err(e) => return Err(e),
            },
        };

        if data.len() < buffer.byte_length {
            return Err(Error::schema(format!(
                "buffer {} declares {} bytes but only {} are available",
                i,
                buffer.byte_length,
                data.len()
            )));
        }
        buffer.data = data;
        // The BIN chunk may carry trailing padding.
        buffer.data.truncate(buffer.byte_length);
        debug!(buffer = i, bytes = buffer.byte_length, "loaded buffer");
    }
    Ok(())
}

/// Write buffers that point at external files under `base_dir`.
///
/// Embedded buffers and the BIN-chunk buffer are skipped; they travel with
/// the document itself.
pub fn save_buffers(asset: &Asset, base_dir: Option<&Path>) -> Result<()> {
    for (i, buffer) in asset.buffers.iter().enumerate() {
        let Some(uri) = &buffer.uri else { continue };
        let Some(path) = uri_path(uri, base_dir)? else { continue };
        if !buffer.is_loaded() {
            return Err(Error::BufferNotLoaded(i));
        }
        std::fs::write(&path, &buffer.data)?;
        debug!(buffer = i, path = %path.display(), "wrote buffer");
    }
    Ok(())
}

/// Replace the URI of every embedded or URI-less buffer by a fresh data URI
/// of its current contents. Buffer `skip` (the BIN chunk) is left untouched.
pub fn embed_buffers(asset: &mut Asset, skip: Option<usize>) -> Result<()> {
    for (i, buffer) in asset.buffers.iter_mut().enumerate() {
        if Some(i) == skip {
            continue;
        }
        let embedded = buffer.uri.as_deref().map_or(true, is_data_uri);
        if !embedded {
            continue;
        }
        if !buffer.is_loaded() {
            return Err(Error::BufferNotLoaded(i));
        }
        buffer.uri = Some(encode_data_uri(OCTET_STREAM, &buffer.data));
    }
    Ok(())
}
