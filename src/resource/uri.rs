//! URI classification, `data:` payloads and percent decoding.

use std::path::{Component, Path, PathBuf};

use base64::prelude::BASE64_STANDARD;
use base64::Engine;

use crate::util::{Error, Result};

/// MIME type of embedded buffers.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Where a URI points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UriKind<'a> {
    /// `data:<mime>;base64,<payload>`
    Data { mime: &'a str, payload: &'a str },
    /// Relative or absolute filesystem path, already percent-decoded.
    Path(PathBuf),
    /// Any other scheme (`http:`, `https:`, ...).
    Remote(&'a str),
}

/// Classify a URI.
pub fn classify(uri: &str) -> Result<UriKind<'_>> {
    if let Some(rest) = uri.strip_prefix("data:") {
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidBase64(format!("data URI without payload separator: {}", truncated(uri))))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::InvalidBase64(format!("data URI is not base64: {}", truncated(uri))))?;
        return Ok(UriKind::Data { mime, payload });
    }
    if has_scheme(uri) {
        return Ok(UriKind::Remote(uri));
    }
    Ok(UriKind::Path(PathBuf::from(percent_decode(uri))))
}

/// True for `scheme:` prefixes, ignoring single-letter drive names.
fn has_scheme(uri: &str) -> bool {
    match uri.find(':') {
        Some(i) if i > 1 => uri[..i]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        _ => false,
    }
}

fn truncated(uri: &str) -> &str {
    let end = uri.char_indices().nth(48).map_or(uri.len(), |(i, _)| i);
    &uri[..end]
}

/// Decode the payload of a `data:` URI. Returns the MIME type and bytes.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    match classify(uri)? {
        UriKind::Data { mime, payload } => Ok((mime.to_string(), BASE64_STANDARD.decode(payload)?)),
        _ => Err(Error::resource(truncated(uri), "not a data URI")),
    }
}

/// Build a base64 `data:` URI.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64_STANDARD.encode(bytes))
}

/// True for `data:` URIs.
pub fn is_data_uri(uri: &str) -> bool {
    uri.starts_with("data:")
}

/// Decode `%XX` escapes. Malformed escapes are kept literally.
pub fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                out.push((h << 4) | l);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Read the bytes a URI points at.
///
/// Relative paths are joined to `base_dir`. A missing file is reported as
/// [`Error::ResourceNotFound`] with the full path.
pub fn read_uri(uri: &str, base_dir: Option<&Path>) -> Result<Vec<u8>> {
    match classify(uri)? {
        UriKind::Data { payload, .. } => Ok(BASE64_STANDARD.decode(payload)?),
        UriKind::Remote(u) => Err(Error::resource(u, "only data URIs and relative paths are supported")),
        UriKind::Path(rel) => {
            let path = match base_dir {
                Some(dir) => dir.join(rel),
                None => rel,
            };
            std::fs::read(&path).map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => Error::ResourceNotFound(path),
                _ => Error::resource(path.display().to_string(), e.to_string()),
            })
        }
    }
}

/// Filesystem path a URI is written to, or `None` for embedded data.
///
/// Only paths that stay below `base_dir` are accepted: absolute paths,
/// drive prefixes and `..` components are refused.
pub fn uri_path(uri: &str, base_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    match classify(uri)? {
        UriKind::Data { .. } => Ok(None),
        UriKind::Remote(u) => Err(Error::resource(u, "cannot write to a remote URI")),
        UriKind::Path(rel) => {
            if !is_contained(&rel) {
                return Err(Error::resource(truncated(uri), "refusing to write outside the output directory"));
            }
            Ok(Some(match base_dir {
                Some(dir) => dir.join(rel),
                None => rel,
            }))
        }
    }
}

/// Relative path without parent, root or drive components.
fn is_contained(path: &Path) -> bool {
    let drive = path.to_str().is_some_and(|s| s.as_bytes().get(1) == Some(&b':'));
    !drive && path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
