//! # Uploaded Images
//!
//! Image widgets reference uploads by file name. Uploads are normalized on the
//! way in: decoded, flattened onto white and re-encoded as PNG under a random
//! `<uuid>.png` name, so everything downstream only ever sees opaque PNGs.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use image::{Rgb, RgbImage};
use uuid::Uuid;

use crate::error::LabelError;
use crate::render::compose::encode_png;

/// Resolves image references to raw bytes.
pub trait ImageStore: Send + Sync {
    /// Bytes for `reference`, or `None` when it does not exist.
    fn load(&self, reference: &str) -> io::Result<Option<Vec<u8>>>;
}

/// Whether `name` is a bare file name (no directories, no traversal).
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}

/// Decode an uploaded image, flatten transparency onto white and encode it
/// as PNG.
pub fn normalize_upload(bytes: &[u8]) -> Result<Vec<u8>, LabelError> {
    let source = image::load_from_memory(bytes)?;
    let rgba = source.to_rgba8();
    let flattened = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u32;
        let over = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([over(r), over(g), over(b)])
    });
    encode_png(&flattened)
}

/// Upload directory on disk.
#[derive(Debug, Clone)]
pub struct DirImageStore {
    dir: PathBuf,
}

impl DirImageStore {
    /// Use `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, LabelError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Normalize and store an upload. Returns the generated file name.
    pub fn save(&self, bytes: &[u8]) -> Result<String, LabelError> {
        let png = normalize_upload(bytes)?;
        let filename = format!("{}.png", Uuid::new_v4().simple());
        std::fs::write(self.dir.join(&filename), png)?;
        tracing::info!(filename = %filename, "stored upload");
        Ok(filename)
    }
}

impl ImageStore for DirImageStore {
    fn load(&self, reference: &str) -> io::Result<Option<Vec<u8>>> {
        if !is_safe_name(reference) {
            return Ok(None);
        }
        match std::fs::read(self.dir.join(reference)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// In-memory store, handy for tests and one-off renders.
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    images: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryImageStore {
    pub fn insert(&self, reference: &str, bytes: Vec<u8>) {
        if let Ok(mut images) = self.images.write() {
            images.insert(reference.to_string(), bytes);
        }
    }
}

impl ImageStore for MemoryImageStore {
    fn load(&self, reference: &str) -> io::Result<Option<Vec<u8>>> {
        let images = self
            .images
            .read()
            .map_err(|_| io::Error::other("image store lock poisoned"))?;
        Ok(images.get(reference).cloned())
    }
}
