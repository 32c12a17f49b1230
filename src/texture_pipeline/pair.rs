//! Albedo/mask texture pairs and texture directory scanning.
//!
//! A texture directory holds `<id>.<ext>` albedo images next to
//! `<id>-a.<ext>` masks. Only the top level is scanned.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};

use super::tile;
use crate::error::{Error, Result};

const MASK_SUFFIX: &str = "-a";

/// An albedo image with its single-channel mask.
#[derive(Debug, Clone)]
pub struct TexturePair {
    pub id: i32,
    pub albedo: RgbImage,
    pub mask: GrayImage,
    /// The mask holds real transparency, i.e. is not a single flat value.
    pub is_cutout: bool,
}

impl TexturePair {
    pub fn new(id: i32, albedo: DynamicImage, mask: DynamicImage) -> Result<Self> {
        let size = tile::tile_size(id, albedo.width(), albedo.height())?;
        if mask.width() != size || mask.height() != size {
            return Err(Error::DimensionMismatch {
                id,
                width: mask.width(),
                height: mask.height(),
                reason: "mask size differs from albedo",
            });
        }
        let mask = mask.into_luma8();
        let is_cutout = mask_is_cutout(&mask);
        Ok(Self {
            id,
            albedo: albedo.into_rgb8(),
            mask,
            is_cutout,
        })
    }

    /// Edge length in pixels.
    pub fn size(&self) -> u32 {
        self.albedo.width()
    }
}

/// A flat mask carries no alpha information, however opaque it is.
pub fn mask_is_cutout(mask: &GrayImage) -> bool {
    let mut samples = mask.as_raw().iter();
    let Some(&first) = samples.next() else {
        return false;
    };
    samples.any(|&s| s != first)
}

pub fn load_pair(id: i32, albedo_path: &Path, mask_path: &Path) -> Result<TexturePair> {
    let albedo = image::open(albedo_path)?;
    let mask = image::open(mask_path)?;
    TexturePair::new(id, albedo, mask)
}

enum TextureFile {
    Albedo(i32),
    Mask(i32),
}

fn classify(path: &Path) -> Option<TextureFile> {
    let ext = path.extension()?.to_str()?;
    ImageFormat::from_extension(ext)?;
    let stem = path.file_stem()?.to_str()?;
    let (digits, is_mask) = match stem.strip_suffix(MASK_SUFFIX) {
        Some(digits) => (digits, true),
        None => (stem, false),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let id = digits.parse().ok()?;
    Some(if is_mask {
        TextureFile::Mask(id)
    } else {
        TextureFile::Albedo(id)
    })
}

fn insert_unique(
    files: &mut BTreeMap<i32, PathBuf>,
    dir: &Path,
    id: i32,
    path: PathBuf,
) -> Result<()> {
    if let Some(existing) = files.insert(id, path) {
        return Err(Error::InvalidTextureDirectory {
            path: dir.to_path_buf(),
            reason: format!(
                "texture {} appears more than once ({})",
                id,
                existing.display()
            ),
        });
    }
    Ok(())
}

/// Find albedo/mask path pairs in `dir`, sorted by ascending id.
pub fn scan_directory(dir: &Path) -> Result<Vec<(i32, PathBuf, PathBuf)>> {
    if !dir.is_dir() {
        return Err(Error::InvalidTextureDirectory {
            path: dir.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let mut albedos = BTreeMap::new();
    let mut masks = BTreeMap::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        match classify(&path) {
            Some(TextureFile::Albedo(id)) => insert_unique(&mut albedos, dir, id, path)?,
            Some(TextureFile::Mask(id)) => insert_unique(&mut masks, dir, id, path)?,
            None => tracing::trace!(path = %path.display(), "skipping non-texture file"),
        }
    }

    if let Some(id) = masks.keys().find(|id| !albedos.contains_key(id)) {
        return Err(Error::InvalidTextureDirectory {
            path: dir.to_path_buf(),
            reason: format!("mask for texture {} has no albedo", id),
        });
    }

    let mut pairs = Vec::with_capacity(albedos.len());
    for (id, albedo) in albedos {
        let Some(mask) = masks.remove(&id) else {
            return Err(Error::InvalidTextureDirectory {
                path: dir.to_path_buf(),
                reason: format!("texture {} has no mask", id),
            });
        };
        pairs.push((id, albedo, mask));
    }
    Ok(pairs)
}

/// Load every texture pair in `dir`, sorted by ascending id.
pub fn load_directory(dir: &Path) -> Result<Vec<TexturePair>> {
    let pairs = scan_directory(dir)?
        .into_iter()
        .map(|(id, albedo, mask)| load_pair(id, &albedo, &mask))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(dir = %dir.display(), textures = pairs.len(), "loaded texture pairs");
    Ok(pairs)
}
