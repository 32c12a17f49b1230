use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::{imageops, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use super::pair::TexturePair;
use super::quadtree::QuadTree;
use super::tile::{self, MIN_TILE_SIZE};
use crate::error::{Error, Result};

/// Options for atlas building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasOptions {
    /// Edge length of the square atlas in pixels.
    pub atlas_size: u32,
    /// Constant subtracted from every remapped v coordinate.
    pub shift_y: f64,
}

impl Default for AtlasOptions {
    fn default() -> Self {
        Self {
            atlas_size: 1024,
            shift_y: 0.0,
        }
    }
}

impl AtlasOptions {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

/// Where a texture landed in the atlas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub id: i32,
    pub x: u32,
    pub y: u32,
    /// Edge of the quadtree node that took the texture.
    pub tile_size: u32,
    pub texture_size: u32,
    pub is_cutout: bool,
}

/// Packs texture pairs into one RGB canvas and one mask canvas.
///
/// Placement is greedy and order dependent: the same pairs packed in the
/// same order always give the same layout.
#[derive(Debug, Clone)]
pub struct AtlasPacker {
    size: u32,
    canvas: RgbImage,
    mask: GrayImage,
    tree: QuadTree,
    placements: BTreeMap<i32, Placement>,
}

impl AtlasPacker {
    pub fn new(size: u32) -> Result<Self> {
        if !tile::is_node_edge(size) {
            return Err(Error::InvalidAtlasSize {
                size,
                min: MIN_TILE_SIZE,
            });
        }
        Ok(Self {
            size,
            canvas: RgbImage::new(size, size),
            mask: GrayImage::new(size, size),
            tree: QuadTree::new(size),
            placements: BTreeMap::new(),
        })
    }

    /// Pack `pairs` in order into a new atlas of edge `size`.
    pub fn build(size: u32, pairs: &[TexturePair]) -> Result<Self> {
        let mut packer = Self::new(size)?;
        packer.pack_all(pairs)?;
        Ok(packer)
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn canvas(&self) -> &RgbImage {
        &self.canvas
    }

    pub fn mask(&self) -> &GrayImage {
        &self.mask
    }

    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }

    pub fn placement(&self, id: i32) -> Option<&Placement> {
        self.placements.get(&id)
    }

    /// Placements by ascending texture id.
    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.placements.values()
    }

    /// Place `pair` and paste it into both canvases, or return `None` when
    /// no free node can hold it. A failed attempt leaves the atlas as it was.
    pub fn try_pack(&mut self, pair: &TexturePair) -> Option<Placement> {
        let node = self.tree.insert(pair.id, pair.size())?;
        let node = self.tree.node(node);
        let placement = Placement {
            id: pair.id,
            x: node.x,
            y: node.y,
            tile_size: node.size,
            texture_size: pair.size(),
            is_cutout: pair.is_cutout,
        };

        imageops::replace(
            &mut self.canvas,
            &pair.albedo,
            placement.x as i64,
            placement.y as i64,
        );
        imageops::replace(
            &mut self.mask,
            &pair.mask,
            placement.x as i64,
            placement.y as i64,
        );

        tracing::debug!(
            id = pair.id,
            x = placement.x,
            y = placement.y,
            size = placement.texture_size,
            "packed texture"
        );
        self.placements.insert(pair.id, placement);
        Some(placement)
    }

    pub fn pack(&mut self, pair: &TexturePair) -> Result<Placement> {
        self.try_pack(pair).ok_or(Error::PackingExhausted {
            id: pair.id,
            size: pair.size(),
            atlas_size: self.size,
        })
    }

    /// Pack every pair in the given order. The first texture that does not
    /// fit aborts the whole atlas.
    pub fn pack_all(&mut self, pairs: &[TexturePair]) -> Result<()> {
        for pair in pairs {
            self.pack(pair)?;
        }
        tracing::debug!(
            textures = pairs.len(),
            atlas_size = self.size,
            "atlas packed"
        );
        Ok(())
    }

    /// Write `<stem>.png` and `<stem>-a.png`, returning both paths.
    pub fn save(&self, stem: &Path) -> Result<(PathBuf, PathBuf)> {
        let albedo_path = with_suffix(stem, ".png");
        let mask_path = with_suffix(stem, "-a.png");
        self.canvas.save(&albedo_path)?;
        self.mask.save(&mask_path)?;
        tracing::debug!(
            albedo = %albedo_path.display(),
            mask = %mask_path.display(),
            "saved atlas images"
        );
        Ok((albedo_path, mask_path))
    }
}

fn with_suffix(stem: &Path, suffix: &str) -> PathBuf {
    let mut name = stem.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
