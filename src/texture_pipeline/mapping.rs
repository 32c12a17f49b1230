//! UV mapping tables for packed atlases.
//!
//! Atlas pixels have their origin at the top-left, texture UVs at the
//! bottom-left, so every normalized v is flipped as `1 - v`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::atlas::{AtlasPacker, Placement};
use crate::error::{Error, Result};
use crate::frd::TrackFile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasMappingEntry {
    /// UV corners in atlas space, in the source texture's corner order.
    pub corners: [[f64; 2]; 4],
    /// Pixel position of the tile.
    pub x: i32,
    pub y: i32,
    pub atlas_size: i32,
    pub texture_size: i32,
    /// Texture file id.
    pub id: i32,
}

/// Flat key to entry table, serialized as a JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AtlasMapping {
    pub entries: BTreeMap<i32, AtlasMappingEntry>,
}

/// Corners of an axis-aligned tile: top-left, top-right, bottom-right,
/// bottom-left in pixel space, normalized and v-flipped.
pub fn tile_corners(x: u32, y: u32, size: u32, atlas_size: u32) -> [[f64; 2]; 4] {
    let s = atlas_size as f64;
    let (x1, y1) = (x as f64 / s, y as f64 / s);
    let (x2, y2) = ((x + size) as f64 / s, (y + size) as f64 / s);
    [[x1, 1.0 - y1], [x2, 1.0 - y1], [x2, 1.0 - y2], [x1, 1.0 - y2]]
}

/// Map texture-space UV pairs into the tile at `placement`.
pub fn remap_uvs(
    placement: &Placement,
    atlas_size: u32,
    uvs: [[f32; 2]; 4],
    shift_y: f64,
) -> [[f64; 2]; 4] {
    let s = atlas_size as f64;
    let size = placement.texture_size as f64;
    uvs.map(|[u, v]| {
        let px = placement.x as f64 + u as f64 * size;
        let py = placement.y as f64 + v as f64 * size;
        [px / s, 1.0 - py / s - shift_y]
    })
}

fn entry(placement: &Placement, atlas_size: u32, corners: [[f64; 2]; 4]) -> AtlasMappingEntry {
    AtlasMappingEntry {
        corners,
        x: placement.x as i32,
        y: placement.y as i32,
        atlas_size: atlas_size as i32,
        texture_size: placement.texture_size as i32,
        id: placement.id,
    }
}

impl AtlasMapping {
    /// Whole-tile corners for every packed texture, keyed by texture id.
    pub fn from_packer(packer: &AtlasPacker) -> Self {
        let size = packer.size();
        let entries = packer
            .placements()
            .map(|p| {
                let corners = tile_corners(p.x, p.y, p.texture_size, size);
                (p.id, entry(p, size, corners))
            })
            .collect();
        Self { entries }
    }

    /// Per-usage corners for a decoded track, keyed by texture table index.
    ///
    /// Only table entries referenced by some polygon are mapped. Each one
    /// carries its own UV corners, which are moved into the tile of the
    /// texture file it names.
    pub fn remap_track(packer: &AtlasPacker, track: &TrackFile, shift_y: f64) -> Result<Self> {
        let used = track.used_textures();
        let mut entries = BTreeMap::new();
        for (usage, texture) in track.textures.iter().enumerate() {
            // polygons address the table with u16, so later entries are unreachable
            if !u16::try_from(usage).is_ok_and(|u| used.contains(&u)) {
                continue;
            }
            let placement =
                packer
                    .placement(texture.texture as i32)
                    .ok_or(Error::MissingAtlasTexture {
                        usage,
                        texture: texture.texture,
                    })?;
            if texture.is_irregular() {
                tracing::debug!(usage, texture = texture.texture, "texture UVs leave their tile");
            }
            let corners = remap_uvs(placement, packer.size(), texture.uv_pairs(), shift_y);
            entries.insert(usage as i32, entry(placement, packer.size(), corners));
        }
        Ok(Self { entries })
    }

    pub fn get(&self, key: i32) -> Option<&AtlasMappingEntry> {
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}
