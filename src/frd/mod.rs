//! FRD track container decoder.
//!
//! Binary layout:
//! ```text
//! [28 bytes]  header (kept verbatim, not interpreted)
//! [4 bytes]   n: block count minus one
//! (n+1) x TrackBlock
//! (n+1) x PolygonBlock        (index-aligned with the track blocks)
//! (4(n+1)+1) x XobjBlock
//! [4 bytes]   texture count
//! count x TextureEntry (47 bytes each)
//! ```
//!
//! Blocks carry no length prefix of their own, so every count inside a block
//! decides where the next block starts. Any short read or bad tag aborts the
//! whole decode.

pub mod polygon_block;
pub mod reader;
pub mod records;
pub mod track_block;
pub mod xobj;

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
pub use polygon_block::{ObjectGroup, PolyObject, PolygonBlock, PolygonChunk};
pub use reader::{Record, RecordReader};
pub use records::{PolygonRecord, TextureEntry};
pub use track_block::{CrossReference, TrackBlock};
pub use xobj::{ExtraObject, ExtraObjectKind, ObjectGeometry, XobjBlock};

pub const HEADER_LEN: usize = 28;

/// Extra object blocks per track block (plus one global block).
pub const XOBJ_BLOCKS_PER_TRACK_BLOCK: usize = 4;

/// A fully decoded track file.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackFile {
    pub header: [u8; HEADER_LEN],
    /// Stored block count; the file holds `n_blocks + 1` segments.
    pub n_blocks: i32,
    pub trk: Vec<TrackBlock>,
    pub poly: Vec<PolygonBlock>,
    pub xobj: Vec<XobjBlock>,
    pub textures: Vec<TextureEntry>,
}

/// Decode a complete track file held in memory.
pub fn decode(data: &[u8]) -> Result<TrackFile> {
    let mut reader = RecordReader::new(data);
    let header = reader.bytes::<HEADER_LEN>("header")?;

    let count_position = reader.position();
    let n_blocks = reader.i32("block count")?;
    // -1 is a track with no segments and only the global object block
    let segments = n_blocks
        .checked_add(1)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or(Error::InvalidCount {
            field: "block",
            count: n_blocks as i64,
            position: count_position,
        })?;

    let mut trk = Vec::with_capacity(segments.min(4096));
    for _ in 0..segments {
        trk.push(TrackBlock::read(&mut reader)?);
    }

    let mut poly = Vec::with_capacity(segments.min(4096));
    for _ in 0..segments {
        poly.push(PolygonBlock::read(&mut reader)?);
    }

    let xobj_count = XOBJ_BLOCKS_PER_TRACK_BLOCK * segments + 1;
    let mut xobj = Vec::with_capacity(xobj_count.min(4096 * 4));
    for _ in 0..xobj_count {
        xobj.push(XobjBlock::read(&mut reader)?);
    }

    let n_textures = reader.count("texture")?;
    let textures = reader.records(n_textures)?;

    tracing::debug!(
        segments,
        textures = n_textures,
        trailing = reader.remaining(),
        "decoded track file"
    );

    Ok(TrackFile {
        header,
        n_blocks,
        trk,
        poly,
        xobj,
        textures,
    })
}

/// Read and decode a track file from disk.
pub fn load(path: &Path) -> Result<TrackFile> {
    let data = std::fs::read(path)?;
    decode(&data)
}

/// Counts describing a decoded track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub segments: usize,
    pub vertices: usize,
    pub polygons: usize,
    pub static_objects: usize,
    pub animated_objects: usize,
    pub textures: usize,
    pub used_textures: usize,
}

impl TrackFile {
    pub fn segments(&self) -> usize {
        self.trk.len()
    }

    /// Extra objects across every xobj block.
    pub fn extra_objects(&self) -> impl Iterator<Item = &ExtraObject> {
        self.xobj.iter().flat_map(|block| block.obj.iter())
    }

    /// Every renderable polygon: segment polygons first, then extra objects.
    pub fn iter_polys(&self) -> impl Iterator<Item = &PolygonRecord> {
        self.poly
            .iter()
            .flat_map(PolygonBlock::iter_polys)
            .chain(self.extra_objects().flat_map(|obj| obj.geometry.polygons.iter()))
    }

    /// Texture usage ids referenced by at least one renderable polygon.
    pub fn used_textures(&self) -> BTreeSet<u16> {
        self.iter_polys().map(|p| p.texture).collect()
    }

    pub fn summary(&self) -> TrackSummary {
        let (animated, fixed): (Vec<_>, Vec<_>) =
            self.extra_objects().partition(|obj| obj.is_animated());
        TrackSummary {
            segments: self.segments(),
            vertices: self.trk.iter().map(|b| b.vertices.len()).sum::<usize>()
                + self
                    .extra_objects()
                    .map(|obj| obj.geometry.vertices.len())
                    .sum::<usize>(),
            polygons: self.iter_polys().count(),
            static_objects: fixed.len(),
            animated_objects: animated.len(),
            textures: self.textures.len(),
            used_textures: self.used_textures().len(),
        }
    }
}
