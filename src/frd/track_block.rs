//! Per-segment track geometry block.
//!
//! Layout:
//! ```text
//! center(12) + bounding[4](48)
//! vertex counts: total, hi-res, lo-res, med-res, duplicated, object (6 x i32)
//! vertices[total](12 each) + shading[total](4 each)
//! neighbors[300](4 each)
//! start_position(i32) + 7 counts: positions, poly-vroad, vroad, xobj refs,
//!     poly-object refs, sound sources, light sources
//! positions, poly-vroad links, vroad records, xobj refs
//! poly-object refs: variable records, region is count x 20 bytes
//! sound sources, light sources
//! ```

use super::reader::{Record, RecordReader};
use super::records::{
    LightSource, NeighborData, PolyVroadData, PositionData, RefXobj, SoundSource, VroadData,
};
use crate::error::{Error, Result};
use crate::math::{FloatPoint, IntPoint, VertexColor};

/// Entries in the fixed neighbor table of every block.
pub const NEIGHBOR_COUNT: usize = 300;

/// Stride of the polygon-object cross-reference region, whatever the size of
/// the individual records inside it.
pub const CROSS_REFERENCE_STRIDE: u64 = 20;

const CROSS_REFERENCE_COMPACT: i16 = 16;
const CROSS_REFERENCE_EXTENDED: i16 = 20;

/// Cross index reported for compact references, which do not store one.
pub const CROSS_INDEX_ABSENT: i32 = -1;

/// Reference from a track block to one of its scenery polygon objects.
///
/// The record starts with its own size: 16 bytes without a cross index,
/// 20 bytes with one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrossReference {
    Compact {
        kind: u8,
        no: u8,
        point: IntPoint,
    },
    Extended {
        kind: u8,
        no: u8,
        point: IntPoint,
        cross_index: i32,
    },
}

impl CrossReference {
    pub fn read(reader: &mut RecordReader<'_>) -> Result<Self> {
        let position = reader.position();
        let size = reader.i16("cross-reference size")?;
        match size {
            CROSS_REFERENCE_COMPACT | CROSS_REFERENCE_EXTENDED => {
                let kind = reader.u8("cross-reference type")?;
                let no = reader.u8("cross-reference number")?;
                let point: IntPoint = reader.record()?;
                if size == CROSS_REFERENCE_COMPACT {
                    Ok(Self::Compact { kind, no, point })
                } else {
                    let cross_index = reader.i32("cross index")?;
                    Ok(Self::Extended {
                        kind,
                        no,
                        point,
                        cross_index,
                    })
                }
            }
            other => Err(Error::UnknownRecordVariant {
                record: "cross-reference",
                value: other as i64,
                position,
            }),
        }
    }

    /// Size tag of the record in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::Compact { .. } => CROSS_REFERENCE_COMPACT as usize,
            Self::Extended { .. } => CROSS_REFERENCE_EXTENDED as usize,
        }
    }

    pub fn kind(&self) -> u8 {
        match *self {
            Self::Compact { kind, .. } | Self::Extended { kind, .. } => kind,
        }
    }

    pub fn no(&self) -> u8 {
        match *self {
            Self::Compact { no, .. } | Self::Extended { no, .. } => no,
        }
    }

    pub fn point(&self) -> IntPoint {
        match *self {
            Self::Compact { point, .. } | Self::Extended { point, .. } => point,
        }
    }

    pub fn cross_index(&self) -> Option<i32> {
        match *self {
            Self::Compact { .. } => None,
            Self::Extended { cross_index, .. } => Some(cross_index),
        }
    }

    /// Cross index with the on-disk sentinel for "absent".
    pub fn cross_index_or_sentinel(&self) -> i32 {
        self.cross_index().unwrap_or(CROSS_INDEX_ABSENT)
    }
}

/// Vertex count fields at the head of a track block. Only `total` sizes the
/// pool; the others partition it by level of detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexCounts {
    pub total: i32,
    pub hi_res: i32,
    pub lo_res: i32,
    pub med_res: i32,
    pub duplicated: i32,
    pub object: i32,
}

/// Geometry and navigation data of one track segment. Owns the vertex pool
/// that the segment's [`PolygonBlock`](super::PolygonBlock) indexes into.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackBlock {
    pub center: FloatPoint,
    pub bounding: [FloatPoint; 4],
    pub vertex_counts: VertexCounts,
    pub vertices: Vec<FloatPoint>,
    pub shading: Vec<VertexColor>,
    pub neighbors: Vec<NeighborData>,
    pub start_position: i32,
    pub positions: Vec<PositionData>,
    pub poly_vroad: Vec<PolyVroadData>,
    pub vroad: Vec<VroadData>,
    pub xobj_refs: Vec<RefXobj>,
    pub poly_object_refs: Vec<CrossReference>,
    pub sound_sources: Vec<SoundSource>,
    pub light_sources: Vec<LightSource>,
}

impl TrackBlock {
    pub fn read(reader: &mut RecordReader<'_>) -> Result<Self> {
        let center = reader.record()?;
        let bounding = [
            reader.record()?,
            reader.record()?,
            reader.record()?,
            reader.record()?,
        ];

        let n_vertices = reader.count("vertex")?;
        let vertex_counts = VertexCounts {
            total: n_vertices as i32,
            hi_res: reader.i32("hi-res vertex count")?,
            lo_res: reader.i32("lo-res vertex count")?,
            med_res: reader.i32("med-res vertex count")?,
            duplicated: reader.i32("duplicated vertex count")?,
            object: reader.i32("object vertex count")?,
        };
        let vertices = reader.records::<FloatPoint>(n_vertices)?;
        let shading = reader.records::<VertexColor>(n_vertices)?;
        let neighbors = reader.records::<NeighborData>(NEIGHBOR_COUNT)?;

        let start_position = reader.i32("start position")?;
        let n_positions = reader.count("position")?;
        let n_poly_vroad = reader.count("poly-vroad")?;
        let n_vroad = reader.count("vroad")?;
        let n_xobj = reader.count("extra object reference")?;
        let n_poly_obj = reader.count("polygon object reference")?;
        let n_sound = reader.count("sound source")?;
        let n_light = reader.count("light source")?;

        let positions = reader.records(n_positions)?;
        let poly_vroad = reader.records(n_poly_vroad)?;
        let vroad = reader.records(n_vroad)?;
        let xobj_refs = reader.records(n_xobj)?;

        let region_start = reader.position();
        let mut poly_object_refs = Vec::with_capacity(n_poly_obj.min(4096));
        for _ in 0..n_poly_obj {
            poly_object_refs.push(CrossReference::read(reader)?);
        }
        reader.skip_to(
            "cross-reference region",
            region_start + n_poly_obj as u64 * CROSS_REFERENCE_STRIDE,
        )?;

        let sound_sources = reader.records(n_sound)?;
        let light_sources = reader.records(n_light)?;

        tracing::trace!(
            vertices = n_vertices,
            positions = n_positions,
            poly_object_refs = n_poly_obj,
            "track block"
        );

        Ok(Self {
            center,
            bounding,
            vertex_counts,
            vertices,
            shading,
            neighbors,
            start_position,
            positions,
            poly_vroad,
            vroad,
            xobj_refs,
            poly_object_refs,
            sound_sources,
            light_sources,
        })
    }

    /// Vertex positions as x, y, z rows.
    pub fn vertex_buffer(&self) -> Vec<[f32; 3]> {
        self.vertices.iter().map(FloatPoint::to_slice).collect()
    }

    /// Shading colors as r, g, b, a rows.
    pub fn shading_buffer(&self) -> Vec<[u8; 4]> {
        self.shading.iter().map(VertexColor::to_rgba).collect()
    }
}

/// Minimum encoded size of a block with empty pools.
pub const EMPTY_TRACK_BLOCK_SIZE: usize = 5 * FloatPoint::SIZE
    + 6 * 4
    + NEIGHBOR_COUNT * NeighborData::SIZE
    + 8 * 4;
