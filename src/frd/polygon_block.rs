//! Per-segment polygon block: seven polygon chunks plus four scenery groups.

use super::reader::RecordReader;
use super::records::PolygonRecord;
use crate::error::{Error, Result};

pub const POLYGON_CHUNK_COUNT: usize = 7;
pub const OBJECT_GROUP_COUNT: usize = 4;

/// High resolution track surface.
pub const CHUNK_HIGH_RES: usize = 4;
/// High resolution transparent polygons.
pub const CHUNK_TRANSPARENT: usize = 5;
/// Road lane markings.
pub const CHUNK_LANES: usize = 6;

const POLY_OBJECT_WITH_POLYGONS: i32 = 1;

/// Count-prefixed run of polygons. Non-empty chunks repeat their count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolygonChunk {
    pub poly: Vec<PolygonRecord>,
}

impl PolygonChunk {
    pub fn read(reader: &mut RecordReader<'_>) -> Result<Self> {
        let size = reader.count("polygon chunk")?;
        if size == 0 {
            return Ok(Self::default());
        }
        let position = reader.position();
        let size_dup = reader.i32("polygon chunk size")?;
        if size_dup as i64 != size as i64 {
            return Err(Error::CountMismatch {
                field: "polygon chunk size",
                first: size as i64,
                second: size_dup as i64,
                position,
            });
        }
        Ok(Self {
            poly: reader.records(size)?,
        })
    }
}

/// One scenery object inside an object group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolyObject {
    /// Type 1: carries its own polygon list.
    Polygons(Vec<PolygonRecord>),
    /// Any other type tag; no payload follows it.
    Placeholder { tag: i32 },
}

impl PolyObject {
    pub fn read(reader: &mut RecordReader<'_>) -> Result<Self> {
        let tag = reader.i32("polygon object type")?;
        if tag != POLY_OBJECT_WITH_POLYGONS {
            return Ok(Self::Placeholder { tag });
        }
        let count = reader.count("polygon object polygon")?;
        Ok(Self::Polygons(reader.records(count)?))
    }

    pub fn polygons(&self) -> &[PolygonRecord] {
        match self {
            Self::Polygons(poly) => poly,
            Self::Placeholder { .. } => &[],
        }
    }
}

/// Scenery objects sharing the segment's vertex pool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectGroup {
    /// Polygon count as stored; zero means the group has no object list.
    pub n_polygons: i32,
    pub objects: Vec<PolyObject>,
}

impl ObjectGroup {
    pub fn read(reader: &mut RecordReader<'_>) -> Result<Self> {
        let n_polygons = reader.count("object group polygon")?;
        if n_polygons == 0 {
            return Ok(Self::default());
        }
        let n_objects = reader.count("object group object")?;
        let mut objects = Vec::with_capacity(n_objects.min(4096));
        for _ in 0..n_objects {
            objects.push(PolyObject::read(reader)?);
        }
        Ok(Self {
            n_polygons: n_polygons as i32,
            objects,
        })
    }

    pub fn iter_polys(&self) -> impl Iterator<Item = &PolygonRecord> {
        self.objects.iter().flat_map(|obj| obj.polygons().iter())
    }
}

/// Polygons of one track segment, indexing the vertex pool of the
/// [`TrackBlock`](super::TrackBlock) at the same position.
///
/// Chunks 0 to 3 are decoded and kept but carry no known meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolygonBlock {
    pub poly: [PolygonChunk; POLYGON_CHUNK_COUNT],
    pub obj: [ObjectGroup; OBJECT_GROUP_COUNT],
}

impl PolygonBlock {
    pub fn read(reader: &mut RecordReader<'_>) -> Result<Self> {
        let poly = [
            PolygonChunk::read(reader)?,
            PolygonChunk::read(reader)?,
            PolygonChunk::read(reader)?,
            PolygonChunk::read(reader)?,
            PolygonChunk::read(reader)?,
            PolygonChunk::read(reader)?,
            PolygonChunk::read(reader)?,
        ];
        let obj = [
            ObjectGroup::read(reader)?,
            ObjectGroup::read(reader)?,
            ObjectGroup::read(reader)?,
            ObjectGroup::read(reader)?,
        ];
        Ok(Self { poly, obj })
    }

    pub fn high_res(&self) -> &PolygonChunk {
        &self.poly[CHUNK_HIGH_RES]
    }

    pub fn transparent(&self) -> &PolygonChunk {
        &self.poly[CHUNK_TRANSPARENT]
    }

    pub fn lanes(&self) -> &PolygonChunk {
        &self.poly[CHUNK_LANES]
    }

    /// Renderable polygons: chunks 4 to 6, then every scenery object.
    pub fn iter_polys(&self) -> impl Iterator<Item = &PolygonRecord> {
        self.poly[CHUNK_HIGH_RES..=CHUNK_LANES]
            .iter()
            .flat_map(|chunk| chunk.poly.iter())
            .chain(self.obj.iter().flat_map(ObjectGroup::iter_polys))
    }
}
