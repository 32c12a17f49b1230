//! Extra objects: static or animated props with their own vertex pools.
//!
//! ```text
//! type 4 (static):   crossno(4) unknown(4) reference(12) unknown(4) geometry
//! type 3 (animated): crossno(4) unknown(4) unknown[9](18) type3(1)=3
//!                    objno(1) anim_len(2) unknown(2) keyframes[anim_len](20)
//!                    geometry
//! geometry: n_vertices(4) vertices(12 each) shading(4 each)
//!           n_polygons(4) polygons(14 each)
//! ```

use super::reader::RecordReader;
use super::records::{AnimKeyframe, PolygonRecord};
use crate::error::{Error, Result};
use crate::math::{FloatPoint, VertexColor};

const XOBJ_TYPE_ANIMATED: i32 = 3;
const XOBJ_TYPE_STATIC: i32 = 4;

/// Vertex pool plus the polygons that index into it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectGeometry {
    pub vertices: Vec<FloatPoint>,
    pub shading: Vec<VertexColor>,
    pub polygons: Vec<PolygonRecord>,
}

impl ObjectGeometry {
    fn read(reader: &mut RecordReader<'_>) -> Result<Self> {
        let n_vertices = reader.count("extra object vertex")?;
        let vertices = reader.records(n_vertices)?;
        let shading = reader.records(n_vertices)?;
        let n_polygons = reader.count("extra object polygon")?;
        let polygons = reader.records(n_polygons)?;
        Ok(Self {
            vertices,
            shading,
            polygons,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtraObjectKind {
    Static {
        unknown: u32,
        reference: FloatPoint,
        unknown2: u32,
    },
    Animated {
        unknown: u32,
        unknown_shorts: [i16; 9],
        object_no: u8,
        unknown2: i16,
        keyframes: Vec<AnimKeyframe>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtraObject {
    pub cross_no: i32,
    pub kind: ExtraObjectKind,
    pub geometry: ObjectGeometry,
}

impl ExtraObject {
    pub fn read(reader: &mut RecordReader<'_>) -> Result<Self> {
        let position = reader.position();
        let tag = reader.i32("extra object type")?;
        match tag {
            XOBJ_TYPE_STATIC => {
                let cross_no = reader.i32("extra object cross number")?;
                let unknown = reader.u32("extra object")?;
                let reference = reader.record()?;
                let unknown2 = reader.u32("extra object")?;
                Ok(Self {
                    cross_no,
                    kind: ExtraObjectKind::Static {
                        unknown,
                        reference,
                        unknown2,
                    },
                    geometry: ObjectGeometry::read(reader)?,
                })
            }
            XOBJ_TYPE_ANIMATED => {
                let cross_no = reader.i32("extra object cross number")?;
                let unknown = reader.u32("extra object")?;
                let mut unknown_shorts = [0i16; 9];
                for slot in unknown_shorts.iter_mut() {
                    *slot = reader.i16("extra object")?;
                }
                let inner_position = reader.position();
                let inner_tag = reader.u8("animated object type")?;
                if inner_tag != XOBJ_TYPE_ANIMATED as u8 {
                    return Err(Error::InconsistentTypeTag {
                        expected: XOBJ_TYPE_ANIMATED as u8,
                        found: inner_tag,
                        position: inner_position,
                    });
                }
                let object_no = reader.u8("animated object number")?;
                let anim_position = reader.position();
                let anim_length = reader.i16("animation length")?;
                let anim_length =
                    usize::try_from(anim_length).map_err(|_| Error::InvalidCount {
                        field: "animation length",
                        count: anim_length as i64,
                        position: anim_position,
                    })?;
                let unknown2 = reader.i16("animated object")?;
                let keyframes = reader.records(anim_length)?;
                Ok(Self {
                    cross_no,
                    kind: ExtraObjectKind::Animated {
                        unknown,
                        unknown_shorts,
                        object_no,
                        unknown2,
                        keyframes,
                    },
                    geometry: ObjectGeometry::read(reader)?,
                })
            }
            other => Err(Error::UnknownExtraObjectType {
                tag: other,
                position,
            }),
        }
    }

    pub fn is_animated(&self) -> bool {
        matches!(self.kind, ExtraObjectKind::Animated { .. })
    }

    pub fn keyframes(&self) -> &[AnimKeyframe] {
        match &self.kind {
            ExtraObjectKind::Animated { keyframes, .. } => keyframes,
            ExtraObjectKind::Static { .. } => &[],
        }
    }
}

/// Count-prefixed list of extra objects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XobjBlock {
    pub obj: Vec<ExtraObject>,
}

impl XobjBlock {
    pub fn read(reader: &mut RecordReader<'_>) -> Result<Self> {
        let n_obj = reader.count("extra object")?;
        let mut obj = Vec::with_capacity(n_obj.min(4096));
        for _ in 0..n_obj {
            obj.push(ExtraObject::read(reader)?);
        }
        Ok(Self { obj })
    }
}
