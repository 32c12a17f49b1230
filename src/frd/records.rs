//! Fixed-size records of the track container.
//!
//! Sizes, in bytes:
//! ```text
//! FloatPoint 12   IntPoint 12   VertexColor 4   PolygonRecord 14
//! NeighborData 4  PositionData 8  PolyVroadData 8  VroadData 12
//! RefXobj 20      SoundSource 16  LightSource 16   AnimKeyframe 20
//! TextureEntry 47
//! ```

use binrw::binread;

use super::reader::Record;
use crate::math::{FloatPoint, IntPoint, VertexColor};

/// Flag bit marking a polygon as visible from both sides.
pub const POLYGON_DOUBLE_SIDED: u8 = 0x10;

impl Record for FloatPoint {
    const NAME: &'static str = "float point";
    const SIZE: usize = 12;
}

impl Record for IntPoint {
    const NAME: &'static str = "fixed-point point";
    const SIZE: usize = 12;
}

impl Record for VertexColor {
    const NAME: &'static str = "vertex color";
    const SIZE: usize = 4;
}

/// A quad referencing four vertices of the pool that owns it.
#[binread]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[br(little)]
pub struct PolygonRecord {
    pub vertex: [i16; 4],
    /// Usage id into the track's texture table.
    pub texture: u16,
    pub unknown: i16,
    pub flags: u8,
    pub unknown2: u8,
}

impl PolygonRecord {
    pub fn is_double_sided(&self) -> bool {
        self.flags & POLYGON_DOUBLE_SIDED != 0
    }
}

impl Record for PolygonRecord {
    const NAME: &'static str = "polygon";
    const SIZE: usize = 14;
}

#[binread]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[br(little)]
pub struct NeighborData {
    #[br(pad_after = 2)]
    pub block: i16,
}

impl Record for NeighborData {
    const NAME: &'static str = "neighbor";
    const SIZE: usize = 4;
}

#[binread]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[br(little)]
pub struct PositionData {
    pub polygon: i16,
    #[br(pad_after = 1)]
    pub polygon_count: u8,
    pub extra_neighbor1: i16,
    pub extra_neighbor2: i16,
}

impl Record for PositionData {
    const NAME: &'static str = "position";
    const SIZE: usize = 8;
}

#[binread]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[br(little)]
pub struct PolyVroadData {
    pub vroad_entry: u8,
    #[br(pad_after = 6)]
    pub flags: u8,
}

impl Record for PolyVroadData {
    const NAME: &'static str = "poly-vroad link";
    const SIZE: usize = 8;
}

/// Virtual road normal and forward vectors, both stored x, z, y.
#[binread]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[br(little)]
pub struct VroadData {
    pub x_norm: i16,
    pub z_norm: i16,
    pub y_norm: i16,
    pub x_forw: i16,
    pub z_forw: i16,
    pub y_forw: i16,
}

impl Record for VroadData {
    const NAME: &'static str = "vroad";
    const SIZE: usize = 12;
}

/// Reference from a track block to a global extra object.
#[binread]
#[derive(Debug, Clone, Copy, PartialEq)]
#[br(little)]
pub struct RefXobj {
    pub point: IntPoint,
    #[br(pad_before = 2)]
    pub global_no: i16,
    #[br(pad_before = 2, pad_after = 1)]
    pub cross_index: u8,
}

impl Record for RefXobj {
    const NAME: &'static str = "extra object reference";
    const SIZE: usize = 20;
}

#[binread]
#[derive(Debug, Clone, Copy, PartialEq)]
#[br(little)]
pub struct SoundSource {
    pub refpoint: IntPoint,
    pub kind: i32,
}

impl Record for SoundSource {
    const NAME: &'static str = "sound source";
    const SIZE: usize = 16;
}

#[binread]
#[derive(Debug, Clone, Copy, PartialEq)]
#[br(little)]
pub struct LightSource {
    pub refpoint: IntPoint,
    pub kind: i32,
}

impl Record for LightSource {
    const NAME: &'static str = "light source";
    const SIZE: usize = 16;
}

/// One keyframe of an animated extra object: position plus yaw as cos/sin.
#[binread]
#[derive(Debug, Clone, Copy, PartialEq)]
#[br(little)]
pub struct AnimKeyframe {
    pub point: IntPoint,
    pub cos_theta: f32,
    pub sin_theta: f32,
}

impl AnimKeyframe {
    /// Yaw angle in radians.
    pub fn angle(&self) -> f32 {
        self.sin_theta.atan2(self.cos_theta)
    }
}

impl Record for AnimKeyframe {
    const NAME: &'static str = "animation keyframe";
    const SIZE: usize = 20;
}

/// Entry of the global texture table. The index of the entry is the usage
/// id that [`PolygonRecord::texture`] refers to; `texture` is the id of the
/// image file on disk.
#[binread]
#[derive(Debug, Clone, Copy, PartialEq)]
#[br(little)]
pub struct TextureEntry {
    pub width: i16,
    pub height: i16,
    pub unknown: i32,
    /// Four (u, v) corners, flattened.
    pub corners: [f32; 8],
    pub unknown2: i32,
    #[br(map = |raw: u8| raw != 0)]
    pub is_lane: bool,
    pub texture: u16,
}

impl TextureEntry {
    pub fn uv_pairs(&self) -> [[f32; 2]; 4] {
        let c = &self.corners;
        [[c[0], c[1]], [c[2], c[3]], [c[4], c[5]], [c[6], c[7]]]
    }

    /// Corners that reach outside the source texture (tiling UVs).
    pub fn is_irregular(&self) -> bool {
        self.corners.iter().any(|&c| !(0.0..=1.0).contains(&c))
    }
}

impl Record for TextureEntry {
    const NAME: &'static str = "texture entry";
    const SIZE: usize = 47;
}
