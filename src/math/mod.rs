use binrw::binread;
use cgmath::Vector3;

/// Fixed-point positions are stored as `value * 2^16` in an i32.
pub const FIXED_POINT_SCALE: f64 = 65536.0;

/// A float position. On disk the components are ordered x, z, y; the
/// wrapped vector is already swizzled to x, y, z.
#[binread]
#[derive(Debug, Clone, Copy, PartialEq)]
#[br(little)]
pub struct FloatPoint(
    #[br(map = |raw: [f32; 3]| Vector3::new(raw[0], raw[2], raw[1]))] pub Vector3<f32>,
);

impl FloatPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vector3::new(x, y, z))
    }

    pub fn to_slice(&self) -> [f32; 3] {
        let v = &self.0;
        [v.x, v.y, v.z]
    }
}

/// A 16.16 fixed-point position, decoded to f64 so the round trip through
/// `round(x * 65536)` stays within 2^-16 for the whole i32 range.
#[binread]
#[derive(Debug, Clone, Copy, PartialEq)]
#[br(little)]
pub struct IntPoint(
    #[br(map = |raw: [i32; 3]| Vector3::new(
        raw[0] as f64 / FIXED_POINT_SCALE,
        raw[2] as f64 / FIXED_POINT_SCALE,
        raw[1] as f64 / FIXED_POINT_SCALE,
    ))]
    pub Vector3<f64>,
);

impl IntPoint {
    pub fn to_slice(&self) -> [f64; 3] {
        let v = &self.0;
        [v.x, v.y, v.z]
    }
}

/// Per-vertex shading color, stored b, g, r, a.
#[binread]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[br(little)]
pub struct VertexColor {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

impl VertexColor {
    pub fn to_rgba(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}
