// Shared builders for synthetic track files and texture directories
#![allow(dead_code)]

use std::path::Path;

use image::{GrayImage, Luma, Rgb, RgbImage};

pub const HEADER: [u8; 28] = *b"FRD synthetic test header!!\0";

#[derive(Debug, Clone, Copy)]
pub struct PolyFixture {
    pub vertex: [i16; 4],
    pub texture: u16,
    pub flags: u8,
}

pub fn poly(vertex: [i16; 4], texture: u16) -> PolyFixture {
    PolyFixture {
        vertex,
        texture,
        flags: 0,
    }
}

/// One track segment: its block and the polygon block that goes with it.
#[derive(Debug, Clone, Default)]
pub struct SegmentFixture {
    /// Logical x, y, z; written to disk as x, z, y.
    pub vertices: Vec<[f32; 3]>,
    /// Cross-reference size tag and optional cross index.
    pub cross_refs: Vec<(i16, Option<i32>)>,
    pub chunks: [Vec<PolyFixture>; 7],
    /// Polygon lists of type-1 objects in object group 0.
    pub objects: Vec<Vec<PolyFixture>>,
}

#[derive(Debug, Clone)]
pub enum XobjFixture {
    Static {
        vertices: Vec<[f32; 3]>,
        polygons: Vec<PolyFixture>,
    },
    Animated {
        inner_tag: u8,
        frames: i16,
        vertices: Vec<[f32; 3]>,
        polygons: Vec<PolyFixture>,
    },
    Unknown(i32),
}

#[derive(Debug, Clone, Copy)]
pub struct TextureFixture {
    pub texture: u16,
    pub corners: [f32; 8],
}

pub const UNIT_CORNERS: [f32; 8] = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];

#[derive(Debug, Clone, Default)]
pub struct TrackFixture {
    pub segments: Vec<SegmentFixture>,
    /// Extra object blocks, padded with empty blocks to 4 * segments + 1.
    pub xobjs: Vec<Vec<XobjFixture>>,
    pub textures: Vec<TextureFixture>,
}

#[derive(Default)]
pub struct Writer {
    pub bytes: Vec<u8>,
}

impl Writer {
    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i16(&mut self, v: i16) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.bytes.push(v);
        self
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn zeros(&mut self, n: usize) -> &mut Self {
        self.bytes.resize(self.bytes.len() + n, 0);
        self
    }

    fn float_point(&mut self, [x, y, z]: [f32; 3]) -> &mut Self {
        self.f32(x).f32(z).f32(y)
    }

    fn pool(&mut self, vertices: &[[f32; 3]]) {
        for &v in vertices {
            self.float_point(v);
        }
        for i in 0..vertices.len() {
            self.u8(i as u8).u8(0x80).u8(0xFF - i as u8).u8(0xFF);
        }
    }

    pub fn polygon(&mut self, p: &PolyFixture) -> &mut Self {
        for v in p.vertex {
            self.i16(v);
        }
        self.u16(p.texture).i16(0).u8(p.flags).u8(0)
    }

    pub fn track_block(&mut self, segment: &SegmentFixture) {
        for _ in 0..5 {
            self.float_point([0.0; 3]);
        }
        self.i32(segment.vertices.len() as i32);
        self.i32(segment.vertices.len() as i32).i32(0).i32(0).i32(0).i32(0);
        self.pool(&segment.vertices);
        self.zeros(300 * 4);

        self.i32(0); // start position
        self.i32(0).i32(0).i32(0).i32(0);
        self.i32(segment.cross_refs.len() as i32);
        self.i32(0).i32(0);

        // records sit back to back inside a region of 20 bytes per record
        let start = self.bytes.len();
        for &(tag, cross_index) in &segment.cross_refs {
            self.i16(tag).u8(1).u8(2).i32(65536).i32(0).i32(-65536);
            if let Some(index) = cross_index {
                self.i32(index);
            }
        }
        let written = self.bytes.len() - start;
        self.zeros((segment.cross_refs.len() * 20).saturating_sub(written));
    }

    pub fn polygon_block(&mut self, segment: &SegmentFixture) {
        for chunk in &segment.chunks {
            self.i32(chunk.len() as i32);
            if !chunk.is_empty() {
                self.i32(chunk.len() as i32);
                for p in chunk {
                    self.polygon(p);
                }
            }
        }
        let total: usize = segment.objects.iter().map(Vec::len).sum();
        if segment.objects.is_empty() {
            self.i32(0);
        } else {
            self.i32(total.max(1) as i32).i32(segment.objects.len() as i32);
            for object in &segment.objects {
                self.i32(1).i32(object.len() as i32);
                for p in object {
                    self.polygon(p);
                }
            }
        }
        for _ in 1..4 {
            self.i32(0);
        }
    }

    fn geometry(&mut self, vertices: &[[f32; 3]], polygons: &[PolyFixture]) {
        self.i32(vertices.len() as i32);
        self.pool(vertices);
        self.i32(polygons.len() as i32);
        for p in polygons {
            self.polygon(p);
        }
    }

    pub fn xobj_block(&mut self, objects: &[XobjFixture]) {
        self.i32(objects.len() as i32);
        for (no, object) in objects.iter().enumerate() {
            match object {
                XobjFixture::Static { vertices, polygons } => {
                    self.i32(4).i32(no as i32).i32(0);
                    self.float_point([1.0, 2.0, 3.0]).i32(0);
                    self.geometry(vertices, polygons);
                }
                XobjFixture::Animated {
                    inner_tag,
                    frames,
                    vertices,
                    polygons,
                } => {
                    self.i32(3).i32(no as i32).i32(0).zeros(18);
                    self.u8(*inner_tag).u8(no as u8).i16(*frames).i16(0);
                    for i in 0..(*frames).max(0) {
                        self.i32(i as i32 * 65536).i32(0).i32(0).f32(1.0).f32(0.0);
                    }
                    self.geometry(vertices, polygons);
                }
                XobjFixture::Unknown(tag) => {
                    self.i32(*tag);
                }
            }
        }
    }

    pub fn texture(&mut self, t: &TextureFixture) -> &mut Self {
        self.i16(64).i16(64).i32(0);
        for c in t.corners {
            self.f32(c);
        }
        self.i32(0).u8(0).u16(t.texture)
    }
}

impl TrackFixture {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::default();
        w.bytes.extend_from_slice(&HEADER);
        w.i32(self.segments.len() as i32 - 1);
        for segment in &self.segments {
            w.track_block(segment);
        }
        for segment in &self.segments {
            w.polygon_block(segment);
        }
        let xobj_count = 4 * self.segments.len() + 1;
        for i in 0..xobj_count {
            w.xobj_block(self.xobjs.get(i).map(Vec::as_slice).unwrap_or(&[]));
        }
        w.i32(self.textures.len() as i32);
        for t in &self.textures {
            w.texture(t);
        }
        w.bytes
    }
}

/// A single segment with a quad strip over four vertices.
pub fn one_segment_track() -> TrackFixture {
    let mut segment = SegmentFixture {
        vertices: vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
            [5.0, 5.0, 5.0],
        ],
        ..Default::default()
    };
    segment.chunks[4] = vec![poly([0, 1, 2, 3], 1)];
    TrackFixture {
        segments: vec![segment],
        xobjs: Vec::new(),
        textures: vec![
            TextureFixture {
                texture: 100,
                corners: UNIT_CORNERS,
            },
            TextureFixture {
                texture: 101,
                corners: UNIT_CORNERS,
            },
        ],
    }
}

/// Write `<id>.png` filled with `color` and `<id>-a.png` from `mask`.
pub fn write_texture_pair(dir: &Path, id: i32, size: u32, color: [u8; 3], mask: &GrayImage) {
    RgbImage::from_pixel(size, size, Rgb(color))
        .save(dir.join(format!("{}.png", id)))
        .unwrap();
    mask.save(dir.join(format!("{}-a.png", id))).unwrap();
}

pub fn opaque_mask(size: u32) -> GrayImage {
    GrayImage::from_pixel(size, size, Luma([255]))
}

/// A mask with a transparent top-left pixel.
pub fn cutout_mask(size: u32) -> GrayImage {
    let mut mask = opaque_mask(size);
    mask.put_pixel(0, 0, Luma([0]));
    mask
}
