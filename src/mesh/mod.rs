//! Rebuild compact quad meshes from polygons that index a shared vertex pool.
//!
//! Track segments store one vertex pool per block and several polygon lists
//! that index into it. A mesh keeps only the referenced vertices, renumbered
//! densely, so each polygon list can be exported on its own. The shared
//! pools are only read, so independent chunks can be rebuilt in parallel.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::frd::{ObjectGeometry, PolyObject, PolygonChunk, PolygonRecord, TrackBlock};
use crate::math::{FloatPoint, VertexColor};

/// A deduplicated quad mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// Referenced vertices, as x, y, z.
    pub vertices: Vec<[f32; 3]>,
    /// Shading colors parallel to `vertices`, as r, g, b, a.
    pub shading: Option<Vec<[u8; 4]>>,
    /// One quad per source polygon, indexing `vertices`.
    pub quads: Vec<[u32; 4]>,
    /// Texture usage id of each quad.
    pub face_textures: Vec<u16>,
    pub double_sided: Vec<bool>,
    /// Distinct texture usage ids, for material slot bucketing.
    pub textures: BTreeSet<u16>,
    /// Pool index each vertex was taken from.
    pub source_indices: Vec<u32>,
}

/// Reverse the corner order of a quad.
pub fn flip_quad(quad: [u32; 4]) -> [u32; 4] {
    [quad[3], quad[2], quad[1], quad[0]]
}

/// Distinct pool indices referenced by `polys`.
pub fn vertex_set(polys: &[PolygonRecord], pool_len: usize) -> Result<BTreeSet<u32>> {
    let mut set = BTreeSet::new();
    for poly in polys {
        for &index in &poly.vertex {
            if index < 0 || index as usize >= pool_len {
                return Err(Error::VertexOutOfRange {
                    index: index as i32,
                    pool_len,
                });
            }
            set.insert(index as u32);
        }
    }
    Ok(set)
}

/// Build a mesh from `polys`, gathering only the vertices they reference.
///
/// Slots are assigned in ascending pool index order. With `flip` every quad
/// is emitted reversed, turning its front face without touching the pool.
pub fn reconstruct(
    polys: &[PolygonRecord],
    vertices: &[FloatPoint],
    flip: bool,
    shading: Option<&[VertexColor]>,
) -> Result<Mesh> {
    let pool_len = match shading {
        Some(colors) => vertices.len().min(colors.len()),
        None => vertices.len(),
    };
    let set = vertex_set(polys, pool_len)?;

    let remap: BTreeMap<u32, u32> = set
        .iter()
        .enumerate()
        .map(|(slot, &index)| (index, slot as u32))
        .collect();
    let source_indices: Vec<u32> = set.into_iter().collect();

    let gathered = source_indices
        .iter()
        .map(|&i| vertices[i as usize].to_slice())
        .collect();
    let gathered_shading = shading.map(|colors| {
        source_indices
            .iter()
            .map(|&i| colors[i as usize].to_rgba())
            .collect()
    });

    let mut quads = Vec::with_capacity(polys.len());
    let mut face_textures = Vec::with_capacity(polys.len());
    let mut double_sided = Vec::with_capacity(polys.len());
    let mut textures = BTreeSet::new();
    for poly in polys {
        // every index was validated by vertex_set
        let quad = poly.vertex.map(|v| remap[&(v as u32)]);
        quads.push(if flip { flip_quad(quad) } else { quad });
        face_textures.push(poly.texture);
        double_sided.push(poly.is_double_sided());
        textures.insert(poly.texture);
    }

    Ok(Mesh {
        vertices: gathered,
        shading: gathered_shading,
        quads,
        face_textures,
        double_sided,
        textures,
        source_indices,
    })
}

impl Mesh {
    /// Split every quad (a, b, c, d) into (a, b, c) and (c, d, a).
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        self.quads
            .iter()
            .flat_map(|&[a, b, c, d]| [[a, b, c], [c, d, a]])
            .collect()
    }

    /// Quads that use the given texture usage id.
    pub fn quads_with_texture(&self, texture: u16) -> impl Iterator<Item = &[u32; 4]> {
        self.quads
            .iter()
            .zip(&self.face_textures)
            .filter(move |(_, t)| **t == texture)
            .map(|(quad, _)| quad)
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.quads)
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }
}

impl PolygonChunk {
    /// Mesh of this chunk over the vertex pool of its track block.
    pub fn to_mesh(&self, block: &TrackBlock, flip: bool, with_shading: bool) -> Result<Mesh> {
        let shading = with_shading.then_some(block.shading.as_slice());
        reconstruct(&self.poly, &block.vertices, flip, shading)
    }
}

impl PolyObject {
    pub fn to_mesh(&self, block: &TrackBlock, flip: bool, with_shading: bool) -> Result<Mesh> {
        let shading = with_shading.then_some(block.shading.as_slice());
        reconstruct(self.polygons(), &block.vertices, flip, shading)
    }
}

impl ObjectGeometry {
    /// Mesh of an extra object over its own vertex pool.
    pub fn to_mesh(&self, flip: bool, with_shading: bool) -> Result<Mesh> {
        let shading = with_shading.then_some(self.shading.as_slice());
        reconstruct(&self.polygons, &self.vertices, flip, shading)
    }
}
