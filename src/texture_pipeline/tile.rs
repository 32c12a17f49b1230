use crate::error::{Error, Result};

/// Smallest quadtree tile; nodes of this size are never subdivided.
pub const MIN_TILE_SIZE: u32 = 8;

/// Whether `n` can be the edge of an atlas or a quadtree node.
pub fn is_node_edge(n: u32) -> bool {
    n >= MIN_TILE_SIZE && n.is_power_of_two()
}

/// Edge of the smallest node that can hold a texture of edge `n`.
pub fn node_edge(n: u32) -> u32 {
    n.max(MIN_TILE_SIZE)
        .checked_next_power_of_two()
        .unwrap_or(1 << 31)
}

/// Validate that a texture is a square power-of-two tile and return its edge.
pub fn tile_size(id: i32, width: u32, height: u32) -> Result<u32> {
    if width != height {
        return Err(Error::DimensionMismatch {
            id,
            width,
            height,
            reason: "texture is not square",
        });
    }
    if !width.is_power_of_two() {
        return Err(Error::DimensionMismatch {
            id,
            width,
            height,
            reason: "edge is not a power of two",
        });
    }
    Ok(width)
}

/// Smallest power-of-two canvas whose area covers every tile and whose edge
/// fits the largest one. Packing can still fail at this size when the
/// insertion order fragments the tree.
pub fn smallest_atlas_size(sizes: impl IntoIterator<Item = u32>) -> u32 {
    let mut area: u64 = 0;
    let mut largest = MIN_TILE_SIZE;
    for size in sizes {
        area += size as u64 * size as u64;
        largest = largest.max(size);
    }
    let mut edge = node_edge(largest);
    while (edge as u64) * (edge as u64) < area {
        edge *= 2;
    }
    edge
}
