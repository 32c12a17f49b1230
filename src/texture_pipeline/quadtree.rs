//! Quadtree tile allocator over a square power-of-two canvas.
//!
//! Nodes live in an arena and are addressed by index. Children are created
//! the first time a node is descended into, in quadrant order top-left,
//! top-right, bottom-left, bottom-right.
//!
//! A node is `free` until a texture is placed on it. It is `dirty` once it
//! or any descendant holds a texture; the flag is set on the way back up
//! from a successful placement. A dirty node never takes a texture of its
//! own size, so a placement can never cover an occupied descendant.

use super::tile::MIN_TILE_SIZE;

pub type NodeId = usize;

pub const ROOT: NodeId = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadNode {
    pub x: u32,
    pub y: u32,
    pub size: u32,
    pub children: Option<[NodeId; 4]>,
    pub free: bool,
    pub dirty: bool,
    /// Texture id placed on this node.
    pub texture: Option<i32>,
}

impl QuadNode {
    fn new(x: u32, y: u32, size: u32) -> Self {
        Self {
            x,
            y,
            size,
            children: None,
            free: true,
            dirty: false,
            texture: None,
        }
    }

    /// Minimum-size nodes are never split and take any texture that fits.
    pub fn is_leaf(&self) -> bool {
        self.size <= MIN_TILE_SIZE
    }
}

#[derive(Debug, Clone)]
pub struct QuadTree {
    nodes: Vec<QuadNode>,
}

impl QuadTree {
    pub fn new(size: u32) -> Self {
        Self {
            nodes: vec![QuadNode::new(0, 0, size)],
        }
    }

    pub fn size(&self) -> u32 {
        self.nodes[ROOT].size
    }

    pub fn node(&self, id: NodeId) -> &QuadNode {
        &self.nodes[id]
    }

    /// Nodes currently holding a texture.
    pub fn occupied(&self) -> impl Iterator<Item = &QuadNode> {
        self.nodes.iter().filter(|node| !node.free)
    }

    /// Place a texture of edge `size` and return the node that took it.
    pub fn insert(&mut self, texture: i32, size: u32) -> Option<NodeId> {
        self.insert_at(ROOT, texture, size)
    }

    fn insert_at(&mut self, id: NodeId, texture: i32, size: u32) -> Option<NodeId> {
        let node = &self.nodes[id];
        if !node.free || node.size < size {
            return None;
        }
        if (node.size == size && !node.dirty) || node.is_leaf() {
            let node = &mut self.nodes[id];
            node.free = false;
            node.dirty = true;
            node.texture = Some(texture);
            return Some(id);
        }

        for child in self.children(id) {
            if let Some(placed) = self.insert_at(child, texture, size) {
                self.nodes[id].dirty = true;
                return Some(placed);
            }
        }
        None
    }

    fn children(&mut self, id: NodeId) -> [NodeId; 4] {
        if let Some(children) = self.nodes[id].children {
            return children;
        }
        let QuadNode { x, y, size, .. } = self.nodes[id];
        let half = size / 2;
        let first = self.nodes.len();
        self.nodes.extend([
            QuadNode::new(x, y, half),
            QuadNode::new(x + half, y, half),
            QuadNode::new(x, y + half, half),
            QuadNode::new(x + half, y + half, half),
        ]);
        let children = [first, first + 1, first + 2, first + 3];
        self.nodes[id].children = Some(children);
        children
    }
}
