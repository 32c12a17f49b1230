//! Texture loading and quadtree atlas packing.

pub mod atlas;
pub mod mapping;
pub mod pair;
pub mod quadtree;
pub mod tile;

pub use atlas::{AtlasOptions, AtlasPacker, Placement};
pub use mapping::{AtlasMapping, AtlasMappingEntry};
pub use pair::{load_directory, load_pair, TexturePair};
pub use quadtree::QuadTree;
