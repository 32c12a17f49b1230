//! Decoder for FRD track containers, quad mesh reconstruction over their
//! shared vertex pools, and a quadtree texture atlas packer that remaps
//! per-texture UVs into atlas space.

pub mod error;
pub mod frd;
pub mod math;
pub mod mesh;
pub mod texture_pipeline;

pub use error::{Error, Result};
pub use frd::{decode, load, TrackFile};
