use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while decoding tracks, rebuilding meshes or packing atlases.
///
/// None of these are recoverable at the point they are raised: the track
/// format carries no checksums or sync markers, so a single bad record
/// leaves every later read misaligned.
#[derive(Debug, Error)]
pub enum Error {
    /// Fewer bytes remain than the record at `position` requires.
    #[error("truncated input at byte {position}: {record} needs {needed} bytes, {remaining} left")]
    TruncatedInput {
        record: &'static str,
        position: u64,
        needed: u64,
        remaining: u64,
    },

    /// A size or type discriminator has a value with no known layout.
    #[error("unknown {record} variant {value} at byte {position}")]
    UnknownRecordVariant {
        record: &'static str,
        value: i64,
        position: u64,
    },

    /// Redundant type tags in the same record disagree.
    #[error("inconsistent type tag at byte {position}: expected {expected}, found {found}")]
    InconsistentTypeTag {
        expected: u8,
        found: u8,
        position: u64,
    },

    #[error("unknown extra object type {tag} at byte {position}")]
    UnknownExtraObjectType { tag: i32, position: u64 },

    /// A count prefix is negative.
    #[error("invalid {field} count {count} at byte {position}")]
    InvalidCount {
        field: &'static str,
        count: i64,
        position: u64,
    },

    /// Two fields that must carry the same count do not.
    #[error("{field} mismatch at byte {position}: {first} != {second}")]
    CountMismatch {
        field: &'static str,
        first: i64,
        second: i64,
        position: u64,
    },

    #[error("polygon references vertex {index}, pool holds {pool_len}")]
    VertexOutOfRange { index: i32, pool_len: usize },

    #[error("texture {id} ({size}px) does not fit anywhere in the {atlas_size}px atlas")]
    PackingExhausted { id: i32, size: u32, atlas_size: u32 },

    #[error("invalid texture directory {}: {reason}", path.display())]
    InvalidTextureDirectory { path: PathBuf, reason: String },

    #[error("texture {id} is {width}x{height}: {reason}")]
    DimensionMismatch {
        id: i32,
        width: u32,
        height: u32,
        reason: &'static str,
    },

    #[error("atlas size {size} is not a power of two of at least {min}")]
    InvalidAtlasSize { size: u32, min: u32 },

    /// A texture table entry in use has no tile in the atlas.
    #[error("texture usage {usage} refers to file {texture}, which is not in the atlas")]
    MissingAtlasTexture { usage: usize, texture: u16 },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Low-level read failure that is not a short read.
    #[error("binary read error: {0}")]
    Binary(binrw::Error),
}

/// Result type for track decoding and atlas packing
pub type Result<T> = std::result::Result<T, Error>;
