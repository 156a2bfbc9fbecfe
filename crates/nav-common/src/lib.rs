//! Common utilities and data structures shared by the nav2ent crates

mod geometry;
mod vector;

pub use geometry::*;
pub use vector::*;

/// Represents a 3D position (Z-up world coordinates)
pub type Vec3 = glam::Vec3;

/// Error types for the library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid navigation file: bad magic number {0:#010x}")]
    InvalidFormat(u32),

    #[error("unsupported navigation file version {0}")]
    UnsupportedVersion(u32),

    #[error("corrupt navigation data: {0}")]
    CorruptData(String),

    #[error("corrupted info_node: {0}")]
    CorruptNode(String),

    #[error("unknown build flag '{0}'")]
    InvalidBuildFlag(char),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unsupported BSP version {0}")]
    InvalidBsp(i32),

    #[error("invalid entity data: {0}")]
    InvalidEntities(String),

    #[cfg(feature = "std")]
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for nav2ent operations
pub type Result<T> = std::result::Result<T, Error>;
