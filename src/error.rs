use derive_more::Display;

pub type Result<T> = core::result::Result<T, GyroidError>;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[display("{self:?}")]
pub enum GyroidError {
    /// A lattice step component is zero or negative.
    InvalidStep,
    /// The marching box needs corners the volume does not hold.
    InvalidBounds,
    InvalidCorners,
    /// Vertex count is not a multiple of three.
    IncompleteTriangle,
    EmptyPalette,
    InvalidViewport,
}

impl std::error::Error for GyroidError {}
