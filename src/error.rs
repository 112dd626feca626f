use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Scene content could not be turned into drawable geometry.
    #[error("geometry construction failed: {0}")]
    Geometry(String),

    #[error("render backend failure: {0}")]
    Backend(String),
}
