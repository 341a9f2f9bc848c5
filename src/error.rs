// One error type for the whole panel.
// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The host surface can't do 2D drawing at all.
    #[error("Surface init error: {0}")]
    SurfaceInit(String),
    /// Option validation failed while building the panel config.
    #[error("Config error: {0}")]
    Config(String),
    /// A coordinate pair was not a pair of finite numbers.
    #[error("Invalid point: ({x}, {y})")]
    InvalidPoint { x: f64, y: f64 },
    /// An input event didn't carry what its kind promises (e.g. no touches).
    #[error("Input event error: {0}")]
    InputEvent(String),
    /// Encoding, decoding or saving the panel image failed.
    #[error("Export error: {0}")]
    Export(String),
    /// Creating the demo window failed
    #[error("Window init error: {0}")]
    WindowInit(String),
    /// Updating the demo window buffer failed
    #[error("Window update error: {0}")]
    WindowUpdate(String),
}

pub type Result<T> = std::result::Result<T, Error>;
