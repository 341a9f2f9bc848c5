//! A writing/signature panel: captures pointer or touch strokes onto a 2D
//! surface, keeps an undoable stroke history, replays it, and exports the
//! result as PNG or JPEG.
//!
//! The drawing target is abstracted behind [`Surface`]. [`RasterSurface`]
//! paints real pixels; [`CommandLog`] only records calls.

pub mod capture;
pub mod config;
pub mod error;
pub mod export;
pub mod gamma;
pub mod model;
pub mod panel;
pub mod raster;
pub mod redraw;
pub mod surface;
pub mod types;

pub use capture::{CaptureEngine, CaptureState, EventKind, InputEvent, InputFamily, TouchPoint};
pub use config::{ImgType, LineCap, LineJoin, LineStyle, PanelConfig, PanelConfigOption};
pub use error::{Error, Result};
pub use export::{ExportKind, ImageBlob, ImageFile, ImageOutput};
pub use model::{Line, LineRecord, Point};
pub use panel::{HostEnv, WritingPanel};
pub use raster::RasterSurface;
pub use surface::{CommandLog, DrawCommand, RasterSource, StrokeStyle, Surface};
pub use types::FrameBuffer;
