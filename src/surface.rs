// The drawing surface the panel paints onto, as seen by the engine.
// A canvas-style immediate-mode API: path building, stroke, rect fills, style state.

use crate::config::{LineCap, LineJoin, LineStyle};
use crate::model::Point;
use crate::types::{FrameBuffer, Rect};

/// Everything `stroke()` needs to know about how to paint the current path.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub color: String,
    pub shadow_blur: f64,
    pub shadow_color: String,
}

impl StrokeStyle {
    /// Style for painting with `source`. The shadow is a 1px glow in the line colour.
    pub fn from_line_style<L: LineStyle + ?Sized>(source: &L) -> Self {
        Self {
            width: source.line_width(),
            cap: source.line_cap(),
            join: source.line_join(),
            color: source.line_color().to_string(),
            shadow_blur: 1.0,
            shadow_color: source.line_color().to_string(),
        }
    }
}

pub trait Surface {
    /// False when the host can't provide a 2D context; the panel refuses to build.
    fn supports_2d(&self) -> bool {
        true
    }

    /// Backing-store size in physical pixels.
    fn backing_size(&self) -> (u32, u32);

    /// Resizes the backing store. Like a canvas, this clears it and resets the transform.
    fn set_backing_size(&mut self, width: u32, height: u32);

    /// Size the surface is displayed at (CSS pixels).
    fn display_size(&self) -> (f64, f64);

    /// `None` restores the natural size for that axis.
    fn set_display_size(&mut self, width: Option<f64>, height: Option<f64>);

    fn bounding_rect(&self) -> Rect;

    fn scale(&mut self, sx: f64, sy: f64);

    fn begin_path(&mut self);
    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    fn quadratic_curve_to(&mut self, control: Point, to: Point);
    fn stroke(&mut self);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn set_stroke_style(&mut self, style: &StrokeStyle);
    fn set_fill_style(&mut self, color: &str);
    fn set_cursor(&mut self, cursor: &str);
}

/// Surfaces whose pixels can be read back (needed for image export).
pub trait RasterSource {
    fn frame(&self) -> &FrameBuffer;
}

/// One call made against a [`CommandLog`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    SetBackingSize(u32, u32),
    Scale(f64, f64),
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    QuadraticCurveTo(Point, Point),
    Stroke,
    FillRect(f64, f64, f64, f64),
    ClearRect(f64, f64, f64, f64),
    StrokeStyle(StrokeStyle),
    FillStyle(String),
    Cursor(String),
}

/// A surface that only records what was asked of it.
/// Handy for checking the exact command stream the engine emits.
#[derive(Clone, Debug)]
pub struct CommandLog {
    commands: Vec<DrawCommand>,
    backing: (u32, u32),
    display: (Option<f64>, Option<f64>),
    origin: (f64, f64),
    supports_2d: bool,
}

impl CommandLog {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            backing: (0, 0),
            display: (None, None),
            origin: (0.0, 0.0),
            supports_2d: true,
        }
    }

    /// A host without 2D support.
    pub fn without_2d() -> Self {
        Self { supports_2d: false, ..Self::new() }
    }

    /// Place the surface at (left, top) in client coordinates.
    pub fn with_origin(mut self, left: f64, top: f64) -> Self {
        self.origin = (left, top);
        self
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for CommandLog {
    fn supports_2d(&self) -> bool {
        self.supports_2d
    }

    fn backing_size(&self) -> (u32, u32) {
        self.backing
    }

    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.backing = (width, height);
        self.commands.push(DrawCommand::SetBackingSize(width, height));
    }

    fn display_size(&self) -> (f64, f64) {
        (
            self.display.0.unwrap_or(self.backing.0 as f64),
            self.display.1.unwrap_or(self.backing.1 as f64),
        )
    }

    fn set_display_size(&mut self, width: Option<f64>, height: Option<f64>) {
        self.display = (width, height);
    }

    fn bounding_rect(&self) -> Rect {
        let (width, height) = self.display_size();
        Rect { left: self.origin.0, top: self.origin.1, width, height }
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.commands.push(DrawCommand::Scale(sx, sy));
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, p: Point) {
        self.commands.push(DrawCommand::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.commands.push(DrawCommand::LineTo(p));
    }

    fn quadratic_curve_to(&mut self, control: Point, to: Point) {
        self.commands.push(DrawCommand::QuadraticCurveTo(control, to));
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::FillRect(x, y, width, height));
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::ClearRect(x, y, width, height));
    }

    fn set_stroke_style(&mut self, style: &StrokeStyle) {
        self.commands.push(DrawCommand::StrokeStyle(style.clone()));
    }

    fn set_fill_style(&mut self, color: &str) {
        self.commands.push(DrawCommand::FillStyle(color.to_string()));
    }

    fn set_cursor(&mut self, cursor: &str) {
        self.commands.push(DrawCommand::Cursor(cursor.to_string()));
    }
}
