// Software implementation of `Surface` over an ARGB frame buffer.
// Visual expectations:
// - stroke() paints the whole current path with anti-aliased edges.
// - round caps turn a zero-length segment into a dot (that's how a tap shows up).
// - fill_rect/clear_rect work in logical units, scaled like a canvas context.

use crate::config::{LineCap, LineJoin};
use crate::gamma::GammaLut;
use crate::model::Point;
use crate::surface::{RasterSource, StrokeStyle, Surface};
use crate::types::{Color, FrameBuffer, Mask, Rect};
use tracing::warn;

/// Max segments a quadratic curve is flattened into.
const MAX_CURVE_STEPS: usize = 32;
/// Target length of one flattened piece, in device pixels.
const CURVE_STEP_PX: f64 = 2.0;

pub struct RasterSurface {
    frame: FrameBuffer,
    lut: GammaLut,
    scale: f64,                        // uniform context transform
    subpaths: Vec<Vec<(f64, f64)>>,    // current path, already in device pixels
    stroke_style: StrokeStyle,
    stroke_argb: u32,
    fill_argb: u32,
    cursor: String,
    display: (Option<f64>, Option<f64>),
    origin: (f64, f64),
}

fn parse_or_black(color: &str) -> u32 {
    match Color::parse(color) {
        Some(c) => c.to_argb(),
        None => {
            warn!(color, "unrecognised colour, painting black instead");
            Color::BLACK.to_argb()
        }
    }
}

impl RasterSurface {
    pub fn new() -> Self {
        Self {
            frame: FrameBuffer::transparent(0, 0),
            lut: GammaLut::new(),
            scale: 1.0,
            subpaths: Vec::new(),
            stroke_style: StrokeStyle {
                width: 1.0,
                cap: LineCap::Butt,
                join: LineJoin::Miter,
                color: "#000000".into(),
                shadow_blur: 0.0,
                shadow_color: "#000000".into(),
            },
            stroke_argb: Color::BLACK.to_argb(),
            fill_argb: Color::BLACK.to_argb(),
            cursor: "default".into(),
            display: (None, None),
            origin: (0.0, 0.0),
        }
    }

    /// Where the surface sits in client coordinates (window/page offset).
    pub fn set_origin(&mut self, left: f64, top: f64) {
        self.origin = (left, top);
    }

    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    #[inline]
    fn to_device(&self, p: Point) -> (f64, f64) {
        (p.x() * self.scale, p.y() * self.scale)
    }

    /// Canvas rule: drawing with no open subpath starts one at that point.
    fn ensure_subpath(&mut self, at: (f64, f64)) {
        if self.subpaths.is_empty() {
            self.subpaths.push(vec![at]);
        }
    }

    fn push_point(&mut self, at: (f64, f64)) {
        match self.subpaths.last_mut() {
            Some(sub) => sub.push(at),
            None => self.subpaths.push(vec![at]),
        }
    }

    /// Half-width and edge feather in device pixels.
    fn pen(&self) -> (f64, f64) {
        let hw = (self.stroke_style.width * self.scale / 2.0).max(0.0);
        let feather = 0.5 + self.stroke_style.shadow_blur * self.scale * 0.5;
        (hw, feather)
    }

    /// Accumulate coverage for one segment into `mask`.
    fn cover_segment(&self, mask: &mut Mask, a: (f64, f64), b: (f64, f64), cap: LineCap) {
        let (hw, f) = self.pen();
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 && cap == LineCap::Butt {
            return;
        }
        // Unit direction; a dot still needs an axis for its square cap.
        let (ux, uy) = if len > 0.0 { (dx / len, dy / len) } else { (1.0, 0.0) };
        let ext = if cap == LineCap::Square { hw } else { 0.0 };

        let pad = hw + f + 1.0;
        let x0 = (a.0.min(b.0) - pad).floor().max(0.0) as usize;
        let y0 = (a.1.min(b.1) - pad).floor().max(0.0) as usize;
        let x1 = ((a.0.max(b.0) + pad).ceil().max(0.0) as usize).min(mask.width);
        let y1 = ((a.1.max(b.1) + pad).ceil().max(0.0) as usize).min(mask.height);
        let ramp = |d: f64| ((d + f) / (2.0 * f)).clamp(0.0, 1.0);

        for y in y0..y1 {
            for x in x0..x1 {
                // Sample at the pixel centre.
                let (px, py) = (x as f64 + 0.5 - a.0, y as f64 + 0.5 - a.1);
                let u = px * ux + py * uy;   // along the segment
                let v = -px * uy + py * ux;  // across it
                let cov = match cap {
                    LineCap::Round => {
                        let t = u.clamp(0.0, len);
                        let d = ((u - t) * (u - t) + v * v).sqrt();
                        ramp(hw - d)
                    }
                    LineCap::Butt | LineCap::Square => {
                        let along = ramp((u + ext).min(len + ext - u));
                        let across = ramp(hw - v.abs());
                        along.min(across)
                    }
                };
                if cov > 0.0 {
                    mask.cover(x, y, cov as f32);
                }
            }
        }
    }

    fn device_rect(&self, x: f64, y: f64, w: f64, h: f64) -> (usize, usize, usize, usize) {
        let s = self.scale;
        let (mut ax, mut bx) = (x * s, (x + w) * s);
        let (mut ay, mut by) = (y * s, (y + h) * s);
        if ax > bx {
            std::mem::swap(&mut ax, &mut bx);
        }
        if ay > by {
            std::mem::swap(&mut ay, &mut by);
        }
        let clamp_x = |v: f64| (v.max(0.0) as usize).min(self.frame.width);
        let clamp_y = |v: f64| (v.max(0.0) as usize).min(self.frame.height);
        (clamp_x(ax.floor()), clamp_y(ay.floor()), clamp_x(bx.ceil()), clamp_y(by.ceil()))
    }
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for RasterSurface {
    fn backing_size(&self) -> (u32, u32) {
        (self.frame.width as u32, self.frame.height as u32)
    }

    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.frame = FrameBuffer::transparent(width as usize, height as usize);
        self.scale = 1.0;
        self.subpaths.clear();
    }

    fn display_size(&self) -> (f64, f64) {
        (
            self.display.0.unwrap_or(self.frame.width as f64),
            self.display.1.unwrap_or(self.frame.height as f64),
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
        // Only uniform scaling is modelled; the panel never scales axes apart.
        self.scale *= (sx + sy) / 2.0;
    }

    fn begin_path(&mut self) {
        self.subpaths.clear();
    }

    fn move_to(&mut self, p: Point) {
        let at = self.to_device(p);
        self.subpaths.push(vec![at]);
    }

    fn line_to(&mut self, p: Point) {
        let at = self.to_device(p);
        self.push_point(at);
    }

    fn quadratic_curve_to(&mut self, control: Point, to: Point) {
        let c = self.to_device(control);
        let e = self.to_device(to);
        self.ensure_subpath(c);
        let Some(&s) = self.subpaths.last().and_then(|sub| sub.last()) else {
            return;
        };
        let rough_len = ((c.0 - s.0).hypot(c.1 - s.1)) + ((e.0 - c.0).hypot(e.1 - c.1));
        let steps = ((rough_len / CURVE_STEP_PX).ceil() as usize).clamp(1, MAX_CURVE_STEPS);
        for i in 1..=steps {
            let t = i as f64 / steps as f64;
            let mt = 1.0 - t;
            let x = mt * mt * s.0 + 2.0 * mt * t * c.0 + t * t * e.0;
            let y = mt * mt * s.1 + 2.0 * mt * t * c.1 + t * t * e.1;
            self.push_point((x, y));
        }
    }

    fn stroke(&mut self) {
        let mut mask = Mask::new(self.frame.width, self.frame.height);
        let cap = self.stroke_style.cap;
        let (hw, _) = self.pen();
        for sub in &self.subpaths {
            for pair in sub.windows(2) {
                self.cover_segment(&mut mask, pair[0], pair[1], cap);
            }
            // Joins are always rendered round: a dot of pen width on every inner vertex.
            if hw > 0.0 && sub.len() > 2 {
                for &v in &sub[1..sub.len() - 1] {
                    self.cover_segment(&mut mask, v, v, LineCap::Round);
                }
            }
        }
        for (px, &a) in self.frame.pixels.iter_mut().zip(mask.alpha.iter()) {
            if a > 0.0 {
                *px = self.lut.blend_over(*px, self.stroke_argb, a);
            }
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let (x0, y0, x1, y1) = self.device_rect(x, y, width, height);
        for row in y0..y1 {
            let ofs = row * self.frame.width;
            for px in &mut self.frame.pixels[ofs + x0..ofs + x1] {
                *px = self.lut.blend_over(*px, self.fill_argb, 1.0);
            }
        }
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let (x0, y0, x1, y1) = self.device_rect(x, y, width, height);
        for row in y0..y1 {
            let ofs = row * self.frame.width;
            self.frame.pixels[ofs + x0..ofs + x1].fill(0);
        }
    }

    fn set_stroke_style(&mut self, style: &StrokeStyle) {
        if style.color != self.stroke_style.color {
            self.stroke_argb = parse_or_black(&style.color);
        }
        self.stroke_style = style.clone();
    }

    fn set_fill_style(&mut self, color: &str) {
        self.fill_argb = parse_or_black(color);
    }

    fn set_cursor(&mut self, cursor: &str) {
        self.cursor = cursor.to_string();
    }
}

impl RasterSource for RasterSurface {
    fn frame(&self) -> &FrameBuffer {
        &self.frame
    }
}
