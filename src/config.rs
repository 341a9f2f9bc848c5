// Panel configuration: raw user options in, validated PanelConfig out.
// All defaulting and coercion happens once here, never on read.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use tracing::warn;

pub const DEFAULT_BG_COLOR: &str = "#ffffff";
pub const DEFAULT_LINE_COLOR: &str = "#000000";
pub const DEFAULT_CURSOR: &str = "crosshair";
/// Largest backing-store side in physical pixels, the common browser canvas limit.
pub const MAX_BACKING_SIDE: u32 = 16_384;

/// A number, or a string that should hold one (`"300"`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberLike {
    Number(f64),
    Text(String),
}

impl NumberLike {
    /// Finite value or `default`.
    pub fn to_number(&self, default: f64) -> f64 {
        let v = match self {
            NumberLike::Number(n) => *n,
            NumberLike::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        };
        if v.is_finite() { v } else { default }
    }
}

impl From<f64> for NumberLike {
    fn from(v: f64) -> Self {
        NumberLike::Number(v)
    }
}

impl From<&str> for NumberLike {
    fn from(v: &str) -> Self {
        NumberLike::Text(v.to_string())
    }
}

fn number_or(v: Option<&NumberLike>, default: f64) -> f64 {
    v.map_or(default, |n| n.to_number(default))
}

/// Options as the user hands them over. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelConfigOption {
    pub width: Option<NumberLike>,
    pub height: Option<NumberLike>,
    pub panel_bg_color: Option<String>,
    pub line_color: Option<String>,
    pub line_width: Option<NumberLike>,
    pub line_cap: Option<String>,
    pub line_join: Option<String>,
    pub img_type: Option<String>,
    pub cursor_style: Option<String>,
    pub auto_resize: Option<bool>,
    #[serde(rename = "enableDPR")]
    pub enable_dpr: Option<bool>,
}

impl PanelConfigOption {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config(format!("options JSON: {e}")))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

impl LineCap {
    /// Anything outside butt/round/square becomes round.
    pub fn from_css(value: &str) -> Self {
        match value {
            "butt" => LineCap::Butt,
            "square" => LineCap::Square,
            _ => LineCap::Round,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineJoin {
    Round,
    Bevel,
    Miter,
}

impl LineJoin {
    pub fn from_css(value: &str) -> Self {
        match value {
            "bevel" => LineJoin::Bevel,
            "miter" => LineJoin::Miter,
            _ => LineJoin::Round,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
            LineJoin::Miter => "miter",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImgType {
    Png,
    Jpg,
    Jpeg,
}

impl ImgType {
    /// Case-insensitive; empty means png. Anything else is a config error.
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "" | "png" => Ok(ImgType::Png),
            "jpg" => Ok(ImgType::Jpg),
            "jpeg" => Ok(ImgType::Jpeg),
            other => Err(Error::Config(format!(
                "image type must be one of png/jpg/jpeg, got '{other}'"
            ))),
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImgType::Png => "image/png",
            ImgType::Jpg | ImgType::Jpeg => "image/jpeg",
        }
    }

    /// File extension used when saving.
    pub fn extension(self) -> &'static str {
        match self {
            ImgType::Png => "png",
            ImgType::Jpg => "jpg",
            ImgType::Jpeg => "jpeg",
        }
    }
}

impl fmt::Display for ImgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Anything that can style a stroke: the live config, or a frozen line.
pub trait LineStyle {
    fn line_width(&self) -> f64;
    fn line_cap(&self) -> LineCap;
    fn line_join(&self) -> LineJoin;
    fn line_color(&self) -> &str;
}

/// Validated panel configuration.
#[derive(Clone, Debug)]
pub struct PanelConfig {
    raw_width: f64,
    raw_height: f64,
    width: u32,
    height: u32,
    panel_bg_color: String,
    line_color: String,
    line_width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    img_type: ImgType,
    cursor_style: String,
    auto_resize: bool,
    enable_dpr: bool,
    scale: f64,
}

fn non_empty_or(v: Option<&str>, default: &str) -> String {
    match v {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => default.to_string(),
    }
}

fn coerce_line_width(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 1.0 }
}

fn scaled(raw: f64, scale: f64) -> u32 {
    let px = (raw * scale).floor().max(0.0);
    if px > MAX_BACKING_SIDE as f64 {
        warn!(requested = px, max = MAX_BACKING_SIDE, "backing store side clamped");
        return MAX_BACKING_SIDE;
    }
    px as u32
}

impl PanelConfig {
    /// `device_pixel_ratio` is only used when `enableDPR` is set.
    pub fn new(options: &PanelConfigOption, device_pixel_ratio: f64) -> Result<Self> {
        let img_type = ImgType::parse(options.img_type.as_deref().unwrap_or(""))?;
        let enable_dpr = options.enable_dpr.unwrap_or(false);
        let scale = if enable_dpr { sanitize_ratio(device_pixel_ratio) } else { 1.0 };
        let raw_width = number_or(options.width.as_ref(), 0.0);
        let raw_height = number_or(options.height.as_ref(), 0.0);

        Ok(Self {
            raw_width,
            raw_height,
            width: scaled(raw_width, scale),
            height: scaled(raw_height, scale),
            panel_bg_color: non_empty_or(options.panel_bg_color.as_deref(), DEFAULT_BG_COLOR),
            line_color: non_empty_or(options.line_color.as_deref(), DEFAULT_LINE_COLOR),
            line_width: coerce_line_width(number_or(options.line_width.as_ref(), 1.0)),
            line_cap: LineCap::from_css(options.line_cap.as_deref().unwrap_or("round")),
            line_join: LineJoin::from_css(options.line_join.as_deref().unwrap_or("round")),
            img_type,
            cursor_style: non_empty_or(options.cursor_style.as_deref(), DEFAULT_CURSOR),
            auto_resize: options.auto_resize != Some(false),
            enable_dpr,
            scale,
        })
    }

    /// Backing-store width in physical pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn panel_bg_color(&self) -> &str {
        &self.panel_bg_color
    }

    pub fn img_type(&self) -> ImgType {
        self.img_type
    }

    pub fn image_mime_type(&self) -> &'static str {
        self.img_type.mime_type()
    }

    pub fn cursor_style(&self) -> &str {
        &self.cursor_style
    }

    pub fn auto_resize(&self) -> bool {
        self.auto_resize
    }

    pub fn enable_dpr(&self) -> bool {
        self.enable_dpr
    }

    pub fn set_panel_bg_color(&mut self, color: &str) {
        self.panel_bg_color = non_empty_or(Some(color), DEFAULT_BG_COLOR);
    }

    pub fn set_line_color(&mut self, color: &str) {
        self.line_color = non_empty_or(Some(color), DEFAULT_LINE_COLOR);
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.line_width = coerce_line_width(width);
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.line_cap = cap;
    }

    pub fn set_cursor_style(&mut self, style: Option<&str>) {
        self.cursor_style = non_empty_or(style, DEFAULT_CURSOR);
    }

    /// New device pixel ratio: recompute scale and the backing size from the raw options.
    pub fn set_scale(&mut self, device_pixel_ratio: f64) {
        self.scale = sanitize_ratio(device_pixel_ratio);
        self.width = scaled(self.raw_width, self.scale);
        self.height = scaled(self.raw_height, self.scale);
    }
}

fn sanitize_ratio(r: f64) -> f64 {
    if r.is_finite() && r > 0.0 { r } else { 1.0 }
}

impl LineStyle for PanelConfig {
    fn line_width(&self) -> f64 {
        self.line_width
    }

    fn line_cap(&self) -> LineCap {
        self.line_cap
    }

    fn line_join(&self) -> LineJoin {
        self.line_join
    }

    fn line_color(&self) -> &str {
        &self.line_color
    }
}
