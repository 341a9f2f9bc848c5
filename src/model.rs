// Stroke data model: points, lines (strokes) and the line record (history).

use crate::config::{LineCap, LineJoin, LineStyle, PanelConfig};
use crate::error::{Error, Result};

/// A surface-logical coordinate (already divided by the device scale).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Result<Self> {
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::InvalidPoint { x, y });
        }
        Ok(Self { x, y })
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Halfway between two finite points is finite, so no validation needed.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point { x: (self.x + other.x) / 2.0, y: (self.y + other.y) / 2.0 }
    }
}

/// One press-move-release gesture plus the style it was drawn with.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    key: String,
    index: u64,
    usable: bool,
    point_list: Vec<Point>,
    line_color: String,
    line_width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    panel_bg_color: String,
}

impl Line {
    /// Start a new stroke, snapshotting the config's current style and background.
    pub fn start(index: u64, config: &PanelConfig) -> Self {
        Self {
            key: format!("line_{index}"),
            index,
            usable: true,
            point_list: Vec::new(),
            line_color: config.line_color().to_string(),
            line_width: config.line_width(),
            line_cap: config.line_cap(),
            line_join: config.line_join(),
            panel_bg_color: config.panel_bg_color().to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn is_usable(&self) -> bool {
        self.usable
    }

    pub fn points(&self) -> &[Point] {
        &self.point_list
    }

    pub fn panel_bg_color(&self) -> &str {
        &self.panel_bg_color
    }

    pub fn last_point(&self) -> Option<&Point> {
        self.point_list.last()
    }

    pub(crate) fn add_point(&mut self, point: Point) {
        self.point_list.push(point);
    }

    pub fn disable(&mut self) {
        self.usable = false;
    }

    pub fn enable(&mut self) {
        self.usable = true;
    }
}

/// The blank line: empty key, no points, not usable. A record never stores it.
impl Default for Line {
    fn default() -> Self {
        Self {
            key: String::new(),
            index: 0,
            usable: false,
            point_list: Vec::new(),
            line_color: String::new(),
            line_width: 1.0,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            panel_bg_color: String::new(),
        }
    }
}

impl LineStyle for Line {
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

/// Lookups accept either a key or the line itself.
pub trait AsLineKey {
    fn line_key(&self) -> &str;
}

impl AsLineKey for str {
    fn line_key(&self) -> &str {
        self
    }
}

impl AsLineKey for String {
    fn line_key(&self) -> &str {
        self
    }
}

impl AsLineKey for Line {
    fn line_key(&self) -> &str {
        &self.key
    }
}

/// Insertion-ordered strokes with boolean tombstones.
/// Undo disables the newest usable line; redo re-enables the oldest disabled one.
#[derive(Clone, Debug, Default)]
pub struct LineRecord {
    line_list: Vec<Line>,
}

impl LineRecord {
    pub fn new() -> Self {
        Self::default()
    }

    fn position<K: AsLineKey + ?Sized>(&self, line: &K) -> Option<usize> {
        let key = line.line_key();
        self.line_list.iter().position(|l| l.key == key)
    }

    pub fn has_line<K: AsLineKey + ?Sized>(&self, line: &K) -> bool {
        self.position(line).is_some()
    }

    /// Appends unless the key is empty or already present.
    pub fn add_line(&mut self, line: Line) {
        if line.key.is_empty() || self.has_line(&line) {
            return;
        }
        self.line_list.push(line);
    }

    pub fn disable_line<K: AsLineKey + ?Sized>(&mut self, line: &K) {
        if let Some(i) = self.position(line) {
            self.line_list[i].disable();
        }
    }

    pub fn enable_line<K: AsLineKey + ?Sized>(&mut self, line: &K) {
        if let Some(i) = self.position(line) {
            self.line_list[i].enable();
        }
    }

    pub fn find_last_usable_line(&self) -> Option<&Line> {
        self.line_list.iter().rev().find(|l| l.usable)
    }

    pub fn find_first_disabled_line(&self) -> Option<&Line> {
        self.line_list.iter().find(|l| !l.usable)
    }

    pub fn get_usable_lines(&self) -> Vec<&Line> {
        self.line_list.iter().filter(|l| l.usable).collect()
    }

    /// True iff there are no lines at all (disabled ones count).
    pub fn is_empty(&self) -> bool {
        self.line_list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.line_list.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Line> {
        self.line_list.iter()
    }

    pub fn empty(&mut self) {
        self.line_list.clear();
    }
}
