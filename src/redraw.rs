// Replays the stroke history onto the surface (undo, redo, background changes).
// Visual: the panel shows exactly the usable lines, each in its own frozen style.
// Replay joins recorded points with straight segments; only live capture smooths.

use crate::config::PanelConfig;
use crate::model::LineRecord;
use crate::surface::{StrokeStyle, Surface};
use tracing::warn;

/// Whole backing store in logical units (the context may be scaled).
fn logical_extent<S: Surface + ?Sized>(surface: &S, scale: f64) -> (f64, f64) {
    let (w, h) = surface.backing_size();
    (w as f64 / scale, h as f64 / scale)
}

/// Flood the surface with `color`, covering whatever was drawn.
pub fn paint_background<S: Surface + ?Sized>(surface: &mut S, color: &str, scale: f64) {
    let (w, h) = logical_extent(surface, scale);
    surface.set_fill_style(color);
    surface.fill_rect(0.0, 0.0, w, h);
}

/// Make the surface fully transparent.
pub fn clear_surface<S: Surface + ?Sized>(surface: &mut S, scale: f64) {
    let (w, h) = logical_extent(surface, scale);
    surface.clear_rect(0.0, 0.0, w, h);
}

/// Redraw the usable lines of `record`. Returns how many lines were replayed.
///
/// With `restore_background`, the background recorded on the last usable line
/// becomes the live background again; with no usable lines the configured
/// background is repainted instead.
pub fn redraw<S: Surface + ?Sized>(
    surface: &mut S,
    record: &LineRecord,
    config: &mut PanelConfig,
    clear_first: bool,
    restore_background: bool,
) -> usize {
    if clear_first {
        clear_surface(surface, config.scale());
    }

    let usable = record.get_usable_lines();
    let Some(last) = usable.last() else {
        if restore_background {
            paint_background(surface, config.panel_bg_color(), config.scale());
        }
        warn!("redraw: no usable lines to draw");
        return 0;
    };

    if restore_background {
        config.set_panel_bg_color(last.panel_bg_color());
        paint_background(surface, config.panel_bg_color(), config.scale());
    }

    for line in &usable {
        let style = StrokeStyle::from_line_style(*line);
        surface.begin_path();
        for (i, point) in line.points().iter().enumerate() {
            if i == 0 {
                surface.move_to(*point);
            }
            surface.set_stroke_style(&style);
            surface.line_to(*point);
            surface.stroke();
        }
        surface.begin_path();
    }
    usable.len()
}
