// What you SEE:
// • A blank panel in its background colour.
// • Hold Left Mouse and drag: you write on it, smoothed as you go.
// • U undoes the last stroke, R brings it back, C clears everything.
// • B cycles the background (strokes are redrawn on top), L cycles the ink.
// • S saves the panel as an image in the current directory. ESC quits.
//
// Usage: writing-panel [options.json]
// Logging follows RUST_LOG (default: info).

mod draw;

use draw::{Drawer, PointerTracker};
use minifb::Key;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use writing_panel::{HostEnv, PanelConfigOption, RasterSource, RasterSurface, Result, WritingPanel};

const BACKGROUNDS: &[&str] = &["#ffffff", "#fdf6e3", "#202124", "#e8f0fe"];
const INKS: &[&str] = &["#000000", "#d93025", "#1a73e8", "#188038"];

fn load_options() -> Result<PanelConfigOption> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| writing_panel::Error::Config(format!("read {path}: {e}")))?;
            PanelConfigOption::from_json(&text)
        }
        // Visual: a 640x400 white panel with 3px round black ink.
        None => Ok(PanelConfigOption {
            width: Some(640.0.into()),
            height: Some(400.0.into()),
            line_width: Some(3.0.into()),
            ..Default::default()
        }),
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    /* --- Panel + window setup ---
       Visual: window opens showing the empty panel. */
    let options = load_options()?;
    let mut panel = WritingPanel::new(RasterSurface::new(), &options, HostEnv::default())?;
    let (w, h) = (panel.config().width() as usize, panel.config().height() as usize);
    let mut drawer = Drawer::new("Writing Panel", w, h)?;
    drawer.set_cursor(panel.config().cursor_style());

    let mut pointer = PointerTracker::default();
    let mut bg_idx = 0;
    let mut ink_idx = 0;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Mouse -> panel events.
           Visual: ink follows the pointer while the button is held. */
        for event in pointer.poll(drawer.mouse_pos(), drawer.left_mouse_down()) {
            if let Err(e) = panel.handle_event(&event) {
                warn!(error = %e, "input event rejected");
            }
        }

        /* 2) Keys */
        if drawer.pressed_once(Key::U) {
            panel.revoke(); // visual: newest stroke disappears
        }
        if drawer.pressed_once(Key::R) {
            panel.recover(); // visual: oldest hidden stroke reappears
        }
        if drawer.pressed_once(Key::C) {
            panel.clear_panel(true, true); // visual: back to a blank panel
        }
        if drawer.pressed_once(Key::B) {
            bg_idx = (bg_idx + 1) % BACKGROUNDS.len();
            panel.set_panel_bg_color(Some(BACKGROUNDS[bg_idx]), true);
        }
        if drawer.pressed_once(Key::L) {
            ink_idx = (ink_idx + 1) % INKS.len();
            panel.set_line_color(INKS[ink_idx]); // visual: next stroke uses the new ink
        }
        if drawer.pressed_once(Key::S) {
            match pollster::block_on(panel.save_img_file(Path::new("."), None)) {
                Ok(path) => info!(path = %path.display(), "saved"),
                Err(e) => error!(error = %e, "save failed"),
            }
        }

        /* 3) Present the panel's pixels. */
        drawer.present(panel.surface().frame())?;
    }

    panel.destroy();
    Ok(())
}
