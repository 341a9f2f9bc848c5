// Window plumbing for the demo.
// Visual effects provided here:
// 1) A window that shows the panel's pixels.
// 2) The panel's cursor style applied to the OS cursor.
// 3) Polled mouse state turned into the mouse events a page would see.

use minifb::{CursorStyle, Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use writing_panel::{Error, EventKind, FrameBuffer, InputEvent, Result};

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a window the size of the panel's backing store.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self { window })
    }

    /// Push the panel's pixels to the screen. minifb ignores the alpha byte.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<()> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Mouse position in window pixels; None while the pointer is outside.
    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Discard)
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    pub fn pressed_once(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    /// Visual: the OS cursor over the window follows the panel's cursor style.
    pub fn set_cursor(&mut self, css: &str) {
        self.window.set_cursor_style(cursor_for(css));
    }
}

/// Closest minifb cursor for a CSS cursor keyword.
pub fn cursor_for(css: &str) -> CursorStyle {
    match css {
        "crosshair" => CursorStyle::Crosshair,
        "text" | "vertical-text" => CursorStyle::Ibeam,
        "grab" => CursorStyle::OpenHand,
        "grabbing" => CursorStyle::ClosedHand,
        "ew-resize" | "col-resize" => CursorStyle::ResizeLeftRight,
        "ns-resize" | "row-resize" => CursorStyle::ResizeUpDown,
        "move" | "all-scroll" => CursorStyle::ResizeAll,
        _ => CursorStyle::Arrow,
    }
}

/// Turns per-frame mouse samples into down/move/up/leave events.
#[derive(Debug, Default)]
pub struct PointerTracker {
    pressed: bool,
    last: Option<(f32, f32)>,
}

impl PointerTracker {
    /// `pos` is None when the pointer is outside the window.
    pub fn poll(&mut self, pos: Option<(f32, f32)>, button_down: bool) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let Some((x, y)) = pos else {
            // Leaving ends whatever gesture was running.
            if let Some((lx, ly)) = self.last.take() {
                events.push(mouse(EventKind::MouseLeave, lx, ly));
            }
            self.pressed = false;
            return events;
        };

        let moved = self.last != Some((x, y));
        match (self.pressed, button_down) {
            (false, true) => events.push(mouse(EventKind::MouseDown, x, y)),
            (true, false) => events.push(mouse(EventKind::MouseUp, x, y)),
            _ if moved => events.push(mouse(EventKind::MouseMove, x, y)),
            _ => {}
        }
        self.pressed = button_down;
        self.last = Some((x, y));
        events
    }
}

fn mouse(kind: EventKind, x: f32, y: f32) -> InputEvent {
    InputEvent::mouse(kind, x as f64, y as f64)
}
