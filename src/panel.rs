// The writing panel: owns the surface, the config, the capture engine and the
// line record, and exposes the operations a page (or the demo window) calls.

use crate::capture::{CaptureEngine, InputEvent, InputFamily};
use crate::config::{LineCap, PanelConfig, PanelConfigOption};
use crate::error::{Error, Result};
use crate::export::{self, ExportKind, ImageBlob, ImageFile, ImageOutput};
use crate::model::LineRecord;
use crate::redraw::{clear_surface, paint_background, redraw};
use crate::surface::{RasterSource, Surface};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Facts about the host the panel can't work out by itself.
#[derive(Clone, Debug, PartialEq)]
pub struct HostEnv {
    pub device_pixel_ratio: f64,
    /// Mobile user agents get touch input, others mouse input.
    pub user_agent: String,
}

impl Default for HostEnv {
    fn default() -> Self {
        Self { device_pixel_ratio: 1.0, user_agent: String::new() }
    }
}

pub struct WritingPanel<S: Surface> {
    surface: S,
    config: PanelConfig,
    capture: CaptureEngine,
    record: LineRecord,
    host: HostEnv,
    initialized: bool,
    destroyed: bool,
}

impl<S: Surface> WritingPanel<S> {
    /// Validate options, size the surface and paint the background.
    pub fn new(surface: S, options: &PanelConfigOption, host: HostEnv) -> Result<Self> {
        if !surface.supports_2d() {
            return Err(Error::SurfaceInit("surface does not support 2D drawing".into()));
        }
        let config = PanelConfig::new(options, host.device_pixel_ratio)?;
        let family = InputFamily::from_user_agent(&host.user_agent);

        let mut panel = Self {
            surface,
            config,
            capture: CaptureEngine::new(family),
            record: LineRecord::new(),
            host,
            initialized: false,
            destroyed: false,
        };
        panel.reset_canvas();
        info!(
            width = panel.config.width(),
            height = panel.config.height(),
            scale = panel.config.scale(),
            input = ?family,
            "writing panel initialised"
        );
        Ok(panel)
    }

    /// Size the backing store and scale the context.
    /// After the first run this only does work when DPR tracking is on and the ratio changed.
    fn reset_canvas(&mut self) {
        if self.initialized
            && (!self.config.enable_dpr() || self.config.scale() == self.host.device_pixel_ratio)
        {
            return;
        }
        if self.config.enable_dpr() {
            self.config.set_scale(self.host.device_pixel_ratio);
        }
        self.surface.set_backing_size(self.config.width(), self.config.height());
        let scale = self.config.scale();
        self.surface.scale(scale, scale);
        self.set_panel_bg_color(None, false);
        self.surface.set_cursor(self.config.cursor_style());
        if self.initialized {
            info!(scale, "window resized, panel reset");
        }
        self.initialized = true;
    }

    /// Window-resize hook. Ignored unless `autoResize` is on, and after `destroy`.
    pub fn resize(&mut self, device_pixel_ratio: f64) {
        if self.destroyed {
            debug!(device_pixel_ratio, "panel destroyed, resize ignored");
            return;
        }
        self.host.device_pixel_ratio = device_pixel_ratio;
        if self.config.auto_resize() {
            self.reset_canvas();
        }
    }

    /// Feed one input event to the capture engine.
    pub fn handle_event(&mut self, event: &InputEvent) -> Result<()> {
        if self.destroyed {
            debug!(kind = ?event.kind, "panel destroyed, event ignored");
            return Ok(());
        }
        self.capture.handle(event, &mut self.surface, &self.config, &mut self.record)
    }

    /// Repaint the background, optionally switching to `color` first.
    /// With `rewrite`, the usable lines are drawn again on top.
    pub fn set_panel_bg_color(&mut self, color: Option<&str>, rewrite: bool) -> &mut Self {
        if let Some(c) = color.filter(|c| !c.is_empty()) {
            self.config.set_panel_bg_color(c);
        }
        paint_background(&mut self.surface, self.config.panel_bg_color(), self.config.scale());
        if rewrite {
            redraw(&mut self.surface, &self.record, &mut self.config, false, false);
        }
        self
    }

    pub fn panel_bg_color(&self) -> &str {
        self.config.panel_bg_color()
    }

    /// Applies to lines started from now on.
    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        self.config.set_line_width(width);
        self
    }

    pub fn set_line_cap(&mut self, cap: LineCap) -> &mut Self {
        self.config.set_line_cap(cap);
        self
    }

    pub fn set_line_color(&mut self, color: &str) -> &mut Self {
        self.config.set_line_color(color);
        self
    }

    /// Displayed height; the current displayed width is pinned.
    pub fn set_panel_height(&mut self, height: f64) -> &mut Self {
        let (w, _) = self.surface.display_size();
        self.surface.set_display_size(Some(w), Some(finite_or_zero(height)));
        self
    }

    /// Displayed width; the current displayed height is pinned.
    pub fn set_panel_width(&mut self, width: f64) -> &mut Self {
        let (_, h) = self.surface.display_size();
        self.surface.set_display_size(Some(finite_or_zero(width)), Some(h));
        self
    }

    pub fn panel_width(&self) -> f64 {
        self.surface.display_size().0
    }

    pub fn panel_height(&self) -> f64 {
        self.surface.display_size().1
    }

    /// Drop displayed-size overrides set through `set_panel_width/height`.
    pub fn restore_panel_wh(&mut self, width: bool, height: bool) {
        let (w, h) = self.surface.display_size();
        self.surface.set_display_size((!width).then_some(w), (!height).then_some(h));
    }

    /// `None` goes back to the default crosshair.
    pub fn set_panel_cursor_style(&mut self, cursor: Option<&str>) {
        self.config.set_cursor_style(cursor);
        self.surface.set_cursor(self.config.cursor_style());
    }

    /// Undo: hide the newest usable line and redraw.
    /// Returns false if there was nothing to undo.
    pub fn revoke(&mut self) -> bool {
        let Some(key) = self.record.find_last_usable_line().map(|l| l.key().to_string()) else {
            warn!("revoke: nothing to undo");
            return false;
        };
        self.record.disable_line(&key);
        debug!(key, "line revoked");
        redraw(&mut self.surface, &self.record, &mut self.config, true, true);
        true
    }

    /// Redo: bring back the oldest hidden line and redraw.
    /// Returns false if there was nothing to redo.
    pub fn recover(&mut self) -> bool {
        let Some(key) = self.record.find_first_disabled_line().map(|l| l.key().to_string()) else {
            warn!("recover: nothing to redo");
            return false;
        };
        self.record.enable_line(&key);
        debug!(key, "line recovered");
        redraw(&mut self.surface, &self.record, &mut self.config, true, true);
        true
    }

    /// Wipe the surface. `clear_record` also forgets every line and restarts numbering;
    /// `reset_bg` repaints the configured background afterwards.
    pub fn clear_panel(&mut self, clear_record: bool, reset_bg: bool) {
        if clear_record {
            self.capture.reset();
            self.record.empty();
        }
        clear_surface(&mut self.surface, self.config.scale());
        if reset_bg {
            self.set_panel_bg_color(None, false);
        }
    }

    /// True when nothing is visible: no usable lines.
    pub fn is_empty(&self) -> bool {
        self.record.get_usable_lines().is_empty()
    }

    /// Clear everything, swap in a blank backing store and stop listening to input.
    pub fn destroy(&mut self) {
        self.clear_panel(true, true);
        self.surface.set_backing_size(self.config.width(), self.config.height());
        self.capture.unsubscribe_all();
        self.destroyed = true;
        info!("writing panel destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_capturing()
    }

    pub fn record(&self) -> &LineRecord {
        &self.record
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// For host bookkeeping (e.g. moving the surface); drawing goes through the panel.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

impl<S: Surface + RasterSource> WritingPanel<S> {
    /// The panel as a `data:` URL in the configured image type.
    pub fn get_base64(&self) -> Result<String> {
        export::to_data_url(self.surface.frame(), self.config.img_type())
    }

    fn blob(&self) -> Result<ImageBlob> {
        self.get_base64()
            .and_then(|url| export::decode_data_url(&url))
            .inspect_err(|e| error!(error = %e, "building image blob failed"))
    }

    pub async fn get_img_blob_or_file(&self, kind: ExportKind) -> Result<ImageOutput> {
        let blob = self.blob()?;
        Ok(match kind {
            ExportKind::Blob => ImageOutput::Blob(blob),
            ExportKind::File(name) => ImageOutput::File(ImageFile {
                name: name.unwrap_or_else(export::random_file_name),
                blob,
            }),
        })
    }

    /// Write the image straight from the data URL into `dir`.
    pub async fn save_img_file(&self, dir: &Path, file_name: Option<&str>) -> Result<PathBuf> {
        let url = self.get_base64()?;
        let decoded = export::decode_data_url(&url)?;
        self.write(dir, file_name, &decoded.bytes)
    }

    /// Same result as `save_img_file`, going through the Blob path.
    pub async fn download_img_file(&self, dir: &Path, file_name: Option<&str>) -> Result<PathBuf> {
        let ImageBlob { bytes, .. } = self.blob()?;
        self.write(dir, file_name, &bytes)
    }

    fn write(&self, dir: &Path, file_name: Option<&str>, bytes: &[u8]) -> Result<PathBuf> {
        let name = file_name.map_or_else(export::random_file_name, str::to_string);
        let path = export::write_image(dir, &name, self.config.img_type(), bytes)?;
        info!(path = %path.display(), "image saved");
        Ok(path)
    }
}
