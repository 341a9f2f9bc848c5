// Stroke capture: turns one pointer/touch gesture into one Line.
//
//   Idle --Down--> Capturing --Move*--> Capturing --Up--> Idle
//
// The active line lives inside the Capturing state, so nothing outside the
// transitions below can reach it. The subscription table mirrors the state:
// Move events are only accepted while a gesture is in progress.

use crate::config::PanelConfig;
use crate::error::{Error, Result};
use crate::model::{Line, LineRecord, Point};
use crate::surface::{StrokeStyle, Surface};
use tracing::{debug, trace, warn};

/// Which part of a gesture an event belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Down,
    Move,
    Up,
}

/// Mouse or touch. A panel listens to exactly one family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFamily {
    Mouse,
    Touch,
}

const MOBILE_MARKERS: &[&str] = &[
    "phone", "pad", "pod", "iphone", "ipod", "ios", "ipad", "android", "mobile", "blackberry",
    "iemobile", "mqqbrowser", "juc", "fennec", "wosbrowser", "browserng", "webos", "symbian",
    "windows phone",
];

impl InputFamily {
    /// Mobile user agents get touch events, everything else mouse events.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        if MOBILE_MARKERS.iter().any(|m| ua.contains(m)) {
            InputFamily::Touch
        } else {
            InputFamily::Mouse
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    MouseDown,
    MouseMove,
    MouseUp,
    MouseLeave,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
}

impl EventKind {
    pub fn phase(self) -> Phase {
        match self {
            EventKind::MouseDown | EventKind::TouchStart => Phase::Down,
            EventKind::MouseMove | EventKind::TouchMove => Phase::Move,
            EventKind::MouseUp
            | EventKind::MouseLeave
            | EventKind::TouchEnd
            | EventKind::TouchCancel => Phase::Up,
        }
    }

    pub fn family(self) -> InputFamily {
        match self {
            EventKind::MouseDown
            | EventKind::MouseMove
            | EventKind::MouseUp
            | EventKind::MouseLeave => InputFamily::Mouse,
            _ => InputFamily::Touch,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    pub client_x: f64,
    pub client_y: f64,
}

/// Device coordinates as the host delivers them.
#[derive(Clone, Debug, PartialEq)]
pub enum Pointer {
    Mouse { client_x: f64, client_y: f64 },
    Touch { changed_touches: Vec<TouchPoint> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct InputEvent {
    pub kind: EventKind,
    pub pointer: Pointer,
}

impl InputEvent {
    pub fn mouse(kind: EventKind, client_x: f64, client_y: f64) -> Self {
        Self { kind, pointer: Pointer::Mouse { client_x, client_y } }
    }

    pub fn touch(kind: EventKind, changed_touches: Vec<TouchPoint>) -> Self {
        Self { kind, pointer: Pointer::Touch { changed_touches } }
    }

    /// One coordinate pair per event; touch events use their first changed touch.
    pub fn client_position(&self) -> Result<(f64, f64)> {
        match &self.pointer {
            Pointer::Mouse { client_x, client_y } => Ok((*client_x, *client_y)),
            Pointer::Touch { changed_touches } => changed_touches
                .first()
                .map(|t| (t.client_x, t.client_y))
                .ok_or_else(|| {
                    Error::InputEvent(format!("{:?} without changed touches", self.kind))
                }),
        }
    }
}

/// Device (client) coordinates -> surface logical coordinates.
///
/// `x = (client_x - rect.left) * (backing_width / display_width) / scale`, same for y.
pub fn map_to_surface<S: Surface + ?Sized>(
    surface: &S,
    client: (f64, f64),
    scale: f64,
) -> Result<Point> {
    let rect = surface.bounding_rect();
    let (backing_w, backing_h) = surface.backing_size();
    let (display_w, display_h) = surface.display_size();
    let x = (client.0 - rect.left) * (backing_w as f64 / display_w) / scale;
    let y = (client.1 - rect.top) * (backing_h as f64 / display_h) / scale;
    Point::new(x, y)
}

/// The dispatch table: which events the engine currently listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscriptions {
    family: InputFamily,
    down_up: bool,
    moves: bool,
}

impl Subscriptions {
    fn idle(family: InputFamily) -> Self {
        Self { family, down_up: true, moves: false }
    }

    pub fn accepts(&self, kind: EventKind) -> bool {
        if kind.family() != self.family {
            return false;
        }
        match kind.phase() {
            Phase::Down | Phase::Up => self.down_up,
            Phase::Move => self.moves,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CaptureState {
    Idle,
    Capturing { line: Line },
}

pub struct CaptureEngine {
    state: CaptureState,
    next_index: u64,
    subscriptions: Subscriptions,
}

impl CaptureEngine {
    pub fn new(family: InputFamily) -> Self {
        Self {
            state: CaptureState::Idle,
            next_index: 0,
            subscriptions: Subscriptions::idle(family),
        }
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.state, CaptureState::Capturing { .. })
    }

    /// The stroke being drawn right now, if any.
    pub fn active_line(&self) -> Option<&Line> {
        match &self.state {
            CaptureState::Capturing { line } => Some(line),
            CaptureState::Idle => None,
        }
    }

    pub fn subscriptions(&self) -> Subscriptions {
        self.subscriptions
    }

    pub fn accepts(&self, kind: EventKind) -> bool {
        self.subscriptions.accepts(kind)
    }

    /// Feed one event. Events nobody subscribed to are dropped.
    pub fn handle<S: Surface + ?Sized>(
        &mut self,
        event: &InputEvent,
        surface: &mut S,
        config: &PanelConfig,
        record: &mut LineRecord,
    ) -> Result<()> {
        if !self.accepts(event.kind) {
            trace!(kind = ?event.kind, "event not subscribed, dropped");
            return Ok(());
        }
        match event.kind.phase() {
            Phase::Down => self.down(event, surface, config),
            Phase::Move => self.write(event, surface, config),
            Phase::Up => self.up(event, surface, config, record),
        }
    }

    fn down<S: Surface + ?Sized>(
        &mut self,
        event: &InputEvent,
        surface: &mut S,
        config: &PanelConfig,
    ) -> Result<()> {
        let point = map_to_surface(surface, event.client_position()?, config.scale())?;
        if let CaptureState::Capturing { line } = &self.state {
            warn!(key = line.key(), "new gesture while capturing; abandoning the unfinished line");
        }

        let mut line = Line::start(self.next_index, config);
        self.next_index += 1;
        debug!(key = line.key(), "start writing");

        // A zero-length segment: with round caps this is the dot a tap leaves behind.
        surface.begin_path();
        surface.move_to(point);
        surface.line_to(point);
        surface.set_stroke_style(&StrokeStyle::from_line_style(config));
        surface.stroke();
        line.add_point(point);

        self.state = CaptureState::Capturing { line };
        self.subscriptions.moves = true;
        Ok(())
    }

    fn write<S: Surface + ?Sized>(
        &mut self,
        event: &InputEvent,
        surface: &mut S,
        config: &PanelConfig,
    ) -> Result<()> {
        let CaptureState::Capturing { line } = &mut self.state else {
            return Ok(());
        };
        let point = map_to_surface(surface, event.client_position()?, config.scale())?;
        match line.last_point() {
            // Curve through the midpoint to the new point: smooth instead of a jagged polyline.
            Some(prev) => surface.quadratic_curve_to(prev.midpoint(&point), point),
            None => surface.line_to(point),
        }
        surface.stroke();
        line.add_point(point);
        trace!(key = line.key(), points = line.points().len(), "writing");
        Ok(())
    }

    /// Fires in any state. Always ends the gesture and resets the path.
    /// A bad end point is reported after the line, as drawn so far, is committed.
    fn up<S: Surface + ?Sized>(
        &mut self,
        event: &InputEvent,
        surface: &mut S,
        config: &PanelConfig,
        record: &mut LineRecord,
    ) -> Result<()> {
        let mut outcome = Ok(());
        let state = std::mem::replace(&mut self.state, CaptureState::Idle);
        if let CaptureState::Capturing { mut line } = state {
            let end = event
                .client_position()
                .and_then(|c| map_to_surface(surface, c, config.scale()));
            match end {
                Ok(point) => {
                    surface.line_to(point);
                    surface.stroke();
                    line.add_point(point);
                    surface.stroke();
                }
                Err(e) => {
                    warn!(key = line.key(), error = %e, "no usable end point, line kept as drawn");
                    outcome = Err(e);
                }
            }
            debug!(key = line.key(), points = line.points().len(), "end writing");
            record.add_line(line);
        }
        surface.begin_path();
        self.subscriptions.moves = false;
        outcome
    }

    /// Forget any unfinished gesture and restart numbering (panel clear).
    pub fn reset(&mut self) {
        self.state = CaptureState::Idle;
        self.next_index = 0;
        self.subscriptions.moves = false;
    }

    /// Stop listening to everything (panel destroyed).
    pub fn unsubscribe_all(&mut self) {
        self.reset();
        self.subscriptions.down_up = false;
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PanelConfigOption;
    use crate::surface::{CommandLog, DrawCommand};
    use pretty_assertions::assert_eq;

    /// Engine plus everything `handle` borrows.
    struct Rig {
        eng: CaptureEngine,
        surface: CommandLog,
        config: PanelConfig,
        record: LineRecord,
    }

    impl Rig {
        fn new(family: InputFamily, line_color: &str) -> Self {
            let o = PanelConfigOption {
                width: Some(300.0.into()),
                height: Some(150.0.into()),
                line_color: Some(line_color.into()),
                ..Default::default()
            };
            let mut surface = CommandLog::new();
            surface.set_backing_size(300, 150);
            surface.take_commands();
            Self {
                eng: CaptureEngine::new(family),
                surface,
                config: PanelConfig::new(&o, 1.0).unwrap(),
                record: LineRecord::new(),
            }
        }

        fn send(&mut self, event: &InputEvent) -> Result<()> {
            self.eng.handle(event, &mut self.surface, &self.config, &mut self.record)
        }

        fn mouse(&mut self, kind: EventKind, x: f64, y: f64) {
            self.send(&InputEvent::mouse(kind, x, y)).unwrap();
        }

        fn touch(&mut self, kind: EventKind, touches: &[(f64, f64)]) -> Result<()> {
            let touches = touches
                .iter()
                .map(|&(client_x, client_y)| TouchPoint { client_x, client_y })
                .collect();
            self.send(&InputEvent::touch(kind, touches))
        }
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y).unwrap()
    }

    #[test]
    fn user_agent_picks_input_family() {
        let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
        let desktop = "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/128.0";
        assert_eq!(InputFamily::from_user_agent(iphone), InputFamily::Touch);
        assert_eq!(InputFamily::from_user_agent(desktop), InputFamily::Mouse);
    }

    #[test]
    fn mapping_applies_offset_ratio_and_scale() {
        let mut s = CommandLog::new().with_origin(10.0, 20.0);
        s.set_backing_size(600, 300);
        s.set_display_size(Some(300.0), Some(150.0));
        let pt = map_to_surface(&s, (40.0, 35.0), 2.0).unwrap();
        assert_eq!(pt, p(30.0, 15.0));
    }

    #[test]
    fn mapping_a_zero_sized_display_fails() {
        let s = CommandLog::new();
        let mapped = map_to_surface(&s, (1.0, 1.0), 1.0);
        assert!(matches!(mapped, Err(Error::InvalidPoint { .. })));
    }

    #[test]
    fn gesture_emits_dot_curve_and_final_segment() {
        let mut rig = Rig::new(InputFamily::Mouse, "#ff0000");
        rig.mouse(EventKind::MouseDown, 10.0, 10.0);
        rig.mouse(EventKind::MouseMove, 20.0, 10.0);
        rig.mouse(EventKind::MouseUp, 30.0, 10.0);

        assert_eq!(
            rig.surface.take_commands(),
            vec![
                DrawCommand::BeginPath,
                DrawCommand::MoveTo(p(10.0, 10.0)),
                DrawCommand::LineTo(p(10.0, 10.0)),
                DrawCommand::StrokeStyle(StrokeStyle::from_line_style(&rig.config)),
                DrawCommand::Stroke,
                DrawCommand::QuadraticCurveTo(p(15.0, 10.0), p(20.0, 10.0)),
                DrawCommand::Stroke,
                DrawCommand::LineTo(p(30.0, 10.0)),
                DrawCommand::Stroke,
                DrawCommand::Stroke,
                DrawCommand::BeginPath,
            ]
        );
        let line = rig.record.find_last_usable_line().unwrap();
        assert_eq!(line.points(), &[p(10.0, 10.0), p(20.0, 10.0), p(30.0, 10.0)]);
        assert_eq!(rig.eng.state(), &CaptureState::Idle);
    }

    #[test]
    fn moves_are_only_subscribed_while_capturing() {
        let mut rig = Rig::new(InputFamily::Mouse, "#000000");
        assert!(!rig.eng.accepts(EventKind::MouseMove));
        rig.mouse(EventKind::MouseMove, 5.0, 5.0);
        assert!(rig.surface.commands().is_empty());

        rig.mouse(EventKind::MouseDown, 5.0, 5.0);
        let subs = rig.eng.subscriptions();
        assert!(subs.accepts(EventKind::MouseMove));
        assert!(subs.accepts(EventKind::MouseUp));
        assert!(!subs.accepts(EventKind::TouchMove));

        rig.mouse(EventKind::MouseLeave, 6.0, 6.0);
        assert!(!rig.eng.subscriptions().accepts(EventKind::MouseMove));
        assert_eq!(rig.record.len(), 1);
    }

    #[test]
    fn capturing_state_holds_the_active_line() {
        let mut rig = Rig::new(InputFamily::Mouse, "#000000");
        rig.mouse(EventKind::MouseDown, 3.0, 4.0);
        let CaptureState::Capturing { line } = rig.eng.state() else {
            panic!("expected capturing, got {:?}", rig.eng.state());
        };
        assert_eq!(line.key(), "line_0");
        assert_eq!(line.points(), &[p(3.0, 4.0)]);
        assert!(rig.record.is_empty());
    }

    #[test]
    fn up_while_idle_only_resets_the_path() {
        let mut rig = Rig::new(InputFamily::Touch, "#000000");
        rig.touch(EventKind::TouchEnd, &[]).unwrap();
        assert_eq!(rig.surface.take_commands(), vec![DrawCommand::BeginPath]);
        assert!(rig.record.is_empty());
    }

    #[test]
    fn up_without_touches_commits_the_line_and_reports_the_error() {
        let mut rig = Rig::new(InputFamily::Touch, "#000000");
        rig.touch(EventKind::TouchStart, &[(5.0, 5.0)]).unwrap();
        rig.touch(EventKind::TouchMove, &[(9.0, 5.0)]).unwrap();

        let ended = rig.touch(EventKind::TouchEnd, &[]);
        assert!(matches!(ended, Err(Error::InputEvent(_))));
        assert!(!rig.eng.is_capturing());
        assert!(!rig.eng.accepts(EventKind::TouchMove));
        assert_eq!(rig.record.len(), 1);
        let line = rig.record.find_last_usable_line().unwrap();
        assert_eq!(line.points(), &[p(5.0, 5.0), p(9.0, 5.0)]);
        assert_eq!(rig.surface.commands().last(), Some(&DrawCommand::BeginPath));
    }

    #[test]
    fn touch_down_without_touches_is_rejected() {
        let mut rig = Rig::new(InputFamily::Touch, "#000000");
        let started = rig.touch(EventKind::TouchStart, &[]);
        assert!(matches!(started, Err(Error::InputEvent(_))));
        assert!(!rig.eng.is_capturing());
    }

    #[test]
    fn touch_uses_the_first_changed_touch() {
        let mut rig = Rig::new(InputFamily::Touch, "#000000");
        rig.touch(EventKind::TouchStart, &[(7.0, 8.0), (99.0, 99.0)]).unwrap();
        let last = rig.eng.active_line().and_then(|l| l.last_point()).copied();
        assert_eq!(last, Some(p(7.0, 8.0)));
    }

    #[test]
    fn indices_are_sequential_and_reset_restarts_them() {
        let mut rig = Rig::new(InputFamily::Mouse, "#000000");
        for _ in 0..2 {
            rig.mouse(EventKind::MouseDown, 1.0, 1.0);
            rig.mouse(EventKind::MouseUp, 1.0, 1.0);
        }
        let keys: Vec<&str> = rig.record.iter().map(|l| l.key()).collect();
        assert_eq!(keys, vec!["line_0", "line_1"]);

        rig.eng.reset();
        rig.mouse(EventKind::MouseDown, 1.0, 1.0);
        assert_eq!(rig.eng.active_line().map(|l| l.index()), Some(0));
    }

    #[test]
    fn unsubscribed_engine_ignores_everything() {
        let mut eng = CaptureEngine::new(InputFamily::Mouse);
        eng.unsubscribe_all();
        assert!(!eng.accepts(EventKind::MouseDown));
        assert!(!eng.accepts(EventKind::MouseUp));
    }
}
