use pretty_assertions::assert_eq;
use writing_panel::{
    CommandLog, Error, EventKind, HostEnv, ImgType, InputEvent, LineStyle, PanelConfigOption, Point,
    RasterSource, RasterSurface, TouchPoint, WritingPanel,
};

fn options(json: &str) -> PanelConfigOption {
    PanelConfigOption::from_json(json).unwrap()
}

fn stroke<S: writing_panel::Surface>(panel: &mut WritingPanel<S>, points: &[(f64, f64)]) {
    let (first, rest) = points.split_first().unwrap();
    panel.handle_event(&InputEvent::mouse(EventKind::MouseDown, first.0, first.1)).unwrap();
    for (x, y) in &rest[..rest.len().saturating_sub(1)] {
        panel.handle_event(&InputEvent::mouse(EventKind::MouseMove, *x, *y)).unwrap();
    }
    let last = rest.last().unwrap_or(first);
    panel.handle_event(&InputEvent::mouse(EventKind::MouseUp, last.0, last.1)).unwrap();
}

fn usable_keys<S: writing_panel::Surface>(panel: &WritingPanel<S>) -> Vec<&str> {
    panel.record().get_usable_lines().into_iter().map(|l| l.key()).collect()
}

fn xy(p: &Point) -> (f64, f64) {
    (p.x(), p.y())
}

#[test]
fn red_stroke_records_one_point_per_event() {
    let opts = options(r##"{"width": 300, "height": 150, "lineColor": "#ff0000"}"##);
    let mut panel = WritingPanel::new(CommandLog::new(), &opts, HostEnv::default()).unwrap();

    stroke(&mut panel, &[(10.0, 10.0), (20.0, 10.0), (30.0, 10.0), (30.0, 10.0)]);

    assert_eq!(panel.record().len(), 1);
    let line = panel.record().iter().next().unwrap();
    assert_eq!(
        line.points().iter().map(xy).collect::<Vec<_>>(),
        vec![(10.0, 10.0), (20.0, 10.0), (30.0, 10.0), (30.0, 10.0)]
    );
    assert_eq!(line.line_color(), "#ff0000");
    assert!(line.is_usable());
    assert_eq!(line.key(), "line_0");
}

#[test]
fn undo_then_redo_two_strokes() {
    let opts = options(r#"{"width": 100, "height": 100}"#);
    let mut panel = WritingPanel::new(RasterSurface::new(), &opts, HostEnv::default()).unwrap();
    stroke(&mut panel, &[(10.0, 10.0), (50.0, 10.0)]);
    stroke(&mut panel, &[(10.0, 60.0), (50.0, 60.0)]);
    assert_eq!(panel.record().get_usable_lines().len(), 2);
    assert_ne!(panel.surface().frame().pixel(30, 60), Some(0xFFFF_FFFF));

    assert!(panel.revoke());
    assert_eq!(usable_keys(&panel), vec!["line_0"]);
    // The second stroke is gone from the pixels too.
    let px = panel.surface().frame().pixel(30, 60).unwrap();
    assert_eq!(px, 0xFFFF_FFFF);

    assert!(panel.recover());
    assert_eq!(usable_keys(&panel), vec!["line_0", "line_1"]);
    assert_ne!(panel.surface().frame().pixel(30, 60), Some(0xFFFF_FFFF));
}

#[test]
fn image_type_validation() {
    let bmp = options(r#"{"imgType": "bmp"}"#);
    let err = WritingPanel::new(CommandLog::new(), &bmp, HostEnv::default());
    assert!(matches!(err, Err(Error::Config(_))));

    let jpg = options(r#"{"imgType": "JPG"}"#);
    let panel = WritingPanel::new(CommandLog::new(), &jpg, HostEnv::default()).unwrap();
    assert_eq!(panel.config().img_type(), ImgType::Jpg);
    assert_eq!(panel.config().image_mime_type(), "image/jpeg");
}

#[test]
fn numeric_strings_are_accepted_for_sizes() {
    let opts =
        options(r#"{"width": "300", "height": "150.7", "lineWidth": "4", "enableDPR": true}"#);
    let host = HostEnv { device_pixel_ratio: 2.0, ..HostEnv::default() };
    let panel = WritingPanel::new(CommandLog::new(), &opts, host).unwrap();
    assert_eq!((panel.config().width(), panel.config().height()), (600, 301));
    assert_eq!(panel.config().line_width(), 4.0);
}

#[test]
fn touch_gesture_on_a_mobile_host() {
    let opts = options(r#"{"width": 200, "height": 100}"#);
    let host = HostEnv {
        user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)".into(),
        ..HostEnv::default()
    };
    let surface = CommandLog::new().with_origin(10.0, 20.0);
    let mut panel = WritingPanel::new(surface, &opts, host).unwrap();

    let touch = |kind, x, y| InputEvent::touch(kind, vec![TouchPoint { client_x: x, client_y: y }]);
    panel.handle_event(&touch(EventKind::TouchStart, 15.0, 25.0)).unwrap();
    panel.handle_event(&touch(EventKind::TouchMove, 25.0, 25.0)).unwrap();

    // A touch event with no touches is rejected and the gesture keeps going.
    let bad = panel.handle_event(&InputEvent::touch(EventKind::TouchMove, vec![]));
    assert!(matches!(bad, Err(Error::InputEvent(_))));
    assert!(panel.is_capturing());

    panel.handle_event(&touch(EventKind::TouchEnd, 35.0, 30.0)).unwrap();
    assert!(!panel.is_capturing());
    let line = panel.record().find_last_usable_line().unwrap();
    let points: Vec<_> = line.points().iter().map(xy).collect();
    assert_eq!(points, vec![(5.0, 5.0), (15.0, 5.0), (25.0, 10.0)]);
}

#[test]
fn leaving_the_surface_finishes_the_stroke() {
    let opts = options(r#"{"width": 100, "height": 100}"#);
    let mut panel = WritingPanel::new(CommandLog::new(), &opts, HostEnv::default()).unwrap();
    panel.handle_event(&InputEvent::mouse(EventKind::MouseDown, 1.0, 1.0)).unwrap();
    panel.handle_event(&InputEvent::mouse(EventKind::MouseLeave, 99.0, 50.0)).unwrap();
    assert!(!panel.is_capturing());
    assert_eq!(panel.record().len(), 1);

    // Moves after the gesture ended are not subscribed any more.
    panel.handle_event(&InputEvent::mouse(EventKind::MouseMove, 5.0, 5.0)).unwrap();
    assert_eq!(panel.record().iter().next().unwrap().points().len(), 2);
}

#[test]
fn background_follows_undo_history() {
    let opts = options(r##"{"width": 40, "height": 40, "panelBgColor": "#ffffff"}"##);
    let mut panel = WritingPanel::new(RasterSurface::new(), &opts, HostEnv::default()).unwrap();
    stroke(&mut panel, &[(5.0, 5.0)]);
    panel.set_panel_bg_color(Some("#000000"), true);
    stroke(&mut panel, &[(20.0, 20.0)]);
    assert_eq!(panel.surface().frame().pixel(39, 39), Some(0xFF00_0000));

    // Undoing the stroke drawn on black brings back the white background of the first one.
    panel.revoke();
    assert_eq!(panel.panel_bg_color(), "#ffffff");
    assert_eq!(panel.surface().frame().pixel(39, 39), Some(0xFFFF_FFFF));
}

#[test]
fn exported_png_matches_the_panel_pixels() {
    let opts = options(r#"{"width": 30, "height": 20, "lineWidth": 4}"#);
    let mut panel = WritingPanel::new(RasterSurface::new(), &opts, HostEnv::default()).unwrap();
    stroke(&mut panel, &[(5.0, 10.0), (25.0, 10.0)]);

    let url = panel.get_base64().unwrap();
    let (_, payload) = url.split_once(',').unwrap();
    use base64::Engine as _;
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (30, 20));

    let frame = panel.surface().frame();
    let argb = frame.pixel(15, 10).unwrap();
    let expected = [(argb >> 16) as u8, (argb >> 8) as u8, argb as u8, (argb >> 24) as u8];
    assert_eq!(img.get_pixel(15, 10).0, expected);
    assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
}
