use proptest::prelude::*;
use writing_panel::{
    CommandLog, EventKind, HostEnv, InputEvent, Line, LineRecord, PanelConfig, PanelConfigOption,
    WritingPanel,
};

fn panel() -> WritingPanel<CommandLog> {
    let opts = PanelConfigOption {
        width: Some(300.0.into()),
        height: Some(150.0.into()),
        ..Default::default()
    };
    WritingPanel::new(CommandLog::new(), &opts, HostEnv::default()).unwrap()
}

fn coord() -> impl Strategy<Value = (f64, f64)> {
    (0.0..300.0f64, 0.0..150.0f64)
}

/// A gesture: start point, intermediate moves, end point.
type Gesture = ((f64, f64), Vec<(f64, f64)>, (f64, f64));

fn gesture() -> impl Strategy<Value = Gesture> {
    (coord(), prop::collection::vec(coord(), 0..12), coord())
}

fn draw(panel: &mut WritingPanel<CommandLog>, (start, moves, end): &Gesture) {
    panel.handle_event(&InputEvent::mouse(EventKind::MouseDown, start.0, start.1)).unwrap();
    for (x, y) in moves {
        panel.handle_event(&InputEvent::mouse(EventKind::MouseMove, *x, *y)).unwrap();
    }
    panel.handle_event(&InputEvent::mouse(EventKind::MouseUp, end.0, end.1)).unwrap();
}

fn usable_keys(panel: &WritingPanel<CommandLog>) -> Vec<String> {
    panel.record().get_usable_lines().into_iter().map(|l| l.key().to_string()).collect()
}

proptest! {
    #[test]
    fn each_stroke_has_moves_plus_two_points(g in gesture()) {
        let mut p = panel();
        draw(&mut p, &g);
        let line = p.record().find_last_usable_line().unwrap();
        prop_assert_eq!(line.points().len(), g.1.len() + 2);
    }

    #[test]
    fn adding_a_key_twice_keeps_one_line(indices in prop::collection::vec(0u64..8, 1..20)) {
        let config = PanelConfig::new(&PanelConfigOption::default(), 1.0).unwrap();
        let mut record = LineRecord::new();
        for &i in &indices {
            record.add_line(Line::start(i, &config));
        }
        let mut distinct = indices.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(record.len(), distinct.len());
        // First insertion wins the position.
        let first = record.iter().next().unwrap().key().to_string();
        prop_assert_eq!(first, format!("line_{}", indices[0]));
    }

    #[test]
    fn undo_then_redo_restores_the_usable_set(
        gestures in prop::collection::vec(gesture(), 1..6),
        undos in 0usize..8,
    ) {
        let mut p = panel();
        for g in &gestures {
            draw(&mut p, g);
        }
        let before = usable_keys(&p);
        let applied = (0..undos).filter(|_| p.revoke()).count();
        prop_assert_eq!(applied, undos.min(gestures.len()));
        for _ in 0..applied {
            prop_assert!(p.recover());
        }
        prop_assert_eq!(usable_keys(&p), before);
        prop_assert!(!p.recover());
    }

    #[test]
    fn n_undos_expose_the_matching_stroke(count in 1usize..8, n in 0usize..10) {
        let mut p = panel();
        for i in 0..count {
            let y = 10.0 + i as f64;
            draw(&mut p, &((5.0, y), vec![(50.0, y)], (60.0, y)));
        }
        for _ in 0..n {
            p.revoke();
        }
        let last = p.record().find_last_usable_line().map(|l| l.index() as usize);
        if n < count {
            prop_assert_eq!(last, Some(count - n - 1));
        } else {
            prop_assert_eq!(last, None);
        }
    }
}
