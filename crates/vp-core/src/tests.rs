//! Unit tests for vp-core primitives.

#[cfg(test)]
mod columns {
    use crate::{find_collisions, normalize_column, normalize_columns};

    #[test]
    fn vissim_headers() {
        assert_eq!(normalize_column("$MOVEMENTEVALUATION:SIMRUN"), "movementevaluation_simrun");
        assert_eq!(normalize_column("TIMEINT"), "timeint");
        assert_eq!(normalize_column(r"MOVEMENT\DIRECTION"), "movement_direction");
        assert_eq!(normalize_column(r"MOVEMENT\FROMLINK\LEVEL"), "movement_fromlink_level");
        assert_eq!(normalize_column("VEHS(ALL)"), "vehs_all");
        assert_eq!(normalize_column("VEHDELAY(ALL)"), "vehdelay_all");
        assert_eq!(normalize_column("DENSITY(1020)"), "density_1020");
    }

    #[test]
    fn raw_travel_time_headers() {
        assert_eq!(normalize_column(" Time"), "time");
        assert_eq!(normalize_column(" No."), "no");
        assert_eq!(normalize_column("VehType"), "veh_type");
        assert_eq!(normalize_column("HTTPServer"), "http_server");
    }

    #[test]
    fn idempotent() {
        let raw = [
            "$MOVEMENTEVALUATION:SIMRUN",
            r"MOVEMENT\FROMLINK\LEVEL",
            "VEHS(ALL)",
            "VehType",
            "Link-Eval.Segment",
        ];
        let once = normalize_columns(&raw);
        let twice = normalize_columns(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn order_and_length_preserved() {
        let raw = ["QLEN", "QLENMAX", "QLEN"];
        let out = normalize_columns(&raw);
        assert_eq!(out, ["qlen", "qlenmax", "qlen"]);
        assert_eq!(find_collisions(&out), ["qlen"]);
    }
}

#[cfg(test)]
mod value {
    use crate::Value;

    #[test]
    fn parse_kinds() {
        assert_eq!(Value::parse(""), Value::Empty);
        assert_eq!(Value::parse("  "), Value::Empty);
        assert_eq!(Value::parse("12.5"), Value::Number(12.5));
        assert_eq!(Value::parse(" AVG "), Value::Text("AVG".into()));
        assert_eq!(Value::parse("2700-6300"), Value::Text("2700-6300".into()));
    }

    #[test]
    fn integral_numbers_key_without_fraction() {
        assert_eq!(Value::Number(1.0).as_key().as_deref(), Some("1"));
        assert_eq!(Value::Number(1.5).as_key().as_deref(), Some("1.5"));
        assert_eq!(Value::Empty.as_key(), None);
    }

    #[test]
    fn nan_displays_blank() {
        assert_eq!(Value::Number(f64::NAN).to_string(), "");
        assert!(Value::Number(f64::NAN).is_missing());
        assert_eq!(Value::Number(3.0).to_string(), "3");
    }

    #[test]
    fn rounding() {
        assert_eq!(Value::Number(1.23456).rounded(2), Value::Number(1.23));
        assert_eq!(Value::Text("x".into()).rounded(2), Value::Text("x".into()));
    }
}

#[cfg(test)]
mod interval {
    use crate::{IntervalOrder, IntervalSpec, TimeInterval};

    #[test]
    fn parse_and_contains() {
        let t: TimeInterval = "2700-6300".parse().unwrap();
        assert_eq!(t, TimeInterval { start: 2700, end: 6300 });
        assert!(t.contains(2700.0));
        assert!(t.contains(6299.9));
        assert!(!t.contains(6300.0));
        assert_eq!(t.to_string(), "2700-6300");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("2700".parse::<TimeInterval>().is_err());
        assert!("a-b".parse::<TimeInterval>().is_err());
        assert!("6300-2700".parse::<TimeInterval>().is_err());
    }

    #[test]
    fn explicit_order_not_alphabetical() {
        let order = IntervalOrder::new(vec![
            IntervalSpec::new("2700-6300", "6:00-7:00 am"),
            IntervalSpec::new("6300-9900", "7:00-8:00 am"),
            IntervalSpec::new("9900-13500", "8:00-9:00 am"),
            IntervalSpec::new("13500-14400", "9:00-9:15 am"),
        ]);
        assert_eq!(order.rank("13500-14400"), Some(3));
        assert_eq!(order.rank("2700-6300"), Some(0));
        assert_eq!(order.label("6300-9900"), Some("7:00-8:00 am"));
        assert_eq!(order.rank("0-900"), None);
    }

    #[test]
    fn bucket_of_is_left_closed() {
        let order = IntervalOrder::from_ids(&["2700-3600", "3600-4500"]);
        let bounds = order.bounds().unwrap();
        assert_eq!(IntervalOrder::bucket_of(&bounds, 3600.0), Some(1));
        assert_eq!(IntervalOrder::bucket_of(&bounds, 3599.0), Some(0));
        assert_eq!(IntervalOrder::bucket_of(&bounds, 100.0), None);
        assert_eq!(order.label("3600-4500"), Some("3600-4500"));
    }
}

#[cfg(test)]
mod los {
    use crate::{los, ControlType, Los};

    #[test]
    fn signalized_boundaries() {
        assert_eq!(los(10.0, "signalized"), "A");
        assert_eq!(los(10.01, "signalized"), "B");
        assert_eq!(los(80.0, "signalized"), "E");
        assert_eq!(los(80.01, "signalized"), "F");
        assert_eq!(los(0.0, "Signalized"), "A");
    }

    #[test]
    fn stop_control_boundaries() {
        assert_eq!(los(25.0, "twsc"), "C");
        assert_eq!(los(25.01, "twsc"), "D");
        assert_eq!(los(50.0, "awsc"), "E");
        assert_eq!(los(50.5, "TWSC"), "F");
    }

    #[test]
    fn unknown_or_undefined_is_blank() {
        assert_eq!(los(12.0, "roundabout"), "");
        assert_eq!(los(f64::NAN, "signalized"), "");
        assert_eq!(ControlType::Signalized.classify(f64::NAN), None);
        assert_eq!(ControlType::Twsc.classify(15.0), Some(Los::B));
    }
}

#[cfg(test)]
mod table {
    use crate::{PivotBuilder, Table, Value, VpError};

    fn sample() -> Table {
        let mut t = Table::new(vec!["a".into(), "b".into(), "a".into()]);
        t.push_row(vec![Value::Number(1.0), Value::Text("x".into()), Value::Number(9.0)]).unwrap();
        t.push_row(vec![Value::Number(2.0), Value::Empty, Value::Number(8.0)]).unwrap();
        t
    }

    #[test]
    fn later_column_shadows_earlier() {
        let t = sample();
        assert_eq!(t.column_index("a"), Some(2));
        assert_eq!(t.get(0, "a"), Some(&Value::Number(9.0)));
    }

    #[test]
    fn push_row_checks_width() {
        let mut t = Table::new(vec!["a".into()]);
        let err = t.push_row(vec![]).unwrap_err();
        assert!(matches!(err, VpError::RowWidth { expected: 1, got: 0 }));
    }

    #[test]
    fn select_skips_missing_and_reorders() {
        let t = sample().select(&["b", "zzz", "a"]);
        assert_eq!(t.columns(), ["b", "a"]);
        assert_eq!(t.rows()[1], vec![Value::Empty, Value::Number(8.0)]);
    }

    #[test]
    fn pivot_fills_template_and_orders_rows() {
        let mut p: PivotBuilder<(u32, String)> =
            PivotBuilder::new(vec!["g1".into(), "g2".into()], vec!["m1".into(), "m2".into()]);
        assert!(p.insert((2, "b".into()), "g2", "m1", Value::Number(5.0)).unwrap());
        assert!(p.insert((1, "a".into()), "g1", "m2", Value::Number(7.0)).unwrap());
        assert!(!p.insert((1, "a".into()), "g9", "m2", Value::Number(7.0)).unwrap());

        let wide = p.finish(vec!["n".into(), "s".into()], |(n, s)| vec![n.to_string(), s.clone()]);
        assert_eq!(wide.rows.len(), 2);
        assert_eq!(wide.rows[0].index, ["1", "a"]);
        assert_eq!(wide.rows[0].cells.len(), 4);
        assert_eq!(wide.cell(&["1", "a"], "g1", "m2"), Some(&Value::Number(7.0)));
        assert_eq!(wide.cell(&["1", "a"], "g2", "m1"), Some(&Value::Empty));
        assert_eq!(wide.cell(&["2", "b"], "g2", "m1"), Some(&Value::Number(5.0)));
        let pairs: Vec<_> = wide.column_pairs().collect();
        assert_eq!(pairs, [("g1", "m1"), ("g1", "m2"), ("g2", "m1"), ("g2", "m2")]);
    }

    #[test]
    fn pivot_rejects_duplicate_cells() {
        let mut p: PivotBuilder<u32> = PivotBuilder::new(vec!["g".into()], vec!["m".into()]);
        p.insert(1, "g", "m", Value::Number(1.0)).unwrap();
        let err = p.insert(1, "g", "m", Value::Number(2.0)).unwrap_err();
        assert!(matches!(err, VpError::DuplicateCell { .. }));
    }
}
