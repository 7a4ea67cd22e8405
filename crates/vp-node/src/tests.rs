//! Unit tests for vp-node.

use std::collections::BTreeMap;
use std::io::Cursor;

use vp_att::load_att_reader;
use vp_att::workbook::read_sheet;
use vp_core::{NodeNo, Strictness, Table, Value};

use crate::{
    parse_movement, CrosswalkRow, DeduplicationRule, DeduplicationTable, DirectionCrosswalk,
    MovementRecord,
};

fn record(run: &str, interval: &str, label: &str, direction: &str, vehs: f64, delay: f64) -> MovementRecord {
    let parsed = parse_movement(label).unwrap();
    MovementRecord {
        run_id:             run.into(),
        time_interval:      interval.into(),
        movement_label:     label.into(),
        from_link_level:    Some(1),
        queue_len:          0.0,
        queue_len_max:      0.0,
        vehicle_count:      vehs,
        vehicle_delay:      delay,
        node:               parsed.node,
        from_link:          parsed.from_link,
        to_link:            parsed.to_link,
        movement_direction: direction.into(),
        extra:              BTreeMap::new(),
    }
}

fn crosswalk(csv: &str) -> DirectionCrosswalk {
    DirectionCrosswalk::new(read_sheet::<CrosswalkRow, _>(Cursor::new(csv), "crosswalk").unwrap())
}

fn rules(csv: &str) -> DeduplicationTable {
    DeduplicationTable::new(read_sheet::<DeduplicationRule, _>(Cursor::new(csv), "rules").unwrap())
}

fn att(text: &str) -> Table {
    load_att_reader(Cursor::new(text), Strictness::Lenient).unwrap()
}

const HEADER: &str = "\
$VISION
* Table: Movement Results
$MOVEMENTEVALUATION:SIMRUN;TIMEINT;MOVEMENT;MOVEMENT\\DIRECTION;MOVEMENT\\FROMLINK\\LEVEL;QLEN;QLENMAX;VEHS(ALL);VEHDELAY(ALL)
";

// ── Movement labels ───────────────────────────────────────────────────────────

#[cfg(test)]
mod movement {
    use crate::{parse_movement, MovementLabel, NodeError};
    use vp_core::NodeNo;

    #[test]
    fn full_label() {
        let m = parse_movement("101: Link5 @ Link9").unwrap();
        assert_eq!(m, MovementLabel { node: NodeNo(101), from_link: "Link5".into(), to_link: "Link9".into() });
    }

    #[test]
    fn missing_from_link() {
        let m = parse_movement("101@Link9").unwrap();
        assert_eq!(m.node, NodeNo(101));
        assert_eq!(m.from_link, "");
        assert_eq!(m.to_link, "Link9");
    }

    #[test]
    fn missing_to_link() {
        let m = parse_movement("101: Link5").unwrap();
        assert_eq!(m.from_link, "Link5");
        assert_eq!(m.to_link, "");
    }

    #[test]
    fn node_only() {
        let m = parse_movement("  42 ").unwrap();
        assert_eq!(m.node, NodeNo(42));
        assert_eq!((m.from_link.as_str(), m.to_link.as_str()), ("", ""));
    }

    #[test]
    fn node_name_between_number_and_links() {
        let m = parse_movement("7 - Main St: 10 @ 20").unwrap();
        assert_eq!(m.node, NodeNo(7));
        assert_eq!(m.from_link, "10");
        assert_eq!(m.to_link, "20");
    }

    #[test]
    fn no_leading_digits_rejected() {
        for label in ["Link5 @ Link9", "", ": 1 @ 2"] {
            assert!(
                matches!(parse_movement(label), Err(NodeError::MalformedMovement(_))),
                "{label:?} should be rejected"
            );
        }
    }

    #[test]
    fn compose_then_parse_recovers_parts() {
        for (node, from, to) in [(0, "1", "2"), (101, "Link5", "Link9"), (9999, "Main St EB", "Ramp B")] {
            let label = MovementLabel { node: NodeNo(node), from_link: from.into(), to_link: to.into() };
            assert_eq!(parse_movement(&label.compose()).unwrap(), label);
        }
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod records {
    use super::{att, HEADER};
    use crate::{records_from_table, NodeColumns, NodeError, RecordFilter};
    use vp_core::NodeNo;

    fn data() -> String {
        format!(
            "{HEADER}\
AVG;2700-6300;7: 10 @ 20;NBR;1;3.5;20.1;5;8.0
AVG;2700-6300;7: 11 @ 21;NBT;;1.5;9.4;15;12.0
AVG;2700-6300;7: 12 @ 22;NBL;2;0.5;1.0;3;30.0
1;2700-6300;7: 11 @ 21;NBT;1;1.2;7.0;14;11.0
"
        )
    }

    fn filter(runs: &[&str]) -> RecordFilter {
        RecordFilter {
            keep_runs:          runs.iter().map(|r| (*r).to_owned()).collect(),
            keep_levels:        vec![1],
            keep_missing_level: true,
        }
    }

    #[test]
    fn keeps_requested_run_and_levels() {
        let recs = records_from_table(&att(&data()), &NodeColumns::default(), &filter(&["AVG"])).unwrap();
        assert_eq!(recs.len(), 2, "level-2 row dropped");
        assert_eq!(recs[0].node, NodeNo(7));
        assert_eq!(recs[0].from_link, "10");
        assert_eq!(recs[0].to_link, "20");
        assert_eq!(recs[0].movement_direction, "NBR");
        assert_eq!(recs[0].vehicle_count, 5.0);
        assert_eq!(recs[1].from_link_level, None);
    }

    #[test]
    fn numeric_run_id_matches_text() {
        let recs = records_from_table(&att(&data()), &NodeColumns::default(), &filter(&["1"])).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].run_id, "1");
    }

    #[test]
    fn absent_run_is_fatal() {
        let err = records_from_table(&att(&data()), &NodeColumns::default(), &filter(&["7"])).unwrap_err();
        assert!(matches!(err, NodeError::RunNotFound(runs) if runs == ["7"]));
    }

    #[test]
    fn text_in_metric_column_is_fatal() {
        let text = format!("{HEADER}AVG;2700-6300;7: 10 @ 20;NBR;1;n/a;20.1;5;8.0\n");
        let err = records_from_table(&att(&text), &NodeColumns::default(), &filter(&["AVG"])).unwrap_err();
        assert!(matches!(err, NodeError::NotNumeric { ref column, .. } if column == "qlen"));
    }

    #[test]
    fn missing_direction_column_is_fatal() {
        let text = "$VISION\n$MOVEMENTEVALUATION:SIMRUN;TIMEINT;MOVEMENT\nAVG;2700-6300;7: 1 @ 2\n";
        let err = records_from_table(&att(text), &NodeColumns::default(), &filter(&["AVG"])).unwrap_err();
        assert!(matches!(err, NodeError::MissingColumn(c) if c == "movement_direction"));
    }
}

// ── De-duplication ────────────────────────────────────────────────────────────

#[cfg(test)]
mod dedup {
    use super::{record, rules};
    use crate::{deduplicate, verify_rules_cover_data, verify_unique_directions, DeduplicationTable, NodeError};

    const RULES: &str = "\
node_no,movement_direction,from_link,to_link,movement_direction_unique
7,N-S, 10 , 20 ,N-S-1
7,N-S,11,21,N-S-2
7,N-S,99,98,N-S-3
";

    #[test]
    fn no_rule_keeps_own_direction() {
        let recs = vec![record("AVG", "0-900", "7: 1 @ 2", "E-W", 10.0, 1.0)];
        let out = deduplicate(recs, &DeduplicationTable::default());
        assert_eq!(out[0].direction_unique, "E-W");
    }

    #[test]
    fn rules_split_shared_direction() {
        let recs = vec![
            record("AVG", "0-900", "7: 10 @ 20", "N-S", 10.0, 1.0),
            record("AVG", "0-900", "7: 11 @ 21", "N-S ", 10.0, 1.0),
        ];
        assert!(matches!(
            verify_unique_directions(&deduplicate(recs.clone(), &DeduplicationTable::default())),
            Err(NodeError::DuplicateDirection { ref direction, .. }) if direction == "N-S"
        ));

        let out = deduplicate(recs, &rules(RULES));
        let dirs: Vec<&str> = out.iter().map(|m| m.direction_unique.as_str()).collect();
        assert_eq!(dirs, ["N-S-1", "N-S-2"]);
        verify_unique_directions(&out).unwrap();
    }

    #[test]
    fn rule_matching_ignores_case() {
        let recs = vec![
            record("AVG", "0-900", "7: Link10 @ Link20", "N-S", 10.0, 1.0),
            record("AVG", "0-900", "7: 3 @ 4", "e-W", 10.0, 1.0),
        ];
        let table = rules(
            "node_no,movement_direction,from_link,to_link,movement_direction_unique\n7, n-s ,LINK10,link20,N-S-1\n",
        );
        assert!(verify_rules_cover_data(&recs, &table).is_empty());
        let out = deduplicate(recs, &table);
        assert_eq!(out[0].direction_unique, "N-S-1");
        // unmatched movements keep their own spelling
        assert_eq!(out[1].direction_unique, "e-W");
    }

    #[test]
    fn same_direction_in_other_group_is_fine() {
        let recs = vec![
            record("AVG", "0-900", "7: 10 @ 20", "N-S", 10.0, 1.0),
            record("AVG", "900-1800", "7: 10 @ 20", "N-S", 10.0, 1.0),
            record("AVG", "0-900", "8: 10 @ 20", "N-S", 10.0, 1.0),
        ];
        verify_unique_directions(&deduplicate(recs, &DeduplicationTable::default())).unwrap();
    }

    #[test]
    fn unmatched_rules_reported_not_fatal() {
        let recs = vec![
            record("AVG", "0-900", "7: 10 @ 20", "N-S", 10.0, 1.0),
            record("AVG", "0-900", "7: 11 @ 21", "N-S", 10.0, 1.0),
        ];
        let table = rules(RULES);
        let unmatched = verify_rules_cover_data(&recs, &table);
        assert_eq!(unmatched.len(), 1);
        assert_eq!(unmatched[0].movement_direction_unique, "N-S-3");
    }
}

// ── Crosswalk ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod crosswalk {
    use super::{crosswalk, record};
    use crate::{approach_of, deduplicate, map_directions, DeduplicationTable, NodeError};
    use vp_core::{NodeNo, Strictness};

    const CROSSWALK: &str = "\
node_no,movement_direction_unique,direction_results,node_type
7,N-S,SBT,Signalized
7,N-E,SBL,
7,Total,Total,
";

    #[test]
    fn aliases_accepted() {
        let cw = crosswalk("node_id,movement_direction_unique,report_direction,node_type\n3,A,NBR,twsc\n");
        assert_eq!(cw.report_direction(NodeNo(3), " A "), Some("NBR"));
        assert_eq!(cw.node_type(NodeNo(3)), Some("twsc"));
    }

    #[test]
    fn blank_report_direction_is_declared_none() {
        let cw = crosswalk("node_no,movement_direction_unique,direction_results,node_type\n7,FWY,  ,signalized\n");
        assert_eq!(cw.report_direction(NodeNo(7), "FWY"), None);
        assert!(cw.contains(NodeNo(7), "FWY"));
        assert!(!cw.contains(NodeNo(7), "W-E"));
    }

    #[test]
    fn first_node_type_wins() {
        let cw = crosswalk(CROSSWALK);
        assert_eq!(cw.node_type(NodeNo(7)), Some("Signalized"));
    }

    #[test]
    fn approach_is_leading_pair() {
        assert_eq!(approach_of("NBR").as_deref(), Some("NB"));
        assert_eq!(approach_of("  SBL (MA 3)").as_deref(), Some("SB"));
        assert_eq!(approach_of("N"), None);
    }

    #[test]
    fn totals_dropped_unmapped_kept_unlabelled() {
        let recs = vec![
            record("AVG", "0-900", "7: 1 @ 2", "N-S", 10.0, 1.0),
            record("AVG", "0-900", "7", "Total", 30.0, 1.0),
            record("AVG", "0-900", "7: 3 @ 4", "W-E", 10.0, 1.0),
        ];
        let mapped = map_directions(
            deduplicate(recs, &DeduplicationTable::default()),
            &crosswalk(CROSSWALK),
            Strictness::Lenient,
        )
        .unwrap();
        assert_eq!(mapped.movements.len(), 2);
        assert_eq!(mapped.movements[0].report_direction.as_deref(), Some("SBT"));
        assert_eq!(mapped.movements[0].approach.as_deref(), Some("SB"));
        assert_eq!(mapped.movements[1].report_direction, None);
        assert_eq!(mapped.movements[1].approach, None);
        assert_eq!(mapped.unmapped, vec![(NodeNo(7), "W-E".to_owned())]);
    }

    #[test]
    fn strict_unmapped_is_error() {
        let recs = vec![record("AVG", "0-900", "7: 3 @ 4", "W-E", 10.0, 1.0)];
        let err = map_directions(
            deduplicate(recs, &DeduplicationTable::default()),
            &crosswalk(CROSSWALK),
            Strictness::Strict,
        )
        .unwrap_err();
        assert!(matches!(err, NodeError::UnmappedDirection { node: NodeNo(7), ref direction } if direction == "W-E"));
    }
}

// ── Aggregation ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod aggregate {
    use super::{crosswalk, record};
    use crate::{
        approach_delay, deduplicate, intersection_delay, map_directions, DeduplicationTable,
        MappedMovement, MovementRecord, NodeError, INTERSECTION,
    };
    use vp_core::Strictness;

    const CROSSWALK: &str = "\
node_no,movement_direction_unique,direction_results,node_type
7,A,NBR,signalized
7,B,NBT,signalized
7,C,EBL,signalized
";

    fn mapped(recs: Vec<MovementRecord>) -> Vec<MappedMovement> {
        map_directions(deduplicate(recs, &DeduplicationTable::default()), &crosswalk(CROSSWALK), Strictness::Lenient)
            .unwrap()
            .movements
    }

    #[test]
    fn vehicle_weighted_mean() {
        let m = mapped(vec![
            record("AVG", "0-900", "7: 1 @ 2", "A", 10.0, 5.0),
            record("AVG", "0-900", "7: 3 @ 4", "B", 20.0, 20.0),
        ]);
        let agg = intersection_delay(&m, Strictness::Lenient).unwrap();
        assert_eq!(agg.len(), 1);
        assert_eq!(agg[0].report_direction, INTERSECTION);
        assert_eq!(agg[0].approach, None);
        assert_eq!(agg[0].delay, 15.0);
        assert_eq!(agg[0].vehicle_count, 30.0);
    }

    #[test]
    fn intersection_counts_unmapped_approach_does_not() {
        let m = mapped(vec![
            record("AVG", "0-900", "7: 1 @ 2", "A", 10.0, 10.0),
            record("AVG", "0-900", "7: 3 @ 4", "C", 10.0, 30.0),
            record("AVG", "0-900", "7: 5 @ 6", "unmapped", 20.0, 40.0),
        ]);
        let node = intersection_delay(&m, Strictness::Lenient).unwrap();
        assert_eq!(node[0].delay, (100.0 + 300.0 + 800.0) / 40.0);

        let approaches = approach_delay(&m, Strictness::Lenient).unwrap();
        let codes: Vec<&str> = approaches.iter().map(|a| a.report_direction.as_str()).collect();
        assert_eq!(codes, ["EB", "NB"]);
        assert_eq!(approaches[0].delay, 30.0);
        assert_eq!(approaches[1].delay, 10.0);
    }

    #[test]
    fn zero_volume_lenient_is_nan() {
        let m = mapped(vec![record("AVG", "0-900", "7: 1 @ 2", "A", 0.0, 0.0)]);
        let agg = intersection_delay(&m, Strictness::Lenient).unwrap();
        assert!(agg[0].delay.is_nan());
    }

    #[test]
    fn zero_volume_strict_is_error() {
        let m = mapped(vec![record("AVG", "0-900", "7: 1 @ 2", "A", 0.0, 0.0)]);
        let err = approach_delay(&m, Strictness::Strict).unwrap_err();
        assert!(matches!(err, NodeError::ZeroVolume { approach: Some(ref a), .. } if a == "NB"));
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod report {
    use super::{att, crosswalk, HEADER};
    use crate::pipeline::filter_records;
    use crate::{
        format_report, DeduplicationTable, NodeError, NodeEvalConfig, NodeEvalPipeline, ReportOrder,
        ReportRow,
    };
    use vp_core::{IntervalOrder, IntervalSpec, NodeNo, Strictness, Value, VpError};

    const CROSSWALK: &str = "\
node_no,movement_direction_unique,direction_results,node_type
7,NBR,NBR,signalized
7,NBT,NBT,signalized
7,Total,Total,signalized
";

    fn node7() -> String {
        format!(
            "{HEADER}\
AVG;2700-6300;7: 10 @ 20;NBR;1;3.5;20.1;5;8.0
AVG;2700-6300;7: 11 @ 21;NBT;1;1.5;9.4;15;12.0
AVG;2700-6300;7;Total;1;9.0;99.0;500;99.0
"
        )
    }

    fn pipeline(cw: &str, strictness: Strictness) -> NodeEvalPipeline {
        let config = NodeEvalConfig { strictness, ..NodeEvalConfig::default() };
        NodeEvalPipeline::new(config, crosswalk(cw), DeduplicationTable::default())
    }

    const AM6: &str = "6:00-7:00 am";

    #[test]
    fn node_and_approach_delay_graded() {
        let out = pipeline(CROSSWALK, Strictness::Lenient).run(&att(&node7())).unwrap();
        let wide = &out.wide;

        let intersection = ["AVG", "7", "", "Intersection", "", ""];
        assert_eq!(wide.cell(&intersection, AM6, "vehdelay_all"), Some(&Value::Number(11.0)));
        assert_eq!(wide.cell(&intersection, AM6, "los"), Some(&Value::Text("B".into())));

        let approach = ["AVG", "7", "NB", "NB", "", ""];
        assert_eq!(wide.cell(&approach, AM6, "vehdelay_all"), Some(&Value::Number(11.0)));
        assert_eq!(wide.cell(&approach, AM6, "los"), Some(&Value::Text("B".into())));
        assert_eq!(wide.cell(&approach, AM6, "qlen"), Some(&Value::Empty));

        let nbr = ["AVG", "7", "NB", "NBR", "10", "20"];
        assert_eq!(wide.cell(&nbr, AM6, "qlen"), Some(&Value::Number(3.5)));
        assert_eq!(wide.cell(&nbr, AM6, "vehs_all"), Some(&Value::Number(5.0)));
        assert_eq!(wide.cell(&nbr, AM6, "los"), Some(&Value::Text("A".into())));

        assert!(out.diagnostics.is_clean());
    }

    #[test]
    fn rows_follow_direction_order_with_intersection_last() {
        let out = pipeline(CROSSWALK, Strictness::Lenient).run(&att(&node7())).unwrap();
        let dirs: Vec<&str> = out.wide.rows.iter().map(|r| r.index[3].as_str()).collect();
        assert_eq!(dirs, ["NBR", "NBT", "NB", "Intersection"]);
    }

    #[test]
    fn columns_are_full_interval_by_metric_product() {
        let out = pipeline(CROSSWALK, Strictness::Lenient).run(&att(&node7())).unwrap();
        let wide = &out.wide;
        assert_eq!(wide.groups, ["6:00-7:00 am", "7:00-8:00 am", "8:00-9:00 am", "9:00-9:15 am"]);
        assert_eq!(wide.column_pairs().count(), 4 * 5);
        assert!(wide.rows.iter().all(|r| r.cells.len() == 20));
        let later = ["AVG", "7", "NB", "NBR", "10", "20"];
        assert_eq!(wide.cell(&later, "9:00-9:15 am", "qlen"), Some(&Value::Empty));
    }

    #[test]
    fn total_row_never_reported() {
        let out = pipeline(CROSSWALK, Strictness::Lenient).run(&att(&node7())).unwrap();
        assert!(out.wide.rows.iter().all(|r| r.index[3] != "Total"));
        assert!(out.long_rows.iter().all(|r| r.report_direction.as_deref() != Some("Total")));
    }

    #[test]
    fn unmapped_direction_left_out_of_report() {
        let cw = "node_no,movement_direction_unique,direction_results,node_type\n7,NBR,NBR,signalized\n";
        let out = pipeline(cw, Strictness::Lenient).run(&att(&node7())).unwrap();
        assert!(out.wide.rows.iter().all(|r| r.index[3] != "NBT"));
        assert_eq!(out.diagnostics.unmapped_directions, vec![(NodeNo(7), "NBT".to_owned())]);
        // the unmapped movement still weighs into the intersection
        let intersection = ["AVG", "7", "", "Intersection", "", ""];
        assert_eq!(out.wide.cell(&intersection, AM6, "vehdelay_all"), Some(&Value::Number(11.0)));
    }

    #[test]
    fn blank_crosswalk_direction_excluded_but_weighted() {
        let cw = format!("{CROSSWALK}7,FWY,,signalized\n");
        let data = format!("{}AVG;2700-6300;7: 30 @ 31;FWY;1;0.0;0.0;900;1.0\n", node7());
        for strictness in [Strictness::Lenient, Strictness::Strict] {
            let out = pipeline(&cw, strictness).run(&att(&data)).unwrap();
            assert!(out.wide.rows.iter().all(|r| !r.index[3].is_empty()));
            assert!(out.wide.row(&["AVG", "7", "", "", "30", "31"]).is_none());
            assert!(out.diagnostics.is_clean());

            let fwy = out.long_rows.iter().filter(|r| r.from_link == "30").collect::<Vec<_>>();
            assert!(!fwy.is_empty());
            assert!(fwy.iter().all(|r| r.report_direction.is_none()));
            assert!(fwy.iter().filter(|r| r.metric == "los").all(|r| r.value == Value::Empty));

            // (5*8 + 15*12 + 900*1) / 920
            let intersection = ["AVG", "7", "", "Intersection", "", ""];
            let expected = ((5.0 * 8.0 + 15.0 * 12.0 + 900.0) / 920.0 * 100.0_f64).round() / 100.0;
            let Some(Value::Number(delay)) = out.wide.cell(&intersection, AM6, "vehdelay_all") else {
                panic!("intersection delay missing");
            };
            assert!((delay - expected).abs() < 0.01, "{delay} vs {expected}");
        }
    }

    #[test]
    fn unknown_control_type_lenient_blank_strict_error() {
        let cw = "node_no,movement_direction_unique,direction_results,node_type\n7,NBR,NBR,roundabout\n7,NBT,NBT,\n";
        let out = pipeline(cw, Strictness::Lenient).run(&att(&node7())).unwrap();
        let intersection = ["AVG", "7", "", "Intersection", "", ""];
        assert_eq!(out.wide.cell(&intersection, AM6, "los"), Some(&Value::Empty));

        let err = pipeline(cw, Strictness::Strict).run(&att(&node7())).unwrap_err();
        assert!(matches!(err, NodeError::UnknownControlType { ref node_type, .. } if node_type == "roundabout"));
    }

    #[test]
    fn control_type_selects_thresholds() {
        let text = format!("{HEADER}AVG;2700-6300;7: 10 @ 20;NBR;1;3.5;20.1;5;18.0\n");
        let nbr = ["AVG", "7", "NB", "NBR", "10", "20"];
        for (node_type, grade) in [("signalized", "B"), ("TWSC", "C"), ("awsc", "C")] {
            let cw = format!("node_no,movement_direction_unique,direction_results,node_type\n7,NBR,NBR,{node_type}\n");
            let out = pipeline(&cw, Strictness::Lenient).run(&att(&text)).unwrap();
            assert_eq!(out.wide.cell(&nbr, AM6, "los"), Some(&Value::Text(grade.into())), "{node_type}");
        }
    }

    #[test]
    fn interval_outside_order_dropped() {
        let rows = vec![ReportRow {
            run_id:           "AVG".into(),
            node:             NodeNo(1),
            approach:         None,
            report_direction: Some("Intersection".into()),
            from_link:        String::new(),
            to_link:          String::new(),
            time_interval:    "0-900".into(),
            metric:           "vehdelay_all".into(),
            value:            Value::Number(3.0),
        }];
        let order = ReportOrder {
            intervals:  IntervalOrder::new(vec![IntervalSpec::new("900-1800", "b")]),
            directions: vec![],
            metrics:    vec!["vehdelay_all".into()],
        };
        let wide = format_report(&rows, &order).unwrap();
        assert!(wide.rows.is_empty());
    }

    #[test]
    fn colliding_cells_rejected() {
        let row = ReportRow {
            run_id:           "AVG".into(),
            node:             NodeNo(1),
            approach:         Some("NB".into()),
            report_direction: Some("NBT".into()),
            from_link:        "1".into(),
            to_link:          "2".into(),
            time_interval:    "0-900".into(),
            metric:           "qlen".into(),
            value:            Value::Number(3.0),
        };
        let order = ReportOrder {
            intervals:  IntervalOrder::from_ids(&["0-900"]),
            directions: vec!["NBT".into()],
            metrics:    vec!["qlen".into()],
        };
        let err = format_report(&[row.clone(), row], &order).unwrap_err();
        assert!(matches!(err, NodeError::Core(VpError::DuplicateCell { .. })));
    }

    #[test]
    fn default_config_filters_level_and_run() {
        let text = format!(
            "{HEADER}\
AVG;2700-6300;7: 10 @ 20;NBR;2;3.5;20.1;5;8.0
3;2700-6300;7: 10 @ 20;NBR;1;3.5;20.1;5;8.0
AVG;2700-6300;7: 11 @ 21;NBT;;1.5;9.4;15;12.0
"
        );
        let recs = filter_records(&att(&text), &NodeEvalConfig::default()).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].movement_direction, "NBT");
    }
}

// ── Odds and ends ─────────────────────────────────────────────────────────────

#[test]
fn node_type_lookup_uses_typed_node() {
    let cw = crosswalk("node_no,movement_direction_unique,direction_results,node_type\n12,X,WBL,awsc\n");
    assert_eq!(cw.node_type(NodeNo(12)), Some("awsc"));
    assert_eq!(cw.node_type(NodeNo(13)), None);
}

#[test]
fn empty_cell_is_nan_metric() {
    let text = format!("{HEADER}AVG;2700-6300;7: 1 @ 2;NBR;1;;;5;8.0\n");
    let recs = crate::records_from_table(
        &att(&text),
        &crate::NodeColumns::default(),
        &crate::RecordFilter { keep_runs: vec!["AVG".into()], keep_levels: vec![1], keep_missing_level: false },
    )
    .unwrap();
    assert!(recs[0].queue_len.is_nan());
    assert!(Value::from(recs[0].queue_len).is_missing());
}
