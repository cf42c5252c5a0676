use super::*;

fn pair(current: i32, previous: i32) -> BoundPair {
    BoundPair { current, previous }
}

// =============================================================
// Edge
// =============================================================

#[test]
fn edge_keys_round_trip() {
    for edge in Edge::ALL {
        assert_eq!(Edge::from_key(edge.key()), Some(edge));
    }
    assert_eq!(Edge::from_key("rowStart_prev"), None);
    assert_eq!(Edge::from_key(""), None);
}

#[test]
fn edge_display_is_wire_key() {
    assert_eq!(Edge::ColumnLast.to_string(), "columnLast");
}

#[test]
fn edge_outward_direction() {
    assert_eq!(Edge::RowStart.outward(), -1);
    assert_eq!(Edge::ColumnStart.outward(), -1);
    assert_eq!(Edge::RowLast.outward(), 1);
    assert_eq!(Edge::ColumnLast.outward(), 1);
}

// =============================================================
// BoundPair::plan
// =============================================================

#[test]
fn settled_pair_plans_nothing() {
    assert_eq!(BoundPair::settled(31).plan(Edge::RowLast), Ok(None));
}

#[test]
fn row_start_increase_deletes_old_top_row() {
    let step = pair(1, 0).plan(Edge::RowStart).unwrap().unwrap();
    assert_eq!(step.edit, LaneEdit::DeleteRow { index: 0, edge: RowEdge::Top });
    assert_eq!(step.step, 1);
}

#[test]
fn row_start_decrease_inserts_above() {
    let step = pair(-1, 0).plan(Edge::RowStart).unwrap().unwrap();
    assert_eq!(step.edit, LaneEdit::InsertRow { index: -1, edge: RowEdge::Top });
    assert_eq!(step.step, -1);
}

#[test]
fn row_last_increase_inserts_below() {
    let step = pair(32, 31).plan(Edge::RowLast).unwrap().unwrap();
    assert_eq!(step.edit, LaneEdit::InsertRow { index: 32, edge: RowEdge::Bottom });
}

#[test]
fn row_last_decrease_deletes_old_bottom_row() {
    let step = pair(30, 31).plan(Edge::RowLast).unwrap().unwrap();
    assert_eq!(step.edit, LaneEdit::DeleteRow { index: 31, edge: RowEdge::Bottom });
}

#[test]
fn column_start_increase_deletes_old_left_column() {
    let step = pair(1, 0).plan(Edge::ColumnStart).unwrap().unwrap();
    assert_eq!(step.edit, LaneEdit::DeleteColumn { index: 0, edge: ColumnEdge::Left });
}

#[test]
fn column_start_decrease_inserts_left() {
    let step = pair(-3, -2).plan(Edge::ColumnStart).unwrap().unwrap();
    assert_eq!(step.edit, LaneEdit::InsertColumn { index: -3, edge: ColumnEdge::Left });
}

#[test]
fn column_last_increase_inserts_right() {
    let step = pair(32, 31).plan(Edge::ColumnLast).unwrap().unwrap();
    assert_eq!(step.edit, LaneEdit::InsertColumn { index: 32, edge: ColumnEdge::Right });
}

#[test]
fn column_last_decrease_deletes_old_right_column() {
    let step = pair(30, 31).plan(Edge::ColumnLast).unwrap().unwrap();
    assert_eq!(step.edit, LaneEdit::DeleteColumn { index: 31, edge: ColumnEdge::Right });
}

// =============================================================
// Violations
// =============================================================

#[test]
fn jump_of_two_is_a_violation() {
    let err = pair(33, 31).plan(Edge::RowLast).unwrap_err();
    assert_eq!(err, BoundViolation { edge: Edge::RowLast, current: 33, previous: 31 });
}

#[test]
fn large_negative_jump_is_a_violation() {
    assert!(pair(-10, 0).plan(Edge::ColumnStart).is_err());
}

#[test]
fn extreme_values_do_not_overflow() {
    let p = pair(i32::MAX, i32::MIN);
    assert_eq!(p.delta(), i64::from(i32::MAX) - i64::from(i32::MIN));
    assert!(p.plan(Edge::RowLast).is_err());
}

#[test]
fn violation_message_names_edge() {
    let err = pair(5, 0).plan(Edge::ColumnLast).unwrap_err();
    assert!(err.to_string().contains("columnLast"));
}

// =============================================================
// advance
// =============================================================

#[test]
fn advance_settles_pair() {
    let mut p = pair(32, 31);
    let step = p.plan(Edge::RowLast).unwrap().unwrap();
    p.advance(step.step);
    assert!(p.is_settled());
    assert_eq!(p.previous, 32);
}

#[test]
fn two_single_steps_each_plan_one_edit() {
    let mut p = BoundPair::settled(31);
    let mut edits = Vec::new();
    for current in [32, 33] {
        p.current = current;
        let step = p.plan(Edge::RowLast).unwrap().unwrap();
        edits.push(step.edit);
        p.advance(step.step);
    }
    assert_eq!(
        edits,
        vec![
            LaneEdit::InsertRow { index: 32, edge: RowEdge::Bottom },
            LaneEdit::InsertRow { index: 33, edge: RowEdge::Bottom },
        ]
    );
}

// =============================================================
// BoundSet
// =============================================================

#[test]
fn bound_set_settled_spans() {
    let set = BoundSet::settled(0, 31, 0, 31);
    assert!(set.is_settled());
    assert_eq!(set.get(Edge::RowLast), BoundPair::settled(31));
    assert_eq!(set.get(Edge::ColumnStart), BoundPair::settled(0));
}

#[test]
fn observe_updates_current_and_plans() {
    let mut set = BoundSet::settled(0, 31, 0, 31);
    let step = set.observe(Edge::RowStart, 1).unwrap().unwrap();
    assert_eq!(step.edit, LaneEdit::DeleteRow { index: 0, edge: RowEdge::Top });
    assert_eq!(set.get(Edge::RowStart), pair(1, 0));
    assert!(!set.is_settled());
}

#[test]
fn observe_duplicate_after_advance_is_noop() {
    let mut set = BoundSet::settled(0, 31, 0, 31);
    let step = set.observe(Edge::ColumnLast, 32).unwrap().unwrap();
    set.get_mut(Edge::ColumnLast).advance(step.step);
    assert_eq!(set.observe(Edge::ColumnLast, 32), Ok(None));
}

#[test]
fn observe_violation_keeps_previous() {
    let mut set = BoundSet::settled(0, 31, 0, 31);
    assert!(set.observe(Edge::RowLast, 40).is_err());
    assert_eq!(set.get(Edge::RowLast).previous, 31);
    // A later consistent value recovers.
    assert!(set.observe(Edge::RowLast, 32).unwrap().is_some());
}
