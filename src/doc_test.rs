use super::*;

fn small() -> GridConfig {
    GridConfig { initial_rows: 2, initial_columns: 3 }
}

fn paths(batch: &ChangeBatch) -> Vec<&str> {
    batch.changes.iter().map(|c| c.path.as_str()).collect()
}

// =============================================================
// Wire shape
// =============================================================

#[test]
fn bounds_serialize_with_wire_names() {
    let json = serde_json::to_value(BoundsData::settled(32, 32)).unwrap();
    assert_eq!(json["rowStart"], 0);
    assert_eq!(json["rowLast"], 31);
    assert_eq!(json["rowLast_prev"], 31);
    assert_eq!(json["columnLast_prev"], 31);
}

#[test]
fn root_round_trips_through_json() {
    let mut root = GridRoot::seeded(&small());
    root.cell_mut(CellId::new(-1, 2)).color = Some("red".into());
    let json = serde_json::to_string(&root).unwrap();
    assert!(json.contains("\"cellGrid\""));
    let back: GridRoot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, root);
}

#[test]
fn missing_fields_default() {
    let root: GridRoot = serde_json::from_str(r#"{"cellGrid":{"0":{"0":{"color":"blue"}}}}"#).unwrap();
    assert_eq!(root.cell(CellId::new(0, 0)).unwrap().color.as_deref(), Some("blue"));
    assert_eq!(root.cell(CellId::new(0, 0)).unwrap().name, None);
    assert_eq!(root.bounds, BoundsData::default());
}

// =============================================================
// GridRoot
// =============================================================

#[test]
fn seeded_root_covers_initial_span() {
    let root = GridRoot::seeded(&small());
    assert!(!root.is_empty());
    assert!(root.cell(CellId::new(1, 2)).is_some());
    assert!(root.cell(CellId::new(2, 0)).is_none());
    assert_eq!(root.bounds.current(Edge::RowLast), 1);
    assert_eq!(root.bounds.previous(Edge::ColumnLast), 2);
}

#[test]
fn default_root_is_empty() {
    assert!(GridRoot::default().is_empty());
}

#[test]
fn bounds_accessors_address_each_edge() {
    let mut bounds = BoundsData::default();
    for (i, edge) in Edge::ALL.into_iter().enumerate() {
        let value = i32::try_from(i).unwrap();
        bounds.set_current(edge, value);
        bounds.set_previous(edge, value + 10);
    }
    for (i, edge) in Edge::ALL.into_iter().enumerate() {
        let value = i32::try_from(i).unwrap();
        assert_eq!(bounds.current(edge), value);
        assert_eq!(bounds.previous(edge), value + 10);
    }
}

#[test]
fn remove_column_drops_emptied_rows() {
    let mut root = GridRoot::default();
    root.cell_mut(CellId::new(0, 0));
    root.cell_mut(CellId::new(1, 0));
    root.cell_mut(CellId::new(1, 1));
    root.remove_column(0);
    assert!(!root.cell_grid.contains_key(&0));
    assert!(root.cell(CellId::new(1, 1)).is_some());
}

// =============================================================
// MemoryDocument
// =============================================================

#[test]
fn detached_document_refuses_updates() {
    let mut doc = MemoryDocument::new();
    assert!(doc.root().is_none());
    assert!(matches!(doc.update(&mut |_| {}), Err(DocError::Detached)));
}

#[test]
fn attach_keeps_existing_root() {
    let mut doc = MemoryDocument::attached();
    doc.update(&mut |root| root.bounds.row_last = 4).unwrap();
    doc.attach();
    assert_eq!(doc.root().unwrap().bounds.row_last, 4);
}

#[test]
fn update_reports_changed_leaves_as_paths() {
    let mut doc = MemoryDocument::attached();
    let rx = doc.subscribe();
    doc.update(&mut |root| {
        root.cell_mut(CellId::new(5, 7)).color = Some("red".into());
        root.bounds.row_start_prev = -1;
    })
    .unwrap();
    let batch = rx.try_recv().unwrap();
    assert_eq!(paths(&batch), vec!["root.bounds.rowStart_prev", "root.cellGrid.5.7.color", "root.cellGrid.5.7.name"]);
    assert!(batch.changes.iter().all(|c| c.origin == Origin::Local));
    assert_eq!(batch.changes[1].value, serde_json::json!("red"));
    assert_eq!(batch.changes[0].value, serde_json::json!(-1));
}

#[test]
fn unchanged_leaves_are_not_reported() {
    let mut doc = MemoryDocument::attached();
    doc.update(&mut |root| root.cell_mut(CellId::new(0, 0)).color = Some("red".into())).unwrap();
    let rx = doc.subscribe();
    doc.update(&mut |root| root.cell_mut(CellId::new(0, 0)).name = Some("g".into())).unwrap();
    assert_eq!(paths(&rx.try_recv().unwrap()), vec!["root.cellGrid.0.0.name"]);
}

#[test]
fn no_op_update_sends_nothing() {
    let mut doc = MemoryDocument::attached();
    let rx = doc.subscribe();
    doc.update(&mut |root| root.bounds.row_last = 0).unwrap();
    assert!(rx.try_recv().is_err());
}

#[test]
fn removed_leaves_are_reported_as_null() {
    let mut doc = MemoryDocument::attached();
    doc.update(&mut |root| root.cell_mut(CellId::new(2, 0)).color = Some("red".into())).unwrap();
    let rx = doc.subscribe();
    doc.update(&mut |root| root.remove_row(2)).unwrap();
    let batch = rx.try_recv().unwrap();
    assert_eq!(paths(&batch), vec!["root.cellGrid.2.0.color", "root.cellGrid.2.0.name"]);
    assert!(batch.changes.iter().all(|c| c.value.is_null()));
}

#[test]
fn remote_changes_carry_remote_origin() {
    let mut doc = MemoryDocument::attached();
    let rx = doc.subscribe();
    doc.apply_remote(&mut |root| root.bounds.column_last = 1).unwrap();
    let batch = rx.try_recv().unwrap();
    assert_eq!(batch.changes[0].origin, Origin::Remote);
}

#[test]
fn every_subscriber_receives_each_batch() {
    let mut doc = MemoryDocument::attached();
    let a = doc.subscribe();
    let b = doc.subscribe();
    doc.update(&mut |root| root.bounds.row_last = 3).unwrap();
    assert_eq!(a.try_recv().unwrap(), b.try_recv().unwrap());
}

#[test]
fn dropped_subscriber_is_pruned() {
    let mut doc = MemoryDocument::attached();
    let a = doc.subscribe();
    drop(doc.subscribe());
    doc.update(&mut |root| root.bounds.row_last = 3).unwrap();
    assert_eq!(doc.subscribers.len(), 1);
    assert!(a.try_recv().is_ok());
}

#[test]
fn negative_indices_appear_in_paths() {
    let mut doc = MemoryDocument::attached();
    let rx = doc.subscribe();
    doc.update(&mut |root| root.cell_mut(CellId::new(-3, -1)).name = Some("g".into())).unwrap();
    let batch = rx.try_recv().unwrap();
    assert!(paths(&batch).contains(&"root.cellGrid.-3.-1.name"));
}
