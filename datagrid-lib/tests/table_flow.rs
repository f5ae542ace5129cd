use datagrid_lib::layout::ResolvedWidth;
use datagrid_lib::model::{ColumnDefinition, Row};
use datagrid_lib::sort::{SortConfig, SortDirection, SortItem};
use datagrid_lib::window::{SizeMode, VirtualizerOptions};
use datagrid_lib::{Table, TableConfig, TableEvent};

fn json_columns() -> Vec<ColumnDefinition> {
    serde_json::from_str(
        r#"[
            {"key": "id", "label": "ID", "width": 60, "pinned": "left"},
            {"key": "name", "label": "Name", "width": "flex", "sortable": true},
            {"key": "email", "label": "Email", "width": "flex"},
            {"key": "actions", "label": "", "width": "80px", "pinned": "right"}
        ]"#,
    )
    .unwrap()
}

fn keys(table: &mut Table) -> Vec<String> {
    table.rows().unwrap().iter().map(|r| r.key.clone()).collect()
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_layout_from_json_columns() {
    let mut table = Table::new(TableConfig::default());
    table.set_columns(json_columns());
    let layout = table.layout();

    assert_eq!(
        layout.template_columns(),
        "60px minmax(100px, 1fr) minmax(100px, 1fr) 80px"
    );
    let widths: Vec<f32> = layout
        .resolve_widths(1130.0)
        .into_iter()
        .map(|ResolvedWidth { width, .. }| width)
        .collect();
    assert_eq!(widths, vec![60.0, 495.0, 495.0, 80.0]);

    assert_eq!(layout.pinned_offset("id"), Some(0.0));
    assert_eq!(layout.pinned_offset("actions"), Some(0.0));
    assert_eq!(layout.pinned_offset("name"), None);
    assert!(layout.is_last_left_pinned("id"));
    assert!(layout.is_first_right_pinned("actions"));
}

#[test]
fn test_flexible_columns_fill_available_width() {
    let mut table = Table::new(TableConfig::default());
    table.set_columns(json_columns());

    assert!(table.start_resize("id", 10.0, None));
    table.on_pointer_move(50.0);
    table.stop_resize();

    for available in [600.0, 1000.0, 1920.0] {
        let widths = table.layout().resolve_widths(available);
        let total: f32 = widths.iter().map(|w| w.width).sum();
        assert!((total - available).abs() < 0.01, "{} != {}", total, available);
    }
    // Flex tracks never shrink below their minimum.
    let widths = table.layout().resolve_widths(300.0);
    assert_eq!(widths[1].width, 100.0);
    assert_eq!(widths[2].width, 100.0);
}

// ============================================================================
// Sorting and hierarchy
// ============================================================================

#[test]
fn test_multi_column_client_sort() {
    let columns = vec![
        ColumnDefinition::new("team", "Team").sortable(),
        ColumnDefinition::new("score", "Score").sortable(),
    ];
    let rows: Vec<Row> = serde_json::from_str(
        r#"[
            {"id": "a", "team": "x", "score": 3},
            {"id": "b", "team": "y", "score": null},
            {"id": "c", "team": "x", "score": 10},
            {"id": "d", "team": "y", "score": 2}
        ]"#,
    )
    .unwrap();

    let mut table = Table::new(TableConfig::default().with_sort(SortConfig::client()));
    table.set_columns(columns);
    table.set_data(rows);

    table.header_click("team");
    table.header_click("score");
    assert_eq!(keys(&mut table), vec!["a", "c", "d", "b"]);

    table.header_click("score");
    assert_eq!(keys(&mut table), vec!["c", "a", "d", "b"]);
    assert_eq!(
        table.sort_state().items(),
        &[
            SortItem::new("team", SortDirection::Asc),
            SortItem::new("score", SortDirection::Desc),
        ]
    );
    assert_eq!(table.column_sort_state("score").priority, Some(1));

    table.reset_sort();
    assert_eq!(keys(&mut table), vec!["a", "b", "c", "d"]);

    let last = table.drain_events().pop();
    assert!(matches!(last, Some(TableEvent::SortStateChanged(state)) if state.is_empty()));
}

#[test]
fn test_sorting_keeps_children_under_parent() {
    let rows: Vec<Row> = serde_json::from_str(
        r#"[
            {"id": "p1", "name": "Zeta", "children": [
                {"id": "c2", "name": "b"},
                {"id": "c1", "name": "a"}
            ]},
            {"id": "p2", "name": "Alpha"}
        ]"#,
    )
    .unwrap();

    let mut table = Table::new(TableConfig::default().with_sort(SortConfig::client()));
    table.set_columns(json_columns());
    table.set_data(rows);
    table.expand_all();
    table.header_click("name");

    let rows = table.rows().unwrap();
    let shape: Vec<(&str, usize)> = rows.iter().map(|r| (r.key.as_str(), r.depth)).collect();
    assert_eq!(shape, vec![("p2", 0), ("p1", 0), ("c2", 1), ("c1", 1)]);
    assert_eq!(rows[2].parent_key.as_deref(), Some("p1"));

    table.collapse_all();
    assert_eq!(keys(&mut table), vec!["p2", "p1"]);
}

// ============================================================================
// Windowing
// ============================================================================

#[test]
fn test_window_boundaries() {
    let mut table = Table::new(TableConfig::default());
    table.set_columns(json_columns());
    assert!(table.window(0.0, 500.0).unwrap().is_empty());

    table.set_data((0..5).map(|i| Row::with_id(format!("r{}", i))));
    assert!(table.window(0.0, 0.0).unwrap().is_empty());
    assert_eq!(table.window(0.0, 10_000.0).unwrap().len(), 5);
}

#[test]
fn test_measured_sizes_follow_rows_across_sort() {
    let options = VirtualizerOptions::default().with_mode(SizeMode::Dynamic);
    let config = TableConfig::default()
        .with_sort(SortConfig::client())
        .with_virtualizer(options);
    let mut table = Table::new(config);
    table.set_columns(json_columns());
    table.set_data((0..10).map(|i| Row::with_id(format!("r{}", i)).set("name", format!("n{}", i))));

    table.rows().unwrap();
    table.virtualizer().measure("r0", 200.0);
    assert_eq!(table.total_extent().unwrap(), 650.0);

    table.header_click("name");
    table.header_click("name");
    assert_eq!(keys(&mut table).last().map(String::as_str), Some("r0"));
    assert_eq!(table.total_extent().unwrap(), 650.0);
    assert_eq!(table.virtualizer().size_of(9), 200.0);
    assert_eq!(table.virtualizer().size_of(0), 50.0);
}
