use tabula::grid::{Align, Column, ColumnConfig, VerticalAlign};
use tabula::tabula_lib::model::Record;

#[test]
fn test_config_defaults() {
    let config: ColumnConfig = serde_json::from_str(r#"{"text": "Name", "data_index": "name"}"#).unwrap();
    assert!(config.resizable);
    assert!(!config.sortable);
    assert!(!config.hidden);
    assert_eq!(config.text_align, Align::Left);
    assert_eq!(config.text_vertical_align, VerticalAlign::Middle);

    let column = Column::from(config);
    assert_eq!(column.data_index.as_deref(), Some("name"));
    assert_eq!(column.flex, 1.0);
    assert!(!column.is_group());
}

#[test]
fn test_config_builds_groups() {
    let config: ColumnConfig = serde_json::from_str(
        r#"{
            "text": "Person",
            "columns": [
                {"text": "Name", "data_index": "name", "width": 120, "sortable": true},
                {"text": "Age", "data_index": "age", "text_align": "right", "hidden": true}
            ]
        }"#,
    )
    .unwrap();
    let column = Column::from_config(config);
    assert!(column.is_group());
    assert_eq!(column.depth(), 2);
    assert_eq!(column.children().len(), 2);
    assert_eq!(column.visible_leaf_count(), 1);
    assert!(column.children()[0].sortable);
    assert_eq!(column.children()[1].text_align, Align::Right);
}

#[test]
fn test_group_hidden_only_when_all_children_hidden() {
    let group = Column::group("G", vec![Column::new("A").hide(), Column::new("B")]);
    assert!(!group.is_hidden());

    let group = Column::group("G", vec![Column::new("A").hide(), Column::new("B").hide()]);
    assert!(group.is_hidden());
}

#[test]
fn test_min_width_falls_back_to_width() {
    assert_eq!(Column::new("A").fixed(90.0).min_width(), 90.0);
    assert_eq!(Column::new("A").fixed(90.0).min(40.0).min_width(), 40.0);
    assert_eq!(Column::new("A").min_width(), 0.0);
}

#[test]
fn test_group_min_width_sums_visible_children() {
    let group = Column::group(
        "G",
        vec![
            Column::new("A").min(40.0),
            Column::new("B").fixed(60.0),
            Column::new("C").min(100.0).hide(),
        ],
    );
    assert_eq!(group.min_width(), 100.0);
}

#[test]
fn test_flex_values() {
    let flexible = Column::new("A").min(50.0).flex(2.0);
    assert_eq!(flexible.flex_grow(), 2.0);
    assert_eq!(flexible.flex_basis(), 50.0);

    let fixed = Column::new("B").fixed(80.0);
    assert_eq!(fixed.flex_grow(), 0.0);
    assert_eq!(fixed.flex_basis(), 80.0);

    let hidden = Column::new("C").min(30.0).hide();
    assert_eq!(hidden.flex_grow(), 0.0);
    assert_eq!(hidden.flex_basis(), 0.0);

    let group = Column::group("G", vec![flexible, fixed, hidden]);
    assert_eq!(group.flex_grow(), 2.0);
    assert_eq!(group.flex_basis(), 130.0);
}

#[test]
fn test_leaves_in_display_order() {
    let group = Column::group(
        "G",
        vec![
            Column::new("A"),
            Column::group("H", vec![Column::new("B"), Column::new("C")]),
            Column::new("D"),
        ],
    );
    let texts: Vec<&str> = group.leaves().iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["A", "B", "C", "D"]);
    assert_eq!(group.depth(), 3);
}

#[test]
fn test_render_cell_uses_value_text() {
    let record = Record::new(["id"]).set("id", 7).set("name", "Ann");
    let column = Column::new("Name").data_index("name").align(Align::Center);
    let cell = column.render_cell(&record, 0, 0);
    assert_eq!(cell.text, "Ann");
    assert_eq!(cell.align, Align::Center);

    let unbound = Column::new("Empty");
    assert_eq!(unbound.render_cell(&record, 0, 1).text, "");
    let missing = Column::new("Missing").data_index("nope");
    assert_eq!(missing.render_cell(&record, 0, 2).text, "");
}

#[test]
fn test_renderer_overrides_text_and_decorates_cell() {
    let record = Record::new(["id"]).set("id", 7).set("age", 41);
    let column = Column::new("Age").data_index("age").renderer(|args, cell| {
        cell.classes.push(format!("row-{}", args.row));
        cell.title = Some(args.column.text.clone());
        let age = args.value.to_string();
        Some(format!("{} years (col {})", age, args.column_index))
    });
    let cell = column.render_cell(&record, 3, 1);
    assert_eq!(cell.text, "41 years (col 1)");
    assert_eq!(cell.classes, vec!["row-3".to_string()]);
    assert_eq!(cell.title.as_deref(), Some("Age"));
}

#[test]
fn test_renderer_returning_none_keeps_handle_text() {
    let record = Record::new(["id"]).set("id", 1).set("flag", true);
    let column = Column::new("Flag").data_index("flag").renderer(|args, cell| {
        if args.record.value("flag").to_string() == "true" {
            cell.text = "yes".into();
        }
        None
    });
    assert_eq!(column.render_cell(&record, 0, 0).text, "yes");
}
