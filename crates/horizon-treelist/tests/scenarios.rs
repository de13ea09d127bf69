//! Integration tests for the control's documented behaviors: cache
//! scenarios, selection mode transitions, eviction and the viewport.

use std::sync::Arc;

use parking_lot::Mutex;

use horizon_treelist::{
    CachedRow, Damage, FocusChange, KeyboardModifiers, Point, Propagation, Row, RowContainer,
    RowKey, SelectionChange, SelectionMode, Size, TreeListConfig, TreeListControl,
};

fn add(control: &mut TreeListControl, container: impl Into<RowContainer>, text: &str) -> RowKey {
    control
        .rows_mut(container.into())
        .add(Row::with_cells([text]))
        .unwrap()
}

fn entries(control: &TreeListControl) -> Vec<(String, usize)> {
    control
        .cache()
        .iter()
        .map(|entry| (control.row(entry.key).unwrap().text(), entry.level))
        .collect()
}

fn entry(text: &str, level: usize) -> (String, usize) {
    (text.to_string(), level)
}

#[test]
fn test_remove_middle_root() {
    let mut control = TreeListControl::default();
    let a = add(&mut control, RowContainer::Root, "A");
    let b = add(&mut control, RowContainer::Root, "B");
    let c = add(&mut control, RowContainer::Root, "C");
    assert_eq!(entries(&control), vec![entry("A", 0), entry("B", 0), entry("C", 0)]);

    control.rows_mut(RowContainer::Root).remove(b).unwrap();
    assert_eq!(entries(&control), vec![entry("A", 0), entry("C", 0)]);
    assert_eq!(control.cache().position_of(c), Some(1));
    assert_eq!(control.cache().get(0), Some(CachedRow { key: a, level: 0 }));
}

#[test]
fn test_expand_and_collapse_children() {
    let mut control = TreeListControl::default();
    let a = add(&mut control, RowContainer::Root, "A");
    add(&mut control, a, "A1");
    add(&mut control, a, "A2");
    assert_eq!(entries(&control), vec![entry("A", 0)]);

    control.expand(a).unwrap();
    assert_eq!(
        entries(&control),
        vec![entry("A", 0), entry("A1", 1), entry("A2", 1)]
    );

    control.collapse(a).unwrap();
    assert_eq!(entries(&control), vec![entry("A", 0)]);
}

#[test]
fn test_expansion_of_hidden_row_is_remembered() {
    let mut control = TreeListControl::default();
    let a = add(&mut control, RowContainer::Root, "A");
    let a1 = add(&mut control, a, "A1");
    add(&mut control, a1, "A1x");

    control.expand(a1).unwrap();
    assert_eq!(entries(&control), vec![entry("A", 0)]);

    control.expand(a).unwrap();
    assert_eq!(
        entries(&control),
        vec![entry("A", 0), entry("A1", 1), entry("A1x", 2)]
    );
}

#[test]
fn test_insert_after_expanded_sibling() {
    let mut control = TreeListControl::default();
    let a = add(&mut control, RowContainer::Root, "A");
    add(&mut control, a, "A1");
    control.expand(a).unwrap();
    add(&mut control, RowContainer::Root, "B");
    control
        .rows_mut(RowContainer::Root)
        .insert(1, Row::with_cells(["AB"]))
        .unwrap();

    assert_eq!(
        entries(&control),
        vec![entry("A", 0), entry("A1", 1), entry("AB", 0), entry("B", 0)]
    );
}

#[test]
fn test_multi_to_single_keeps_first_selected() {
    let config = TreeListConfig::default().with_selection_mode(SelectionMode::MultiSimple);
    let mut control = TreeListControl::new(config).unwrap();
    let a = add(&mut control, RowContainer::Root, "A");
    let b = add(&mut control, RowContainer::Root, "B");
    let c = add(&mut control, RowContainer::Root, "C");

    control.set_row_selected(b, true).unwrap();
    control.set_row_selected(a, true).unwrap();
    control.set_row_selected(c, true).unwrap();
    assert_eq!(control.selected_rows(), &[b, a, c]);

    control.set_selection_mode(SelectionMode::Single);
    assert_eq!(control.selected_rows(), &[b]);
    assert!(control.row(b).unwrap().is_selected());
    assert!(!control.row(a).unwrap().is_selected());

    control.set_selection_mode(SelectionMode::None);
    assert!(control.selected_rows().is_empty());
    control.set_row_selected(a, true).unwrap();
    assert!(control.selected_rows().is_empty());
}

#[test]
fn test_multi_extended_uses_control_modifier() {
    let config = TreeListConfig::default().with_selection_mode(SelectionMode::MultiExtended);
    let mut control = TreeListControl::new(config).unwrap();
    let a = add(&mut control, RowContainer::Root, "A");
    let b = add(&mut control, RowContainer::Root, "B");
    let c = add(&mut control, RowContainer::Root, "C");

    control.set_row_selected(a, true).unwrap();
    control.set_row_selected_with(b, true, KeyboardModifiers::CTRL).unwrap();
    assert_eq!(control.selected_rows(), &[a, b]);

    control.set_row_selected(c, true).unwrap();
    assert_eq!(control.selected_rows(), &[c]);
}

#[test]
fn test_batched_selection_without_net_change_is_silent() {
    let config = TreeListConfig::default().with_selection_mode(SelectionMode::MultiSimple);
    let mut control = TreeListControl::new(config).unwrap();
    let a = add(&mut control, RowContainer::Root, "A");

    let fired = Arc::new(Mutex::new(Vec::<SelectionChange>::new()));
    let sink = fired.clone();
    control
        .selection_changed
        .observe(move |change| sink.lock().push(change.clone()));

    control.set_row_selected(a, false).unwrap();
    control.clear_selection();
    assert!(fired.lock().is_empty());

    control.set_row_selected(a, true).unwrap();
    assert_eq!(fired.lock().len(), 1);
}

#[test]
fn test_removing_focused_selected_row_evicts_it() {
    let mut control = TreeListControl::default();
    add(&mut control, RowContainer::Root, "A");
    let b = add(&mut control, RowContainer::Root, "B");
    let c = add(&mut control, RowContainer::Root, "C");
    control.set_focused_row(Some(b)).unwrap();
    control.set_row_selected(b, true).unwrap();

    let focus = Arc::new(Mutex::new(Vec::new()));
    let sink = focus.clone();
    control.focus_changed.observe(move |change| sink.lock().push(*change));

    let removed = control.rows_mut(RowContainer::Root).remove(b).unwrap();
    assert!(!removed.is_selected());
    assert!(!control.selected_rows().contains(&b));
    assert_eq!(control.focused_row(), Some(c));
    assert_eq!(
        *focus.lock(),
        vec![FocusChange {
            previous: Some(b),
            current: Some(c)
        }]
    );
}

#[test]
fn test_removing_parent_evicts_selected_descendants() {
    let config = TreeListConfig::default().with_selection_mode(SelectionMode::MultiSimple);
    let mut control = TreeListControl::new(config).unwrap();
    let a = add(&mut control, RowContainer::Root, "A");
    let a1 = add(&mut control, a, "A1");
    let a1x = add(&mut control, a1, "A1x");
    let b = add(&mut control, RowContainer::Root, "B");
    control.expand_all();
    control.set_row_selected(a1x, true).unwrap();
    control.set_row_selected(b, true).unwrap();
    control.set_focused_row(Some(a1x)).unwrap();

    control.rows_mut(RowContainer::Root).remove(a).unwrap();
    assert_eq!(control.selected_rows(), &[b]);
    assert_eq!(control.focused_row(), Some(b));
    assert!(control.row(a1).is_none());
    assert!(control.is_consistent());
}

#[test]
fn test_clearing_root_resets_focus_and_selection() {
    let mut control = TreeListControl::default();
    let a = add(&mut control, RowContainer::Root, "A");
    control.set_row_selected(a, true).unwrap();

    control.rows_mut(RowContainer::Root).clear().unwrap();
    assert_eq!(control.row_count(), 0);
    assert_eq!(control.focused_row(), None);
    assert!(control.selected_rows().is_empty());

    let b = add(&mut control, RowContainer::Root, "B");
    assert_eq!(control.focused_row(), Some(b));
}

#[test]
fn test_viewport_visible_window() {
    let config = TreeListConfig::default().with_header(false).with_row_height(25);
    let mut control = TreeListControl::new(config).unwrap();
    control.columns_mut().add("Name");
    control.set_viewport_size(Size::new(300, 100));
    for i in 0..10 {
        add(&mut control, RowContainer::Root, &format!("row {i}"));
    }

    assert!(control.set_vertical_offset(30));
    assert_eq!(control.visible_range(), 1..5);

    // Points map back to the rows drawn there.
    let third = control.cache().get(3).unwrap().key;
    let bounds = control.row_client_bounds(third).unwrap();
    assert_eq!(control.row_at(Point::new(5, bounds.top())), Some(third));
    assert_eq!(control.row_at(Point::new(5, 1000)), None);

    // Offsets clamp to the extent.
    assert!(control.set_vertical_offset(10_000));
    assert_eq!(control.vertical_offset(), 10 * 26 + 1 - 100);
    control.set_vertical_offset(-5);
    assert_eq!(control.vertical_offset(), 0);
}

#[test]
fn test_visible_rows_bounded_by_cache() {
    let mut control = TreeListControl::default();
    control.set_viewport_size(Size::new(300, 1000));
    add(&mut control, RowContainer::Root, "A");
    add(&mut control, RowContainer::Root, "B");
    assert_eq!(control.visible_rows().count(), 2);
    // Restartable.
    assert_eq!(control.visible_rows().count(), 2);
}

#[test]
fn test_ensure_visible_expands_and_scrolls() {
    let config = TreeListConfig::default().with_header(false).with_row_height(25);
    let mut control = TreeListControl::new(config).unwrap();
    control.set_viewport_size(Size::new(300, 100));
    for i in 0..10 {
        add(&mut control, RowContainer::Root, &format!("filler {i}"));
    }
    let folder = add(&mut control, RowContainer::Root, "folder");
    let children: Vec<RowKey> = (0..3)
        .map(|i| add(&mut control, folder, &format!("child {i}")))
        .collect();
    let last = children[2];

    control.ensure_row_visible(last).unwrap();
    assert!(control.is_expanded(folder));
    let position = control.cache().position_of(last).unwrap();
    assert_eq!(position, 13);
    assert!(control.visible_range().contains(&position));
    // The row ends exactly at the bottom of the viewport.
    assert_eq!(control.vertical_offset(), 14 * 26 - 100);
}

#[test]
fn test_suppressed_collapse_still_updates_cache() {
    let mut control = TreeListControl::default();
    control.set_viewport_size(Size::new(300, 300));
    let a = add(&mut control, RowContainer::Root, "A");
    add(&mut control, a, "A1");
    control.expand(a).unwrap();
    control.take_damage();

    control.row_collapsed.connect(|_| Propagation::Suppress);
    control.collapse(a).unwrap();
    assert_eq!(control.visible_row_count(), 1);
    assert_eq!(control.take_damage(), Damage::None);
}

#[test]
fn test_oversized_layouts_are_rejected_or_clamped() {
    let config = TreeListConfig::default().with_row_height(1_000_000);
    assert!(matches!(
        TreeListControl::new(config),
        Err(horizon_treelist::TreeListError::ValueTooLarge { .. })
    ));

    let config = TreeListConfig::default().with_row_height(horizon_treelist::config::MAX_LAYOUT_SIZE);
    let mut control = TreeListControl::new(config).unwrap();
    control.set_viewport_size(Size::new(300, 100));
    control.columns_mut().add("Name");
    let mut rows = control.rows_mut(RowContainer::Root);
    let keys: Vec<RowKey> = (0..10_000)
        .map(|i| rows.add(Row::with_cells([format!("row {i}")])).unwrap())
        .collect();

    let max = horizon_treelist::geometry::MAX_EXTENT;
    assert_eq!(control.extent_height(), max);
    control.set_vertical_offset(i32::MAX);
    assert_eq!(control.vertical_offset(), max - 100);

    control.ensure_row_visible(keys[9_999]).unwrap();
    assert!(control.visible_rows().count() >= 1);
    control.wheel(i32::MIN);
    assert_eq!(control.vertical_offset(), control.max_vertical_offset());
    control.wheel(i32::MAX);
    assert_eq!(control.vertical_offset(), 0);
    assert!(control.is_consistent());
}
