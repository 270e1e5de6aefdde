mod common;

use common::{bill, memory_tracker};
use contas_core::{
    core::services::CategoryService,
    domain::BUILTIN_CATEGORIES,
    persistence::keys::HIDDEN_KEY,
    storage::KeyValueStore,
    TrackerError,
};

#[test]
fn hide_then_show_restores_menu_without_touching_bills() {
    let (mut tracker, store) = memory_tracker();
    tracker.add_bill(bill("CEMIG", 180.0, 9)).unwrap();
    let bills_before = tracker.model().bills.clone();

    let report = tracker.hide_category("CEMIG").unwrap();
    assert!(report.changed);
    assert_eq!(report.bills_referencing, 1);
    assert!(!CategoryService::menu_categories(tracker.model()).contains(&"CEMIG"));
    assert_eq!(store.get(HIDDEN_KEY).unwrap().as_deref(), Some(r#"["CEMIG"]"#));

    assert!(tracker.show_category("CEMIG").unwrap());
    assert!(CategoryService::menu_categories(tracker.model()).contains(&"CEMIG"));
    assert_eq!(tracker.model().bills, bills_before);
}

#[test]
fn rename_cascades_to_referencing_bills() {
    let (mut tracker, _store) = memory_tracker();
    let index = tracker.create_category("Escola", None).unwrap();
    tracker.add_bill(bill("Escola", 300.0, 5)).unwrap();
    tracker.add_bill(bill("Escola", 45.0, 20)).unwrap();
    tracker.add_bill(bill("escola", 1.0, 21)).unwrap();

    let report = tracker.rename_category(index, "NewName").unwrap();
    assert_eq!(report.cascaded, 2);
    let labels: Vec<&str> = tracker
        .model()
        .bills
        .iter()
        .map(|b| b.category.as_str())
        .filter(|label| label.eq_ignore_ascii_case("newname") || label.eq_ignore_ascii_case("escola"))
        .collect();
    assert_eq!(labels, vec!["NewName", "NewName", "escola"]);
}

#[test]
fn delete_removes_record_and_its_bills() {
    let (mut tracker, _store) = memory_tracker();
    let index = tracker.create_category("Pets", Some("animais")).unwrap();
    for day in [3, 13, 23] {
        tracker.add_bill(bill("Pets", 80.0, day)).unwrap();
    }
    let bills_before = tracker.model().bills.len();

    let report = tracker.delete_category(index).unwrap();
    assert_eq!((report.categories_removed, report.bills_removed), (1, 3));
    assert_eq!(tracker.model().bills.len(), bills_before - 3);
    assert!(tracker.model().category_index("Pets").is_none());
}

#[test]
fn builtin_names_are_reserved() {
    let (mut tracker, _store) = memory_tracker();
    let err = tracker.create_category("INTERNET", None).unwrap_err();
    assert!(matches!(err, TrackerError::ReservedName(_)));
    assert!(err.is_validation());
}

#[test]
fn remove_builtin_guards_usage_before_mutating() {
    let (mut tracker, _store) = memory_tracker();
    tracker.hide_category("Mercado").unwrap();

    let err = tracker.remove_builtin("Mercado").unwrap_err();
    assert!(matches!(err, TrackerError::InUse { bills: 1, .. }));
    assert!(tracker.model().is_hidden("Mercado"));

    tracker.hide_category("IPTU").unwrap();
    assert!(tracker.remove_builtin("IPTU").unwrap());
    assert!(!tracker.model().is_hidden("IPTU"));
    assert!(matches!(
        tracker.remove_builtin("Lazer"),
        Err(TrackerError::UnknownBuiltin(_))
    ));
}

#[test]
fn bulk_visibility_changes_persist() {
    let (mut tracker, store) = memory_tracker();
    assert_eq!(tracker.hide_all_categories().unwrap(), BUILTIN_CATEGORIES.len());
    let stored: Vec<String> =
        serde_json::from_str(&store.get(HIDDEN_KEY).unwrap().expect("hidden key")).unwrap();
    assert_eq!(stored.len(), BUILTIN_CATEGORIES.len());

    assert_eq!(tracker.restore_default_categories().unwrap(), BUILTIN_CATEGORIES.len());
    assert!(tracker.model().hidden.is_empty());
    assert_eq!(tracker.show_all_categories().unwrap(), 0);
}
