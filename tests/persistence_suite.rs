mod common;

use common::{bill, date, file_engine, fixed_now, memory_engine, temp_dir};
use contas_core::{
    core::services::{BillService, CategoryService},
    domain::{BillStatus, DomainModel, HiddenCategories},
    persistence::{
        keys::{BACKUP_KEY, LITE_KEY, PRIMARY_KEY},
        LoadSource, PersistenceEngine, SaveOutcome,
    },
    storage::{KeyValueStore, MemoryStore},
};

fn model_with_bills(count: usize) -> DomainModel {
    let bills = (0..count)
        .map(|idx| bill("Mercado", 10.0 + idx as f64, 1 + (idx % 28) as u32))
        .collect();
    DomainModel::from_parts(bills, Vec::new(), HiddenCategories::new(), false)
}

#[test]
fn added_bill_round_trips_through_file_store() {
    let root = temp_dir();
    let engine = file_engine(root.clone());
    let mut model = engine.load_at(fixed_now()).model;

    let added = bill("CODAU", 74.35, 18);
    let index = BillService::add(&mut model, added.clone()).expect("add bill");
    engine.save_at(&model, fixed_now()).expect("save");

    let reloaded = file_engine(root).load_at(fixed_now());
    assert_eq!(reloaded.source, LoadSource::Primary);
    assert_eq!(reloaded.model.bills[index], added);
}

#[test]
fn repeated_round_trips_are_stable() {
    let (engine, store) = memory_engine();
    let mut model = engine.load_at(fixed_now()).model;
    CategoryService::create_at(&mut model, "Pets", None, fixed_now()).expect("create");
    CategoryService::hide(&mut model, "CEMIG").expect("hide");

    engine.save_at(&model, fixed_now()).expect("first save");
    let first_bytes = store.get(PRIMARY_KEY).unwrap();
    let first = engine.load_at(fixed_now()).model;

    engine.save_at(&first, fixed_now()).expect("second save");
    let second = engine.load_at(fixed_now()).model;

    assert_eq!(first, second);
    assert_eq!(store.get(PRIMARY_KEY).unwrap(), first_bytes);
}

#[test]
fn corrupted_primary_heals_from_backup() {
    let (engine, store) = memory_engine();
    let mut model = engine.load_at(fixed_now()).model;
    BillService::add(&mut model, bill("NUBANK", 410.0, 25)).expect("add");
    CategoryService::create_at(&mut model, "Pets", Some("animais"), fixed_now()).expect("create");
    engine.save_at(&model, fixed_now()).expect("save");

    store.set(PRIMARY_KEY, "{not json").unwrap();
    let report = engine.load_at(fixed_now());

    assert_eq!(report.source, LoadSource::Backup);
    assert!(report.healed);
    assert_eq!(report.model.bills.len(), model.bills.len());
    let names = |m: &DomainModel| m.categories.iter().map(|c| c.name.clone()).collect::<Vec<_>>();
    assert_eq!(names(&report.model), names(&model));

    let healed = store.get(PRIMARY_KEY).unwrap().expect("primary rewritten");
    assert!(serde_json::from_str::<serde_json::Value>(&healed).is_ok());
    assert_eq!(engine.load_at(fixed_now()).source, LoadSource::Primary);
}

#[test]
fn missing_primary_and_backup_yield_seed_defaults() {
    let (engine, store) = memory_engine();
    let report = engine.load_at(fixed_now());

    assert_eq!(report.source, LoadSource::Defaults);
    let bills: Vec<(&str, f64, BillStatus)> = report
        .model
        .bills
        .iter()
        .map(|b| (b.category.as_str(), b.amount, b.status))
        .collect();
    assert_eq!(
        bills,
        vec![
            ("INTERNET", 89.90, BillStatus::Pending),
            ("Mercado", 350.00, BillStatus::Paid),
            ("Academia", 120.00, BillStatus::Pending),
        ]
    );
    assert_eq!(report.model.bills[0].due_date, date(2025, 3, 5));
    let names: Vec<&str> = report.model.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Aluguel", "Transporte", "Lazer"]);
    assert!(store.contains(BACKUP_KEY).unwrap());
}

#[test]
fn quota_failure_degrades_to_lite_snapshot() {
    let store = MemoryStore::new();
    let engine = PersistenceEngine::new(Box::new(store.clone()));
    store.set("cache_graficos", &"x".repeat(2_000)).unwrap();
    let model = model_with_bills(150);
    store.set_quota(Some(10_000));

    let outcome = engine.save_at(&model, fixed_now()).expect("degraded save is not an error");
    match outcome {
        SaveOutcome::Degraded {
            lite_written,
            bills_kept,
            pruned,
        } => {
            assert!(lite_written);
            assert_eq!(bills_kept, 100);
            assert_eq!(pruned, 1);
        }
        other => panic!("expected degraded save, got {other:?}"),
    }

    let lite: serde_json::Value =
        serde_json::from_str(&store.get(LITE_KEY).unwrap().expect("lite key")).unwrap();
    let bills = lite["contas"].as_array().expect("bills array");
    assert_eq!(bills.len(), 100);
    assert_eq!(bills[99]["valor"], 159.0);
    assert!(!store.contains("cache_graficos").unwrap());
}

#[test]
fn lite_write_that_also_overflows_is_reported_not_raised() {
    let store = MemoryStore::with_quota(200);
    let engine = PersistenceEngine::new(Box::new(store.clone()));
    let outcome = engine.save_at(&model_with_bills(50), fixed_now()).expect("no error");
    assert_eq!(
        outcome,
        SaveOutcome::Degraded {
            lite_written: false,
            bills_kept: 50,
            pruned: 0,
        }
    );
}

#[test]
fn lite_snapshot_survives_pruning() {
    let (engine, store) = memory_engine();
    store.set(LITE_KEY, "{}").unwrap();
    store.set("stale", "1").unwrap();
    engine.prune_non_essential_keys().expect("prune");
    assert!(store.contains(LITE_KEY).unwrap());
    assert!(!store.contains("stale").unwrap());
}
