use chrono::{Duration, NaiveDate, TimeZone, Utc};
use contas_core::core::services::{ChartPeriod, SummaryService};
use contas_core::domain::{Bill, BillStatus, DomainModel, HiddenCategories};
use contas_core::persistence::PersistenceEngine;
use contas_core::storage::{FileStore, MemoryStore};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempfile::tempdir;

const LABELS: [&str; 6] = ["INTERNET", "CEMIG", "Mercado", "GÁS", "Aluguel", "Lazer"];

fn build_sample_model(bill_count: usize) -> DomainModel {
    let start_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let bills = (0..bill_count)
        .map(|idx| {
            let status = if idx % 3 == 0 {
                BillStatus::Paid
            } else {
                BillStatus::Pending
            };
            Bill::new(
                LABELS[idx % LABELS.len()],
                50.0 + (idx % 100) as f64,
                start_date + Duration::days((idx % 540) as i64),
                status,
            )
        })
        .collect();
    DomainModel::from_parts(bills, Vec::new(), HiddenCategories::new(), false)
}

fn bench_persistence(c: &mut Criterion) {
    let model = build_sample_model(black_box(10_000));
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

    let memory = PersistenceEngine::new(Box::new(MemoryStore::new()));
    c.bench_function("memory_save_10k", |b| {
        b.iter(|| memory.save_at(&model, now).expect("save"))
    });
    c.bench_function("memory_load_10k", |b| b.iter(|| black_box(memory.load_at(now))));

    let dir = tempdir().expect("tempdir");
    let store = FileStore::new(dir.path().to_path_buf()).expect("file store");
    let files = PersistenceEngine::new(Box::new(store));
    c.bench_function("file_save_10k", |b| {
        b.iter(|| files.save_at(&model, now).expect("save"))
    });
    c.bench_function("file_load_10k", |b| b.iter(|| black_box(files.load_at(now))));
}

fn bench_summaries(c: &mut Criterion) {
    let model = build_sample_model(black_box(10_000));
    let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();

    c.bench_function("category_breakdown_all", |b| {
        b.iter(|| black_box(SummaryService::category_breakdown(&model, ChartPeriod::All, today)))
    });
    c.bench_function("monthly_evolution", |b| {
        b.iter(|| black_box(SummaryService::monthly_evolution(&model)))
    });
}

criterion_group!(benches, bench_persistence, bench_summaries);
criterion_main!(benches);
