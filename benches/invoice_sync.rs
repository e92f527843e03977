use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tally_core::{EngineSettings, InvoicePlanner, InvoiceService, MemoryStore, Repository};
use tally_domain::{
    BankAccount, ClosingDays, PaymentMethod, PaymentMethodKind, Transaction, TransactionKind,
    YearMonth,
};

const CARDS: [&str; 3] = ["visa", "master", "elo"];

fn seeded_store(purchase_count: usize) -> MemoryStore {
    let store = MemoryStore::new();
    let settings = EngineSettings::default();
    let repo = Repository::new(&store, &settings);

    repo.save_bank_accounts(&[BankAccount::new("Checking", 0.0).with_id("checking")])
        .expect("seed accounts");
    let methods: Vec<PaymentMethod> = CARDS
        .iter()
        .map(|card| {
            PaymentMethod::new(*card, TransactionKind::Expense)
                .with_id(*card)
                .with_kind(PaymentMethodKind::CreditCard)
                .linked_to("checking")
        })
        .collect();
    repo.save_payment_methods(&methods).expect("seed methods");

    let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let purchases: Vec<Transaction> = (0..purchase_count)
        .map(|idx| {
            Transaction::new(
                start + Duration::days((idx % 540) as i64),
                "Purchase",
                "2",
                "checking",
                TransactionKind::Expense,
                10.0 + (idx % 90) as f64,
                CARDS[idx % CARDS.len()],
            )
        })
        .collect();
    repo.save_transactions(&purchases).expect("seed purchases");
    store
}

fn bench_full_sync(c: &mut Criterion) {
    let settings = EngineSettings::default();
    let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

    c.bench_function("sync_all_linked_invoices_5k", |b| {
        b.iter_batched(
            || seeded_store(5_000),
            |store| {
                let repo = Repository::new(&store, &settings);
                let report = InvoiceService::sync_all_linked_invoices(&repo, today)
                    .expect("sync invoices");
                black_box(report);
            },
            BatchSize::LargeInput,
        )
    });

    let store = seeded_store(5_000);
    let repo = Repository::new(&store, &settings);
    InvoiceService::sync_all_linked_invoices(&repo, today).expect("warm sync");

    c.bench_function("sync_all_linked_invoices_5k_unchanged", |b| {
        b.iter(|| {
            let report = InvoiceService::sync_all_linked_invoices(&repo, today)
                .expect("sync invoices");
            black_box(report);
        })
    });
}

fn bench_reconcile(c: &mut Criterion) {
    let settings = EngineSettings::default();
    let store = seeded_store(5_000);
    let repo = Repository::new(&store, &settings);
    let methods = repo.payment_methods().expect("methods");
    let categories = repo.categories().expect("categories");
    let transactions = repo.transactions().expect("transactions");
    let closing_days = ClosingDays::new();
    let visa = methods
        .iter()
        .find(|method| method.id == "visa")
        .cloned()
        .expect("visa card");

    c.bench_function("reconcile_single_month_5k", |b| {
        b.iter_batched(
            || transactions.clone(),
            |mut transactions| {
                let planner = InvoicePlanner::new(&methods, &closing_days, &categories, &settings);
                let outcome =
                    planner.reconcile(&mut transactions, &visa, YearMonth::new(2026, 3));
                black_box(outcome);
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_full_sync, bench_reconcile);
criterion_main!(benches);
