use chrono::NaiveDate;
use tally::{
    config::Config,
    domain::{
        BankAccount, PaymentMethod, PaymentMethodKind, RecurringBill, Transaction,
        TransactionKind, TransactionStatus, YearMonth,
    },
    engine::{CardSpendFilter, FixedClock, TransactionFilter},
    Tally, TallyError,
};
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ledger_with_card(app: &mut Tally) {
    app.save_bank_account(BankAccount::new("Checking", 1_000.0).with_id("checking"))
        .expect("save account");
    app.save_payment_method(
        PaymentMethod::new("Visa", TransactionKind::Expense)
            .with_id("visa")
            .with_kind(PaymentMethodKind::CreditCard)
            .linked_to("checking"),
    )
    .expect("save card");
}

fn purchase(on: NaiveDate, value: f64) -> Transaction {
    Transaction::new(
        on,
        "Market",
        "2",
        "checking",
        TransactionKind::Expense,
        value,
        "visa",
    )
}

fn memory_app() -> Tally {
    Tally::in_memory().with_clock(FixedClock(date(2026, 3, 15)))
}

#[test]
fn card_purchases_reach_the_account_through_invoices() {
    let mut app = memory_app();
    ledger_with_card(&mut app);

    app.save_transaction(purchase(date(2026, 3, 10), 300.0)).unwrap();
    app.save_transaction(purchase(date(2026, 3, 28), 150.0)).unwrap();

    let invoices: Vec<Transaction> = app
        .list_transactions(&TransactionFilter {
            include_synthetic: true,
            ..TransactionFilter::default()
        })
        .unwrap()
        .into_iter()
        .filter(Transaction::is_synthetic_invoice)
        .collect();
    assert_eq!(invoices.len(), 2);

    let april = app.monthly_summary(YearMonth::new(2026, 3)).unwrap();
    assert_eq!(april.total_expense, 300.0);
    let may = app.monthly_summary(YearMonth::new(2026, 4)).unwrap();
    assert_eq!(may.total_expense, 150.0);

    let checking = app
        .bank_account_summaries()
        .unwrap()
        .into_iter()
        .find(|summary| summary.account.id == "checking")
        .expect("checking summary");
    assert_eq!(checking.current_balance, 550.0);
}

#[test]
fn effective_date_follows_closing_day_overrides() {
    let mut app = memory_app();
    ledger_with_card(&mut app);
    let txn = purchase(date(2026, 3, 20), 80.0);

    assert_eq!(app.effective_date(&txn).unwrap(), date(2026, 4, 20));
    app.set_closing_day(YearMonth::new(2026, 2), 18).unwrap();
    assert_eq!(app.effective_date(&txn).unwrap(), date(2026, 5, 20));
    assert!(app.reset_closing_day(YearMonth::new(2026, 2)).unwrap());
    assert_eq!(app.effective_date(&txn).unwrap(), date(2026, 4, 20));
}

#[test]
fn deleting_the_last_purchase_removes_its_invoice() {
    let mut app = memory_app();
    ledger_with_card(&mut app);
    let ids = app.save_transaction(purchase(date(2026, 3, 10), 42.0)).unwrap();

    assert!(app.delete_transaction(&ids[0], false).unwrap());
    let report = app.sync_all_linked_invoices().unwrap();
    assert!(!report.has_changes());
    assert!(app
        .snapshot()
        .unwrap()
        .transactions
        .iter()
        .all(|txn| !txn.is_synthetic_invoice()));
}

#[test]
fn toggling_status_moves_confirmed_totals() {
    let mut app = memory_app();
    let income = Transaction::new(
        date(2026, 3, 1),
        "Salary",
        "1",
        "ba1",
        TransactionKind::Income,
        5_000.0,
        "pm1",
    )
    .with_status(TransactionStatus::Projected);
    let ids = app.save_transaction(income).unwrap();

    let month = YearMonth::new(2026, 2);
    assert_eq!(app.monthly_summary(month).unwrap().confirmed_income, 0.0);
    assert_eq!(app.toggle_status(&ids[0]).unwrap(), TransactionStatus::Paid);
    assert_eq!(app.monthly_summary(month).unwrap().confirmed_income, 5_000.0);
}

#[test]
fn bills_report_status_relative_to_the_clock() {
    let mut app = memory_app();
    let bill = RecurringBill::new("Rent", 15).with_value(1_200.0);
    let bill_id = bill.id.clone();
    app.save_bill(bill).unwrap();

    assert_eq!(app.bills_due_today().unwrap().len(), 1);
    let counts = app.bill_status_counts(2026).unwrap();
    assert_eq!(counts.due_today, 1);

    assert!(app
        .toggle_bill_payment(&bill_id, YearMonth::new(2026, 2))
        .unwrap());
    assert!(app.bills_due_today().unwrap().is_empty());
}

#[test]
fn unknown_transaction_surfaces_core_error() {
    let app = memory_app();
    let err = app.transaction("missing").unwrap_err();
    assert!(matches!(err, TallyError::Core(_)));
}

#[test]
fn file_backed_ledger_survives_reopen_and_backup() {
    let dir = tempdir().expect("tempdir");
    let config = Config {
        data_dir: Some(dir.path().join("data")),
        ..Config::default()
    };

    let backup_path = {
        let mut app = Tally::open(&config)
            .expect("open")
            .with_clock(FixedClock(date(2026, 3, 15)));
        ledger_with_card(&mut app);
        app.save_transaction(purchase(date(2026, 3, 10), 300.0)).unwrap();
        app.set_copyright_image(Some("data:image/png;base64,AAAA")).unwrap();
        app.write_backup(dir.path()).expect("backup")
    };
    assert!(backup_path.ends_with("Tally_Backup_2026-03-15_12-00.csv"));

    let reopened = Tally::open(&config).expect("reopen");
    assert_eq!(reopened.snapshot().unwrap().transactions.len(), 2);

    let mut restored = Tally::in_memory();
    let report = restored.import_backup_file(&backup_path).expect("import");
    assert!(report.skipped.is_empty());
    assert_eq!(
        restored.copyright_image().unwrap().as_deref(),
        Some("data:image/png;base64,AAAA")
    );
    assert_eq!(
        restored.export_backup().unwrap(),
        reopened.export_backup().unwrap()
    );
}

#[test]
fn invalid_config_is_rejected_before_opening() {
    let config = Config {
        default_closing_day: 0,
        ..Config::default()
    };
    assert!(matches!(Tally::open(&config), Err(TallyError::Config(_))));
}

#[test]
fn currency_follows_configured_locale() {
    let app = memory_app();
    assert_eq!(app.format_currency(1_234.5), "R$ 1.234,50");
}

#[test]
fn linking_a_card_with_history_keeps_balances() {
    let mut app = memory_app();
    app.save_bank_account(BankAccount::new("Checking", 1_000.0).with_id("checking"))
        .unwrap();
    app.save_payment_method(
        PaymentMethod::new("Visa", TransactionKind::Expense)
            .with_id("visa")
            .with_kind(PaymentMethodKind::CreditCard),
    )
    .unwrap();
    app.save_transaction(purchase(date(2025, 6, 10), 200.0)).unwrap();

    let balance = |app: &Tally| {
        app.bank_account_summaries()
            .unwrap()
            .into_iter()
            .find(|summary| summary.account.id == "checking")
            .map(|summary| summary.current_balance)
            .expect("checking summary")
    };
    assert_eq!(balance(&app), 800.0);
    app.link_card_account("visa", Some("checking")).unwrap();
    assert_eq!(balance(&app), 800.0);
}

#[test]
fn spending_breakdowns_split_cards_from_accounts() {
    let mut app = memory_app();
    ledger_with_card(&mut app);
    app.save_transaction(purchase(date(2026, 3, 10), 300.0)).unwrap();
    app.save_transaction(Transaction::new(
        date(2026, 4, 8),
        "Rent",
        "3",
        "checking",
        TransactionKind::Expense,
        900.0,
        "pm3",
    ))
    .unwrap();

    let breakdown = app.origin_breakdown(YearMonth::new(2026, 3)).unwrap();
    assert_eq!(breakdown.credit_cards.total, 300.0);
    let checking = breakdown
        .accounts
        .iter()
        .find(|account| account.account_id == "checking")
        .expect("checking group");
    assert_eq!(checking.spending.total, 900.0);

    let report = app
        .card_spend_by_category(&CardSpendFilter {
            card_id: Some("visa".into()),
            ..CardSpendFilter::default()
        })
        .unwrap();
    assert_eq!(report.total, 300.0);
    assert_eq!(report.categories[0].category_name, "Food");
}
