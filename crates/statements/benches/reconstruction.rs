use banking_core::{AccountId, TenantId};
use banking_ledger::{Account, Transaction, TransactionKind};
use banking_statements::{StatementEngine, StatementWindow};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;

fn build_history(n: usize) -> (Account, StatementWindow, Vec<Transaction>) {
    let tenant = TenantId::parse("BENCH").unwrap();
    let account_id = AccountId::parse("BENCH-ACCOUNT").unwrap();
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    let transactions = (0..n)
        .map(|i| {
            let kind = if i % 3 == 0 { TransactionKind::Withdrawal } else { TransactionKind::Deposit };
            Transaction::new(
                account_id.clone(),
                tenant.clone(),
                kind,
                Decimal::new((i as i64 % 50_000) + 1, 2),
                start + Duration::seconds(i as i64),
            )
        })
        .collect();

    let account = Account {
        id: account_id,
        tenant_id: tenant,
        customer_name: "Bench".to_string(),
        balance: Decimal::new(1_000_000_00, 2),
        created_at: start,
    };

    let window = StatementWindow::from_dates(
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
    )
    .unwrap();

    (account, window, transactions)
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_generate");

    for size in [100usize, 1_000, 10_000] {
        let (account, window, txs) = build_history(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| StatementEngine.generate(black_box(&account), window, black_box(&txs)))
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let (account, window, txs) = build_history(1_000);
    let statement = StatementEngine.generate(&account, window, &txs);

    c.bench_function("statement_render_1000", |b| b.iter(|| black_box(&statement).render()));
}

criterion_group!(benches, bench_generate, bench_render);
criterion_main!(benches);
