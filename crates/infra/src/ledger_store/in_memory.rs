use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use banking_core::{AccountId, TenantId};
use banking_ledger::{Account, Transaction, TransactionKind};
use banking_statements::StatementWindow;

use super::{AccountSnapshot, LedgerStore, LedgerStoreError};

type Key = (TenantId, AccountId);

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<Key, Account>,
    /// Append-only per account.
    history: HashMap<Key, Vec<Transaction>>,
}

/// In-memory tenant-isolated ledger for tests/dev.
///
/// A single lock covers accounts and history, so a recorded transaction and
/// the balance change it causes become visible together.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    inner: RwLock<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LedgerState>, LedgerStoreError> {
        self.inner
            .read()
            .map_err(|_| LedgerStoreError::Storage("ledger lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, LedgerStoreError> {
        self.inner
            .write()
            .map_err(|_| LedgerStoreError::Storage("ledger lock poisoned".to_string()))
    }
}

fn key(account_id: &AccountId, tenant_id: &TenantId) -> Key {
    (tenant_id.clone(), account_id.clone())
}

/// History entries accepted by `keep`, oldest first.
fn history_where(
    state: &LedgerState,
    k: &Key,
    keep: impl Fn(&Transaction) -> bool,
) -> Vec<Transaction> {
    let mut result: Vec<Transaction> = state
        .history
        .get(k)
        .map(|txs| txs.iter().filter(|t| keep(t)).cloned().collect())
        .unwrap_or_default();

    result.sort_by_key(|t| t.timestamp);
    result
}

impl LedgerStore for InMemoryLedgerStore {
    fn find_account(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
    ) -> Result<Option<Account>, LedgerStoreError> {
        let state = self.read()?;
        Ok(state.accounts.get(&key(account_id, tenant_id)).cloned())
    }

    fn find_transactions(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, LedgerStoreError> {
        let state = self.read()?;
        Ok(history_where(&state, &key(account_id, tenant_id), |t| {
            start <= t.timestamp && t.timestamp <= end
        }))
    }

    fn statement_snapshot(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
        window: &StatementWindow,
    ) -> Result<Option<AccountSnapshot>, LedgerStoreError> {
        let state = self.read()?;
        let k = key(account_id, tenant_id);
        let Some(account) = state.accounts.get(&k).cloned() else {
            return Ok(None);
        };

        let transactions = history_where(&state, &k, |t| window.contains(t.timestamp));
        Ok(Some(AccountSnapshot { account, transactions }))
    }

    fn list_accounts(&self, tenant_id: &TenantId) -> Result<Vec<Account>, LedgerStoreError> {
        let state = self.read()?;
        let mut result: Vec<Account> = state
            .accounts
            .iter()
            .filter_map(|((t, _), a)| if t == tenant_id { Some(a.clone()) } else { None })
            .collect();

        result.sort_by_key(|a| a.created_at);
        Ok(result)
    }

    fn insert_account(&self, account: Account) -> Result<(), LedgerStoreError> {
        let mut state = self.write()?;
        let k = key(&account.id, &account.tenant_id);
        if state.accounts.contains_key(&k) {
            return Err(LedgerStoreError::AlreadyExists(account.id));
        }
        state.accounts.insert(k, account);
        Ok(())
    }

    fn update_account(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
        customer_name: &str,
        balance: Decimal,
    ) -> Result<Account, LedgerStoreError> {
        let mut state = self.write()?;
        let account = state
            .accounts
            .get_mut(&key(account_id, tenant_id))
            .ok_or_else(|| LedgerStoreError::AccountNotFound(account_id.clone()))?;

        account.revise(customer_name, balance)?;
        Ok(account.clone())
    }

    fn delete_account(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
    ) -> Result<(), LedgerStoreError> {
        let mut state = self.write()?;
        let k = key(account_id, tenant_id);
        if state.accounts.remove(&k).is_none() {
            return Err(LedgerStoreError::AccountNotFound(account_id.clone()));
        }
        state.history.remove(&k);
        Ok(())
    }

    fn list_transactions(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Transaction>, LedgerStoreError> {
        let state = self.read()?;
        let k = key(account_id, tenant_id);
        if !state.accounts.contains_key(&k) {
            return Err(LedgerStoreError::AccountNotFound(account_id.clone()));
        }

        Ok(history_where(&state, &k, |_| true))
    }

    fn record_transaction(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
        kind: TransactionKind,
        amount: Decimal,
        at: DateTime<Utc>,
    ) -> Result<Transaction, LedgerStoreError> {
        let mut state = self.write()?;
        let k = key(account_id, tenant_id);

        let account = state
            .accounts
            .get_mut(&k)
            .ok_or_else(|| LedgerStoreError::AccountNotFound(account_id.clone()))?;
        account.apply(kind, amount)?;

        let tx = Transaction::new(account_id.clone(), tenant_id.clone(), kind, amount, at);
        state.history.entry(k).or_default().push(tx.clone());
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banking_core::DomainError;
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal_macros::dec;

    fn tenant(name: &str) -> TenantId {
        TenantId::parse(name).unwrap()
    }

    fn seed(store: &InMemoryLedgerStore, tenant_id: &TenantId, id: &str, balance: Decimal) -> AccountId {
        let account_id = AccountId::parse(id).unwrap();
        let account = Account::open(account_id.clone(), tenant_id.clone(), "Alice", balance, Utc::now()).unwrap();
        store.insert_account(account).unwrap();
        account_id
    }

    #[test]
    fn accounts_are_invisible_across_tenants() {
        let store = InMemoryLedgerStore::new();
        let bank1 = tenant("BANK001");
        let bank2 = tenant("BANK002");
        let id = seed(&store, &bank1, "A123", dec!(100));

        assert!(store.find_account(&id, &bank1).unwrap().is_some());
        assert!(store.find_account(&id, &bank2).unwrap().is_none());
        assert!(store.list_accounts(&bank2).unwrap().is_empty());
        assert!(matches!(
            store.record_transaction(&id, &bank2, TransactionKind::Deposit, dec!(1), Utc::now()),
            Err(LedgerStoreError::AccountNotFound(_))
        ));
        assert!(matches!(
            store.delete_account(&id, &bank2),
            Err(LedgerStoreError::AccountNotFound(_))
        ));
    }

    #[test]
    fn same_account_id_may_exist_under_two_tenants() {
        let store = InMemoryLedgerStore::new();
        let bank1 = tenant("BANK001");
        let bank2 = tenant("BANK002");
        let id = seed(&store, &bank1, "A123", dec!(100));
        seed(&store, &bank2, "A123", dec!(900));

        assert_eq!(store.find_account(&id, &bank1).unwrap().unwrap().balance, dec!(100));
        assert_eq!(store.find_account(&id, &bank2).unwrap().unwrap().balance, dec!(900));
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = InMemoryLedgerStore::new();
        let bank = tenant("BANK001");
        seed(&store, &bank, "A123", dec!(1));

        let dup = Account::open(AccountId::parse("A123").unwrap(), bank, "Bob", dec!(2), Utc::now()).unwrap();
        assert!(matches!(store.insert_account(dup), Err(LedgerStoreError::AlreadyExists(_))));
    }

    #[test]
    fn record_transaction_updates_balance_and_history() {
        let store = InMemoryLedgerStore::new();
        let bank = tenant("BANK001");
        let id = seed(&store, &bank, "A123", dec!(1000.00));

        store.record_transaction(&id, &bank, TransactionKind::Deposit, dec!(200.00), Utc::now()).unwrap();
        store.record_transaction(&id, &bank, TransactionKind::Withdrawal, dec!(50.00), Utc::now()).unwrap();

        assert_eq!(store.find_account(&id, &bank).unwrap().unwrap().balance, dec!(1150.00));
        assert_eq!(store.list_transactions(&id, &bank).unwrap().len(), 2);
    }

    #[test]
    fn rejected_withdrawal_leaves_no_trace() {
        let store = InMemoryLedgerStore::new();
        let bank = tenant("BANK001");
        let id = seed(&store, &bank, "A123", dec!(10.00));

        let err = store
            .record_transaction(&id, &bank, TransactionKind::Withdrawal, dec!(10.01), Utc::now())
            .unwrap_err();
        assert_eq!(err, LedgerStoreError::Domain(DomainError::InsufficientFunds));
        assert_eq!(store.find_account(&id, &bank).unwrap().unwrap().balance, dec!(10.00));
        assert!(store.list_transactions(&id, &bank).unwrap().is_empty());
    }

    #[test]
    fn find_transactions_is_inclusive_and_sorted() {
        let store = InMemoryLedgerStore::new();
        let bank = tenant("BANK001");
        let id = seed(&store, &bank, "A123", dec!(100.00));

        let at = |d: u32, h: u32, m: u32, s: u32| Utc.with_ymd_and_hms(2025, 10, d, h, m, s).unwrap();
        store.record_transaction(&id, &bank, TransactionKind::Deposit, dec!(3), at(31, 23, 59, 59)).unwrap();
        store.record_transaction(&id, &bank, TransactionKind::Deposit, dec!(1), at(1, 0, 0, 0)).unwrap();
        store.record_transaction(&id, &bank, TransactionKind::Deposit, dec!(9), at(15, 0, 0, 0)).unwrap();

        let start = at(1, 0, 0, 0);
        let end = at(31, 23, 59, 59);
        let found = store.find_transactions(&id, &bank, start, end).unwrap();
        let amounts: Vec<Decimal> = found.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![dec!(1), dec!(9), dec!(3)]);

        let narrow = store.find_transactions(&id, &bank, at(2, 0, 0, 0), at(30, 0, 0, 0)).unwrap();
        assert_eq!(narrow.len(), 1);
    }

    #[test]
    fn update_and_delete_account() {
        let store = InMemoryLedgerStore::new();
        let bank = tenant("BANK001");
        let id = seed(&store, &bank, "A123", dec!(10.00));
        store.record_transaction(&id, &bank, TransactionKind::Deposit, dec!(5), Utc::now()).unwrap();

        let updated = store.update_account(&id, &bank, "Alice Smith", dec!(1500.00)).unwrap();
        assert_eq!(updated.customer_name, "Alice Smith");
        assert_eq!(updated.balance, dec!(1500.00));

        assert!(matches!(
            store.update_account(&id, &bank, " ", dec!(1)),
            Err(LedgerStoreError::Domain(DomainError::Validation(_)))
        ));

        store.delete_account(&id, &bank).unwrap();
        assert!(store.find_account(&id, &bank).unwrap().is_none());
        assert!(matches!(
            store.list_transactions(&id, &bank),
            Err(LedgerStoreError::AccountNotFound(_))
        ));
    }

    #[test]
    fn overflowing_deposit_is_rejected_and_store_stays_usable() {
        let store = InMemoryLedgerStore::new();
        let bank1 = tenant("BANK001");
        let bank2 = tenant("BANK002");
        let id = seed(&store, &bank1, "A1", Decimal::MAX);
        let other = seed(&store, &bank2, "B1", dec!(50.00));

        let err = store
            .record_transaction(&id, &bank1, TransactionKind::Deposit, dec!(1), Utc::now())
            .unwrap_err();
        assert_eq!(err, LedgerStoreError::Domain(DomainError::validation("balance overflow")));

        // Lock is not poisoned; every tenant keeps working.
        assert_eq!(store.find_account(&id, &bank1).unwrap().unwrap().balance, Decimal::MAX);
        assert!(store.list_transactions(&id, &bank1).unwrap().is_empty());
        assert_eq!(store.list_accounts(&bank2).unwrap().len(), 1);
        store.record_transaction(&other, &bank2, TransactionKind::Deposit, dec!(5.00), Utc::now()).unwrap();
        assert_eq!(store.find_account(&other, &bank2).unwrap().unwrap().balance, dec!(55.00));
    }

    #[test]
    fn statement_snapshot_pairs_account_with_window_history() {
        let store = InMemoryLedgerStore::new();
        let bank1 = tenant("BANK001");
        let bank2 = tenant("BANK002");
        let id = seed(&store, &bank1, "A123", dec!(100.00));

        let at = |d: u32, h: u32| Utc.with_ymd_and_hms(2025, 10, d, h, 0, 0).unwrap();
        store.record_transaction(&id, &bank1, TransactionKind::Deposit, dec!(7), at(20, 9)).unwrap();
        store.record_transaction(&id, &bank1, TransactionKind::Deposit, dec!(2), at(1, 0)).unwrap();
        store.record_transaction(&id, &bank1, TransactionKind::Deposit, dec!(4), at(10, 12)).unwrap();

        let window = StatementWindow::from_dates(
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 10).unwrap(),
        )
        .unwrap();

        let snapshot = store.statement_snapshot(&id, &bank1, &window).unwrap().unwrap();
        assert_eq!(snapshot.account.balance, dec!(113.00));
        let amounts: Vec<Decimal> = snapshot.transactions.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![dec!(2), dec!(4)]);

        assert!(store.statement_snapshot(&id, &bank2, &window).unwrap().is_none());
    }
}
