//! Tenant-isolated account and transaction storage.

pub mod in_memory;

pub use in_memory::InMemoryLedgerStore;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use banking_core::{AccountId, DomainError, TenantId};
use banking_ledger::{Account, Transaction, TransactionKind};
use banking_statements::StatementWindow;

/// Ledger store error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerStoreError {
    /// Absent, or owned by another tenant (the two are never distinguished).
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),
    #[error("account already exists: {0}")]
    AlreadyExists(AccountId),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("storage error: {0}")]
    Storage(String),
}

/// An account and its in-window history, read as one consistent view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub account: Account,
    /// Oldest first.
    pub transactions: Vec<Transaction>,
}

/// Account/transaction storage keyed by `(tenant, account)`.
///
/// Every read and write is scoped to a tenant; an account belonging to a
/// different tenant behaves exactly as if it did not exist.
pub trait LedgerStore: Send + Sync {
    fn find_account(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
    ) -> Result<Option<Account>, LedgerStoreError>;

    /// Transactions with `start <= timestamp <= end`, oldest first.
    fn find_transactions(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, LedgerStoreError>;

    /// Account plus transactions inside `window`, taken under a single read.
    ///
    /// `None` when the account is absent for this tenant.
    fn statement_snapshot(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
        window: &StatementWindow,
    ) -> Result<Option<AccountSnapshot>, LedgerStoreError>;

    fn list_accounts(&self, tenant_id: &TenantId) -> Result<Vec<Account>, LedgerStoreError>;

    fn insert_account(&self, account: Account) -> Result<(), LedgerStoreError>;

    /// Replace name and balance of an existing account.
    fn update_account(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
        customer_name: &str,
        balance: Decimal,
    ) -> Result<Account, LedgerStoreError>;

    /// Remove an account together with its transaction history.
    fn delete_account(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
    ) -> Result<(), LedgerStoreError>;

    /// Full history of an account, oldest first.
    fn list_transactions(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Transaction>, LedgerStoreError>;

    /// Apply a deposit/withdrawal to the balance and append it to the history.
    fn record_transaction(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
        kind: TransactionKind,
        amount: Decimal,
        at: DateTime<Utc>,
    ) -> Result<Transaction, LedgerStoreError>;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn find_account(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
    ) -> Result<Option<Account>, LedgerStoreError> {
        (**self).find_account(account_id, tenant_id)
    }

    fn find_transactions(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, LedgerStoreError> {
        (**self).find_transactions(account_id, tenant_id, start, end)
    }

    fn statement_snapshot(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
        window: &StatementWindow,
    ) -> Result<Option<AccountSnapshot>, LedgerStoreError> {
        (**self).statement_snapshot(account_id, tenant_id, window)
    }

    fn list_accounts(&self, tenant_id: &TenantId) -> Result<Vec<Account>, LedgerStoreError> {
        (**self).list_accounts(tenant_id)
    }

    fn insert_account(&self, account: Account) -> Result<(), LedgerStoreError> {
        (**self).insert_account(account)
    }

    fn update_account(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
        customer_name: &str,
        balance: Decimal,
    ) -> Result<Account, LedgerStoreError> {
        (**self).update_account(account_id, tenant_id, customer_name, balance)
    }

    fn delete_account(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
    ) -> Result<(), LedgerStoreError> {
        (**self).delete_account(account_id, tenant_id)
    }

    fn list_transactions(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Transaction>, LedgerStoreError> {
        (**self).list_transactions(account_id, tenant_id)
    }

    fn record_transaction(
        &self,
        account_id: &AccountId,
        tenant_id: &TenantId,
        kind: TransactionKind,
        amount: Decimal,
        at: DateTime<Utc>,
    ) -> Result<Transaction, LedgerStoreError> {
        (**self).record_transaction(account_id, tenant_id, kind, amount, at)
    }
}
