use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use banking_core::{AccountId, DomainError, DomainResult, TenantId};

use crate::transaction::TransactionKind;

/// A customer account owned by exactly one tenant.
///
/// `balance` always reflects every transaction recorded against the account,
/// which is what lets statements derive historical balances backwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "accountId")]
    pub id: AccountId,
    pub tenant_id: TenantId,
    pub customer_name: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Open an account with a validated customer name and starting balance.
    pub fn open(
        id: AccountId,
        tenant_id: TenantId,
        customer_name: impl Into<String>,
        balance: Decimal,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let customer_name = validate_customer_name(customer_name.into())?;
        validate_positive("balance", balance)?;

        Ok(Self {
            id,
            tenant_id,
            customer_name,
            balance,
            created_at: now,
        })
    }

    /// Replace the editable details (name and balance).
    pub fn revise(&mut self, customer_name: impl Into<String>, balance: Decimal) -> DomainResult<()> {
        let customer_name = validate_customer_name(customer_name.into())?;
        validate_positive("balance", balance)?;
        self.customer_name = customer_name;
        self.balance = balance;
        Ok(())
    }

    /// Apply a deposit or withdrawal to the balance.
    ///
    /// Withdrawals are checked against the current balance with a plain
    /// threshold comparison; the store decides how atomic that is.
    pub fn apply(&mut self, kind: TransactionKind, amount: Decimal) -> DomainResult<()> {
        validate_positive("amount", amount)?;

        if kind == TransactionKind::Withdrawal && self.balance < amount {
            return Err(DomainError::InsufficientFunds);
        }

        self.balance = self
            .balance
            .checked_add(kind.signed(amount))
            .ok_or_else(|| DomainError::validation("balance overflow"))?;
        Ok(())
    }
}

fn validate_customer_name(name: String) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("customer name is required"));
    }
    Ok(trimmed.to_string())
}

/// Money carries at most this many fractional digits (whole cents).
const MONEY_SCALE: u32 = 2;

fn validate_positive(field: &str, value: Decimal) -> DomainResult<()> {
    if value <= Decimal::ZERO {
        return Err(DomainError::validation(format!("{field} must be positive")));
    }
    if value.normalize().scale() > MONEY_SCALE {
        return Err(DomainError::validation(format!(
            "{field} must not have more than {MONEY_SCALE} decimal places"
        )));
    }
    Ok(())
}
