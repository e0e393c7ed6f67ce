use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use banking_core::{AccountId, DomainError, TenantId, TransactionId};

/// Direction of a ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdrawal => "WITHDRAWAL",
        }
    }

    /// Effect of `amount` on the balance when moved in this direction.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionKind::Deposit => amount,
            TransactionKind::Withdrawal => -amount,
        }
    }
}

impl core::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEPOSIT" => Ok(TransactionKind::Deposit),
            "WITHDRAWAL" => Ok(TransactionKind::Withdrawal),
            _ => Err(DomainError::validation(
                "invalid transaction type; use DEPOSIT or WITHDRAWAL",
            )),
        }
    }
}

/// A posted deposit or withdrawal (immutable once recorded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "transactionId")]
    pub id: TransactionId,
    pub account_id: AccountId,
    pub tenant_id: TenantId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Always positive; direction comes from `kind`.
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        account_id: AccountId,
        tenant_id: TenantId,
        kind: TransactionKind,
        amount: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            account_id,
            tenant_id,
            kind,
            amount,
            timestamp,
        }
    }

    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("deposit".parse::<TransactionKind>().unwrap(), TransactionKind::Deposit);
        assert_eq!(" Withdrawal ".parse::<TransactionKind>().unwrap(), TransactionKind::Withdrawal);
        assert!("transfer".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn signed_amount_follows_direction() {
        assert_eq!(TransactionKind::Deposit.signed(dec!(12.50)), dec!(12.50));
        assert_eq!(TransactionKind::Withdrawal.signed(dec!(12.50)), dec!(-12.50));
    }
}
