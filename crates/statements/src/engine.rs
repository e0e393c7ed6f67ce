//! Opening-balance reconstruction and statement rendering.
//!
//! The ledger only stores the *current* balance. Every transaction in the
//! window is already reflected in it, so the balance at the start of the
//! window is recovered by undoing those transactions: subtract deposits, add
//! back withdrawals. All arithmetic is `Decimal`, so the replay is exact.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use banking_core::AccountId;
use banking_ledger::{Account, Transaction, TransactionKind};

use crate::window::StatementWindow;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One transaction as it appears on a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    pub timestamp: DateTime<Utc>,
    pub kind: TransactionKind,
    pub amount: Decimal,
}

impl StatementLine {
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

impl From<&Transaction> for StatementLine {
    fn from(tx: &Transaction) -> Self {
        Self {
            timestamp: tx.timestamp,
            kind: tx.kind,
            amount: tx.amount,
        }
    }
}

/// A computed statement for one account over one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub account_id: AccountId,
    pub customer_name: String,
    pub window: StatementWindow,
    pub opening_balance: Decimal,
    pub closing_balance: Decimal,
    /// Chronological.
    pub lines: Vec<StatementLine>,
}

impl Statement {
    /// Apply every line forward from the opening balance.
    ///
    /// Always equals `closing_balance` for a statement built by the engine.
    pub fn replay(&self) -> Decimal {
        self.lines
            .iter()
            .fold(self.opening_balance, |balance, line| balance + line.signed_amount())
    }

    /// Render the statement as plain text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "=== ACCOUNT STATEMENT ===")?;
        writeln!(out, "Account ID: {}", self.account_id)?;
        writeln!(out, "Customer: {}", self.customer_name)?;
        writeln!(
            out,
            "Period: {} to {}",
            self.window.start().format(TIMESTAMP_FORMAT),
            self.window.end().format(TIMESTAMP_FORMAT)
        )?;
        writeln!(out)?;
        writeln!(out, "Opening Balance: {}", money(self.opening_balance, false))?;
        writeln!(out)?;
        writeln!(out, "TRANSACTIONS:")?;

        if self.lines.is_empty() {
            writeln!(out, "(no transactions)")?;
        }
        for line in &self.lines {
            writeln!(
                out,
                "{} | {} | {}",
                line.timestamp.format(TIMESTAMP_FORMAT),
                line.kind,
                money(line.signed_amount(), true)
            )?;
        }

        writeln!(out)?;
        writeln!(out, "Closing Balance: {}", money(self.closing_balance, false))?;
        write!(out, "=========================")
    }
}

fn money(value: Decimal, always_signed: bool) -> String {
    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else if always_signed {
        "+"
    } else {
        ""
    };
    format!("{sign}${:.2}", value.abs())
}

/// Stateless statement calculator.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatementEngine;

impl StatementEngine {
    /// Balance immediately before the first of `transactions` was applied.
    pub fn opening_balance<'a, I>(current_balance: Decimal, transactions: I) -> Decimal
    where
        I: IntoIterator<Item = &'a StatementLine>,
    {
        transactions
            .into_iter()
            .fold(current_balance, |balance, line| balance - line.signed_amount())
    }

    /// Build the statement for `account` over `window`.
    ///
    /// `transactions` must be the account's transactions inside the window;
    /// they are re-sorted by timestamp so the output is chronological even if
    /// the caller's ordering was not.
    pub fn generate(
        &self,
        account: &Account,
        window: StatementWindow,
        transactions: &[Transaction],
    ) -> Statement {
        let mut lines: Vec<StatementLine> = transactions.iter().map(StatementLine::from).collect();
        lines.sort_by_key(|l| l.timestamp);

        let opening_balance = Self::opening_balance(account.balance, &lines);

        Statement {
            account_id: account.id.clone(),
            customer_name: account.customer_name.clone(),
            window,
            opening_balance,
            closing_balance: account.balance,
            lines,
        }
    }
}
