//! Read side of the customer ledger and bottle wallets.

use sqlx::PgPool;
use tracing::error;

use crate::domain::ledger::{replay, ChainBreak};
use crate::dtos::customer::CustomerStatement;
use crate::error::AppError;
use crate::models::bottle_wallet::BottleWallet;
use crate::store::{customers, ledger, wallets};

/// Ledger entries in sequence order, checked by replaying them from zero.
pub async fn statement(pool: &PgPool, customer_id: i64) -> Result<CustomerStatement, AppError> {
    // One snapshot so the cached balance and the entries agree.
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
        .execute(&mut *tx)
        .await?;

    let customer = customers::fetch(&mut tx, customer_id)
        .await?
        .ok_or_else(|| AppError::not_found("Customer not found"))?;
    let entries = ledger::list_for_customer(&mut tx, customer_id).await?;
    tx.commit().await?;

    let chain_break = match replay(&entries) {
        Ok(balance) if balance == customer.cash_balance => None,
        Ok(balance) => Some(ChainBreak {
            seq: entries.last().map(|e| e.seq).unwrap_or(0),
            expected_balance_after: balance,
            recorded_balance_after: customer.cash_balance,
        }),
        Err(broken) => Some(broken),
    };
    if let Some(broken) = &chain_break {
        error!(customer_id, seq = broken.seq, "Ledger chain does not reproduce the cached balance");
    }

    Ok(CustomerStatement {
        customer,
        chain_valid: chain_break.is_none(),
        chain_break,
        entries,
    })
}

pub async fn bottle_wallets(pool: &PgPool, customer_id: i64) -> Result<Vec<BottleWallet>, AppError> {
    let mut conn = pool.acquire().await?;
    customers::fetch(&mut conn, customer_id)
        .await?
        .ok_or_else(|| AppError::not_found("Customer not found"))?;
    Ok(wallets::list_for_customer(&mut conn, customer_id).await?)
}
