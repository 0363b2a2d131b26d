use sqlx::PgConnection;

use crate::domain::ledger::PlannedEntry;
use crate::models::customer::LedgerEntry;

/// Highest persisted sequence number for the customer, 0 if none.
/// Call only while holding the customer row lock.
pub async fn last_seq(conn: &mut PgConnection, customer_id: i64) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        "SELECT COALESCE(MAX(seq), 0)::INT FROM ledger_entries WHERE customer_id = $1",
    )
    .bind(customer_id)
    .fetch_one(&mut *conn)
    .await
}

pub async fn append(
    conn: &mut PgConnection,
    customer_id: i64,
    entries: &[PlannedEntry],
) -> Result<Vec<LedgerEntry>, sqlx::Error> {
    let mut written = Vec::with_capacity(entries.len());
    for entry in entries {
        let row = sqlx::query_as::<_, LedgerEntry>(
            r#"INSERT INTO ledger_entries (customer_id, seq, amount, description, balance_after, reference_id)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, customer_id, seq, amount, description, balance_after, reference_id, created_at"#,
        )
        .bind(customer_id)
        .bind(entry.seq)
        .bind(entry.amount)
        .bind(&entry.description)
        .bind(entry.balance_after)
        .bind(entry.reference_id)
        .fetch_one(&mut *conn)
        .await?;
        written.push(row);
    }
    Ok(written)
}

pub async fn list_for_customer(conn: &mut PgConnection, customer_id: i64) -> Result<Vec<LedgerEntry>, sqlx::Error> {
    sqlx::query_as::<_, LedgerEntry>(
        r#"SELECT id, customer_id, seq, amount, description, balance_after, reference_id, created_at
           FROM ledger_entries
           WHERE customer_id = $1
           ORDER BY seq ASC"#,
    )
    .bind(customer_id)
    .fetch_all(&mut *conn)
    .await
}
