use sqlx::PgConnection;

use crate::models::bottle_wallet::BottleWallet;

/// Single-statement upsert: creates the wallet at `net_change` or increments it.
pub async fn apply_change(
    conn: &mut PgConnection,
    customer_id: i64,
    product_id: i64,
    net_change: i32,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        r#"INSERT INTO bottle_wallets (customer_id, product_id, balance, updated_at)
           VALUES ($1, $2, $3, NOW())
           ON CONFLICT (customer_id, product_id)
           DO UPDATE SET balance = bottle_wallets.balance + EXCLUDED.balance,
                         updated_at = NOW()
           RETURNING balance"#,
    )
    .bind(customer_id)
    .bind(product_id)
    .bind(net_change)
    .fetch_one(&mut *conn)
    .await
}

pub async fn list_for_customer(conn: &mut PgConnection, customer_id: i64) -> Result<Vec<BottleWallet>, sqlx::Error> {
    sqlx::query_as::<_, BottleWallet>(
        r#"SELECT bw.customer_id, bw.product_id, p.name AS product_name, bw.balance, bw.updated_at
           FROM bottle_wallets bw
           JOIN products p ON p.id = bw.product_id
           WHERE bw.customer_id = $1
           ORDER BY p.name"#,
    )
    .bind(customer_id)
    .fetch_all(&mut *conn)
    .await
}
