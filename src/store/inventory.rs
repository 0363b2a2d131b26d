use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgConnection;

/// Current prices for the given products. Missing ids are simply absent.
pub async fn prices(conn: &mut PgConnection, product_ids: &[i64]) -> Result<HashMap<i64, Decimal>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, Decimal)>("SELECT id, price FROM products WHERE id = ANY($1)")
        .bind(product_ids)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.into_iter().collect())
}

/// Moves depot stock for one product. Returns false if the product does not exist.
pub async fn adjust_stock(
    conn: &mut PgConnection,
    product_id: i64,
    filled_out: i32,
    empty_in: i32,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"UPDATE products
           SET stock_filled = stock_filled - $2,
               stock_empty = stock_empty + $3
           WHERE id = $1"#,
    )
    .bind(product_id)
    .bind(filled_out)
    .bind(empty_in)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() == 1)
}
