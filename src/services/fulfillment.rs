//! Order status updates, including the completion transaction that moves
//! money, bottle wallets and depot stock together.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument, warn};

use crate::domain::fulfillment::{
    order_total, plan_completion, plan_transition, CompletionFacts, ItemExchange, Transition,
};
use crate::dtos::order::{
    OrderItemRequest, OrderResponse, ReplaceOrderItemsRequest, UpdateOrderStatusRequest,
};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::order::{Order, OrderItem};
use crate::store::{customers, inventory, ledger, orders, wallets};
use crate::store::orders::NewOrderItem;
use crate::validation;

fn authorize(auth: &AuthContext, order: &Order) -> Result<(), AppError> {
    if auth.is_admin() || order.driver_id == Some(auth.user_id) {
        Ok(())
    } else {
        Err(AppError::forbidden("You can only update your own orders"))
    }
}

pub async fn get_order(pool: &PgPool, auth: &AuthContext, order_id: i64) -> Result<OrderResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let order = orders::fetch(&mut conn, order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    authorize(auth, &order)?;
    let items = orders::items(&mut conn, order_id).await?;
    Ok(OrderResponse { order, items })
}

/// Applies a status change. Entering COMPLETED runs the fulfillment side
/// effects exactly once; the previous status is read under the row lock.
#[instrument(skip(pool, auth, req), fields(user_id = auth.user_id, requested = ?req.status))]
pub async fn update_status(
    pool: &PgPool,
    auth: &AuthContext,
    order_id: i64,
    req: &UpdateOrderStatusRequest,
) -> Result<OrderResponse, AppError> {
    req.validate()?;

    let mut tx = pool.begin().await?;

    let order = orders::lock(&mut tx, order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    authorize(auth, &order)?;

    let order = match plan_transition(order.status, req.status)? {
        Transition::NoOp => {
            if req.items.is_some() {
                warn!(order_id, "Ignoring item changes on an order that is already {}", order.status.as_str());
            }
            order
        }
        Transition::StatusOnly(status) => {
            let updated = orders::set_status(&mut tx, order_id, status).await?;
            info!(order_id, from = order.status.as_str(), to = status.as_str(), "Order status changed");
            updated
        }
        Transition::Complete => complete(&mut tx, order, req).await?,
    };

    let items = orders::items(&mut tx, order_id).await?;
    tx.commit().await?;

    Ok(OrderResponse { order, items })
}

async fn complete(
    conn: &mut PgConnection,
    order: Order,
    req: &UpdateOrderStatusRequest,
) -> Result<Order, AppError> {
    let order_id = order.id;

    // Item and total changes land first so the sale reflects the final total.
    let (items, total_amount) = match &req.items {
        Some(requested) => {
            let existing = orders::items(conn, order_id).await?;
            let new_items = price_items(conn, &existing, requested).await?;
            let written = orders::replace_items(conn, order_id, &new_items).await?;
            let total = total_of(&written, order.delivery_charge, order.discount)?;
            orders::set_pricing(conn, order_id, order.delivery_charge, order.discount, total).await?;
            (written, total)
        }
        None => (orders::items(conn, order_id).await?, order.total_amount),
    };

    let cash_collected = req.cash_collected.unwrap_or(Decimal::ZERO);
    let payment_method = req.payment_method.unwrap_or(order.payment_method);
    let completed = orders::mark_completed(conn, order_id, cash_collected, payment_method, Utc::now()).await?;

    let prior_balance = customers::lock_balance(conn, order.customer_id)
        .await?
        .ok_or_else(|| AppError::not_found("Customer not found"))?;
    let last_seq = ledger::last_seq(conn, order.customer_id).await?;

    let exchanges: Vec<ItemExchange> = items
        .iter()
        .map(|item| ItemExchange {
            product_id: item.product_id,
            filled_given: item.filled_given,
            empty_taken: item.empty_taken,
        })
        .collect();
    let plan = plan_completion(&CompletionFacts {
        order_id,
        total_amount,
        cash_collected,
        prior_balance,
        last_seq,
        items: &exchanges,
    })?;
    for entry in &plan.ledger_entries {
        validation::money("balance_after", entry.balance_after)?;
    }

    ledger::append(conn, order.customer_id, &plan.ledger_entries).await?;
    customers::set_balance(conn, order.customer_id, plan.final_balance).await?;

    for change in &plan.wallet_changes {
        wallets::apply_change(conn, order.customer_id, change.product_id, change.net_change)
            .await
            .map_err(|e| AppError::from_out_of_range(e, "Bottle wallet balance is out of range"))?;
    }
    for change in &plan.inventory_changes {
        let found = inventory::adjust_stock(conn, change.product_id, change.filled_out, change.empty_in)
            .await
            .map_err(|e| AppError::from_out_of_range(e, "Depot stock is out of range"))?;
        if !found {
            return Err(AppError::not_found(format!("Product {} not found", change.product_id)));
        }
    }

    info!(
        order_id,
        customer_id = order.customer_id,
        total = %total_amount,
        cash = %cash_collected,
        balance_after = %plan.final_balance,
        "Order completed"
    );

    Ok(completed)
}

/// PUT /orders/{id}/items: wholesale replacement on an open order.
#[instrument(skip(pool, auth, req), fields(user_id = auth.user_id))]
pub async fn replace_items(
    pool: &PgPool,
    auth: &AuthContext,
    order_id: i64,
    req: &ReplaceOrderItemsRequest,
) -> Result<OrderResponse, AppError> {
    req.validate()?;

    let mut tx = pool.begin().await?;

    let order = orders::lock(&mut tx, order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    authorize(auth, &order)?;
    if order.status.is_terminal() {
        // Completed orders would need compensating ledger and wallet entries.
        return Err(AppError::invalid_transition(format!(
            "Items of a {} order cannot be edited",
            order.status.as_str()
        )));
    }

    let existing = orders::items(&mut tx, order_id).await?;
    let new_items = price_items(&mut tx, &existing, &req.items).await?;
    let items = orders::replace_items(&mut tx, order_id, &new_items).await?;

    let delivery_charge = req.delivery_charge.unwrap_or(order.delivery_charge);
    let discount = req.discount.unwrap_or(order.discount);
    let total = total_of(&items, delivery_charge, discount)?;
    let order = orders::set_pricing(&mut tx, order_id, delivery_charge, discount, total).await?;

    tx.commit().await?;

    info!(order_id, total = %total, "Order items replaced");
    Ok(OrderResponse { order, items })
}

/// Keeps the order's existing price snapshot per product; new products take
/// the current catalogue price.
async fn price_items(
    conn: &mut PgConnection,
    existing: &[OrderItem],
    requested: &[OrderItemRequest],
) -> Result<Vec<NewOrderItem>, AppError> {
    let snapshot: HashMap<i64, Decimal> = existing
        .iter()
        .map(|item| (item.product_id, item.price_at_time))
        .collect();
    let product_ids: Vec<i64> = requested.iter().map(|item| item.product_id).collect();
    let catalogue = inventory::prices(conn, &product_ids).await?;

    requested
        .iter()
        .map(|item| {
            let Some(&current_price) = catalogue.get(&item.product_id) else {
                return Err(AppError::not_found(format!("Product {} not found", item.product_id)));
            };
            let price_at_time = snapshot.get(&item.product_id).copied().unwrap_or(current_price);
            Ok(NewOrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
                price_at_time,
                filled_given: item.filled_given,
                empty_taken: item.empty_taken,
                damaged_returned: item.damaged_returned,
            })
        })
        .collect()
}

fn total_of(items: &[OrderItem], delivery_charge: Decimal, discount: Decimal) -> Result<Decimal, AppError> {
    let lines: Vec<(i32, Decimal)> = items
        .iter()
        .map(|item| (item.quantity, item.price_at_time))
        .collect();
    let total = order_total(&lines, delivery_charge, discount);
    validation::money("total_amount", total)?;
    Ok(total)
}
