//! Order status transitions and the side effects of completing an order.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::domain::ledger::{LedgerChain, PlannedEntry};
use crate::error::AppError;
use crate::models::order::OrderStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Requested state equals a terminal current state; nothing is written.
    NoOp,
    /// Status change with no ledger, wallet or inventory effects.
    StatusOnly(OrderStatus),
    /// Entry into COMPLETED; side effects apply exactly once.
    Complete,
}

pub fn plan_transition(previous: OrderStatus, requested: OrderStatus) -> Result<Transition, AppError> {
    if previous.is_terminal() {
        if previous == requested {
            return Ok(Transition::NoOp);
        }
        return Err(AppError::invalid_transition(format!(
            "Order is {} and cannot move to {}",
            previous.as_str(),
            requested.as_str()
        )));
    }

    match requested {
        OrderStatus::Completed => Ok(Transition::Complete),
        other => Ok(Transition::StatusOnly(other)),
    }
}

/// Per-item facts that drive wallet and depot changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemExchange {
    pub product_id: i64,
    pub filled_given: i32,
    pub empty_taken: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletChange {
    pub product_id: i64,
    pub net_change: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryChange {
    pub product_id: i64,
    pub filled_out: i32,
    pub empty_in: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulfillmentPlan {
    pub ledger_entries: Vec<PlannedEntry>,
    pub final_balance: Decimal,
    pub wallet_changes: Vec<WalletChange>,
    pub inventory_changes: Vec<InventoryChange>,
}

/// Inputs for completing one order, read under lock.
#[derive(Debug, Clone)]
pub struct CompletionFacts<'a> {
    pub order_id: i64,
    pub total_amount: Decimal,
    pub cash_collected: Decimal,
    pub prior_balance: Decimal,
    pub last_seq: i32,
    pub items: &'a [ItemExchange],
}

/// Side effects of completing an order. Wallet and inventory changes are
/// merged per product and sorted by product id so concurrent completions
/// lock product rows in the same order. Merged counts that do not fit an
/// `i32` are a validation error.
pub fn plan_completion(facts: &CompletionFacts<'_>) -> Result<FulfillmentPlan, AppError> {
    let mut chain = LedgerChain::resume(facts.prior_balance, facts.last_seq);
    chain.append(
        -facts.total_amount,
        format!("Order #{} Sale", facts.order_id),
        Some(facts.order_id),
    );
    if facts.cash_collected > Decimal::ZERO {
        chain.append(
            facts.cash_collected,
            format!("Order #{} Payment", facts.order_id),
            Some(facts.order_id),
        );
    }
    let final_balance = chain.balance();

    let mut per_product: BTreeMap<i64, (i32, i32)> = BTreeMap::new();
    for item in facts.items {
        let entry = per_product.entry(item.product_id).or_insert((0, 0));
        let overflow = || AppError::validation(format!("Bottle counts for product {} are out of range", item.product_id));
        entry.0 = entry.0.checked_add(item.filled_given).ok_or_else(overflow)?;
        entry.1 = entry.1.checked_add(item.empty_taken).ok_or_else(overflow)?;
    }

    let wallet_changes = per_product
        .iter()
        .map(|(&product_id, &(given, taken))| {
            given
                .checked_sub(taken)
                .map(|net_change| WalletChange { product_id, net_change })
                .ok_or_else(|| AppError::validation(format!("Bottle counts for product {product_id} are out of range")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let inventory_changes = per_product
        .iter()
        .map(|(&product_id, &(given, taken))| InventoryChange {
            product_id,
            filled_out: given,
            empty_in: taken,
        })
        .collect();

    Ok(FulfillmentPlan {
        ledger_entries: chain.into_entries(),
        final_balance,
        wallet_changes,
        inventory_changes,
    })
}

/// Order total: items at their price snapshot plus delivery charge minus discount.
pub fn order_total(lines: &[(i32, Decimal)], delivery_charge: Decimal, discount: Decimal) -> Decimal {
    let items: Decimal = lines
        .iter()
        .map(|(quantity, price)| Decimal::from(*quantity) * *price)
        .sum();
    items + delivery_charge - discount
}
