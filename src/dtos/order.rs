use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::order::{Order, OrderItem, OrderStatus, PaymentMethod};
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: i64,
    pub quantity: i32,
    #[serde(default)]
    pub filled_given: i32,
    #[serde(default)]
    pub empty_taken: i32,
    #[serde(default)]
    pub damaged_returned: i32,
}

impl OrderItemRequest {
    fn validate(&self) -> Result<(), AppError> {
        validation::non_negative_count("quantity", self.quantity)?;
        validation::non_negative_count("filled_given", self.filled_given)?;
        validation::non_negative_count("empty_taken", self.empty_taken)?;
        validation::non_negative_count("damaged_returned", self.damaged_returned)?;
        Ok(())
    }
}

fn validate_items(items: &[OrderItemRequest]) -> Result<(), AppError> {
    if items.is_empty() {
        return Err(AppError::validation("Order must contain at least one item"));
    }
    items.iter().try_for_each(OrderItemRequest::validate)?;

    // Lines for the same product are merged on completion; the merged counts obey the same bound.
    let mut per_product: HashMap<i64, (i64, i64)> = HashMap::new();
    for item in items {
        let totals = per_product.entry(item.product_id).or_insert((0, 0));
        totals.0 += i64::from(item.filled_given);
        totals.1 += i64::from(item.empty_taken);
        if totals.0 > i64::from(validation::MAX_COUNT) || totals.1 > i64::from(validation::MAX_COUNT) {
            return Err(AppError::validation(format!(
                "Bottle counts for product {} cannot exceed {}",
                item.product_id,
                validation::MAX_COUNT
            )));
        }
    }
    Ok(())
}

/// PATCH /orders/{id}/status. Items, cash and payment method apply only when completing.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    pub items: Option<Vec<OrderItemRequest>>,
    pub cash_collected: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
}

impl UpdateOrderStatusRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let completing = self.status == OrderStatus::Completed;
        if !completing
            && (self.items.is_some() || self.cash_collected.is_some() || self.payment_method.is_some())
        {
            return Err(AppError::validation(
                "Items, cash_collected and payment_method can only be sent when completing an order",
            ));
        }
        if let Some(items) = &self.items {
            validate_items(items)?;
        }
        if let Some(cash) = self.cash_collected {
            validation::non_negative_money("cash_collected", cash)?;
        }
        Ok(())
    }
}

/// PUT /orders/{id}/items
#[derive(Debug, Deserialize)]
pub struct ReplaceOrderItemsRequest {
    pub items: Vec<OrderItemRequest>,
    pub delivery_charge: Option<Decimal>,
    pub discount: Option<Decimal>,
}

impl ReplaceOrderItemsRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_items(&self.items)?;
        if let Some(charge) = self.delivery_charge {
            validation::non_negative_money("delivery_charge", charge)?;
        }
        if let Some(discount) = self.discount {
            validation::non_negative_money("discount", discount)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> UpdateOrderStatusRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn completion_request_parses_and_validates() {
        let req = parse(
            r#"{"status":"COMPLETED","cash_collected":"600.00","payment_method":"CASH",
                "items":[{"product_id":1,"quantity":2,"filled_given":2,"empty_taken":2}]}"#,
        );
        assert!(req.validate().is_ok());
        assert_eq!(req.items.as_ref().unwrap()[0].damaged_returned, 0);
    }

    #[test]
    fn numeric_cash_is_accepted() {
        let req = parse(r#"{"status":"COMPLETED","cash_collected":600}"#);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn negative_exchange_counts_are_rejected() {
        let req = parse(
            r#"{"status":"COMPLETED","items":[{"product_id":1,"quantity":1,"empty_taken":-1}]}"#,
        );
        assert!(matches!(req.validate(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn counts_that_would_overflow_when_merged_are_rejected() {
        let req = parse(
            r#"{"status":"COMPLETED","items":[
                {"product_id":1,"quantity":1,"filled_given":2147483647},
                {"product_id":1,"quantity":1,"filled_given":1}]}"#,
        );
        assert!(matches!(req.validate(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn merged_counts_for_one_product_are_bounded() {
        let req = parse(
            r#"{"status":"COMPLETED","items":[
                {"product_id":4,"quantity":1,"empty_taken":60000},
                {"product_id":4,"quantity":1,"empty_taken":60000}]}"#,
        );
        assert!(matches!(req.validate(), Err(AppError::ValidationError(_))));

        let split = parse(
            r#"{"status":"COMPLETED","items":[
                {"product_id":4,"quantity":1,"empty_taken":60000},
                {"product_id":5,"quantity":1,"empty_taken":60000}]}"#,
        );
        assert!(split.validate().is_ok());
    }

    #[test]
    fn oversized_cash_is_rejected_before_any_write() {
        let req = parse(r#"{"status":"COMPLETED","cash_collected":"100000000000"}"#);
        assert!(matches!(req.validate(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn empty_item_list_is_rejected() {
        let req = parse(r#"{"status":"COMPLETED","items":[]}"#);
        assert!(req.validate().is_err());
    }

    #[test]
    fn completion_fields_on_other_moves_are_rejected() {
        let req = parse(r#"{"status":"IN_PROGRESS","cash_collected":"10"}"#);
        assert!(req.validate().is_err());
        assert!(parse(r#"{"status":"CANCELLED"}"#).validate().is_ok());
    }
}
