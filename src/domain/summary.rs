//! Expected-cash aggregation for one driver and one calendar day.

use std::collections::HashSet;

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::AppError;
use crate::models::expense::{ExpensePaymentMethod, ExpenseStatus};
use crate::models::order::{OrderStatus, PaymentMethod};

/// Half-open `[start, end)` window covering one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn for_date(date: NaiveDate, offset: FixedOffset) -> Result<Self, AppError> {
        let next = date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| AppError::validation("Date is out of range"))?;
        let start = local_midnight(date, offset)?;
        let end = local_midnight(next, offset)?;
        Ok(Self { start, end })
    }
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> Result<DateTime<Utc>, AppError> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|naive| naive.and_local_timezone(offset).single())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| AppError::validation("Date is out of range"))
}

/// A driver's order scheduled inside the day window.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DayOrder {
    pub id: i64,
    pub customer_name: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub cash_collected: Decimal,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DayItem {
    pub order_id: i64,
    pub filled_given: i32,
    pub empty_taken: i32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DayExpense {
    pub amount: Decimal,
    pub payment_method: ExpensePaymentMethod,
    pub status: ExpenseStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CashOrderLine {
    pub order_id: i64,
    pub customer_name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub driver_id: i64,
    pub date: NaiveDate,
    pub total_orders: i32,
    pub completed_orders: i32,
    pub cash_orders: i32,
    pub gross_cash: Decimal,
    pub expenses_amount: Decimal,
    pub expected_cash: Decimal,
    pub bottles_given: i32,
    pub bottles_taken: i32,
    pub orders_paid_in_cash: Vec<CashOrderLine>,
}

impl DaySummary {
    /// Folds the day's rows. Cash is counted only from COMPLETED orders paid in
    /// CASH; cash-on-hand expenses reduce it unless REJECTED. Bottle totals
    /// that do not fit an `i32` are an internal error.
    pub fn compute(
        driver_id: i64,
        date: NaiveDate,
        orders: &[DayOrder],
        items: &[DayItem],
        expenses: &[DayExpense],
    ) -> Result<Self, AppError> {
        let mut completed: HashSet<i64> = HashSet::new();
        let mut gross_cash = Decimal::ZERO;
        let mut orders_paid_in_cash = Vec::new();

        for order in orders {
            if order.status != OrderStatus::Completed {
                continue;
            }
            completed.insert(order.id);
            if order.payment_method == PaymentMethod::Cash {
                gross_cash += order.cash_collected;
                orders_paid_in_cash.push(CashOrderLine {
                    order_id: order.id,
                    customer_name: order.customer_name.clone(),
                    amount: order.cash_collected,
                });
            }
        }
        orders_paid_in_cash.sort_by_key(|line| line.order_id);

        let (bottles_given, bottles_taken) = items
            .iter()
            .filter(|item| completed.contains(&item.order_id))
            .try_fold((0i32, 0i32), |(given, taken), item| {
                Some((
                    given.checked_add(item.filled_given)?,
                    taken.checked_add(item.empty_taken)?,
                ))
            })
            .ok_or_else(|| AppError::internal(format!("Bottle totals for driver {driver_id} on {date} overflow")))?;

        let expenses_amount: Decimal = expenses
            .iter()
            .filter(|e| e.payment_method == ExpensePaymentMethod::CashOnHand)
            .filter(|e| e.status != ExpenseStatus::Rejected)
            .map(|e| e.amount)
            .sum();

        Ok(DaySummary {
            driver_id,
            date,
            total_orders: orders.len() as i32,
            completed_orders: completed.len() as i32,
            cash_orders: orders_paid_in_cash.len() as i32,
            gross_cash,
            expenses_amount,
            expected_cash: gross_cash - expenses_amount,
            bottles_given,
            bottles_taken,
            orders_paid_in_cash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    fn order(id: i64, status: OrderStatus, method: PaymentMethod, cash: Decimal) -> DayOrder {
        DayOrder {
            id,
            customer_name: format!("Customer {id}"),
            status,
            payment_method: method,
            cash_collected: cash,
        }
    }

    fn expense(amount: Decimal, method: ExpensePaymentMethod, status: ExpenseStatus) -> DayExpense {
        DayExpense {
            amount,
            payment_method: method,
            status,
        }
    }

    #[test]
    fn rejected_expenses_do_not_reduce_expected_cash() {
        let orders = [order(1, OrderStatus::Completed, PaymentMethod::Cash, dec!(400))];
        let expenses = [
            expense(dec!(100), ExpensePaymentMethod::CashOnHand, ExpenseStatus::Rejected),
            expense(dec!(50), ExpensePaymentMethod::CashOnHand, ExpenseStatus::Approved),
        ];

        let summary = DaySummary::compute(7, date(), &orders, &[], &expenses).unwrap();
        assert_eq!(summary.gross_cash, dec!(400));
        assert_eq!(summary.expenses_amount, dec!(50));
        assert_eq!(summary.expected_cash, dec!(350));
    }

    #[test]
    fn pending_cash_expenses_count_and_other_methods_do_not() {
        let orders = [order(1, OrderStatus::Completed, PaymentMethod::Cash, dec!(200))];
        let expenses = [
            expense(dec!(30), ExpensePaymentMethod::CashOnHand, ExpenseStatus::Pending),
            expense(dec!(70), ExpensePaymentMethod::CompanyAccount, ExpenseStatus::Approved),
            expense(dec!(15), ExpensePaymentMethod::Personal, ExpenseStatus::Pending),
        ];

        let summary = DaySummary::compute(7, date(), &orders, &[], &expenses).unwrap();
        assert_eq!(summary.expenses_amount, dec!(30));
        assert_eq!(summary.expected_cash, dec!(170));
    }

    #[test]
    fn only_completed_cash_orders_contribute_cash() {
        let orders = [
            order(3, OrderStatus::Completed, PaymentMethod::Cash, dec!(120)),
            order(1, OrderStatus::Completed, PaymentMethod::Cash, dec!(80)),
            order(2, OrderStatus::Completed, PaymentMethod::BankTransfer, dec!(500)),
            order(4, OrderStatus::InProgress, PaymentMethod::Cash, dec!(90)),
            order(5, OrderStatus::Cancelled, PaymentMethod::Cash, dec!(60)),
        ];

        let summary = DaySummary::compute(7, date(), &orders, &[], &[]).unwrap();
        assert_eq!(summary.total_orders, 5);
        assert_eq!(summary.completed_orders, 3);
        assert_eq!(summary.cash_orders, 2);
        assert_eq!(summary.gross_cash, dec!(200));
        let ids: Vec<i64> = summary.orders_paid_in_cash.iter().map(|l| l.order_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn bottles_are_counted_from_completed_orders_only() {
        let orders = [
            order(1, OrderStatus::Completed, PaymentMethod::Credit, Decimal::ZERO),
            order(2, OrderStatus::Pending, PaymentMethod::Cash, Decimal::ZERO),
        ];
        let items = [
            DayItem { order_id: 1, filled_given: 3, empty_taken: 2 },
            DayItem { order_id: 1, filled_given: 1, empty_taken: 0 },
            DayItem { order_id: 2, filled_given: 9, empty_taken: 9 },
        ];

        let summary = DaySummary::compute(7, date(), &orders, &items, &[]).unwrap();
        assert_eq!((summary.bottles_given, summary.bottles_taken), (4, 2));
    }

    #[test]
    fn bottle_totals_past_i32_are_an_error() {
        let orders = [order(1, OrderStatus::Completed, PaymentMethod::Cash, Decimal::ZERO)];
        let items = [
            DayItem { order_id: 1, filled_given: i32::MAX, empty_taken: 0 },
            DayItem { order_id: 1, filled_given: 1, empty_taken: 0 },
        ];

        let err = DaySummary::compute(7, date(), &orders, &items, &[]).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn recomputation_is_deterministic() {
        let orders = [
            order(2, OrderStatus::Completed, PaymentMethod::Cash, dec!(10)),
            order(1, OrderStatus::Completed, PaymentMethod::Cash, dec!(20)),
        ];
        let expenses = [expense(dec!(5), ExpensePaymentMethod::CashOnHand, ExpenseStatus::Pending)];

        let first = DaySummary::compute(7, date(), &orders, &[], &expenses).unwrap();
        let second = DaySummary::compute(7, date(), &orders, &[], &expenses).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn window_spans_one_local_day() {
        let offset = FixedOffset::east_opt(5 * 3600).unwrap();
        let window = DayWindow::for_date(date(), offset).unwrap();

        assert_eq!(window.start, Utc.with_ymd_and_hms(2026, 3, 13, 19, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2026, 3, 14, 19, 0, 0).unwrap());
    }
}
