//! Cash handover state machine and read-side statistics.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::AppError;
use crate::models::cash_handover::{CashHandover, HandoverStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    Create,
    /// Overwrite the PENDING handover with this id.
    Resubmit(i64),
}

/// Decides what a driver submission does given the existing (driver, date) row.
pub fn decide_submit(existing: Option<(i64, HandoverStatus)>) -> Result<SubmitAction, AppError> {
    match existing {
        None => Ok(SubmitAction::Create),
        Some((id, HandoverStatus::Pending)) => Ok(SubmitAction::Resubmit(id)),
        Some(_) => Err(AppError::invalid_transition("Handover already verified")),
    }
}

/// Positive is a shortage, negative an excess.
pub fn discrepancy(expected_cash: Decimal, actual_cash: Decimal) -> Decimal {
    expected_cash - actual_cash
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    pub status: HandoverStatus,
    pub adjustment_amount: Option<Decimal>,
}

/// One-way move out of PENDING. The adjustment is kept only for ADJUSTED.
pub fn plan_verification(
    current: HandoverStatus,
    target: HandoverStatus,
    adjustment_amount: Option<Decimal>,
) -> Result<Verification, AppError> {
    if target == HandoverStatus::Pending {
        return Err(AppError::validation(
            "Verification status must be VERIFIED, REJECTED or ADJUSTED",
        ));
    }
    if current != HandoverStatus::Pending {
        return Err(AppError::invalid_transition("Only pending handovers can be verified"));
    }

    let adjustment_amount = match target {
        HandoverStatus::Adjusted => adjustment_amount,
        _ => None,
    };
    Ok(Verification {
        status: target,
        adjustment_amount,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusTotals {
    pub status: HandoverStatus,
    pub count: i64,
    pub expected_cash: Decimal,
    pub actual_cash: Decimal,
    pub discrepancy: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscrepancyAlert {
    pub handover_id: i64,
    pub driver_id: i64,
    pub handover_date: chrono::NaiveDate,
    pub status: HandoverStatus,
    pub discrepancy: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandoverStats {
    pub total_count: i64,
    pub by_status: Vec<StatusTotals>,
    pub threshold: Decimal,
    pub large_discrepancies: Vec<DiscrepancyAlert>,
}

const ALL_STATUSES: [HandoverStatus; 4] = [
    HandoverStatus::Pending,
    HandoverStatus::Verified,
    HandoverStatus::Rejected,
    HandoverStatus::Adjusted,
];

impl HandoverStats {
    pub fn compute(handovers: &[CashHandover], threshold: Decimal) -> Self {
        let by_status = ALL_STATUSES
            .iter()
            .map(|&status| {
                let mut totals = StatusTotals {
                    status,
                    count: 0,
                    expected_cash: Decimal::ZERO,
                    actual_cash: Decimal::ZERO,
                    discrepancy: Decimal::ZERO,
                };
                for h in handovers.iter().filter(|h| h.status == status) {
                    totals.count += 1;
                    totals.expected_cash += h.expected_cash;
                    totals.actual_cash += h.actual_cash;
                    totals.discrepancy += h.discrepancy;
                }
                totals
            })
            .collect();

        let mut large_discrepancies: Vec<DiscrepancyAlert> = handovers
            .iter()
            .filter(|h| h.discrepancy.abs() > threshold)
            .map(|h| DiscrepancyAlert {
                handover_id: h.id,
                driver_id: h.driver_id,
                handover_date: h.handover_date,
                status: h.status,
                discrepancy: h.discrepancy,
            })
            .collect();
        large_discrepancies.sort_by(|a, b| {
            b.discrepancy
                .abs()
                .cmp(&a.discrepancy.abs())
                .then(a.handover_id.cmp(&b.handover_id))
        });

        HandoverStats {
            total_count: handovers.len() as i64,
            by_status,
            threshold,
            large_discrepancies,
        }
    }
}
