//! # Payment Reconciler
//!
//! Sums simulated payment entries (each with its own surcharge rate) and
//! computes the remaining balance against the cart total.
//!
//! ```text
//! total 333.00
//!   cash    200.00 × 1.00 = 200.00
//!   credit  100.00 × 1.10 = 110.00
//!                           ──────
//!   paid                    310.00   remaining 23.00 → underpaid,
//!                                    finalize asks for an override
//! ```
//!
//! Under-payment is a warning, not a hard block: counter staff may split
//! payment methods after printing, so the finalize flow prompts for an
//! explicit acknowledgment instead of refusing.

use crate::money::Money;
use crate::types::PaymentEntry;

/// Tolerance for the under-payment gate: one cent.
const UNDERPAYMENT_TOLERANCE: Money = Money::from_cents(1);

/// Effective contribution of one payment: `amount × (1 + surcharge)`.
pub fn effective_amount(payment: &PaymentEntry) -> Money {
    payment.amount.with_surcharge(payment.surcharge)
}

/// Total paid across all entries, surcharges included.
pub fn paid_with_surcharge(payments: &[PaymentEntry]) -> Money {
    payments.iter().map(effective_amount).sum()
}

/// Remaining balance against `total`, clamped to ≥ 0.
pub fn remaining_balance(total: Money, payments: &[PaymentEntry]) -> Money {
    (total - paid_with_surcharge(payments)).clamp_non_negative()
}

/// Whether the payments fall short of the total by more than one cent.
///
/// When true, the finalize action must prompt for explicit confirmation
/// before proceeding.
pub fn is_underpaid(total: Money, payments: &[PaymentEntry]) -> bool {
    paid_with_surcharge(payments) + UNDERPAYMENT_TOLERANCE < total
}

/// "Fill remaining" helper for one payment row.
///
/// Sets row `index`'s amount to `total` minus every *other* row's
/// effective contribution, clamped to ≥ 0. The row's own surcharge is
/// not discounted from the assigned amount — the operator sees the raw
/// figure they asked for. Out-of-range indices are a no-op.
pub fn fill_remaining(payments: &mut [PaymentEntry], index: usize, total: Money) {
    if index >= payments.len() {
        return;
    }

    let others: Money = payments
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, p)| effective_amount(p))
        .sum();

    payments[index].amount = (total - others).clamp_non_negative();
}

/// Clamps an over-payment by shrinking the last row.
///
/// On submit, when the effective sum exceeds the total, the last row's
/// amount is reduced so its surcharged contribution fits exactly into
/// what the earlier rows left uncovered. Rounds down so the sum never
/// ends above the total.
pub fn clamp_overpayment(payments: &mut [PaymentEntry], total: Money) {
    if payments.is_empty() || paid_with_surcharge(payments) <= total {
        return;
    }

    let last = payments.len() - 1;
    let others: Money = payments[..last].iter().map(effective_amount).sum();
    let allowed = (total - others).clamp_non_negative();

    // invert the surcharge: amount = allowed / (1 + s), floored
    let bps = payments[last].surcharge.bps() as i128;
    let amount = allowed.cents() as i128 * 10_000 / (10_000 + bps);
    payments[last].amount = Money::from_cents(amount as i64);
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Rate;
    use crate::types::PaymentMethod;

    fn payment(method: PaymentMethod, amount_cents: i64, surcharge_pct: f64) -> PaymentEntry {
        PaymentEntry {
            method,
            amount: Money::from_cents(amount_cents),
            surcharge: Rate::from_percent(surcharge_pct),
            ..PaymentEntry::default()
        }
    }

    #[test]
    fn test_reference_reconciliation() {
        // 200.00 cash + 100.00 credit at 10% against 333.00:
        // paid 310.00, remaining 23.00, underpaid
        let total = Money::from_cents(33_300);
        let payments = vec![
            payment(PaymentMethod::Cash, 20_000, 0.0),
            payment(PaymentMethod::Credit, 10_000, 10.0),
        ];

        assert_eq!(paid_with_surcharge(&payments).cents(), 31_000);
        assert_eq!(remaining_balance(total, &payments).cents(), 2_300);
        assert!(is_underpaid(total, &payments));
    }

    #[test]
    fn test_conservation() {
        let total = Money::from_cents(33_300);
        assert_eq!(remaining_balance(total, &[]), total);

        let covering = vec![
            payment(PaymentMethod::Cash, 30_000, 0.0),
            payment(PaymentMethod::Credit, 3_000, 10.0),
        ];
        // 30_000 + 3_300 ≥ total → remaining is exactly zero
        assert_eq!(remaining_balance(total, &covering).cents(), 0);
        assert!(!is_underpaid(total, &covering));
    }

    #[test]
    fn test_one_cent_tolerance() {
        let total = Money::from_cents(10_000);
        // short by exactly one cent: inside tolerance, no prompt
        let just_short = vec![payment(PaymentMethod::Cash, 9_999, 0.0)];
        assert!(!is_underpaid(total, &just_short));
        // short by two cents: prompt
        let shorter = vec![payment(PaymentMethod::Cash, 9_998, 0.0)];
        assert!(is_underpaid(total, &shorter));
    }

    #[test]
    fn test_fill_remaining() {
        let total = Money::from_cents(33_300);
        let mut payments = vec![
            payment(PaymentMethod::Cash, 20_000, 0.0),
            payment(PaymentMethod::Credit, 0, 10.0),
        ];

        fill_remaining(&mut payments, 1, total);
        // the other row covers 200.00, so this row is asked for 133.00
        assert_eq!(payments[1].amount.cents(), 13_300);

        // already over-covered elsewhere → clamps at zero
        payments[0].amount = Money::from_cents(40_000);
        fill_remaining(&mut payments, 1, total);
        assert!(payments[1].amount.is_zero());

        // out of range is a no-op
        fill_remaining(&mut payments, 9, total);
    }

    #[test]
    fn test_clamp_overpayment() {
        let total = Money::from_cents(10_000);
        let mut payments = vec![
            payment(PaymentMethod::Cash, 8_000, 0.0),
            payment(PaymentMethod::Credit, 5_000, 10.0),
        ];

        clamp_overpayment(&mut payments, total);
        // last row may cover at most 2_000 effective → 1_818 raw
        assert_eq!(payments[1].amount.cents(), 1_818);
        assert!(paid_with_surcharge(&payments) <= total);

        // nothing to do when already within the total
        let mut fine = vec![payment(PaymentMethod::Cash, 5_000, 0.0)];
        clamp_overpayment(&mut fine, total);
        assert_eq!(fine[0].amount.cents(), 5_000);
    }
}
