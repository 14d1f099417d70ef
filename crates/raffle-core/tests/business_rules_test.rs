//! Property tests for pricing, commission and range rules.

use chrono::Utc;
use proptest::prelude::*;
use raffle_core::commission::{CommissionRates, summarize};
use raffle_core::models::invoice::{Invoice, InvoiceStatus};
use raffle_core::models::ticket_package::PromotionType;
use raffle_core::pricing::{PackageTerms, final_price, total_tickets};
use raffle_core::ranges::{NumberRange, complement, covered_count, first_conflict};
use uuid::Uuid;

fn promotion() -> impl Strategy<Value = PromotionType> {
    prop_oneof![
        Just(PromotionType::None),
        Just(PromotionType::Discount),
        Just(PromotionType::Bonus),
        Just(PromotionType::TwoForOne),
        Just(PromotionType::ThreeForTwo),
    ]
}

fn status() -> impl Strategy<Value = InvoiceStatus> {
    prop_oneof![
        Just(InvoiceStatus::Pending),
        Just(InvoiceStatus::Completed),
        Just(InvoiceStatus::Paid),
        Just(InvoiceStatus::Cancelled),
        Just(InvoiceStatus::Refunded),
    ]
}

fn invoice(total_price: f64, status: InvoiceStatus) -> Invoice {
    Invoice {
        id: Uuid::new_v4(),
        tenant_id: Uuid::nil(),
        raffle_id: Uuid::nil(),
        participant_id: Uuid::nil(),
        package_id: None,
        referral_id: None,
        ambassador_id: None,
        quantity: 1,
        total_price,
        status,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn range() -> impl Strategy<Value = NumberRange> {
    (1u64..500, 0u64..50).prop_map(|(start, len)| NumberRange {
        start,
        end: start + len,
    })
}

proptest! {
    #[test]
    fn total_tickets_is_monotonic_in_amount(
        amount in 1u32..10_000,
        promotion_type in promotion(),
        bonus in 0u32..100,
    ) {
        let terms = |amount| PackageTerms {
            amount,
            base_price: 10.0,
            promotion_type,
            promotion_value: f64::from(bonus),
        };
        prop_assert!(total_tickets(&terms(amount)) <= total_tickets(&terms(amount + 1)));
    }

    #[test]
    fn discount_never_raises_price(base_price in 0.0f64..10_000.0, value in 0.0f64..=100.0) {
        let terms = PackageTerms {
            amount: 1,
            base_price,
            promotion_type: PromotionType::Discount,
            promotion_value: value,
        };
        let price = final_price(&terms);
        prop_assert!(price <= base_price);
        prop_assert!(price >= 0.0);
    }

    #[test]
    fn personal_plus_team_matches_combined_rate(
        sales in prop::collection::vec((0.0f64..5_000.0, status()), 0..40),
        commission_rate in 0.0f64..=1.0,
        team_commission_rate in 0.0f64..=1.0,
    ) {
        let invoices: Vec<Invoice> = sales.iter().map(|(p, s)| invoice(*p, *s)).collect();
        let rates = CommissionRates::new(commission_rate, team_commission_rate).unwrap();
        let summary = summarize(&invoices, rates);

        let combined = summary.total_sales * (commission_rate + team_commission_rate);
        prop_assert!((summary.personal_commission + summary.team_commission - combined).abs() <= 1e-6);
    }

    #[test]
    fn ranges_accepted_by_conflict_check_are_disjoint(candidates in prop::collection::vec(range(), 1..30)) {
        let mut accepted: Vec<NumberRange> = Vec::new();
        for candidate in candidates {
            if first_conflict(&candidate, accepted.iter().copied()).is_none() {
                accepted.push(candidate);
            }
        }
        for (i, a) in accepted.iter().enumerate() {
            for b in &accepted[i + 1..] {
                prop_assert!(a.end < b.start || b.end < a.start);
            }
        }
    }

    #[test]
    fn covered_and_complement_partition_the_window(ranges in prop::collection::vec(range(), 0..20)) {
        let window = NumberRange { start: 1, end: 600 };
        let covered = covered_count(ranges.iter().copied(), &window);
        let free: u64 = complement(ranges.iter().copied(), &window)
            .iter()
            .map(|r| r.count())
            .sum();
        prop_assert_eq!(covered + free, window.count());
    }
}

#[test]
fn overlapping_assignment_cites_existing_range() {
    let existing = [NumberRange { start: 1, end: 100 }];
    let candidate = NumberRange::new(50, 150).unwrap();
    assert_eq!(
        first_conflict(&candidate, existing),
        Some(NumberRange { start: 1, end: 100 })
    );
}
