use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;

/// Collection and payout figures for one month of a chit.
#[cw_serde]
pub struct MonthlyPool {
    /// Contributions from every approved member.
    pub base_collection: Uint128,
    /// Surcharges owed by members who lifted in an earlier month.
    pub extra_collection: Uint128,
    pub total_pool: Uint128,
    pub commission: Uint128,
    /// Pool minus commission, floored at zero.
    pub payout: Uint128,
}

/// Derive the month's pool from current membership and lift counts.
///
/// Pure projection: callable both for the gating checks at selection
/// time and for estimated figures before all payments are in.
/// `prior_lifters` is the number of lift records with a month strictly
/// before the target month.
pub fn monthly_pool(
    monthly_contribution: Uint128,
    approved_members: u32,
    prior_lifters: u32,
    extra_charge_per_month: Uint128,
    commission: Uint128,
) -> MonthlyPool {
    let base_collection = monthly_contribution * Uint128::from(approved_members);
    let extra_collection = extra_charge_per_month * Uint128::from(prior_lifters);
    let total_pool = base_collection + extra_collection;
    let payout = total_pool.saturating_sub(commission);

    MonthlyPool {
        base_collection,
        extra_collection,
        total_pool,
        commission,
        payout,
    }
}

/// Surcharge obligations created by lifting in `month`.
#[cw_serde]
pub struct LiftTerms {
    /// Months left after the lift month.
    pub remaining_months: u32,
    pub extra_per_month: Uint128,
    /// Total surcharge still owed over the remaining months.
    pub extra_due_total: Uint128,
}

pub fn lift_terms(total_months: u32, month: u32, extra_charge_per_month: Uint128) -> LiftTerms {
    let remaining_months = total_months - month;
    LiftTerms {
        remaining_months,
        extra_per_month: extra_charge_per_month,
        extra_due_total: extra_charge_per_month * Uint128::from(remaining_months),
    }
}

/// The auction-mode split of a month's pool.
#[cw_serde]
pub struct AuctionTerms {
    /// Share withheld from the winner and returned to the members.
    pub deduction: Uint128,
    pub amount_received: Uint128,
    /// Equal dividend per approved member; integer division, any
    /// remainder is not redistributed.
    pub dividend_per_member: Uint128,
}

/// Discount the pool by a per-month interest share scaled by the months
/// still outstanding (the selection month included). Requires
/// `approved_members > 0` and `1 <= month <= total_months`.
pub fn auction_terms(
    total_pool: Uint128,
    approved_members: u32,
    total_months: u32,
    month: u32,
) -> AuctionTerms {
    let outstanding = total_months - month + 1;
    let deduction = total_pool.multiply_ratio(
        outstanding as u128,
        approved_members as u128 * total_months as u128,
    );
    let amount_received = total_pool - deduction;
    let dividend_per_member = deduction / Uint128::from(approved_members);

    AuctionTerms {
        deduction,
        amount_received,
        dividend_per_member,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_for_first_month_has_no_extra_collection() {
        let pool = monthly_pool(
            Uint128::new(1000),
            3,
            0,
            Uint128::new(200),
            Uint128::new(100),
        );
        assert_eq!(pool.base_collection, Uint128::new(3000));
        assert_eq!(pool.extra_collection, Uint128::zero());
        assert_eq!(pool.total_pool, Uint128::new(3000));
        assert_eq!(pool.payout, Uint128::new(2900));
    }

    #[test]
    fn pool_grows_with_prior_lifters() {
        let pool = monthly_pool(
            Uint128::new(1000),
            3,
            2,
            Uint128::new(200),
            Uint128::new(100),
        );
        assert_eq!(pool.base_collection, Uint128::new(3000));
        assert_eq!(pool.extra_collection, Uint128::new(400));
        assert_eq!(pool.total_pool, Uint128::new(3400));
        assert_eq!(pool.payout, Uint128::new(3300));
    }

    #[test]
    fn pool_is_pure() {
        let a = monthly_pool(
            Uint128::new(20000),
            21,
            5,
            Uint128::new(4000),
            Uint128::new(8000),
        );
        let b = monthly_pool(
            Uint128::new(20000),
            21,
            5,
            Uint128::new(4000),
            Uint128::new(8000),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn payout_floors_at_zero_when_commission_exceeds_pool() {
        let pool = monthly_pool(
            Uint128::new(1000),
            1,
            0,
            Uint128::zero(),
            Uint128::new(5000),
        );
        assert_eq!(pool.payout, Uint128::zero());
    }

    #[test]
    fn lift_terms_cover_the_months_after_the_lift() {
        let terms = lift_terms(21, 10, Uint128::new(4000));
        assert_eq!(terms.remaining_months, 11);
        assert_eq!(terms.extra_due_total, Uint128::new(44000));
    }

    #[test]
    fn lift_terms_in_final_month_owe_nothing_further() {
        let terms = lift_terms(3, 3, Uint128::new(200));
        assert_eq!(terms.remaining_months, 0);
        assert_eq!(terms.extra_due_total, Uint128::zero());
    }

    #[test]
    fn auction_terms_first_month_takes_the_largest_deduction() {
        // pool 3000, 3 members, 3 months, month 1:
        // deduction = 3000 * 3 / 9 = 1000
        let terms = auction_terms(Uint128::new(3000), 3, 3, 1);
        assert_eq!(terms.deduction, Uint128::new(1000));
        assert_eq!(terms.amount_received, Uint128::new(2000));
        assert_eq!(terms.dividend_per_member, Uint128::new(333));
    }

    #[test]
    fn auction_terms_final_month_deducts_one_share() {
        // month 3 of 3: outstanding = 1, deduction = 3000 / 9 = 333
        let terms = auction_terms(Uint128::new(3000), 3, 3, 3);
        assert_eq!(terms.deduction, Uint128::new(333));
        assert_eq!(terms.amount_received, Uint128::new(2667));
        assert_eq!(terms.dividend_per_member, Uint128::new(111));
    }
}
