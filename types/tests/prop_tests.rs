use proptest::prelude::*;

use revshare_types::math::{mul_add_div_rem, mul_div, per_mille_of, percent_of};
use revshare_types::Timestamp;

proptest! {
    /// Floored division never exceeds the exact rational result.
    #[test]
    fn mul_div_never_rounds_up(
        a in 0u128..1_000_000_000_000,
        b in 0u128..1_000_000_000_000,
        d in 1u128..1_000_000,
    ) {
        let q = mul_div(a, b, d).unwrap();
        prop_assert!(q * d <= a * b);
        prop_assert!(a * b - q * d < d);
    }

    /// Multiplying and dividing by the same factor is exact at any width.
    #[test]
    fn mul_div_cancels_wide_factor(a in any::<u128>(), b in 1u128..=u128::MAX) {
        prop_assert_eq!(mul_div(a, b, b), Some(a));
        prop_assert_eq!(mul_div(b, a, b), Some(a));
    }

    /// Quotient and remainder reconstruct the dividend when it fits.
    #[test]
    fn mul_add_div_rem_reconstructs(
        a in 0u128..u64::MAX as u128,
        b in 0u128..u64::MAX as u128,
        c in 0u128..u64::MAX as u128,
        d in 1u128..u64::MAX as u128,
    ) {
        let (q, r) = mul_add_div_rem(a, b, c, d).unwrap();
        prop_assert!(r < d);
        prop_assert_eq!(q * d + r, a * b + c);
    }

    /// A percentage split and its complement always add back to the whole.
    #[test]
    fn percent_split_conserves(amount in 0u128..u64::MAX as u128, pct in 0u32..=100) {
        let part = percent_of(amount, pct).unwrap();
        let rest = amount - part;
        prop_assert_eq!(part + rest, amount);
        prop_assert!(part <= amount);
    }

    /// A per-mille fee is never larger than the amount it is taken from.
    #[test]
    fn fee_bounded_by_amount(amount in 0u128..u64::MAX as u128, per_mille in 0u32..=1000) {
        prop_assert!(per_mille_of(amount, per_mille).unwrap() <= amount);
    }

    /// has_expired flips exactly at start + duration.
    #[test]
    fn expiry_boundary(start in 0u64..1_000_000, dur in 0u64..1_000_000) {
        let t = Timestamp::new(start);
        prop_assert!(t.has_expired(dur, Timestamp::new(start + dur)));
        if dur > 0 {
            prop_assert!(!t.has_expired(dur, Timestamp::new(start + dur - 1)));
        }
    }
}
