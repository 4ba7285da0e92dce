use proptest::prelude::*;

use revshare_ledger::{FeeRoutes, FeeSchedule, MemoryLedger, PoolId, ValueLedger};
use revshare_types::Address;

fn routes() -> FeeRoutes {
    FeeRoutes {
        staking_pool: Address::new("staking"),
        membership_pool: Address::new("members"),
        beneficiary: Address::new("beneficiary"),
    }
}

proptest! {
    /// The fee split never creates or destroys value.
    #[test]
    fn split_sums_to_fee(
        fee in 0u128..1_000_000_000_000,
        reward_share in 0u32..=100,
        staking_split in 0u32..=100,
    ) {
        let schedule = FeeSchedule {
            fee_per_mille: 40,
            reward_share_pct: reward_share,
            staking_split_pct: staking_split,
        };
        let split = schedule.split(fee).unwrap();
        prop_assert_eq!(split.total(), fee);
    }

    /// Balances always sum to minted supply, and queued revenue matches
    /// what landed in the pool accounts.
    #[test]
    fn transfers_conserve_supply(
        fee_per_mille in 0u32..=1000,
        amounts in prop::collection::vec(0u128..10_000_000, 1..20),
    ) {
        let schedule = FeeSchedule { fee_per_mille, ..FeeSchedule::default() };
        let mut ledger = MemoryLedger::new(schedule, routes()).unwrap();
        let alice = Address::new("alice");
        let bob = Address::new("bob");
        ledger.mint(&alice, 100_000_000).unwrap();

        for (i, amount) in amounts.iter().enumerate() {
            let (from, to) = if i % 2 == 0 { (&alice, &bob) } else { (&bob, &alice) };
            let _ = ledger.transfer(from, to, *amount);
        }

        let accounts = ["alice", "bob", "staking", "members", "beneficiary"];
        let sum: u128 = accounts.iter().map(|a| ledger.balance_of(&Address::new(*a))).sum();
        prop_assert_eq!(sum, ledger.total_supply());

        let revenue = ledger.take_revenue();
        let staking: u128 = revenue.iter().filter(|r| r.pool == PoolId::Staking).map(|r| r.amount).sum();
        let membership: u128 = revenue.iter().filter(|r| r.pool == PoolId::Membership).map(|r| r.amount).sum();
        prop_assert_eq!(staking, ledger.balance_of(&Address::new("staking")));
        prop_assert_eq!(membership, ledger.balance_of(&Address::new("members")));
    }
}
