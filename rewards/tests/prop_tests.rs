use proptest::prelude::*;

use revshare_ledger::{FeeRoutes, FeeSchedule, MemoryLedger};
use revshare_rewards::{DistributorConfig, RewardDistributor};
use revshare_types::{Address, Timestamp};

const LOCK: u64 = 1_000;
const PARTICIPANTS: [&str; 3] = ["alice", "bob", "carol"];

#[derive(Clone, Debug)]
enum Op {
    Stake(usize, u128),
    Unstake(usize),
    Claim(usize),
    Notify(u128),
    Advance(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..3, 1u128..1_000_000).prop_map(|(i, a)| Op::Stake(i, a)),
        (0usize..3).prop_map(Op::Unstake),
        (0usize..3).prop_map(Op::Claim),
        (0u128..10_000_000).prop_map(Op::Notify),
        (0u64..600).prop_map(Op::Advance),
    ]
}

fn setup() -> (RewardDistributor, MemoryLedger) {
    let mut config = DistributorConfig::staking(Address::new("pool"), Address::new("owner"))
        .with_depositor(Address::new("router"));
    config.minimum_lock_secs = LOCK;
    let distributor = RewardDistributor::new(config).unwrap();
    let mut ledger = MemoryLedger::new(
        FeeSchedule::default(),
        FeeRoutes {
            staking_pool: Address::new("pool"),
            membership_pool: Address::new("members"),
            beneficiary: Address::new("beneficiary"),
        },
    )
    .unwrap();
    for p in PARTICIPANTS {
        ledger.mint(&Address::new(p), 1_000_000_000_000).unwrap();
    }
    (distributor, ledger)
}

proptest! {
    /// Everything notified is either paid, still claimable, retained, or
    /// lost to per-settlement rounding.
    #[test]
    fn conservation_and_monotonic_accumulator(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let (mut d, mut ledger) = setup();
        let mut now = 0u64;
        let mut last_acc = 0u128;

        for op in &ops {
            match op {
                Op::Stake(i, amount) => {
                    let _ = d.stake(&Address::new(PARTICIPANTS[*i]), *amount, Timestamp::new(now), &mut ledger);
                }
                Op::Unstake(i) => {
                    let _ = d.unstake(&Address::new(PARTICIPANTS[*i]), Timestamp::new(now), &mut ledger);
                }
                Op::Claim(i) => {
                    let _ = d.claim(&Address::new(PARTICIPANTS[*i]), Timestamp::new(now), &mut ledger);
                }
                Op::Notify(amount) => {
                    ledger.mint(&Address::new("pool"), *amount).unwrap();
                    d.notify(&Address::new("router"), *amount, Timestamp::new(now)).unwrap();
                }
                Op::Advance(secs) => now += secs,
            }
            let acc = d.pool().acc_reward_per_weight;
            prop_assert!(acc >= last_acc, "accumulator decreased: {} -> {}", last_acc, acc);
            last_acc = acc;
            d.verify().unwrap();
        }

        let earned: u128 = PARTICIPANTS
            .iter()
            .map(|p| d.earned(&Address::new(*p)).unwrap())
            .sum();
        let totals = d.totals();
        let accounted = totals.paid + earned + d.undistributed();
        prop_assert!(accounted <= totals.notified, "paid out more than notified");
        let tolerance = ops.len() as u128 + PARTICIPANTS.len() as u128 + 1;
        prop_assert!(
            totals.notified - accounted <= tolerance,
            "rounding loss {} exceeds {}",
            totals.notified - accounted,
            tolerance
        );
    }

    /// Early exit pays exactly the earned reward minus 15%, and the full
    /// principal.
    #[test]
    fn early_exit_penalty_is_exact(
        stake_a in 1u128..1_000_000,
        stake_b in 1u128..1_000_000,
        revenue in 0u128..1_000_000_000,
        exit_at in 0u64..LOCK,
    ) {
        let (mut d, mut ledger) = setup();
        let alice = Address::new("alice");
        let bob = Address::new("bob");
        d.stake(&alice, stake_a, Timestamp::new(0), &mut ledger).unwrap();
        d.stake(&bob, stake_b, Timestamp::new(0), &mut ledger).unwrap();
        ledger.mint(&Address::new("pool"), revenue).unwrap();
        d.notify(&Address::new("router"), revenue, Timestamp::new(0)).unwrap();

        let earned = d.earned(&alice).unwrap();
        let receipt = d.unstake(&alice, Timestamp::new(exit_at), &mut ledger).unwrap();
        prop_assert_eq!(receipt.principal, stake_a);
        prop_assert_eq!(receipt.reward + receipt.forfeited, earned);
        prop_assert_eq!(receipt.forfeited, earned * 15 / 100);
    }

    /// Unstaking at or after the lock end pays everything.
    #[test]
    fn exit_after_lock_has_no_penalty(
        stake in 1u128..1_000_000,
        revenue in 0u128..1_000_000_000,
        extra in 0u64..10_000,
    ) {
        let (mut d, mut ledger) = setup();
        let alice = Address::new("alice");
        d.stake(&alice, stake, Timestamp::new(0), &mut ledger).unwrap();
        ledger.mint(&Address::new("pool"), revenue).unwrap();
        d.notify(&Address::new("router"), revenue, Timestamp::new(1)).unwrap();
        let earned = d.earned(&alice).unwrap();
        let receipt = d.unstake(&alice, Timestamp::new(LOCK + extra), &mut ledger).unwrap();
        prop_assert_eq!(receipt.forfeited, 0);
        prop_assert_eq!(receipt.reward, earned);
    }

    /// Joining right before a deposit earns strictly less than having
    /// joined before the previous one.
    #[test]
    fn no_front_running_gain(
        base in 1u128..1_000_000,
        stake in 1u128..1_000_000,
        first in 10_000_000u128..1_000_000_000,
        second in 0u128..1_000_000_000,
    ) {
        let run = |join_early: bool| {
            let (mut d, mut ledger) = setup();
            let alice = Address::new("alice");
            let bob = Address::new("bob");
            d.stake(&alice, base, Timestamp::new(0), &mut ledger).unwrap();
            if join_early {
                d.stake(&bob, stake, Timestamp::new(1), &mut ledger).unwrap();
            }
            ledger.mint(&Address::new("pool"), first + second).unwrap();
            d.notify(&Address::new("router"), first, Timestamp::new(2)).unwrap();
            if !join_early {
                d.stake(&bob, stake, Timestamp::new(3), &mut ledger).unwrap();
            }
            d.notify(&Address::new("router"), second, Timestamp::new(4)).unwrap();
            d.earned(&bob).unwrap()
        };
        prop_assert!(run(false) < run(true));
    }
}
