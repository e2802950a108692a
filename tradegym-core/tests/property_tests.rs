//! Property tests for transition and reward invariants.
//!
//! Uses proptest to verify:
//! 1. Redundant entries and FLAT/HOLD leave the balance untouched
//! 2. Opening from FLAT costs exactly the commission
//! 3. Round trips at an unchanged price lose exactly two commissions
//! 4. Long and short marks move in opposite directions
//! 5. Rewards only depend on the trailing window

use proptest::prelude::*;
use tradegym_core::components::{PositionStateMachine, PriorState, RewardPolicy};
use tradegym_core::domain::{Action, Position};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_balance() -> impl Strategy<Value = f64> {
    100.0..1_000_000.0_f64
}

fn arb_price() -> impl Strategy<Value = f64> {
    0.5..2.0_f64
}

fn arb_commission() -> impl Strategy<Value = f64> {
    0.0..0.01_f64
}

fn arb_position() -> impl Strategy<Value = Position> {
    prop::sample::select(Position::ALL.to_vec())
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop::sample::select(Action::ALL.to_vec())
}

fn prior(balance: f64, position: Position, reference: f64) -> PriorState {
    PriorState {
        balance,
        position,
        entry_price: (!position.is_flat()).then_some(reference),
        reference_price: Some(reference),
    }
}

fn rel_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * b.abs().max(1.0)
}

// ── 1. No-op transitions ─────────────────────────────────────────────

proptest! {
    #[test]
    fn redundant_entry_is_a_noop(
        balance in arb_balance(),
        reference in arb_price(),
        price in arb_price(),
        c in arb_commission(),
        long in any::<bool>(),
    ) {
        let (position, action) = if long {
            (Position::Long, Action::Buy)
        } else {
            (Position::Short, Action::Sell)
        };
        let sm = PositionStateMachine::new(c);
        let t = sm.apply(&prior(balance, position, reference), price, action);
        prop_assert_eq!(t.balance, balance);
        prop_assert_eq!(t.position, position);
        prop_assert!(t.was_redundant_entry(position));
    }

    #[test]
    fn flat_hold_is_a_noop(
        balance in arb_balance(),
        reference in arb_price(),
        price in arb_price(),
        c in arb_commission(),
    ) {
        let sm = PositionStateMachine::new(c);
        let t = sm.apply(&prior(balance, Position::Flat, reference), price, Action::Hold);
        prop_assert_eq!(t.balance, balance);
        prop_assert_eq!(t.position, Position::Flat);
    }

    #[test]
    fn first_step_never_changes_state(
        balance in arb_balance(),
        price in arb_price(),
        c in arb_commission(),
        position in arb_position(),
        action in arb_action(),
    ) {
        let sm = PositionStateMachine::new(c);
        let first = PriorState { reference_price: None, ..prior(balance, position, price) };
        let t = sm.apply(&first, price, action);
        prop_assert_eq!(t.balance, balance);
        prop_assert_eq!(t.position, position);
        prop_assert_eq!(t.action, action);
    }
}

// ── 2. Opening cost ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn opening_costs_exactly_the_commission(
        balance in arb_balance(),
        reference in arb_price(),
        price in arb_price(),
        c in arb_commission(),
        buy in any::<bool>(),
    ) {
        let action = if buy { Action::Buy } else { Action::Sell };
        let sm = PositionStateMachine::new(c);
        let t = sm.apply(&prior(balance, Position::Flat, reference), price, action);
        prop_assert!(rel_eq(t.balance, balance * (1.0 - c)));
        prop_assert!(!t.position.is_flat());
        prop_assert_eq!(t.entry_price, Some(price));
    }
}

// ── 3. Round trips ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn round_trip_at_same_price_costs_two_commissions(
        balance in arb_balance(),
        price in arb_price(),
        c in arb_commission(),
        long in any::<bool>(),
    ) {
        let sm = PositionStateMachine::new(c);
        let (open, close) = if long {
            (Action::Buy, Action::Sell)
        } else {
            (Action::Sell, Action::Buy)
        };
        let opened = sm.apply(&prior(balance, Position::Flat, price), price, open);
        let after = PriorState {
            balance: opened.balance,
            position: opened.position,
            entry_price: opened.entry_price,
            reference_price: Some(price),
        };
        let closed = sm.apply(&after, price, close);
        prop_assert_eq!(closed.position, Position::Flat);
        prop_assert!(rel_eq(closed.balance, balance * (1.0 - c) * (1.0 - c)));
    }
}

// ── 4. Mark-to-market symmetry ───────────────────────────────────────

proptest! {
    #[test]
    fn long_and_short_marks_are_mirrored(
        balance in arb_balance(),
        reference in arb_price(),
        price in arb_price(),
    ) {
        let sm = PositionStateMachine::new(0.001);
        let long = sm.apply(&prior(balance, Position::Long, reference), price, Action::Hold);
        let short = sm.apply(&prior(balance, Position::Short, reference), price, Action::Hold);
        // (1 + pct) + (1 - pct) == 2
        prop_assert!(rel_eq(long.balance + short.balance, 2.0 * balance));
        if price > reference * (1.0 + 1e-9) {
            prop_assert!(long.balance > balance);
            prop_assert!(short.balance < balance);
        }
    }
}

// ── 5. Reward window ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn reward_ignores_balances_outside_window(
        window in 1usize..10,
        balances in prop::collection::vec(arb_balance(), 1..30),
        junk in arb_balance(),
    ) {
        let policy = RewardPolicy::from_name("simple-profit", window).unwrap();
        let mut balances = balances;
        let before = policy.calculate_reward(&balances);
        if balances.len() > window {
            balances[0] = junk;
            prop_assert_eq!(policy.calculate_reward(&balances), before);
        }
    }

    #[test]
    fn log_and_simple_profit_agree_in_sign(
        window in 1usize..10,
        balances in prop::collection::vec(arb_balance(), 1..30),
    ) {
        let simple = RewardPolicy::from_name("simple-profit", window).unwrap();
        let log = RewardPolicy::from_name("log-profit", window).unwrap();
        let s = simple.calculate_reward(&balances);
        let l = log.calculate_reward(&balances);
        prop_assert!((s == 0.0 && l == 0.0) || s * l > 0.0);
    }
}
