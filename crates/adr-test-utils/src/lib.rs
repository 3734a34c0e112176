//! Testing utilities for the ADR workspace
//!
//! Shared test helpers, fixtures, and entropy sources.

#![allow(missing_docs)]

use adr_core::{advance, create_exception, Entropy, Industry, PolicyConfig, Record, Status};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;

pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Entropy whose `chance` outcomes are scripted.
///
/// Queued outcomes are consumed first, then `fallback` applies (or the
/// inner seeded RNG when no fallback is set). Every other draw comes from
/// the inner RNG.
#[derive(Debug, Clone)]
pub struct ScriptedEntropy {
    chances: VecDeque<bool>,
    fallback: Option<bool>,
    inner: StdRng,
}

impl ScriptedEntropy {
    pub fn new(seed: u64) -> Self {
        Self {
            chances: VecDeque::new(),
            fallback: None,
            inner: seeded(seed),
        }
    }

    /// Every `chance` call returns `outcome`
    pub fn always(outcome: bool) -> Self {
        Self {
            fallback: Some(outcome),
            ..Self::new(0)
        }
    }

    /// Queue outcomes for the next `chance` calls
    pub fn then(mut self, outcomes: &[bool]) -> Self {
        self.chances.extend(outcomes);
        self
    }

    pub fn remaining(&self) -> usize {
        self.chances.len()
    }
}

impl Entropy for ScriptedEntropy {
    fn chance(&mut self, probability: f64) -> bool {
        match self.chances.pop_front().or(self.fallback) {
            Some(outcome) => outcome,
            None => self.inner.chance(probability),
        }
    }

    fn unit(&mut self) -> f64 {
        self.inner.unit()
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.inner.below(bound)
    }

    fn fill_random(&mut self, dest: &mut [u8]) {
        self.inner.fill_random(dest);
    }
}

/// Exception with a fixed amount, fresh at `DETECT`
pub fn exception_with_amount<E: Entropy + ?Sized>(
    industry: Industry,
    amount: i64,
    entropy: &mut E,
) -> Record {
    let mut record = create_exception(industry, None, entropy);
    record.state.business.amount = amount;
    record
}

/// Advance under `policy` until `target` is reached or advancement stops.
///
/// Returns `None` if the record never reaches `target`.
pub fn walk_to<E: Entropy + ?Sized>(
    mut record: Record,
    target: Status,
    policy: &PolicyConfig,
    entropy: &mut E,
) -> Option<Record> {
    for _ in 0..Status::ALL.len() {
        if record.status() == target {
            return Some(record);
        }
        if !record.status().auto_advances() {
            return None;
        }
        record = advance(&record, false, policy, entropy);
    }
    (record.status() == target).then_some(record)
}

/// Finance exception parked at `DECIDE`
pub fn exception_at_decide(amount: i64, seed: u64) -> Record {
    let mut rng = seeded(seed);
    let record = exception_with_amount(Industry::Finance, amount, &mut rng);
    walk_to(record, Status::Decide, &PolicyConfig::default(), &mut rng)
        .expect("DETECT always reaches DECIDE")
}

/// Exception held for manual review
pub fn exception_on_hold(seed: u64) -> Record {
    let mut rng = seeded(seed);
    let record = exception_with_amount(Industry::Retail, 50_000, &mut rng);
    walk_to(record, Status::ManualHold, &PolicyConfig::default(), &mut rng)
        .expect("amount above threshold ends on hold")
}
