//! Session state and the orchestration tick
//!
//! A [`Session`] owns the authoritative record collection. Every mutation
//! replaces records wholesale with values returned by the pure pipeline
//! functions; the collection is an `im::Vector`, so handing out a
//! [`SessionView`] is a cheap structural clone.

use adr_core::entropy::pick;
use adr_core::view::{counts, group_by_layer};
use adr_core::{
    advance, approve, calculate_stats, create_exception, create_signal, reject, rollback_signed,
    Entropy, Industry, Layer, PolicyConfig, Priority, Record, RecordId, RiskLevel,
    SimulationConfig, Stats, Status,
};
use im::Vector;
use indexmap::IndexMap;
use serde::Serialize;

/// User intents accepted by a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Add a new exception at `DETECT`
    Spawn {
        industry: Industry,
        priority: Option<Priority>,
    },
    TogglePlay,
    ToggleKillSwitch,
    SetPolicyThreshold(i64),
    Approve(RecordId),
    Reject(RecordId),
    /// Restore a record to `history[step]`
    Rollback { id: RecordId, step: i64 },
    /// Choose the record shown in detail, or clear the choice
    Select(Option<RecordId>),
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub advanced: Vec<RecordId>,
    pub pruned: Vec<RecordId>,
    pub spawned: Option<RecordId>,
}

impl TickReport {
    /// True when the tick changed nothing
    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.advanced.is_empty() && self.pruned.is_empty() && self.spawned.is_none()
    }
}

/// Immutable snapshot of a session for rendering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub tick: u64,
    pub records: Vector<Record>,
    pub stats: Stats,
    pub kill_switch: bool,
    pub policy: PolicyConfig,
    pub risk_level: RiskLevel,
    pub playing: bool,
    pub selected: Option<RecordId>,
}

impl SessionView {
    /// The selected record as of this view
    #[must_use]
    pub fn selected_record(&self) -> Option<&Record> {
        let id = self.selected?;
        self.records.iter().find(|record| record.id() == id)
    }

    /// Record counts per layer, every layer present
    #[must_use]
    pub fn layer_counts(&self) -> IndexMap<Layer, usize> {
        counts(&group_by_layer(&self.records))
    }
}

/// Authoritative session state
#[derive(Debug, Clone)]
pub struct Session {
    config: SimulationConfig,
    records: Vector<Record>,
    playing: bool,
    selected: Option<RecordId>,
    ticks: u64,
}

impl Session {
    /// Empty, paused session
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            records: Vector::new(),
            playing: false,
            selected: None,
            ticks: 0,
        }
    }

    /// Live settings; kill switch and policy reflect applied intents
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn records(&self) -> &Vector<Record> {
        &self.records
    }

    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.id() == id)
    }

    /// Selected record, resolved against the current collection
    #[must_use]
    pub fn selected(&self) -> Option<&Record> {
        self.selected.and_then(|id| self.get(id))
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[inline]
    #[must_use]
    pub fn kill_switch(&self) -> bool {
        self.config.kill_switch
    }

    #[inline]
    #[must_use]
    pub fn policy(&self) -> PolicyConfig {
        self.config.policy
    }

    #[inline]
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        calculate_stats(&self.records)
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView {
            tick: self.ticks,
            records: self.records.clone(),
            stats: self.stats(),
            kill_switch: self.config.kill_switch,
            policy: self.config.policy,
            risk_level: self.config.policy.risk_level(),
            playing: self.playing,
            selected: self.selected().map(Record::id),
        }
    }

    /// Run one orchestration tick.
    ///
    /// Phases run in order: advance eligible records, prune completed ones,
    /// maybe spawn a signal. Ignores the play flag; timers check it.
    pub fn tick<E: Entropy + ?Sized>(&mut self, entropy: &mut E) -> TickReport {
        self.ticks += 1;
        let mut report = TickReport {
            tick: self.ticks,
            ..TickReport::default()
        };

        let advance_probability = self.config.advance_probability;
        let kill_switch = self.config.kill_switch;
        let policy = self.config.policy;
        let mut next: Vector<Record> = self
            .records
            .iter()
            .map(|record| {
                if record.status().auto_advances() && entropy.chance(advance_probability) {
                    report.advanced.push(record.id());
                    advance(record, kill_switch, &policy, &mut *entropy)
                } else {
                    record.clone()
                }
            })
            .collect();

        let prune_probability = self.config.prune_probability;
        next.retain(|record| {
            let pruned = record.status() == Status::Completed
                && entropy.chance(prune_probability);
            if pruned {
                report.pruned.push(record.id());
            }
            !pruned
        });

        if entropy.chance(self.config.spawn_probability) {
            let industry = pick(entropy, &Industry::ALL)
                .copied()
                .unwrap_or(Industry::Finance);
            let signal = create_signal(industry, entropy);
            report.spawned = Some(signal.id());
            next.push_back(signal);
        }

        self.records = next;
        tracing::debug!(
            tick = report.tick,
            advanced = report.advanced.len(),
            pruned = report.pruned.len(),
            spawned = report.spawned.is_some(),
            total = self.records.len(),
            "tick"
        );
        report
    }

    /// Apply a user intent; returns whether anything changed.
    ///
    /// Unknown ids and out-of-range rollback steps change nothing.
    pub fn apply<E: Entropy + ?Sized>(&mut self, intent: Intent, entropy: &mut E) -> bool {
        tracing::info!(?intent, "intent");
        match intent {
            Intent::Spawn { industry, priority } => {
                self.records
                    .push_back(create_exception(industry, priority, entropy));
                true
            }
            Intent::TogglePlay => {
                self.playing = !self.playing;
                true
            }
            Intent::ToggleKillSwitch => {
                self.config.kill_switch = !self.config.kill_switch;
                tracing::warn!(active = self.config.kill_switch, "kill switch toggled");
                true
            }
            Intent::SetPolicyThreshold(threshold) => {
                self.config.policy = PolicyConfig::new(threshold);
                true
            }
            Intent::Approve(id) => self.replace(id, |record| approve(record, entropy)),
            Intent::Reject(id) => self.replace(id, |record| reject(record, entropy)),
            Intent::Rollback { id, step } => {
                let in_range = self.get(id).is_some_and(|record| {
                    usize::try_from(step).is_ok_and(|step| step < record.history.len())
                });
                in_range && self.replace(id, |record| rollback_signed(record, step))
            }
            Intent::Select(None) => self.selected.take().is_some(),
            Intent::Select(Some(id)) => {
                if self.get(id).is_none() {
                    return false;
                }
                self.selected = Some(id);
                true
            }
        }
    }

    /// Swap the record with `id` for `f(record)`
    fn replace(&mut self, id: RecordId, f: impl FnOnce(&Record) -> Record) -> bool {
        let Some(index) = self.records.iter().position(|record| record.id() == id) else {
            return false;
        };
        let updated = f(&self.records[index]);
        self.records.set(index, updated);
        true
    }
}
