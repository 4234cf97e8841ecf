//! One full analysis pass over a combat log.
//!
//! The session wires the pipeline together: raw lines decode into events,
//! the processor derives signals, and every registered handler consumes
//! the same signal slice in order. Queries and report assembly run only
//! after ingestion; nothing here interleaves mutation with reads.

use std::io::BufRead;

use chrono::NaiveDateTime;
use thiserror::Error;

use vigil_types::{
    EncounterMeta, EncounterReport, RuleTally, StatusUptimeRow, WindowReport,
};

use crate::buffs::{ActorScope, BuffTracker};
use crate::events::{AnalysisSignal, CombatEvent, SignalHandler};
use crate::invulns::InvulnTracker;
use crate::profile::{AnalysisProfile, StatusDefinition};
use crate::query;
use crate::rotation::WindowClassifier;
use crate::signal_processor::EventProcessor;

use super::cache::{EncounterPhase, SessionCache};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("reading log: {0}")]
    Io(#[from] std::io::Error),
}

/// Owns all per-encounter state for one pass: ingest, then query.
#[derive(Debug)]
pub struct AnalysisSession {
    processor: EventProcessor,
    cache: SessionCache,
    tracker: BuffTracker<ActorScope>,
    invulns: InvulnTracker,
    classifiers: Vec<WindowClassifier>,
    profile: AnalysisProfile,
    lines_skipped: u64,
}

impl AnalysisSession {
    /// `actor_id` scopes buff tracking and rotation classification; the
    /// profile supplies everything else.
    pub fn new(profile: AnalysisProfile, actor_id: i64) -> Self {
        let invulns = InvulnTracker::new(profile.invuln_watch());
        let classifiers = profile
            .enabled_windows()
            .cloned()
            .map(|rule| WindowClassifier::new(rule, actor_id))
            .collect();
        Self {
            processor: EventProcessor::new(),
            cache: SessionCache::new(),
            tracker: BuffTracker::new(ActorScope::new(actor_id)),
            invulns,
            classifiers,
            profile,
            lines_skipped: 0,
        }
    }

    /// Feed every line of a log in order, then call [`finish`](Self::finish).
    pub fn ingest(&mut self, reader: impl BufRead) -> Result<(), IngestError> {
        for line in reader.lines() {
            self.process_line(&line?);
        }
        Ok(())
    }

    /// Decode and process one line. Undecodable lines are counted and
    /// skipped; one bad line never ends the pass.
    pub fn process_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        match serde_json::from_str::<CombatEvent>(line) {
            Ok(event) => self.process_event(&event),
            Err(e) => {
                self.lines_skipped += 1;
                tracing::warn!("skipping undecodable line: {e}");
            }
        }
    }

    pub fn process_event(&mut self, event: &CombatEvent) {
        let signals = self.processor.process_event(event, &mut self.cache);
        self.dispatch(&signals);
    }

    /// Close the encounter if the log ended without a completion marker.
    pub fn finish(&mut self) {
        if self.cache.phase != EncounterPhase::Running {
            return;
        }
        let Some(at) = self.tracker.current_time() else {
            return;
        };
        tracing::warn!("log ended without a completion marker, closing encounter at {at}");
        let signals = [AnalysisSignal::EncounterEnded { timestamp: at }];
        self.dispatch(&signals);
        self.cache.phase = EncounterPhase::Completed;
        self.cache.encounter.ended_at = Some(at);
    }

    /// Every handler sees every signal, in registration order, and the
    /// tracker's derived stack changes land in the cache afterwards.
    fn dispatch(&mut self, signals: &[AnalysisSignal]) {
        self.tracker.handle_signals(signals);
        self.invulns.handle_signals(signals);
        for classifier in &mut self.classifiers {
            classifier.handle_signals(signals);
        }
        self.cache
            .stack_changes
            .extend(self.tracker.take_stack_changes());
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    pub fn tracker(&self) -> &BuffTracker<ActorScope> {
        &self.tracker
    }

    pub fn classifiers(&self) -> &[WindowClassifier] {
        &self.classifiers
    }

    pub fn lines_skipped(&self) -> u64 {
        self.lines_skipped
    }

    /// Report across all sources.
    pub fn report(&self) -> EncounterReport {
        self.report_filtered(None)
    }

    /// Assemble the report, optionally restricted to statuses applied by
    /// one source entity.
    pub fn report_filtered(&self, source: Option<i64>) -> EncounterReport {
        let started = self.cache.encounter.started_at;
        let ended = self.cache.encounter.ended_at.or(self.tracker.current_time());
        let fallback_now = self.tracker.current_time().unwrap_or_default();
        let duration_ms = match (started, ended) {
            (Some(start), Some(end)) => end.signed_duration_since(start).num_milliseconds(),
            _ => 0,
        };

        let mut defs: Vec<&StatusDefinition> = self.profile.enabled_statuses().collect();
        defs.sort_by_key(|def| def.id);
        let statuses = defs
            .into_iter()
            .map(|def| {
                let uptime = self
                    .tracker
                    .status_uptime(def.id, source, self.invulns.log());
                let stats =
                    query::status_stats(self.tracker.timelines(), def.id, source, fallback_now);
                let uptime_ms = uptime.num_milliseconds();
                let uptime_pct = if duration_ms > 0 {
                    uptime_ms as f64 / duration_ms as f64 * 100.0
                } else {
                    0.0
                };
                StatusUptimeRow {
                    ability_id: def.id,
                    name: def.name.clone(),
                    uptime_ms,
                    uptime_pct,
                    applications: stats.applications,
                    max_stacks: stats.max_stacks,
                    weighted_uptime_ms: stats.weighted_uptime.num_milliseconds(),
                }
            })
            .collect();

        let mut windows = Vec::new();
        let mut tallies = Vec::new();
        for classifier in &self.classifiers {
            let rule = classifier.rule();
            for window in classifier.windows() {
                windows.push(WindowReport {
                    rule: rule.name.clone(),
                    opened_ms: offset_ms(started, window.opened_at),
                    closed_ms: offset_ms(started, window.closed_at.unwrap_or(window.opened_at)),
                    casts: window.casts.len() as u32,
                    qualifying_count: window.qualifying_count,
                    expected_count: rule.expected_count,
                    shortfall: window.shortfall(rule.expected_count),
                });
            }
            let tally = classifier.tally();
            tallies.push(RuleTally {
                rule: rule.name.clone(),
                gate_violations: tally.gate_violations,
                missed_actions: tally.missed_actions,
            });
        }

        EncounterReport {
            encounter: EncounterMeta {
                started_at: started.map(|t| t.to_string()).unwrap_or_default(),
                ended_at: self.cache.encounter.ended_at.map(|t| t.to_string()),
                duration_ms,
                events_processed: self.cache.encounter.events_processed,
                events_ignored: self.cache.encounter.events_ignored,
                lines_skipped: self.lines_skipped,
            },
            statuses,
            windows,
            tallies,
        }
    }
}

fn offset_ms(start: Option<NaiveDateTime>, at: NaiveDateTime) -> i64 {
    start.map_or(0, |start| at.signed_duration_since(start).num_milliseconds())
}
