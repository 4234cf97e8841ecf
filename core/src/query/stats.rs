//! Per-status summary statistics derived from stack histories.

use chrono::{Duration, NaiveDateTime};

use crate::buffs::{EntityTimeline, StackEntry};

use super::uptime::source_matches;

/// Aggregates over every matching instance of one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStats {
    /// Number of instances opened (synthesized ones included).
    pub applications: u32,
    /// Highest stack count observed on any instance.
    pub max_stacks: u32,
    /// Uptime with each span weighted by its stack count; a 15s span at
    /// 2 stacks contributes 30s.
    pub weighted_uptime: Duration,
}

impl Default for StatusStats {
    fn default() -> Self {
        Self {
            applications: 0,
            max_stacks: 0,
            weighted_uptime: Duration::zero(),
        }
    }
}

/// Walk the stack histories of every matching instance. Open instances
/// contribute their final segment up to `fallback_now`.
pub fn status_stats<'a, I>(
    timelines: I,
    status_id: i64,
    source: Option<i64>,
    fallback_now: NaiveDateTime,
) -> StatusStats
where
    I: IntoIterator<Item = &'a EntityTimeline>,
{
    let mut stats = StatusStats::default();
    for timeline in timelines {
        for buff in &timeline.buffs {
            if buff.ability_id != status_id || !source_matches(source, buff.source_id) {
                continue;
            }
            stats.applications += 1;
            let mut prev: Option<&StackEntry> = None;
            for entry in &buff.stack_history {
                stats.max_stacks = stats.max_stacks.max(entry.stacks);
                if let Some(prev) = prev {
                    stats.weighted_uptime +=
                        entry.at.signed_duration_since(prev.at) * prev.stacks as i32;
                }
                prev = Some(entry);
            }
            // Closed histories end on a zero-stack entry, so only open
            // instances have a trailing segment left to count.
            if buff.is_open()
                && let Some(last) = prev
                && last.stacks > 0
            {
                stats.weighted_uptime +=
                    fallback_now.signed_duration_since(last.at) * last.stacks as i32;
            }
        }
    }
    stats
}
