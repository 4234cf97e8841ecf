//! Status uptime over tracked timelines.
//!
//! Uptime is the length of the *union* of matching buff intervals, not
//! their sum: two sources keeping the same debuff up concurrently cannot
//! push uptime past wall-clock time. The pipeline per query:
//!
//! 1. collect matching buff intervals, open ones running to `fallback_now`
//! 2. subtract invulnerability windows from each interval
//! 3. drop what the subtraction emptied out
//! 4. flatten the survivors to apply/remove edges, sort, and sweep

use chrono::{Duration, NaiveDateTime};

use crate::buffs::EntityTimeline;
use crate::invulns::{InvulnKind, InvulnSource, InvulnWindow};

/// Half-open-in-spirit interval; `start == end` carries no uptime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Range {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

/// Edge ordering breaks timestamp ties as `Remove` before `Apply`, so a
/// buff ending exactly where another begins never double-counts the
/// boundary instant. Safe only because empty ranges are dropped before
/// edges are built; the sweep counter cannot dip below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EdgeKind {
    Remove,
    Apply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Edge {
    at: NaiveDateTime,
    kind: EdgeKind,
}

/// Total time `status_id` was active anywhere in `timelines`, net of
/// invulnerability windows on the owning entity.
///
/// `source` of `None` matches every instance; `Some(id)` matches
/// instances recorded from that caster plus instances whose caster the
/// log never attributed. Open instances run to `fallback_now`.
pub fn status_uptime<'a, I, S>(
    timelines: I,
    status_id: i64,
    source: Option<i64>,
    invulns: &S,
    fallback_now: NaiveDateTime,
) -> Duration
where
    I: IntoIterator<Item = &'a EntityTimeline>,
    S: InvulnSource + ?Sized,
{
    let mut edges: Vec<Edge> = Vec::new();
    for timeline in timelines {
        let windows = invulns.windows_for(timeline.entity_id);
        for buff in &timeline.buffs {
            if buff.ability_id != status_id || !source_matches(source, buff.source_id) {
                continue;
            }
            let range = Range {
                start: buff.applied_at,
                end: buff.removed_at.unwrap_or(fallback_now),
            };
            for piece in subtract_invulns(range, windows) {
                edges.push(Edge {
                    at: piece.start,
                    kind: EdgeKind::Apply,
                });
                edges.push(Edge {
                    at: piece.end,
                    kind: EdgeKind::Remove,
                });
            }
        }
    }
    edges.sort_unstable();
    sweep(&edges)
}

/// `None` recorded means the log never attributed the instance; such
/// instances pass every filter rather than silently vanishing from
/// filtered queries.
pub(super) fn source_matches(filter: Option<i64>, recorded: Option<i64>) -> bool {
    match (filter, recorded) {
        (None, _) | (_, None) => true,
        (Some(want), Some(have)) => want == have,
    }
}

/// Remove every `Invulnerable` window from `range`, in recorded order.
///
/// Each window subtracts from a snapshot of the pieces the previous
/// windows left behind, so a window splitting one piece is fully applied
/// before the next window runs.
fn subtract_invulns(range: Range, windows: &[InvulnWindow]) -> Vec<Range> {
    let mut pieces = vec![range];
    for window in windows {
        if window.kind != InvulnKind::Invulnerable {
            continue;
        }
        // Overlap is checked against the original interval; a window
        // outside it cannot touch any surviving piece either.
        if window.end <= range.start || window.start >= range.end {
            continue;
        }
        let mut next = Vec::with_capacity(pieces.len() + 1);
        for piece in pieces {
            subtract_one(piece, window, &mut next);
        }
        pieces = next;
    }
    pieces.retain(|piece| piece.start < piece.end);
    pieces
}

/// Push whatever survives of `piece` after removing `window`: the whole
/// piece when disjoint, a truncated piece, or the two flanks of a split.
fn subtract_one(piece: Range, window: &InvulnWindow, out: &mut Vec<Range>) {
    if window.end <= piece.start || window.start >= piece.end {
        out.push(piece);
        return;
    }
    if window.start > piece.start {
        out.push(Range {
            start: piece.start,
            end: window.start,
        });
    }
    if window.end < piece.end {
        out.push(Range {
            start: window.end,
            end: piece.end,
        });
    }
}

/// Sweep sorted edges, accumulating spans where at least one instance is
/// active.
fn sweep(edges: &[Edge]) -> Duration {
    let mut total = Duration::zero();
    let mut active: u32 = 0;
    let mut current_start: Option<NaiveDateTime> = None;
    for edge in edges {
        match edge.kind {
            EdgeKind::Apply => {
                if active == 0 {
                    current_start = Some(edge.at);
                }
                active += 1;
            }
            EdgeKind::Remove => {
                debug_assert!(active > 0, "remove edge without matching apply");
                active = active.saturating_sub(1);
                if active == 0
                    && let Some(start) = current_start.take()
                {
                    total += edge.at.signed_duration_since(start);
                }
            }
        }
    }
    total
}
