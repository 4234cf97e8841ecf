//! Entity-resolution strategies.
//!
//! The tracker is generic over how an event's participants map to the
//! entity that owns the resulting buff record; the strategy is supplied at
//! construction, so a tracker without one cannot exist. Returning `None`
//! filters the event out of tracked scope entirely; an expected outcome
//! for events about bystanders, not an error, and not logged.

/// Maps an event's (source, target) pair to the entity that holds the buff.
pub trait EntityResolver {
    fn resolve(&self, source_id: Option<i64>, target_id: i64) -> Option<i64>;
}

/// Tracks effects involving one actor: events where the actor is either
/// participant resolve to the target entity (the holder). Covers both the
/// actor's own buffs and the debuffs it puts on others.
#[derive(Debug, Clone, Copy)]
pub struct ActorScope {
    actor_id: i64,
}

impl ActorScope {
    pub fn new(actor_id: i64) -> Self {
        Self { actor_id }
    }
}

impl EntityResolver for ActorScope {
    fn resolve(&self, source_id: Option<i64>, target_id: i64) -> Option<i64> {
        if source_id == Some(self.actor_id) || target_id == self.actor_id {
            Some(target_id)
        } else {
            None
        }
    }
}

/// Tracks every event against its target, regardless of source. Used when
/// no single actor is selected (whole-group debuff accounting).
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetScope;

impl EntityResolver for TargetScope {
    fn resolve(&self, _source_id: Option<i64>, target_id: i64) -> Option<i64> {
        Some(target_id)
    }
}
