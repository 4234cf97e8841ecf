use chrono::NaiveDateTime;

/// One stack-count observation in a buff's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackEntry {
    pub stacks: u32,
    pub at: NaiveDateTime,
}

/// A single tracked status-effect interval on one entity.
///
/// `removed_at` stays `None` while the effect is active. The stack history
/// opens with `1` at `applied_at` and, once the buff closes, ends with `0`
/// at `removed_at`; entries in between record every stack change in
/// timestamp order.
#[derive(Debug, Clone, PartialEq)]
pub struct Buff {
    pub ability_id: i64,
    /// `None` when the log did not attribute the application to a source;
    /// such instances match any source filter at query time.
    pub source_id: Option<i64>,
    pub applied_at: NaiveDateTime,
    pub removed_at: Option<NaiveDateTime>,
    pub stacks: u32,
    pub stack_history: Vec<StackEntry>,
    pub is_debuff: bool,
}

impl Buff {
    /// A freshly applied instance with a single stack.
    pub fn open(
        ability_id: i64,
        source_id: Option<i64>,
        applied_at: NaiveDateTime,
        is_debuff: bool,
    ) -> Self {
        Self {
            ability_id,
            source_id,
            applied_at,
            removed_at: None,
            stacks: 1,
            stack_history: vec![StackEntry {
                stacks: 1,
                at: applied_at,
            }],
            is_debuff,
        }
    }

    pub fn is_open(&self) -> bool {
        self.removed_at.is_none()
    }
}

/// Index key for the single open buff allowed per (entity, ability) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuffKey {
    pub entity_id: i64,
    pub ability_id: i64,
}

impl BuffKey {
    pub fn new(entity_id: i64, ability_id: i64) -> Self {
        Self {
            entity_id,
            ability_id,
        }
    }
}

/// Derived stack-change record emitted by the tracker.
///
/// These never re-enter the input stream; the session drains them from the
/// tracker after every processed event and appends them to its cache for
/// downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackChangeEvent {
    pub ability_id: i64,
    pub entity_id: i64,
    pub source_id: Option<i64>,
    pub timestamp: NaiveDateTime,
    pub old_stacks: u32,
    pub new_stacks: u32,
    pub stacks_gained: i32,
    pub is_debuff: bool,
}
