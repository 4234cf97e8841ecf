//! Buff and debuff tracking
//!
//! This module provides:
//! - **Instances**: Per-entity buff records with full stack history
//! - **Resolvers**: Strategies that decide which entities' buffs to track
//! - **Tracker**: Signal handler that manages the buff lifecycle
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    AnalysisSignal stream                        │
//! │  "ability 7001 applied by source 10 to target 900 at 20:00:02"  │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                    EntityResolver::resolve
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Buff (per-entity timeline)                      │
//! │  "entity 900 has 7001 from 20:00:02, 2 stacks since 20:00:05"   │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                       Uptime queries
//! ```

mod instance;
mod resolver;
pub mod tracker;


pub use instance::{Buff, BuffKey, StackChangeEvent, StackEntry};
pub use resolver::{ActorScope, EntityResolver, TargetScope};
pub use tracker::{BuffTracker, EntityTimeline};
