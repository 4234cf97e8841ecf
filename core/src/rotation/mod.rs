//! Rotation window classification
//!
//! This module provides:
//! - **Windows**: Retained cast sequences between an opener and its
//!   status removal
//! - **Classifier**: Per-rule state machine over the signal stream
//!
//! # Architecture
//!
//! ```text
//!              cast opener (resource gate met)
//!        Idle ─────────────────────────────────▶ Open
//!          ▲                                      │
//!          │   status removed / encounter end     │ casts append,
//!          └──────────────────────────────────────┘ qualifying counted
//!                  window evaluated + retained
//! ```

pub mod classifier;

#[cfg(test)]
mod classifier_tests;

pub use classifier::{CastRecord, ClassifierTally, RotationWindow, WindowClassifier};
