//! Commit-Triggered Update Orchestration
//!
//! ## Flow
//!
//! ```text
//! post-commit hook ─→ gate ─→ launcher ─┐
//!                                       │  (detached worker)
//!                     ┌─────────────────┘
//!                     ↓
//!               lock ─→ cycle ─→ catch-up ─→ release
//!                        │
//!                        ├─ changes (range + exclusion filter)
//!                        ├─ strategy (full / incremental + section hints)
//!                        ├─ engine
//!                        ├─ wiki self-commit (under sentinel)
//!                        └─ state (baseline)
//! ```
//!
//! Workers for the same repository are serialized by the file lock. There is
//! no in-process concurrency.

mod changes;
mod cycle;
mod gate;
mod launcher;
mod lock;
mod sections;
mod sentinel;
mod state;
mod strategy;

pub use changes::{ChangeDetector, ChangeSet, CommitRange, filter_excluded};
pub use cycle::{CycleOutcome, SyncContext, SyncReport, UpdateCycle, run_generate, run_update};
pub use gate::{GateDecision, SkipReason, evaluate as evaluate_gate, is_self_authored};
pub use launcher::BackgroundLauncher;
pub use lock::{LockGuard, LockRecord, ProcessLock, is_pid_alive};
pub use sections::{SectionIndex, affected_sections, heuristic_sections};
pub use sentinel::{Sentinel, SentinelGuard};
pub use state::{RunState, StateStore};
pub use strategy::{Strategy, StrategyKind, select_strategy};
