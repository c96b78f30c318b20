//! # Remindz Architecture
//!
//! Remindz is a **UI-agnostic reminder library** with a command-line client on
//! top. Users create reminders with a due date and a frequency (`once`,
//! `hourly`, `daily`, `weekly`, `monthly`); remindz persists them, notifies when
//! each comes due, and completes one-shot reminders after they fire.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, runs the watch loop    │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, hydrates on first use         │
//! │  - CmdResult methods plus never-failing plain responses     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Business operations returning CmdResult                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Context (context.rs)                                       │
//! │  - Owns the reminder book, job registry and notifier        │
//! └─────────────────────────────────────────────────────────────┘
//!          │                   │                    │
//!          ▼                   ▼                    ▼
//!   reminders.rs +        scheduler.rs +         notify/
//!   store/                schedule.rs
//! ```
//!
//! ## Time Is an Argument
//!
//! Nothing below the API reads the clock. Operations that depend on time take
//! `now: DateTime<Utc>`, and the scheduler only answers "what is due at this
//! instant" and "when is the next wake-up". The CLI's `watch` loop is the one
//! place that sleeps. Tests simulate days of firings in microseconds.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business operations
//! - [`context`]: Runtime state owner
//! - [`reminders`]: In-memory reminder book with write-through persistence
//! - [`store`]: Slot storage abstraction and implementations
//! - [`schedule`]: Recurrence rules and next-fire computation
//! - [`scheduler`]: Registry of armed jobs
//! - [`notify`]: Notification dedup, permission and delivery channels
//! - [`model`]: Core data types (`Reminder`, `Frequency`)
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod notify;
pub mod reminders;
pub mod schedule;
pub mod scheduler;
pub mod store;
