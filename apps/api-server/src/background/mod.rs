//! Scheduled maintenance.

pub mod scheduler;

pub use scheduler::{OrphanSweepConfig, Scheduler, SchedulerConfig, schedule_orphan_sweep};
