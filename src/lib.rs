//! pagesched - a discrete-time CPU scheduling and demand paging simulator
//!
//! Design principles:
//! - Deterministic: the same workload and policies always produce the same run
//! - One step is one time unit, run to completion, no hidden concurrency
//! - Policies are plain enums; switching them is a method call
//! - Observers get deep copies, so they can never corrupt a run
//!
//! Scheduling: FIFO, SJF, Priority, Round-Robin.
//! Page replacement: FIFO, LRU, OPT.

pub mod kernel;

pub use kernel::{
    CpuAlgorithm, PageAlgorithm, Pid, Process, SimConfig, SimError, SimResult, SimulationState,
    Simulator,
};
