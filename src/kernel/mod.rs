//! The simulated kernel - process scheduling and demand paging
//!
//! Leaves first:
//! - `process`: one program's reference string and bookkeeping
//! - `memory`: fixed frames and page replacement
//! - `scheduler`: job/ready/waiting/terminated queues and the CPU slot
//! - `simulator`: the step loop tying them together
//!
//! Control flows downward only. Observers see copies, never live state.

pub mod config;
pub mod error;
pub mod memory;
pub mod process;
pub mod scenario;
pub mod scheduler;
pub mod simulator;
pub mod snapshot;
pub mod trace;


pub use config::{ProcessSpec, SimConfig};
pub use error::{SimError, SimResult};
pub use memory::{AccessResult, MemoryManager, MemoryStats, PageAlgorithm};
pub use process::{PageNumber, Pid, Process, ProcessStatus};
pub use scenario::Scenario;
pub use scheduler::{CpuAlgorithm, Scheduler, SchedulerStats};
pub use simulator::{Simulator, StepReport, SubscriptionId};
pub use snapshot::{DetailedStatistics, ProcessReport, SimulationState};
pub use trace::{EventLog, LogEntry, LogKind};
