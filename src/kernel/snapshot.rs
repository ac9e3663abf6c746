//! Observer-facing views of simulation state
//!
//! Everything here is an owned copy. Observers may mutate what they receive
//! without affecting the running simulation.

use super::memory::{MemoryStats, PageAlgorithm};
use super::process::{PageNumber, Pid, Process, ProcessStatus};
use super::scheduler::{CpuAlgorithm, SchedulerStats};
use super::trace::LogEntry;
use serde::Serialize;

/// Copies of every scheduler location
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueView {
    pub job_queue: Vec<Process>,
    pub ready_queue: Vec<Process>,
    pub waiting_queue: Vec<Process>,
    pub terminated_queue: Vec<Process>,
    pub current_process: Option<Process>,
}

impl QueueView {
    /// Processes across all five locations
    pub fn total(&self) -> usize {
        self.job_queue.len()
            + self.ready_queue.len()
            + self.waiting_queue.len()
            + self.terminated_queue.len()
            + usize::from(self.current_process.is_some())
    }
}

/// Frame contents and replacement bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryView {
    pub frames: Vec<Option<PageNumber>>,
    pub algorithm: PageAlgorithm,
    pub access_order: Vec<PageNumber>,
}

/// Active policy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmView {
    pub cpu: CpuAlgorithm,
    pub memory: PageAlgorithm,
    pub time_quantum: u32,
}

/// Full state snapshot delivered to subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationState {
    pub current_time: u64,
    pub is_running: bool,
    pub queues: QueueView,
    pub memory: MemoryView,
    pub memory_stats: MemoryStats,
    pub scheduler_stats: SchedulerStats,
    /// Most recent log entries, oldest first
    pub logs: Vec<LogEntry>,
    pub algorithms: AlgorithmView,
}

/// Per-process line of the detailed report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessReport {
    pub pid: Pid,
    pub status: ProcessStatus,
    pub priority: i32,
    pub arrival_time: u64,
    pub total_accesses: usize,
    pub completed_accesses: usize,
    pub page_faults: u64,
    pub waiting_time: u64,
    pub turnaround_time: u64,
    pub completion_time: Option<u64>,
}

impl From<&Process> for ProcessReport {
    fn from(p: &Process) -> Self {
        Self {
            pid: p.pid,
            status: p.status,
            priority: p.priority,
            arrival_time: p.arrival_time,
            total_accesses: p.page_accesses().len(),
            completed_accesses: p.current_access_index(),
            page_faults: p.page_faults,
            waiting_time: p.waiting_time,
            turnaround_time: p.turnaround_time,
            completion_time: p.completion_time,
        }
    }
}

/// Aggregate and per-process statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedStatistics {
    pub current_time: u64,
    pub memory: MemoryStats,
    pub scheduler: SchedulerStats,
    /// Sorted by pid
    pub processes: Vec<ProcessReport>,
}
