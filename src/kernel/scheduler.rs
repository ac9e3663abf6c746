//! CPU scheduler
//!
//! Owns every process, spread over four queues and one CPU slot:
//! - job queue: created, not yet admitted
//! - ready queue: eligible to run, ordered by the active policy
//! - waiting queue: blocked on a page load
//! - terminated list: finished, kept for statistics
//! - current: the process holding the CPU
//!
//! Processes are moved by value between locations, so a process can only
//! ever be in one place. Operations naming a process that is not where they
//! expect it are no-ops.

use super::error::{SimError, SimResult};
use super::process::{Pid, Process, ProcessStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::VecDeque;
use std::str::FromStr;

/// CPU scheduling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CpuAlgorithm {
    /// First come, first served
    #[default]
    #[serde(rename = "FIFO", alias = "fifo", alias = "FCFS")]
    Fifo,
    /// Shortest remaining reference string first, non-preemptive
    #[serde(rename = "SJF", alias = "sjf")]
    Sjf,
    /// Highest priority value first
    #[serde(rename = "Priority", alias = "priority")]
    Priority,
    /// Time-sliced rotation through the ready queue
    #[serde(rename = "RoundRobin", alias = "rr", alias = "round-robin")]
    RoundRobin,
}

impl CpuAlgorithm {
    pub const ALL: [CpuAlgorithm; 4] = [
        CpuAlgorithm::Fifo,
        CpuAlgorithm::Sjf,
        CpuAlgorithm::Priority,
        CpuAlgorithm::RoundRobin,
    ];
}

impl std::fmt::Display for CpuAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CpuAlgorithm::Fifo => write!(f, "FIFO"),
            CpuAlgorithm::Sjf => write!(f, "SJF"),
            CpuAlgorithm::Priority => write!(f, "Priority"),
            CpuAlgorithm::RoundRobin => write!(f, "RoundRobin"),
        }
    }
}

impl FromStr for CpuAlgorithm {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" | "fcfs" => Ok(CpuAlgorithm::Fifo),
            "sjf" => Ok(CpuAlgorithm::Sjf),
            "priority" => Ok(CpuAlgorithm::Priority),
            "rr" | "roundrobin" | "round-robin" => Ok(CpuAlgorithm::RoundRobin),
            _ => Err(SimError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Aggregate scheduling statistics over terminated processes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStats {
    pub average_waiting_time: f64,
    pub average_turnaround_time: f64,
    /// Completed processes per time unit
    pub throughput: f64,
    pub completed_processes: usize,
}

/// The process scheduler
#[derive(Debug, Clone)]
pub struct Scheduler {
    job_queue: VecDeque<Process>,
    ready_queue: VecDeque<Process>,
    waiting_queue: VecDeque<Process>,
    terminated: Vec<Process>,
    current: Option<Process>,
    algorithm: CpuAlgorithm,
    time_quantum: u32,
}

pub const DEFAULT_TIME_QUANTUM: u32 = 2;

impl Scheduler {
    pub fn new(algorithm: CpuAlgorithm) -> Self {
        Self {
            job_queue: VecDeque::new(),
            ready_queue: VecDeque::new(),
            waiting_queue: VecDeque::new(),
            terminated: Vec::new(),
            current: None,
            algorithm,
            time_quantum: DEFAULT_TIME_QUANTUM,
        }
    }

    pub fn algorithm(&self) -> CpuAlgorithm {
        self.algorithm
    }

    /// Switch policy and reorder the ready queue accordingly
    ///
    /// Never preempts. A process already on the CPU when Round-Robin takes
    /// over starts a fresh quantum.
    pub fn set_algorithm(&mut self, algorithm: CpuAlgorithm) {
        if algorithm == CpuAlgorithm::RoundRobin
            && self.algorithm != CpuAlgorithm::RoundRobin
            && let Some(current) = self.current.as_mut()
        {
            current.time_slice_remaining = self.time_quantum;
        }
        self.algorithm = algorithm;
        self.sort_ready_queue();
    }

    pub fn time_quantum(&self) -> u32 {
        self.time_quantum
    }

    pub fn set_time_quantum(&mut self, quantum: u32) -> SimResult<()> {
        if quantum == 0 {
            return Err(SimError::ZeroQuantum);
        }
        self.time_quantum = quantum;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    pub fn job_queue(&self) -> impl Iterator<Item = &Process> {
        self.job_queue.iter()
    }

    pub fn ready_queue(&self) -> impl Iterator<Item = &Process> {
        self.ready_queue.iter()
    }

    pub fn waiting_queue(&self) -> impl Iterator<Item = &Process> {
        self.waiting_queue.iter()
    }

    pub fn terminated(&self) -> &[Process] {
        &self.terminated
    }

    pub fn current(&self) -> Option<&Process> {
        self.current.as_ref()
    }

    /// Every process, wherever it currently lives
    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.job_queue
            .iter()
            .chain(self.ready_queue.iter())
            .chain(self.waiting_queue.iter())
            .chain(self.terminated.iter())
            .chain(self.current.iter())
    }

    pub fn process_count(&self) -> usize {
        self.job_queue.len()
            + self.ready_queue.len()
            + self.waiting_queue.len()
            + self.terminated.len()
            + usize::from(self.current.is_some())
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.processes().any(|p| p.pid == pid)
    }

    pub fn waiting_pids(&self) -> Vec<Pid> {
        self.waiting_queue.iter().map(|p| p.pid).collect()
    }

    /// Pids in the job queue whose arrival time has come
    pub fn arrived(&self, now: u64) -> Vec<Pid> {
        self.job_queue
            .iter()
            .filter(|p| p.arrival_time <= now)
            .map(|p| p.pid)
            .collect()
    }

    /// True when nothing is left to run
    pub fn is_all_completed(&self) -> bool {
        self.job_queue.is_empty()
            && self.ready_queue.is_empty()
            && self.waiting_queue.is_empty()
            && self.current.is_none()
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    pub fn add_to_job_queue(&mut self, mut process: Process) {
        process.status = ProcessStatus::New;
        self.job_queue.push_back(process);
    }

    /// job -> ready
    pub fn admit_process(&mut self, pid: Pid) -> bool {
        let Some(mut process) = take(&mut self.job_queue, pid) else {
            return false;
        };
        process.status = ProcessStatus::Ready;
        self.ready_queue.push_back(process);
        self.sort_ready_queue();
        true
    }

    /// running/ready -> waiting
    pub fn block_process(&mut self, pid: Pid) -> bool {
        let Some(mut process) = self.take_active(pid) else {
            return false;
        };
        process.status = ProcessStatus::Waiting;
        process.time_slice_remaining = 0;
        self.waiting_queue.push_back(process);
        true
    }

    /// waiting -> ready
    pub fn unblock_process(&mut self, pid: Pid) -> bool {
        let Some(mut process) = take(&mut self.waiting_queue, pid) else {
            return false;
        };
        process.status = ProcessStatus::Ready;
        self.ready_queue.push_back(process);
        self.sort_ready_queue();
        true
    }

    /// running/ready -> terminated
    pub fn terminate_process(&mut self, pid: Pid, now: u64) -> bool {
        let Some(mut process) = self.take_active(pid) else {
            return false;
        };
        process.status = ProcessStatus::Terminated;
        process.completion_time = Some(now);
        process.turnaround_time = now.saturating_sub(process.arrival_time);
        process.time_slice_remaining = 0;
        self.terminated.push(process);
        true
    }

    /// Advance the waiting process one access as its page load completes
    pub fn complete_page_load(&mut self, pid: Pid) -> bool {
        match self.waiting_queue.iter_mut().find(|p| p.pid == pid) {
            Some(process) => {
                process.next_page_access();
                true
            }
            None => false,
        }
    }

    /// Demote the running process to the tail of the ready queue
    pub fn preempt_current(&mut self) -> Option<Pid> {
        let mut process = self.current.take()?;
        process.status = ProcessStatus::Ready;
        process.time_slice_remaining = 0;
        let pid = process.pid;
        self.ready_queue.push_back(process);
        Some(pid)
    }

    /// Pick the process that holds the CPU this step
    ///
    /// Non-preemptive policies keep the current process. Round-Robin keeps it
    /// while its slice lasts, otherwise rotates it to the tail and hands a full
    /// quantum to the head of the ready queue.
    pub fn select_next_process(&mut self) -> Option<&Process> {
        match self.algorithm {
            CpuAlgorithm::RoundRobin => {
                if self
                    .current
                    .as_ref()
                    .is_some_and(|p| p.time_slice_remaining > 0)
                {
                    return self.current.as_ref();
                }
                self.preempt_current();
                let mut next = self.ready_queue.pop_front()?;
                next.status = ProcessStatus::Running;
                next.time_slice_remaining = self.time_quantum;
                self.current = Some(next);
            }
            CpuAlgorithm::Fifo | CpuAlgorithm::Sjf | CpuAlgorithm::Priority => {
                if self.current.is_none() {
                    let mut next = self.ready_queue.pop_front()?;
                    next.status = ProcessStatus::Running;
                    self.current = Some(next);
                }
            }
        }
        self.current.as_ref()
    }

    /// Consume one unit of the running process's quantum
    ///
    /// Returns true when the quantum reaches zero on this call. Always false
    /// outside Round-Robin.
    pub fn handle_time_slice(&mut self) -> bool {
        if self.algorithm != CpuAlgorithm::RoundRobin {
            return false;
        }
        let Some(current) = self.current.as_mut() else {
            return false;
        };
        if current.time_slice_remaining == 0 {
            return false;
        }
        current.time_slice_remaining -= 1;
        current.time_slice_remaining == 0
    }

    /// Charge one step of waiting to every ready process
    pub fn update_waiting_times(&mut self) {
        for process in self.ready_queue.iter_mut() {
            process.waiting_time += 1;
        }
    }

    /// Mutable access to the running process
    pub fn current_mut(&mut self) -> Option<&mut Process> {
        self.current.as_mut()
    }

    pub fn statistics(&self, now: u64) -> SchedulerStats {
        let completed = self.terminated.len();
        if completed == 0 {
            return SchedulerStats::default();
        }
        let waiting: u64 = self.terminated.iter().map(|p| p.waiting_time).sum();
        let turnaround: u64 = self.terminated.iter().map(|p| p.turnaround_time).sum();
        SchedulerStats {
            average_waiting_time: waiting as f64 / completed as f64,
            average_turnaround_time: turnaround as f64 / completed as f64,
            throughput: if now == 0 {
                0.0
            } else {
                completed as f64 / now as f64
            },
            completed_processes: completed,
        }
    }

    /// Drop every process; keeps policy and quantum
    pub fn clear(&mut self) {
        self.job_queue.clear();
        self.ready_queue.clear();
        self.waiting_queue.clear();
        self.terminated.clear();
        self.current = None;
    }

    fn take_active(&mut self, pid: Pid) -> Option<Process> {
        if self.current.as_ref().is_some_and(|p| p.pid == pid) {
            return self.current.take();
        }
        take(&mut self.ready_queue, pid)
    }

    fn sort_ready_queue(&mut self) {
        let queue = self.ready_queue.make_contiguous();
        match self.algorithm {
            CpuAlgorithm::Fifo => queue.sort_by_key(|p| (p.arrival_time, p.pid)),
            CpuAlgorithm::Sjf => queue.sort_by_key(|p| (p.remaining_accesses(), p.arrival_time)),
            CpuAlgorithm::Priority => queue.sort_by_key(|p| (Reverse(p.priority), p.arrival_time)),
            // Insertion order is the rotation order
            CpuAlgorithm::RoundRobin => {}
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(CpuAlgorithm::default())
    }
}

fn take(queue: &mut VecDeque<Process>, pid: Pid) -> Option<Process> {
    let pos = queue.iter().position(|p| p.pid == pid)?;
    queue.remove(pos)
}
