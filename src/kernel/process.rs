//! Process abstraction
//!
//! A simulated process is a fixed script of page references plus the
//! bookkeeping the scheduler and pager accumulate while running it.
//!
//! - The reference string is immutable once created
//! - Progress is a cursor that only moves forward
//! - Status is owned by the scheduler; a process never changes its own status

use serde::{Deserialize, Serialize};

/// A page number in a process's virtual address space
pub type PageNumber = u32;

/// Process identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(pub u32);

impl std::fmt::Display for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Process status, mirrored by queue membership inside the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    /// Created, sitting in the job queue
    #[default]
    New,
    /// Eligible to run
    Ready,
    /// Holds the CPU
    Running,
    /// Waiting for a page to load
    Waiting,
    /// Finished; kept for inspection
    Terminated,
}

impl std::fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProcessStatus::New => "new",
            ProcessStatus::Ready => "ready",
            ProcessStatus::Running => "running",
            ProcessStatus::Waiting => "waiting",
            ProcessStatus::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// A process in the simulation
///
/// `Clone` produces an independent deep copy; snapshots handed to observers
/// are built from clones so they can never alias live state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    /// Unique process identifier
    pub pid: Pid,

    /// Reference string, consumed front to back
    page_accesses: Vec<PageNumber>,

    /// Cursor into `page_accesses`
    current_access_index: usize,

    /// Larger value is served first under Priority scheduling
    pub priority: i32,

    /// First time unit at which the process may be admitted
    pub arrival_time: u64,

    /// Current status (written by the scheduler)
    pub status: ProcessStatus,

    /// Steps spent in the ready queue without the CPU
    pub waiting_time: u64,

    /// completion_time - arrival_time, set on termination
    pub turnaround_time: u64,

    /// Time of termination
    pub completion_time: Option<u64>,

    /// Faulting accesses made by this process
    pub page_faults: u64,

    /// Round-Robin budget, meaningful only while running
    pub time_slice_remaining: u32,
}

impl Process {
    /// Create a new process in the `New` state
    pub fn new(pid: Pid, page_accesses: Vec<PageNumber>, priority: i32, arrival_time: u64) -> Self {
        Self {
            pid,
            page_accesses,
            current_access_index: 0,
            priority,
            arrival_time,
            status: ProcessStatus::New,
            waiting_time: 0,
            turnaround_time: 0,
            completion_time: None,
            page_faults: 0,
            time_slice_remaining: 0,
        }
    }

    /// The full reference string
    pub fn page_accesses(&self) -> &[PageNumber] {
        &self.page_accesses
    }

    /// Number of accesses already consumed
    pub fn current_access_index(&self) -> usize {
        self.current_access_index
    }

    /// The page the process will touch next, if any
    pub fn current_page_access(&self) -> Option<PageNumber> {
        self.page_accesses.get(self.current_access_index).copied()
    }

    /// Consume one access and return the following one
    pub fn next_page_access(&mut self) -> Option<PageNumber> {
        if self.current_access_index < self.page_accesses.len() {
            self.current_access_index += 1;
        }
        self.current_page_access()
    }

    pub fn is_completed(&self) -> bool {
        self.current_access_index >= self.page_accesses.len()
    }

    /// Accesses left, the SJF ranking key
    pub fn remaining_accesses(&self) -> usize {
        self.page_accesses.len() - self.current_access_index
    }

    /// Accesses after the current one, used by the optimal replacer
    pub fn future_accesses(&self) -> &[PageNumber] {
        let start = (self.current_access_index + 1).min(self.page_accesses.len());
        &self.page_accesses[start..]
    }
}

impl std::fmt::Display for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}/{} accesses",
            self.pid,
            self.status,
            self.current_access_index,
            self.page_accesses.len()
        )
    }
}
