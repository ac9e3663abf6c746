//! Simulation orchestrator
//!
//! Drives the scheduler and memory manager one time unit per `step()`:
//!
//! 1. admit arrivals
//! 2. preempt on an expired Round-Robin quantum
//! 3. select a process if the CPU is free
//! 4. execute one page reference for it
//! 5. charge waiting time to the ready queue
//! 6. finish outstanding page loads (one tick of latency)
//! 7. advance the clock
//! 8. publish a snapshot to subscribers
//! 9. halt once every process has terminated
//!
//! Single-threaded and synchronous; a step always runs to completion.

use super::config::SimConfig;
use super::error::{SimError, SimResult};
use super::memory::{AccessResult, MemoryManager, PageAlgorithm};
use super::process::{Pid, Process};
use super::scenario::Scenario;
use super::scheduler::{CpuAlgorithm, Scheduler};
use super::snapshot::{
    AlgorithmView, DetailedStatistics, MemoryView, ProcessReport, QueueView, SimulationState,
};
use super::trace::{EventLog, LogKind, SNAPSHOT_LOG_LEN};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// Handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

type Observer = Box<dyn FnMut(&SimulationState)>;

/// One-time informational messages, tracked per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// OPT reads the faulting process's remaining references
    OptLookahead,
}

/// What happened during the most recent step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Time at which the step executed (before the clock advanced)
    pub time: u64,
    /// Process that held the CPU
    pub ran: Option<Pid>,
    /// Page reference it made
    pub access: Option<AccessResult>,
    pub preempted: Option<Pid>,
    pub terminated: Option<Pid>,
}

/// The simulator
pub struct Simulator {
    scheduler: Scheduler,
    memory: MemoryManager,
    current_time: u64,
    is_running: bool,
    logs: EventLog,
    notices: HashSet<Notice>,
    observers: BTreeMap<SubscriptionId, Observer>,
    next_subscription: u64,
    last_step: StepReport,
}

impl Simulator {
    /// Create a simulator with default policies and three frames
    pub fn new() -> Self {
        Self::with_parts(Scheduler::default(), MemoryManager::default())
    }

    fn with_parts(scheduler: Scheduler, memory: MemoryManager) -> Self {
        Self {
            scheduler,
            memory,
            current_time: 0,
            is_running: false,
            logs: EventLog::new(),
            notices: HashSet::new(),
            observers: BTreeMap::new(),
            next_subscription: 0,
            last_step: StepReport::default(),
        }
    }

    /// Build a simulator from a validated configuration
    pub fn from_config(config: &SimConfig) -> SimResult<Self> {
        config.validate()?;
        let mut scheduler = Scheduler::new(config.cpu_algorithm);
        scheduler.set_time_quantum(config.time_quantum)?;
        let memory = MemoryManager::new(config.frame_count, config.page_algorithm)?;
        let mut sim = Self::with_parts(scheduler, memory);

        if let Some(name) = &config.scenario {
            sim.load_test_scenario(name)?;
        }
        for spec in &config.processes {
            sim.add_process(spec.clone().into_process());
        }
        Ok(sim)
    }

    fn log(&mut self, kind: LogKind, message: impl Into<String>) {
        self.logs.record(self.current_time, kind, message);
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    /// Queue a process for admission at its arrival time
    ///
    /// Returns false (and logs an error) if the pid is already in use.
    pub fn add_process(&mut self, process: Process) -> bool {
        if self.scheduler.contains(process.pid) {
            self.log(
                LogKind::Error,
                format!("{} already exists; ignoring duplicate", process.pid),
            );
            return false;
        }
        self.log(
            LogKind::Info,
            format!(
                "{} created: {} accesses, priority {}, arrival {}",
                process.pid,
                process.page_accesses().len(),
                process.priority,
                process.arrival_time
            ),
        );
        self.scheduler.add_to_job_queue(process);
        true
    }

    pub fn set_cpu_scheduling_algorithm(&mut self, algorithm: CpuAlgorithm) {
        self.scheduler.set_algorithm(algorithm);
        self.log(LogKind::Info, format!("CPU scheduling set to {}", algorithm));
    }

    pub fn set_page_replacement_algorithm(&mut self, algorithm: PageAlgorithm) {
        self.memory.set_algorithm(algorithm);
        self.log(LogKind::Info, format!("Page replacement set to {}", algorithm));
    }

    pub fn set_time_quantum(&mut self, quantum: u32) -> SimResult<()> {
        if let Err(e) = self.scheduler.set_time_quantum(quantum) {
            self.log(LogKind::Error, format!("Rejected time quantum {}: {}", quantum, e));
            return Err(e);
        }
        self.log(LogKind::Info, format!("Time quantum set to {}", quantum));
        Ok(())
    }

    /// Replace the memory manager with a fresh one of `frames` frames
    pub fn set_frame_count(&mut self, frames: usize) -> SimResult<()> {
        match MemoryManager::new(frames, self.memory.algorithm()) {
            Ok(memory) => {
                self.memory = memory;
                self.log(LogKind::Info, format!("Memory rebuilt with {} frames", frames));
                Ok(())
            }
            Err(e) => {
                self.log(LogKind::Error, format!("Rejected frame count {}: {}", frames, e));
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Reset the clock and admit everything that arrives at time zero
    pub fn start(&mut self) {
        self.current_time = 0;
        self.is_running = true;
        self.last_step = StepReport::default();
        self.log(
            LogKind::Info,
            format!(
                "Simulation started ({} / {}, {} frames)",
                self.scheduler.algorithm(),
                self.memory.algorithm(),
                self.memory.frame_count()
            ),
        );
        self.admit_arrivals();
    }

    pub fn stop(&mut self) {
        if self.is_running {
            self.is_running = false;
            self.log(LogKind::Info, "Simulation stopped");
        }
    }

    /// Discard all processes, memory contents and logs
    pub fn reset(&mut self) {
        self.is_running = false;
        self.current_time = 0;
        self.scheduler.clear();
        self.memory.reset();
        self.logs.clear();
        self.notices.clear();
        self.last_step = StepReport::default();
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    pub fn logs(&self) -> &EventLog {
        &self.logs
    }

    pub fn last_step(&self) -> &StepReport {
        &self.last_step
    }

    // ------------------------------------------------------------------------
    // Stepping
    // ------------------------------------------------------------------------

    fn admit_arrivals(&mut self) {
        for pid in self.scheduler.arrived(self.current_time) {
            if self.scheduler.admit_process(pid) {
                self.log(LogKind::Scheduler, format!("{} admitted to ready queue", pid));
            }
        }
    }

    /// Advance the simulation by one time unit
    ///
    /// Returns whether the simulation should keep going. Does nothing and
    /// returns false unless started.
    pub fn step(&mut self) -> bool {
        if !self.is_running {
            return false;
        }

        let now = self.current_time;
        let mut report = StepReport {
            time: now,
            ..StepReport::default()
        };

        self.admit_arrivals();

        if self.scheduler.handle_time_slice()
            && let Some(pid) = self.scheduler.preempt_current()
        {
            self.log(LogKind::Scheduler, format!("{} time quantum expired", pid));
            report.preempted = Some(pid);
        }

        if self.scheduler.current().is_none()
            && let Some(pid) = self.scheduler.select_next_process().map(|p| p.pid)
        {
            self.log(
                LogKind::Scheduler,
                format!("{} selected ({})", pid, self.scheduler.algorithm()),
            );
        }

        self.execute(now, &mut report);

        self.scheduler.update_waiting_times();
        self.resolve_page_loads();

        self.current_time += 1;
        self.log(LogKind::Time, format!("Time advanced to {}", self.current_time));

        if self.scheduler.is_all_completed() {
            self.is_running = false;
            self.log(
                LogKind::Success,
                format!("All processes completed at t={}", self.current_time),
            );
        }

        self.last_step = report;
        self.publish();
        self.is_running
    }

    /// Stage 4: one page reference for the running process
    fn execute(&mut self, now: u64, report: &mut StepReport) {
        let running = self
            .scheduler
            .current()
            .map(|p| (p.pid, p.current_page_access(), p.future_accesses().to_vec()));
        let Some((pid, page, future)) = running else {
            self.log(LogKind::Scheduler, "CPU idle");
            return;
        };
        report.ran = Some(pid);

        let Some(page) = page else {
            self.terminate(pid, now, report);
            return;
        };

        let result = self.memory.access_page(page, &future);
        if result.hit {
            self.log(LogKind::Memory, format!("{} page {} hit", pid, page));
            let completed = match self.scheduler.current_mut() {
                Some(process) => {
                    process.next_page_access();
                    process.is_completed()
                }
                None => false,
            };
            if completed {
                self.terminate(pid, now, report);
            }
        } else {
            let message = match result.victim {
                Some(victim) => format!(
                    "{} page {} fault, evicted page {} ({})",
                    pid,
                    page,
                    victim,
                    self.memory.algorithm()
                ),
                None => format!("{} page {} fault, loaded into frame {}", pid, page, result.frame),
            };
            self.log(LogKind::Memory, message);
            if result.victim.is_some() && self.memory.algorithm() == PageAlgorithm::Opt {
                self.notify_once(
                    Notice::OptLookahead,
                    "OPT chooses victims from the faulting process's remaining page references",
                );
            }
            if let Some(process) = self.scheduler.current_mut() {
                process.page_faults += 1;
            }
            self.scheduler.block_process(pid);
            self.log(LogKind::Scheduler, format!("{} blocked for page load", pid));
        }
        report.access = Some(result);
    }

    fn terminate(&mut self, pid: Pid, now: u64, report: &mut StepReport) {
        if self.scheduler.terminate_process(pid, now) {
            self.log(LogKind::Success, format!("{} terminated", pid));
            report.terminated = Some(pid);
        }
    }

    /// Stage 6: every waiting process finishes its one-tick page load
    fn resolve_page_loads(&mut self) {
        for pid in self.scheduler.waiting_pids() {
            self.scheduler.complete_page_load(pid);
            if self.scheduler.unblock_process(pid) {
                self.log(LogKind::Scheduler, format!("{} page loaded, back to ready", pid));
            }
        }
    }

    fn notify_once(&mut self, notice: Notice, message: &str) {
        if self.notices.insert(notice) {
            self.log(LogKind::Info, message);
        }
    }

    /// Step repeatedly until the simulation halts, pausing `interval` between
    /// steps; returns the number of steps taken
    pub fn run_automatic(&mut self, interval: Duration) -> u64 {
        let mut steps = 0;
        while self.is_running {
            let keep_going = self.step();
            steps += 1;
            if !keep_going {
                break;
            }
            if !interval.is_zero() {
                std::thread::sleep(interval);
            }
        }
        steps
    }

    /// Clear everything and load a named fixture workload
    pub fn load_test_scenario(&mut self, name: &str) -> SimResult<()> {
        let scenario = match name.parse::<Scenario>() {
            Ok(s) => s,
            Err(e) => {
                self.log(LogKind::Error, e.to_string());
                return Err(e);
            }
        };
        self.reset();
        for spec in scenario.processes() {
            self.add_process(spec.into_process());
        }
        self.log(LogKind::Info, format!("Loaded scenario '{}'", scenario));
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------------

    /// Register an observer called with a snapshot after every step
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&SimulationState) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.insert(id, Box::new(observer));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(&id).is_some()
    }

    fn publish(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let state = self.get_simulation_state();
        for observer in self.observers.values_mut() {
            observer(&state);
        }
    }

    /// Deep copy of the current state
    pub fn get_simulation_state(&self) -> SimulationState {
        SimulationState {
            current_time: self.current_time,
            is_running: self.is_running,
            queues: QueueView {
                job_queue: self.scheduler.job_queue().cloned().collect(),
                ready_queue: self.scheduler.ready_queue().cloned().collect(),
                waiting_queue: self.scheduler.waiting_queue().cloned().collect(),
                terminated_queue: self.scheduler.terminated().to_vec(),
                current_process: self.scheduler.current().cloned(),
            },
            memory: MemoryView {
                frames: self.memory.frames().to_vec(),
                algorithm: self.memory.algorithm(),
                access_order: self.memory.access_order().collect(),
            },
            memory_stats: self.memory.get_statistics(),
            scheduler_stats: self.scheduler.statistics(self.current_time),
            logs: self.logs.recent(SNAPSHOT_LOG_LEN),
            algorithms: AlgorithmView {
                cpu: self.scheduler.algorithm(),
                memory: self.memory.algorithm(),
                time_quantum: self.scheduler.time_quantum(),
            },
        }
    }

    /// Snapshot rendered as pretty JSON
    pub fn state_json(&self) -> SimResult<String> {
        serde_json::to_string_pretty(&self.get_simulation_state()).map_err(SimError::from)
    }

    pub fn get_detailed_statistics(&self) -> DetailedStatistics {
        let mut processes: Vec<ProcessReport> =
            self.scheduler.processes().map(ProcessReport::from).collect();
        processes.sort_by_key(|p| p.pid);
        DetailedStatistics {
            current_time: self.current_time,
            memory: self.memory.get_statistics(),
            scheduler: self.scheduler.statistics(self.current_time),
            processes,
        }
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("current_time", &self.current_time)
            .field("is_running", &self.is_running)
            .field("scheduler", &self.scheduler)
            .field("memory", &self.memory)
            .field("observers", &self.observers.len())
            .finish()
    }
}
