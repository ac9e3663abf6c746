//! Simulator configuration
//!
//! A JSON document describing policies, memory size and workload:
//!
//! ```json
//! {
//!   "frameCount": 3,
//!   "cpuAlgorithm": "RoundRobin",
//!   "pageAlgorithm": "LRU",
//!   "timeQuantum": 2,
//!   "scenario": "basic",
//!   "processes": [{ "pid": 9, "pages": [1, 2, 3], "priority": 1, "arrivalTime": 0 }]
//! }
//! ```
//!
//! Every field is optional.

use super::error::{SimError, SimResult};
use super::memory::{DEFAULT_FRAME_COUNT, PageAlgorithm};
use super::process::{PageNumber, Pid, Process};
use super::scenario::Scenario;
use super::scheduler::{CpuAlgorithm, DEFAULT_TIME_QUANTUM};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// Description of a process to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSpec {
    pub pid: u32,
    pub pages: Vec<PageNumber>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub arrival_time: u64,
}

impl ProcessSpec {
    pub fn new(pid: u32, pages: Vec<PageNumber>, priority: i32, arrival_time: u64) -> Self {
        Self {
            pid,
            pages,
            priority,
            arrival_time,
        }
    }

    pub fn into_process(self) -> Process {
        Process::new(Pid(self.pid), self.pages, self.priority, self.arrival_time)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimConfig {
    pub frame_count: usize,
    pub cpu_algorithm: CpuAlgorithm,
    pub page_algorithm: PageAlgorithm,
    pub time_quantum: u32,
    /// Delay between automatic steps
    pub interval_ms: u64,
    /// Fixture loaded before `processes`
    pub scenario: Option<String>,
    pub processes: Vec<ProcessSpec>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            frame_count: DEFAULT_FRAME_COUNT,
            cpu_algorithm: CpuAlgorithm::default(),
            page_algorithm: PageAlgorithm::default(),
            time_quantum: DEFAULT_TIME_QUANTUM,
            interval_ms: DEFAULT_INTERVAL_MS,
            scenario: None,
            processes: Vec::new(),
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.frame_count == 0 {
            return Err(SimError::ZeroFrames);
        }
        if self.time_quantum == 0 {
            return Err(SimError::ZeroQuantum);
        }
        if let Some(name) = &self.scenario {
            name.parse::<Scenario>()?;
        }
        let mut pids: Vec<u32> = self.processes.iter().map(|p| p.pid).collect();
        pids.sort_unstable();
        if let Some(dup) = pids.windows(2).find(|w| w[0] == w[1]) {
            return Err(SimError::InvalidConfig(format!(
                "duplicate pid {}",
                Pid(dup[0])
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SimConfig::from_json("{}").unwrap();
        assert_eq!(config, SimConfig::default());
        assert_eq!(config.frame_count, 3);
        assert_eq!(config.time_quantum, 2);
    }

    #[test]
    fn test_full_document() {
        let config = SimConfig::from_json(
            r#"{
                "frameCount": 4,
                "cpuAlgorithm": "RoundRobin",
                "pageAlgorithm": "LRU",
                "timeQuantum": 3,
                "scenario": "locality",
                "processes": [{ "pid": 9, "pages": [1, 2], "arrivalTime": 5 }]
            }"#,
        )
        .unwrap();
        assert_eq!(config.frame_count, 4);
        assert_eq!(config.cpu_algorithm, CpuAlgorithm::RoundRobin);
        assert_eq!(config.page_algorithm, PageAlgorithm::Lru);
        assert_eq!(config.processes[0], ProcessSpec::new(9, vec![1, 2], 0, 5));
    }

    #[test]
    fn test_lowercase_algorithm_aliases() {
        let config = SimConfig::from_json(r#"{"cpuAlgorithm": "sjf", "pageAlgorithm": "opt"}"#).unwrap();
        assert_eq!(config.cpu_algorithm, CpuAlgorithm::Sjf);
        assert_eq!(config.page_algorithm, PageAlgorithm::Opt);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_eq!(SimConfig::from_json(r#"{"frameCount": 0}"#), Err(SimError::ZeroFrames));
        assert_eq!(SimConfig::from_json(r#"{"timeQuantum": 0}"#), Err(SimError::ZeroQuantum));
        assert!(matches!(
            SimConfig::from_json(r#"{"scenario": "missing"}"#),
            Err(SimError::UnknownScenario(_))
        ));
        assert!(matches!(
            SimConfig::from_json(r#"{"cpuAlgorithm": "lottery"}"#),
            Err(SimError::InvalidConfig(_))
        ));
        assert!(matches!(
            SimConfig::from_json(
                r#"{"processes": [{"pid": 1, "pages": []}, {"pid": 1, "pages": [2]}]}"#
            ),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = SimConfig::default();
        config.processes.push(ProcessSpec::new(1, vec![3, 4], 2, 1));
        let json = config.to_json().unwrap();
        assert_eq!(SimConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            SimConfig::load("/nonexistent/pagesched.json"),
            Err(SimError::Io(_))
        ));
    }
}
