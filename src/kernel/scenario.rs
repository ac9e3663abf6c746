//! Built-in workloads
//!
//! Fixed process sets for demonstrating each policy. Loading a scenario only
//! adds processes; algorithm and frame settings are left alone.

use super::config::ProcessSpec;
use super::error::SimError;
use std::str::FromStr;

/// Named fixture workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Three mixed processes arriving over time
    Basic,
    /// Same work, different priorities
    Priority,
    /// One long job ahead of several short ones
    Sjf,
    /// Equal jobs arriving together
    RoundRobin,
    /// Reference strings larger than any sensible frame count
    MemoryIntensive,
    /// Tight loops over a small working set
    Locality,
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Scenario::Basic,
        Scenario::Priority,
        Scenario::Sjf,
        Scenario::RoundRobin,
        Scenario::MemoryIntensive,
        Scenario::Locality,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Basic => "basic",
            Scenario::Priority => "priority",
            Scenario::Sjf => "sjf",
            Scenario::RoundRobin => "round-robin",
            Scenario::MemoryIntensive => "memory-intensive",
            Scenario::Locality => "locality",
        }
    }

    pub fn processes(&self) -> Vec<ProcessSpec> {
        match self {
            Scenario::Basic => vec![
                ProcessSpec::new(1, vec![1, 2, 3, 4, 1, 2], 2, 0),
                ProcessSpec::new(2, vec![5, 6, 5, 7], 1, 2),
                ProcessSpec::new(3, vec![1, 3, 5, 7, 1], 3, 4),
            ],
            Scenario::Priority => vec![
                ProcessSpec::new(1, vec![1, 2, 3, 1], 1, 0),
                ProcessSpec::new(2, vec![4, 5, 4, 5], 5, 0),
                ProcessSpec::new(3, vec![6, 7, 6, 7], 3, 0),
                ProcessSpec::new(4, vec![8, 9, 8, 9], 4, 1),
            ],
            Scenario::Sjf => vec![
                ProcessSpec::new(1, vec![1, 2, 3, 4, 5, 6, 7, 8, 1, 2], 0, 0),
                ProcessSpec::new(2, vec![3, 4], 0, 0),
                ProcessSpec::new(3, vec![5, 6, 5], 0, 0),
                ProcessSpec::new(4, vec![7], 0, 1),
            ],
            Scenario::RoundRobin => vec![
                ProcessSpec::new(1, vec![1, 1, 2, 2, 3, 3], 0, 0),
                ProcessSpec::new(2, vec![4, 4, 5, 5, 6, 6], 0, 0),
                ProcessSpec::new(3, vec![7, 7, 8, 8, 9, 9], 0, 0),
            ],
            Scenario::MemoryIntensive => vec![
                ProcessSpec::new(1, vec![7, 0, 1, 2, 0, 3, 0, 4, 2, 3, 0, 3, 2, 1, 2, 0, 1, 7, 0, 1], 0, 0),
                ProcessSpec::new(2, vec![1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5], 0, 1),
            ],
            Scenario::Locality => vec![
                ProcessSpec::new(1, vec![1, 2, 1, 2, 1, 2, 3, 1, 2, 3], 0, 0),
                ProcessSpec::new(2, vec![4, 4, 5, 4, 5, 4, 5, 5], 0, 0),
            ],
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Scenario::ALL
            .into_iter()
            .find(|sc| sc.name() == wanted)
            .ok_or_else(|| SimError::UnknownScenario(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.name().parse::<Scenario>().unwrap(), scenario);
        }
        assert_eq!("Round_Robin".parse::<Scenario>().unwrap(), Scenario::RoundRobin);
        assert!(matches!(
            "nope".parse::<Scenario>(),
            Err(SimError::UnknownScenario(_))
        ));
    }

    #[test]
    fn test_scenarios_have_unique_pids() {
        for scenario in Scenario::ALL {
            let mut pids: Vec<u32> = scenario.processes().iter().map(|p| p.pid).collect();
            let before = pids.len();
            pids.sort_unstable();
            pids.dedup();
            assert_eq!(pids.len(), before, "{}", scenario);
        }
    }
}
