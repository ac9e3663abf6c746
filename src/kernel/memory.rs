//! Physical frame management and page replacement
//!
//! A fixed array of frames, each empty or holding one page. On a fault the
//! manager fills a free frame or evicts a victim chosen by the configured
//! policy:
//! - FIFO: oldest load still resident
//! - LRU: oldest access still resident
//! - OPT: page whose next use by the faulting process is farthest away
//!
//! `access_order` tracks resident pages oldest-first. FIFO only appends on
//! load; LRU also moves a page to the back on every hit. Its membership always
//! equals the set of occupied frames.

use super::error::{SimError, SimResult};
use super::process::PageNumber;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::str::FromStr;

pub const DEFAULT_FRAME_COUNT: usize = 3;

/// Page replacement policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PageAlgorithm {
    #[default]
    #[serde(rename = "FIFO", alias = "fifo")]
    Fifo,
    #[serde(rename = "LRU", alias = "lru")]
    Lru,
    #[serde(rename = "OPT", alias = "opt", alias = "optimal")]
    Opt,
}

impl PageAlgorithm {
    pub const ALL: [PageAlgorithm; 3] = [PageAlgorithm::Fifo, PageAlgorithm::Lru, PageAlgorithm::Opt];
}

impl std::fmt::Display for PageAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageAlgorithm::Fifo => write!(f, "FIFO"),
            PageAlgorithm::Lru => write!(f, "LRU"),
            PageAlgorithm::Opt => write!(f, "OPT"),
        }
    }
}

impl FromStr for PageAlgorithm {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(PageAlgorithm::Fifo),
            "lru" => Ok(PageAlgorithm::Lru),
            "opt" | "optimal" => Ok(PageAlgorithm::Opt),
            _ => Err(SimError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Outcome of a single page reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResult {
    /// The page that was referenced
    pub page: PageNumber,
    /// True if the page was already resident
    pub hit: bool,
    /// Page evicted to make room, if any
    pub victim: Option<PageNumber>,
    /// Frame now holding the page
    pub frame: usize,
    /// Frame contents after the access (copy)
    pub frames: Vec<Option<PageNumber>>,
}

impl AccessResult {
    pub fn is_fault(&self) -> bool {
        !self.hit
    }
}

/// Memory statistics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub page_faults: u64,
    pub page_hits: u64,
    pub total_accesses: u64,
    /// Percentage, 0 when nothing has been accessed
    pub fault_rate: f64,
    /// Percentage, 0 when nothing has been accessed
    pub hit_rate: f64,
}

/// Owner of the physical frames
#[derive(Debug, Clone)]
pub struct MemoryManager {
    /// Frame slots; `None` is a free frame
    frames: Vec<Option<PageNumber>>,
    /// Resident pages, oldest first
    access_order: VecDeque<PageNumber>,
    page_faults: u64,
    page_hits: u64,
    algorithm: PageAlgorithm,
}

impl MemoryManager {
    /// Create a manager with `frame_count` empty frames
    pub fn new(frame_count: usize, algorithm: PageAlgorithm) -> SimResult<Self> {
        if frame_count == 0 {
            return Err(SimError::ZeroFrames);
        }
        Ok(Self {
            frames: vec![None; frame_count],
            access_order: VecDeque::with_capacity(frame_count),
            page_faults: 0,
            page_hits: 0,
            algorithm,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Option<PageNumber>] {
        &self.frames
    }

    pub fn access_order(&self) -> impl Iterator<Item = PageNumber> + '_ {
        self.access_order.iter().copied()
    }

    pub fn algorithm(&self) -> PageAlgorithm {
        self.algorithm
    }

    /// Change policy; applies from the next fault
    pub fn set_algorithm(&mut self, algorithm: PageAlgorithm) {
        self.algorithm = algorithm;
    }

    pub fn is_page_in_memory(&self, page: PageNumber) -> bool {
        self.frame_of(page).is_some()
    }

    fn frame_of(&self, page: PageNumber) -> Option<usize> {
        self.frames.iter().position(|f| *f == Some(page))
    }

    /// Reference `page`, loading it on a fault
    ///
    /// `future_accesses` is the faulting process's remaining reference string;
    /// only OPT reads it.
    pub fn access_page(&mut self, page: PageNumber, future_accesses: &[PageNumber]) -> AccessResult {
        if let Some(frame) = self.frame_of(page) {
            self.page_hits += 1;
            if self.algorithm == PageAlgorithm::Lru {
                self.touch(page);
            }
            return AccessResult {
                page,
                hit: true,
                victim: None,
                frame,
                frames: self.frames.clone(),
            };
        }

        self.page_faults += 1;

        if let Some(frame) = self.frames.iter().position(Option::is_none) {
            self.frames[frame] = Some(page);
            self.access_order.push_back(page);
            return AccessResult {
                page,
                hit: false,
                victim: None,
                frame,
                frames: self.frames.clone(),
            };
        }

        let victim = self.victim_frame(future_accesses);
        debug_assert!(victim.is_some(), "memory is full but no resident victim was found");
        // Every slot is occupied here, so slot 0 is a valid fallback
        let frame = victim.unwrap_or(0);
        let evicted = self.frames[frame].replace(page);
        if let Some(old) = evicted {
            self.access_order.retain(|&p| p != old);
        }
        self.access_order.push_back(page);

        AccessResult {
            page,
            hit: false,
            victim: evicted,
            frame,
            frames: self.frames.clone(),
        }
    }

    /// Move a resident page to the most-recent end
    fn touch(&mut self, page: PageNumber) {
        if let Some(pos) = self.access_order.iter().position(|&p| p == page) {
            self.access_order.remove(pos);
            self.access_order.push_back(page);
        }
    }

    fn victim_frame(&self, future_accesses: &[PageNumber]) -> Option<usize> {
        self.select_victim_page(future_accesses)
            .and_then(|victim| self.frame_of(victim))
    }

    /// Choose the page to evict under the current policy
    pub fn select_victim_page(&self, future_accesses: &[PageNumber]) -> Option<PageNumber> {
        match self.algorithm {
            // Same queue, different maintenance: load order vs recency order
            PageAlgorithm::Fifo | PageAlgorithm::Lru => self
                .access_order
                .iter()
                .copied()
                .find(|&p| self.is_page_in_memory(p)),
            PageAlgorithm::Opt => self.optimal_victim(future_accesses),
        }
    }

    fn optimal_victim(&self, future_accesses: &[PageNumber]) -> Option<PageNumber> {
        let mut victim = None;
        let mut farthest = 0;

        for page in self.frames.iter().flatten().copied() {
            match future_accesses.iter().position(|&p| p == page) {
                // Never used again
                None => return Some(page),
                Some(next_use) => {
                    if victim.is_none() || next_use > farthest {
                        victim = Some(page);
                        farthest = next_use;
                    }
                }
            }
        }

        victim
    }

    pub fn get_statistics(&self) -> MemoryStats {
        let total = self.page_faults + self.page_hits;
        let (fault_rate, hit_rate) = if total == 0 {
            (0.0, 0.0)
        } else {
            (
                self.page_faults as f64 / total as f64 * 100.0,
                self.page_hits as f64 / total as f64 * 100.0,
            )
        };
        MemoryStats {
            page_faults: self.page_faults,
            page_hits: self.page_hits,
            total_accesses: total,
            fault_rate,
            hit_rate,
        }
    }

    /// Empty every frame and clear counters; keeps policy and frame count
    pub fn reset(&mut self) {
        self.frames.iter_mut().for_each(|f| *f = None);
        self.access_order.clear();
        self.page_faults = 0;
        self.page_hits = 0;
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self {
            frames: vec![None; DEFAULT_FRAME_COUNT],
            access_order: VecDeque::with_capacity(DEFAULT_FRAME_COUNT),
            page_faults: 0,
            page_hits: 0,
            algorithm: PageAlgorithm::default(),
        }
    }
}
