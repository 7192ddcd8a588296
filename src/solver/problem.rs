use crate::prelude::*;

pub mod prelude {
    pub use super::{
        AssignmentProblem,
        ProblemItem,
        CandidateFootprint,
        ResourceCapacity,
        SolveLimits,
        SolveStatus,
        Solution,
    };
}

/// Remaining storage / computation / bandwidth of one server.
#[derive(Clone, Copy)]
#[derive(Debug)]
pub struct ResourceCapacity {
    pub storage: u64,
    pub computation: u64,
    pub bandwidth: u64,
}

/// One way of placing an item on one server: the resources it consumes and
/// the speed triple realising them.
#[derive(Clone, Copy)]
#[derive(Debug)]
pub struct CandidateFootprint {
    pub storage: u64,
    pub computation: u64,
    pub bandwidth: u64,
    pub speeds: SpeedTriple,
}

/// An assignable item: objective weight plus, per server, the footprints it
/// may be placed with. A forced item must be assigned in any solution.
#[derive(Clone)]
#[derive(Debug)]
pub struct ProblemItem {
    pub weight: f64,
    pub forced: bool,
    pub candidates: Vec<Vec<CandidateFootprint>>,
}

/// The one model every mechanism compiles to: maximise the weight sum of
/// assigned items subject to at-most-one-server per item and the per-server
/// capacity bounds.
#[derive(Clone)]
#[derive(Debug)]
pub struct AssignmentProblem {
    pub items: Vec<ProblemItem>,
    pub capacities: Vec<ResourceCapacity>,
}

#[derive(Clone, Copy)]
#[derive(Debug)]
pub struct SolveLimits {
    pub time_limit: Option<std::time::Duration>,
    pub relative_gap: f64,
}

#[derive(Clone, Copy)]
#[derive(Debug)]
#[derive(PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
}

#[derive(Clone)]
#[derive(Debug)]
pub struct Solution {
    pub status: SolveStatus,
    pub objective: f64,
    pub assignment: Vec<Option<(usize, SpeedTriple)>>,
    pub solve_time: std::time::Duration,
}

// =============================================================================

impl ResourceCapacity {
    pub fn of_server(server: &Server) -> Self {
        Self {
            storage: server.available_storage,
            computation: server.available_computation,
            bandwidth: server.available_bandwidth,
        }
    }

    pub fn full_capacity(server: &Server) -> Self {
        Self {
            storage: server.storage_capacity,
            computation: server.computation_capacity,
            bandwidth: server.bandwidth_capacity,
        }
    }

    pub fn fits(&self, footprint: &CandidateFootprint) -> bool {
        footprint.storage <= self.storage &&
            footprint.computation <= self.computation &&
            footprint.bandwidth <= self.bandwidth
    }

    pub fn take(&mut self, footprint: &CandidateFootprint) {
        self.storage -= footprint.storage;
        self.computation -= footprint.computation;
        self.bandwidth -= footprint.bandwidth;
    }

    pub fn give_back(&mut self, footprint: &CandidateFootprint) {
        self.storage += footprint.storage;
        self.computation += footprint.computation;
        self.bandwidth += footprint.bandwidth;
    }
}

impl SolveLimits {
    pub fn none() -> Self {
        Self { time_limit: None, relative_gap: 0.0 }
    }

    pub fn with_time_limit(seconds: u64) -> Self {
        Self { time_limit: Some(std::time::Duration::from_secs(seconds)), relative_gap: 0.0 }
    }

    /// The limits left for a sub-solve after `elapsed` has been spent on the
    /// overall budget.
    pub fn remaining(&self, elapsed: std::time::Duration) -> Self {
        Self {
            time_limit: self.time_limit.map(|limit| limit.saturating_sub(elapsed)),
            relative_gap: self.relative_gap,
        }
    }
}

impl Default for SolveLimits {
    fn default() -> Self {
        Self::none()
    }
}

impl SolveStatus {
    /// A usable allocation exists (proved optimal or best-so-far at timeout).
    pub fn is_solved(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "OPTIMAL"),
            SolveStatus::Feasible => write!(f, "FEASIBLE"),
            SolveStatus::Infeasible => write!(f, "INFEASIBLE"),
            SolveStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
