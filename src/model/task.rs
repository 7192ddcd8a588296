use crate::prelude::*;

pub mod prelude {
    pub use super::{
        Task,
        TaskAllocation,
    };
}

/// A compute task: immutable resource requirements plus the mutable
/// allocation state the mechanisms drive.
#[derive(Clone)]
#[derive(Debug)]
#[derive(serde::Serialize)]
pub struct Task {
    pub name: String,
    pub required_storage: u64,
    pub required_computation: u64,
    pub required_results_data: u64,
    pub value: f64,
    pub deadline: u64,

    #[serde(skip)]
    pub fixed_speeds: Option<SpeedTriple>,
    #[serde(skip)]
    pub allocation: Option<TaskAllocation>,
    #[serde(skip)]
    pub price: f64,
}

#[derive(Clone, Copy)]
#[derive(Debug)]
#[derive(PartialEq, Eq)]
pub struct TaskAllocation {
    pub loading_speed: u64,
    pub compute_speed: u64,
    pub sending_speed: u64,
    pub server: ServerId,
}

// =============================================================================

impl Task {
    pub fn new(name: &str, required_storage: u64, required_computation: u64,
               required_results_data: u64, value: f64, deadline: u64) -> Self {
        assert!(required_storage > 0 && required_computation > 0 && required_results_data > 0,
                "{name} requires positive resource requirements");
        assert!(deadline > 0, "{name} requires a positive deadline");
        assert!(value >= 0.0, "{name} requires a non-negative value");

        Self {
            name: name.to_string(),
            required_storage,
            required_computation,
            required_results_data,
            value,
            deadline,
            fixed_speeds: None,
            allocation: None,
            price: 0.0,
        }
    }

    pub fn is_allocated(&self) -> bool {
        self.allocation.is_some()
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed_speeds.is_some()
    }

    /// Sum of the three resource requirements, the denominator of the
    /// resource-normalised priority functions.
    pub fn total_requirements(&self) -> u64 {
        self.required_storage + self.required_computation + self.required_results_data
    }

    pub fn allocated_speeds(&self) -> Option<SpeedTriple> {
        self.allocation.as_ref().map(|allocation| SpeedTriple {
            loading: allocation.loading_speed,
            compute: allocation.compute_speed,
            sending: allocation.sending_speed,
        })
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Task (storage: {}, computation: {}, results data: {}, value: {}, deadline: {})",
               self.name, self.required_storage, self.required_computation,
               self.required_results_data, self.value, self.deadline)
    }
}

#[test]
fn new_task_is_unallocated() {
    let task = Task::new("sample", 10, 20, 5, 4.0, 7);

    assert!(!task.is_allocated());
    assert!(!task.is_fixed());
    assert_eq!(task.price, 0.0);
    assert_eq!(task.total_requirements(), 35);
}
