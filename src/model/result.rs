use crate::prelude::*;

pub mod prelude {
    pub use super::{
        MechanismResult,
        TaskAllocationRecord,
    };
}

/// What one mechanism run produced: welfare, allocation and pricing records,
/// status flags, and the free-form diagnostics map serialised alongside.
#[derive(Clone)]
#[derive(Debug)]
#[derive(serde::Serialize)]
pub struct MechanismResult {
    pub algorithm: String,
    #[serde(rename = "social welfare")]
    pub social_welfare: f64,
    #[serde(rename = "percentage tasks allocated")]
    pub percentage_tasks_allocated: f64,
    #[serde(rename = "solve time")]
    pub solve_time: f64,
    #[serde(rename = "is auction", skip_serializing_if = "Option::is_none")]
    pub is_auction: Option<bool>,
    pub failure: bool,
    #[serde(rename = "solve status", skip_serializing_if = "Option::is_none")]
    pub solve_status: Option<String>,
    #[serde(rename = "task allocations")]
    pub task_allocations: Vec<TaskAllocationRecord>,
    #[serde(rename = "server revenues")]
    pub server_revenues: std::collections::BTreeMap<String, f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone)]
#[derive(Debug)]
#[derive(serde::Serialize)]
pub struct TaskAllocationRecord {
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(rename = "loading speed", skip_serializing_if = "Option::is_none")]
    pub loading_speed: Option<u64>,
    #[serde(rename = "compute speed", skip_serializing_if = "Option::is_none")]
    pub compute_speed: Option<u64>,
    #[serde(rename = "sending speed", skip_serializing_if = "Option::is_none")]
    pub sending_speed: Option<u64>,
    pub price: f64,
}

// =============================================================================

impl MechanismResult {
    /// Capture the model's current allocation state as the outcome of the
    /// named mechanism.
    pub fn new(algorithm: &str, model: &Model, solve_time: std::time::Duration) -> Self {
        let task_allocations = model.tasks.iter()
            .map(|task| TaskAllocationRecord {
                task: task.name.clone(),
                server: task.allocation.as_ref()
                    .map(|allocation| model.server(allocation.server).name.clone()),
                loading_speed: task.allocation.as_ref().map(|allocation| allocation.loading_speed),
                compute_speed: task.allocation.as_ref().map(|allocation| allocation.compute_speed),
                sending_speed: task.allocation.as_ref().map(|allocation| allocation.sending_speed),
                price: task.price,
            })
            .collect();

        let server_revenues = model.server_ids()
            .map(|server| (model.server(server).name.clone(), model.server_revenue(server)))
            .collect();

        Self {
            algorithm: algorithm.to_string(),
            social_welfare: model.social_welfare(),
            percentage_tasks_allocated: model.percentage_tasks_allocated(),
            solve_time: solve_time.as_secs_f64(),
            is_auction: None,
            failure: false,
            solve_status: None,
            task_allocations,
            server_revenues,
            extra: serde_json::Map::new(),
        }
    }

    /// A failure outcome carrying the status that stopped the mechanism.
    pub fn failed(algorithm: &str, model: &Model, solve_time: std::time::Duration,
                  status: SolveStatus) -> Self {
        let mut result = Self::new(algorithm, model, solve_time);
        result.failure = true;
        result.solve_status = Some(status.to_string());
        result
    }

    pub fn auction(mut self) -> Self {
        self.is_auction = Some(true);
        self
    }

    pub fn with_status(mut self, status: SolveStatus) -> Self {
        self.solve_status = Some(status.to_string());
        self
    }

    pub fn with_extra(mut self, key: &str, value: serde_json::Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn pretty_print(&self) {
        println!("{}: social welfare {}, tasks allocated {:.0}%, solve time {:.3} secs{}",
                 self.algorithm, self.social_welfare,
                 100.0 * self.percentage_tasks_allocated, self.solve_time,
                 if self.failure { " (FAILURE)" } else { "" });
    }
}

#[test]
fn results_capture_the_allocation_state() {
    let mut model = Model::new(
        vec![
            Task::new("one", 10, 10, 10, 5.0, 9),
            Task::new("two", 10, 10, 10, 2.0, 9),
        ],
        vec![Server::new("alpha", 100, 100, 100)],
    );
    model.allocate(TaskId(0), ServerId(0), SpeedTriple { loading: 5, compute: 5, sending: 5 }, Some(3.0));

    let result = MechanismResult::new("test", &model, std::time::Duration::from_millis(5)).auction();

    assert_eq!(result.social_welfare, 5.0);
    assert_eq!(result.percentage_tasks_allocated, 0.5);
    assert_eq!(result.is_auction, Some(true));
    assert!(!result.failure);
    assert_eq!(result.task_allocations[0].server.as_deref(), Some("alpha"));
    assert_eq!(result.task_allocations[1].server, None);
    assert_eq!(result.server_revenues["alpha"], 3.0);
}
