use crate::prelude::*;

pub mod prelude {
    pub use super::TaskPriority;
}

/// The value-density functions greedy sorts by. Closed set with a uniform
/// evaluator; the value-monotone members also expose the inverse map from a
/// density back to the declared value producing it.
#[derive(Clone, Copy)]
#[derive(Debug)]
#[derive(PartialEq, Eq)]
pub enum TaskPriority {
    Value,
    ValuePerResources,
    ValueDeadlinePerResources,
    ResourceSum,
}

// =============================================================================

impl TaskPriority {
    pub fn name(&self) -> &'static str {
        match self {
            TaskPriority::Value => "Value",
            TaskPriority::ValuePerResources => "Value / Resources",
            TaskPriority::ValueDeadlinePerResources => "Value * Deadline / Resources",
            TaskPriority::ResourceSum => "Resource Sum",
        }
    }

    pub fn evaluate(&self, task: &Task) -> f64 {
        match self {
            TaskPriority::Value => task.value,
            TaskPriority::ValuePerResources =>
                task.value / task.total_requirements() as f64,
            TaskPriority::ValueDeadlinePerResources =>
                task.value * task.deadline as f64 / task.total_requirements() as f64,
            TaskPriority::ResourceSum => task.total_requirements() as f64,
        }
    }

    /// The declared value at which the task's density equals `density`.
    /// Defined for the value-monotone members only.
    pub fn inverse(&self, task: &Task, density: f64) -> f64 {
        match self {
            TaskPriority::Value => density,
            TaskPriority::ValuePerResources => density * task.total_requirements() as f64,
            TaskPriority::ValueDeadlinePerResources =>
                density * task.total_requirements() as f64 / task.deadline as f64,
            TaskPriority::ResourceSum => unreachable!("resource sum has no value inverse"),
        }
    }

    /// Non-decreasing in the declared value; the precondition of the
    /// critical-value auction.
    pub fn is_value_monotone(&self) -> bool {
        !matches!(self, TaskPriority::ResourceSum)
    }
}

#[test]
fn densities_scale_with_value() {
    let cheap = Task::new("cheap", 10, 10, 10, 3.0, 5);
    let dear = Task::new("dear", 10, 10, 10, 9.0, 5);

    for priority in [TaskPriority::Value, TaskPriority::ValuePerResources,
                     TaskPriority::ValueDeadlinePerResources] {
        assert!(priority.is_value_monotone());
        assert!(priority.evaluate(&cheap) < priority.evaluate(&dear));

        // inverse maps the density back to the value that produced it
        let density = priority.evaluate(&dear);
        assert!((priority.inverse(&dear, density) - 9.0).abs() < 1e-9);
    }

    assert!(!TaskPriority::ResourceSum.is_value_monotone());
    assert_eq!(TaskPriority::ResourceSum.evaluate(&cheap), 30.0);
}
