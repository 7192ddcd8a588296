use crate::prelude::*;

pub mod prelude {
    pub use super::{
        FixedSpeedPolicy,
        FixedTaskError,
        fixed_speeds,
        fix_model,
    };
}

/// The functional a fixed task minimises when choosing its permanent speed
/// triple. Closed set; every member is increasing in each speed.
#[derive(Clone, Copy)]
#[derive(Debug)]
#[derive(PartialEq, Eq)]
pub enum FixedSpeedPolicy {
    SumSpeeds,
    SumSpeedPow,
}

#[derive(Clone)]
#[derive(Debug)]
pub enum FixedTaskError {
    InfeasibleTask(String),
    AllocatedTask(String),
}

// =============================================================================

impl FixedSpeedPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            FixedSpeedPolicy::SumSpeeds => "Sum Speeds",
            FixedSpeedPolicy::SumSpeedPow => "Sum Speed Powers",
        }
    }

    pub fn evaluate(&self, speeds: SpeedTriple) -> f64 {
        match self {
            FixedSpeedPolicy::SumSpeeds =>
                (speeds.loading + speeds.compute + speeds.sending) as f64,
            FixedSpeedPolicy::SumSpeedPow =>
                (speeds.loading as f64).powi(3) + (speeds.compute as f64).powi(3) +
                    (speeds.sending as f64).powi(3),
        }
    }
}

/// The speed triple minimising the policy subject to the deadline
/// inequality, searched against the fleet-wide maximum capacities. None when
/// the task cannot meet its deadline on any server.
pub fn fixed_speeds(task: &Task, servers: &[Server], policy: FixedSpeedPolicy) -> Option<SpeedTriple> {
    let max_bandwidth = servers.iter().map(|server| server.bandwidth_capacity).max()?;
    let max_computation = servers.iter().map(|server| server.computation_capacity).max()?;

    let mut best: Option<(ordered_float::OrderedFloat<f64>, SpeedTriple)> = None;
    for loading in 1..max_bandwidth {
        for sending in 1..max_bandwidth {
            let Some(compute) = min_compute_speed(task, loading, sending) else { continue; };
            if compute > max_computation {
                continue;
            }

            let speeds = SpeedTriple { loading, compute, sending };
            let score = ordered_float::OrderedFloat(policy.evaluate(speeds));
            if best.is_none_or(|(best_score, _)| score < best_score) {
                best = Some((score, speeds));
            }
        }
    }

    best.map(|(_, speeds)| speeds)
}

/// Produce the fixed-speed rendition of a population: each task's speed
/// triple is pinned by the policy and its name prefixed, after which only
/// the assignment decision remains.
pub fn fix_model(model: &Model, policy: FixedSpeedPolicy) -> Result<Model, FixedTaskError> {
    let mut fixed = model.clone();

    for task in fixed.tasks.iter_mut() {
        if task.is_allocated() {
            return Err(FixedTaskError::AllocatedTask(task.name.clone()));
        }

        task.fixed_speeds = Some(
            fixed_speeds(task, &model.servers, policy)
                .ok_or_else(|| FixedTaskError::InfeasibleTask(task.name.clone()))?
        );
        task.name = format!("Fixed {}", task.name);
        task.price = 0.0;
    }

    Ok(fixed)
}

impl std::fmt::Display for FixedTaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixedTaskError::InfeasibleTask(name) =>
                write!(f, "{name} Task cannot meet its deadline on any server"),
            FixedTaskError::AllocatedTask(name) =>
                write!(f, "{name} Task is still allocated"),
        }
    }
}

impl std::error::Error for FixedTaskError {}

// =============================================================================

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn sum_speeds_finds_a_minimal_feasible_triple() {
        let task = Task::new("sample", 10, 10, 10, 5.0, 9);
        let servers = [Server::new("alpha", 100, 100, 100)];

        let speeds = fixed_speeds(&task, &servers, FixedSpeedPolicy::SumSpeeds).unwrap();

        assert!(feasible(&task, speeds.loading, speeds.compute, speeds.sending));
        // exhaustively, no feasible triple sums below 11 for this task
        assert_eq!(speeds.loading + speeds.compute + speeds.sending, 11);
    }

    #[test]
    fn fixing_a_model_pins_every_task() {
        let model = Model::new(
            vec![Task::new("one", 10, 10, 10, 5.0, 9)],
            vec![Server::new("alpha", 100, 100, 100)],
        );

        let fixed = fix_model(&model, FixedSpeedPolicy::SumSpeedPow).unwrap();

        assert!(fixed.tasks[0].is_fixed());
        assert_eq!(fixed.tasks[0].name, "Fixed one");
        assert!(!model.tasks[0].is_fixed());
    }

    #[test]
    fn hopeless_deadline_is_rejected() {
        let model = Model::new(
            vec![Task::new("tight", 1000, 1000, 1000, 5.0, 1)],
            vec![Server::new("alpha", 10, 10, 10)],
        );

        assert!(matches!(
            fix_model(&model, FixedSpeedPolicy::SumSpeeds),
            Err(FixedTaskError::InfeasibleTask(_))
        ));
    }
}
