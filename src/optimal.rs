use crate::prelude::*;

pub mod prelude {
    pub use super::{
        flexible_optimal,
        fixed_optimal,
        relaxed_optimal,
    };
}

/// An assignment problem lifted from a population, remembering which task and
/// server each item/capacity position stands for.
pub(crate) struct ModelProblem {
    pub problem: AssignmentProblem,
    pub task_ids: Vec<TaskId>,
    pub server_ids: Vec<ServerId>,
}

/// Every placement of a task on one server's remaining capacity: its single
/// fixed footprint, or the Pareto frontier of flexible speed choices.
pub(crate) fn placement_footprints(task: &Task, capacity: &ResourceCapacity) -> Vec<CandidateFootprint> {
    if task.required_storage > capacity.storage {
        return Vec::new();
    }

    if let Some(fixed) = task.fixed_speeds {
        let footprint = CandidateFootprint {
            storage: task.required_storage,
            computation: fixed.compute,
            bandwidth: fixed.loading + fixed.sending,
            speeds: fixed,
        };
        if capacity.fits(&footprint) {
            vec![footprint]
        } else {
            Vec::new()
        }
    } else {
        speed_candidates(task, capacity.computation, capacity.bandwidth).iter()
            .map(|candidate| CandidateFootprint {
                storage: task.required_storage,
                computation: candidate.speeds.compute,
                bandwidth: candidate.bandwidth,
                speeds: candidate.speeds,
            })
            .collect()
    }
}

pub(crate) fn build_problem(model: &Model, skip_task: Option<TaskId>,
                            skip_server: Option<ServerId>) -> ModelProblem {
    let server_ids: Vec<ServerId> = model.server_ids()
        .filter(|server| Some(*server) != skip_server)
        .collect();
    let capacities: Vec<ResourceCapacity> = server_ids.iter()
        .map(|server| ResourceCapacity::of_server(model.server(*server)))
        .collect();

    let task_ids: Vec<TaskId> = model.task_ids()
        .filter(|task| Some(*task) != skip_task)
        .collect();
    let items = task_ids.iter()
        .map(|task| ProblemItem {
            weight: model.task(*task).value,
            forced: false,
            candidates: capacities.iter()
                .map(|capacity| placement_footprints(model.task(*task), capacity))
                .collect(),
        })
        .collect();

    ModelProblem {
        problem: AssignmentProblem { items, capacities },
        task_ids,
        server_ids,
    }
}

/// The social welfare of the optimum with a task or server removed, leaving
/// the model untouched. Err carries the status of an unusable solve.
pub(crate) fn optimal_welfare(model: &Model, skip_task: Option<TaskId>, skip_server: Option<ServerId>,
                              limits: &SolveLimits) -> Result<f64, SolveStatus> {
    let lifted = build_problem(model, skip_task, skip_server);
    let solution = optimize(&lifted.problem, limits);

    if solution.status.is_solved() {
        Ok(solution.objective)
    } else {
        Err(solution.status)
    }
}

fn solve_into_model(algorithm: &str, model: &mut Model, limits: &SolveLimits) -> MechanismResult {
    let start = std::time::Instant::now();

    let lifted = build_problem(model, None, None);
    let solution = optimize(&lifted.problem, limits);
    if !solution.status.is_solved() {
        return MechanismResult::failed(algorithm, model, start.elapsed(), solution.status);
    }

    for (pos, assignment) in solution.assignment.iter().enumerate() {
        if let Some((server_pos, speeds)) = assignment {
            model.allocate(lifted.task_ids[pos], lifted.server_ids[*server_pos], *speeds, None);
        }
    }

    MechanismResult::new(algorithm, model, start.elapsed()).with_status(solution.status)
}

/// The flexible-speed combinatorial optimum: joint speed and placement
/// decisions for every (task, server) pair, the crate's welfare upper bound
/// over real fleets.
pub fn flexible_optimal(model: &mut Model, limits: &SolveLimits) -> MechanismResult {
    debug_assert!(model.tasks.iter().all(|task| !task.is_allocated()));

    solve_into_model("Flexible Optimal", model, limits)
}

/// The optimum over fixed tasks: speeds are pinned, only placement remains.
pub fn fixed_optimal(model: &mut Model, limits: &SolveLimits) -> MechanismResult {
    assert!(model.tasks.iter().all(|task| task.is_fixed()),
            "fixed optimal requires a fixed-speed population");
    debug_assert!(model.tasks.iter().all(|task| !task.is_allocated()));

    solve_into_model("Fixed Optimal", model, limits)
}

/// The relaxed optimum against the single SuperServer; an upper bound on the
/// welfare of any allocation to the real fleet.
pub fn relaxed_optimal(model: &Model, limits: &SolveLimits) -> MechanismResult {
    debug_assert!(model.tasks.iter().all(|task| !task.is_allocated()));

    let mut relaxed = Model::new(
        model.tasks.clone(),
        vec![SuperServer::aggregate(&model.servers)],
    );

    solve_into_model("Relaxed", &mut relaxed, limits)
}

// =============================================================================

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn singleton_task_reaches_its_value() {
        let mut model = Model::new(
            vec![Task::new("solo", 10, 10, 10, 5.0, 9)],
            vec![Server::new("alpha", 100, 100, 100)],
        );

        let result = flexible_optimal(&mut model, &SolveLimits::none());

        assert_eq!(result.social_welfare, 5.0);
        assert!(!result.failure);
        assert!(model.allocation_feasible());

        let allocation = model.task(TaskId(0)).allocation.as_ref().unwrap();
        let (s, w, r) = (allocation.loading_speed as f64,
                        allocation.compute_speed as f64,
                        allocation.sending_speed as f64);
        assert!(10.0 / s + 10.0 / w + 10.0 / r <= 9.0);
    }

    #[test]
    fn storage_tie_allocates_exactly_one() {
        let mut model = Model::new(
            vec![
                Task::new("first", 50, 10, 10, 10.0, 9),
                Task::new("second", 50, 10, 10, 10.0, 9),
            ],
            vec![Server::new("alpha", 50, 100, 100)],
        );

        let result = flexible_optimal(&mut model, &SolveLimits::none());

        assert_eq!(result.social_welfare, 10.0);
        let allocated = model.tasks.iter().filter(|task| task.is_allocated()).count();
        assert_eq!(allocated, 1);
    }

    #[test]
    fn relaxed_bounds_the_flexible_optimum() {
        let tasks = vec![
            Task::new("one", 20, 20, 20, 10.0, 6),
            Task::new("two", 20, 20, 20, 8.0, 6),
            Task::new("three", 20, 20, 20, 6.0, 6),
        ];
        let servers = vec![
            Server::new("a", 40, 40, 40),
            Server::new("b", 40, 40, 40),
            Server::new("c", 40, 40, 40),
        ];
        let mut model = Model::new(tasks, servers);

        let relaxed = relaxed_optimal(&model, &SolveLimits::none());
        let flexible = flexible_optimal(&mut model, &SolveLimits::none());

        assert!(relaxed.social_welfare >= flexible.social_welfare);
    }

    #[test]
    fn optima_are_ordered_relaxed_flexible_fixed() {
        let tasks = vec![
            Task::new("one", 15, 25, 10, 12.0, 8),
            Task::new("two", 30, 20, 15, 9.0, 10),
            Task::new("three", 20, 30, 10, 7.0, 9),
        ];
        let servers = vec![
            Server::new("a", 40, 30, 25),
            Server::new("b", 35, 40, 30),
        ];
        let model = Model::new(tasks, servers);

        let relaxed = relaxed_optimal(&model, &SolveLimits::none());

        let mut flexible_model = model.clone();
        let flexible = flexible_optimal(&mut flexible_model, &SolveLimits::none());

        let mut fixed_model = fix_model(&model, FixedSpeedPolicy::SumSpeeds).unwrap();
        let fixed = fixed_optimal(&mut fixed_model, &SolveLimits::none());

        assert!(relaxed.social_welfare >= flexible.social_welfare);
        assert!(flexible.social_welfare >= fixed.social_welfare);
        assert!(flexible_model.allocation_feasible());
        assert!(fixed_model.allocation_feasible());
    }
}
