use crate::prelude::*;

pub mod prelude {
    pub use super::task_priority::prelude::*;
    pub use super::server_selection::prelude::*;
    pub use super::resource_allocation::prelude::*;
    pub use super::greedy_algorithm;
}

pub mod task_priority;
pub mod server_selection;
pub mod resource_allocation;

/// The deterministic greedy allocator: tasks in descending priority (stable
/// on ties), hosting server by the selection policy, speeds by the resource
/// allocation policy. Feasibility is gated by `can_run`; a task whose
/// selection comes up empty stays unallocated.
pub fn greedy_algorithm(model: &mut Model, priority: TaskPriority, selection: &ServerSelection,
                        allocation: &ResourceAllocation,
                        rng: &mut rand::rngs::StdRng) -> MechanismResult {
    let start = std::time::Instant::now();
    debug_assert!(model.tasks.iter().all(|task| !task.is_allocated()));

    greedy_allocate(model, priority, selection, allocation, rng);

    let algorithm = format!("Greedy {}, {}, {}", priority.name(), selection.name(), allocation.name());
    MechanismResult::new(&algorithm, model, start.elapsed())
}

/// The allocation loop without the result bookkeeping; the critical-value
/// auction re-runs this for its probes.
pub(crate) fn greedy_allocate(model: &mut Model, priority: TaskPriority,
                              selection: &ServerSelection, allocation: &ResourceAllocation,
                              rng: &mut rand::rngs::StdRng) {
    let mut order: Vec<TaskId> = model.task_ids().collect();
    order.sort_by_key(|task| {
        std::cmp::Reverse(ordered_float::OrderedFloat(priority.evaluate(model.task(*task))))
    });

    for task in order {
        let Some(server) = selection.select(model, task, rng) else { continue; };
        let Some(speeds) = allocation.allocate(model.task(task), model.server(server)) else { continue; };

        model.allocate(task, server, speeds, None);
    }
}

// =============================================================================

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use rand::SeedableRng;

    fn rng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::seed_from_u64(0)
    }

    #[test]
    fn allocations_never_violate_capacities_or_deadlines() {
        let mut model = Model::new(
            vec![
                Task::new("one", 30, 40, 20, 12.0, 8),
                Task::new("two", 25, 30, 15, 9.0, 10),
                Task::new("three", 40, 50, 30, 15.0, 6),
                Task::new("four", 20, 20, 10, 5.0, 12),
            ],
            vec![
                Server::new("a", 60, 70, 50),
                Server::new("b", 50, 60, 40),
            ],
        );

        greedy_algorithm(&mut model, TaskPriority::ValuePerResources,
                         &ServerSelection::SumResources { maximise: true },
                         &ResourceAllocation::SumPercentage, &mut rng());

        assert!(model.allocation_feasible());
    }

    #[test]
    fn greedy_welfare_never_exceeds_the_flexible_optimum() {
        let tasks = vec![
            Task::new("one", 15, 25, 10, 12.0, 8),
            Task::new("two", 30, 20, 15, 9.0, 10),
            Task::new("three", 20, 30, 10, 7.0, 9),
        ];
        let servers = vec![
            Server::new("a", 40, 30, 25),
            Server::new("b", 35, 40, 30),
        ];
        let mut greedy_model = Model::new(tasks, servers);
        let mut optimal_model = greedy_model.clone();

        let greedy = greedy_algorithm(&mut greedy_model, TaskPriority::ValueDeadlinePerResources,
                                      &ServerSelection::ProductResources { maximise: false },
                                      &ResourceAllocation::SumPowPercentage, &mut rng());
        let optimal = flexible_optimal(&mut optimal_model, &SolveLimits::none());

        assert!(greedy.social_welfare <= optimal.social_welfare);
    }

    #[test]
    fn equal_priorities_keep_the_input_order() {
        // both tasks have the same density but only one fits
        let mut model = Model::new(
            vec![
                Task::new("first", 50, 10, 10, 10.0, 9),
                Task::new("second", 50, 10, 10, 10.0, 9),
            ],
            vec![Server::new("alpha", 50, 100, 100)],
        );

        greedy_algorithm(&mut model, TaskPriority::ValuePerResources,
                         &ServerSelection::SumResources { maximise: true },
                         &ResourceAllocation::SumPercentage, &mut rng());

        assert!(model.task(TaskId(0)).is_allocated());
        assert!(!model.task(TaskId(1)).is_allocated());
    }

    #[test]
    fn fixed_tasks_are_placed_with_their_pinned_speeds() {
        let model = Model::new(
            vec![Task::new("one", 10, 10, 10, 5.0, 9)],
            vec![Server::new("alpha", 100, 100, 100)],
        );
        let mut fixed = fix_model(&model, FixedSpeedPolicy::SumSpeeds).unwrap();

        greedy_algorithm(&mut fixed, TaskPriority::Value,
                         &ServerSelection::SumResources { maximise: true },
                         &ResourceAllocation::SumPercentage, &mut rng());

        let task = model.tasks[0].clone();
        let pinned = fixed.task(TaskId(0)).fixed_speeds.unwrap();
        assert_eq!(fixed.task(TaskId(0)).allocated_speeds(), Some(pinned));
        assert!(feasible(&task, pinned.loading, pinned.compute, pinned.sending));
    }
}
