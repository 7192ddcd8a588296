use crate::prelude::*;
use crate::optimal::placement_footprints;

use binary_heap_plus::BinaryHeap;
use compare::Compare;

pub mod prelude {
    pub use super::branch_bound_algorithm;
}

/// A frontier node: the tasks before `next` are decided, the rest are free.
/// `bound` is the relaxed optimum of the free tasks against the pooled
/// remaining capacities.
struct Node {
    next: usize,
    assignment: Vec<Option<(ServerId, SpeedTriple)>>,
    capacities: Vec<ResourceCapacity>,
    value: f64,
    bound: f64,
}

/// Best-first ranking: the node whose partial value plus bound is largest
/// comes out of the frontier first.
struct MaxValueBound;

impl Compare<Node> for MaxValueBound {
    fn compare(&self, a: &Node, b: &Node) -> std::cmp::Ordering {
        (a.value + a.bound).partial_cmp(&(b.value + b.bound))
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}

// =============================================================================

/// The alternate exact solver: best-first branch and bound over
/// (task, server | skip) assignments in fixed task order, pruned by the
/// relaxed super-server optimum of every node's remaining tasks.
pub fn branch_bound_algorithm(model: &mut Model, limits: &SolveLimits) -> MechanismResult {
    let start = std::time::Instant::now();
    debug_assert!(model.tasks.iter().all(|task| !task.is_allocated()));

    let tasks: Vec<TaskId> = model.task_ids().collect();
    let root_capacities: Vec<ResourceCapacity> = model.servers.iter()
        .map(ResourceCapacity::of_server)
        .collect();

    let root = Node {
        next: 0,
        assignment: vec![None; tasks.len()],
        capacities: root_capacities.clone(),
        value: 0.0,
        bound: relaxed_bound(model, &tasks, &root_capacities, limits, start),
    };

    let mut frontier = BinaryHeap::from_vec_cmp(vec![root], MaxValueBound);
    let mut incumbent_value = 0.0;
    let mut incumbent: Vec<Option<(ServerId, SpeedTriple)>> = vec![None; tasks.len()];
    let mut timed_out = false;

    while let Some(node) = frontier.pop() {
        if limits.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
            timed_out = true;
            break;
        }
        if incumbent_value >= node.value + node.bound {
            continue;
        }

        if node.next == tasks.len() {
            if node.value > incumbent_value {
                incumbent_value = node.value;
                incumbent = node.assignment;
            }
            continue;
        }

        let task = model.task(tasks[node.next]);
        let free_tasks = &tasks[node.next + 1..];

        for server in 0..node.capacities.len() {
            for footprint in placement_footprints(task, &node.capacities[server]) {
                let mut capacities = node.capacities.clone();
                capacities[server].take(&footprint);

                let mut assignment = node.assignment.clone();
                assignment[node.next] = Some((ServerId(server), footprint.speeds));

                let value = node.value + task.value;
                let bound = relaxed_bound(model, free_tasks, &capacities, limits, start);
                if value + bound > incumbent_value {
                    frontier.push(Node { next: node.next + 1, assignment, capacities, value, bound });
                }
            }
        }

        let skip_bound = relaxed_bound(model, free_tasks, &node.capacities, limits, start);
        if node.value + skip_bound > incumbent_value {
            frontier.push(Node {
                next: node.next + 1,
                assignment: node.assignment,
                capacities: node.capacities,
                value: node.value,
                bound: skip_bound,
            });
        }
    }

    for (pos, assignment) in incumbent.iter().enumerate() {
        if let Some((server, speeds)) = assignment {
            model.allocate(tasks[pos], *server, *speeds, None);
        }
    }

    let status = if timed_out { SolveStatus::Feasible } else { SolveStatus::Optimal };
    MechanismResult::new("Branch & Bound", model, start.elapsed()).with_status(status)
}

/// Relaxed optimum of the free tasks against the pooled remaining
/// capacities; falls back to the plain value sum when the sub-solve cannot
/// finish in the remaining time.
fn relaxed_bound(model: &Model, free_tasks: &[TaskId], capacities: &[ResourceCapacity],
                 limits: &SolveLimits, start: std::time::Instant) -> f64 {
    if free_tasks.is_empty() {
        return 0.0;
    }

    let pooled = ResourceCapacity {
        storage: capacities.iter().map(|capacity| capacity.storage).sum(),
        computation: capacities.iter().map(|capacity| capacity.computation).sum(),
        bandwidth: capacities.iter().map(|capacity| capacity.bandwidth).sum(),
    };

    let items = free_tasks.iter()
        .map(|task| ProblemItem {
            weight: model.task(*task).value,
            forced: false,
            candidates: vec![placement_footprints(model.task(*task), &pooled)],
        })
        .collect();

    let solution = optimize(
        &AssignmentProblem { items, capacities: vec![pooled] },
        &limits.remaining(start.elapsed()),
    );

    if solution.status.is_solved() {
        solution.objective
    } else {
        free_tasks.iter().map(|task| model.task(*task).value).sum()
    }
}

// =============================================================================

#[cfg(test)]
mod tests {
    use super::{MaxValueBound, Node};
    use crate::prelude::*;
    use binary_heap_plus::BinaryHeap;

    fn node(value: f64, bound: f64) -> Node {
        Node { next: 0, assignment: vec![], capacities: vec![], value, bound }
    }

    #[test]
    fn frontier_pops_the_best_node_first() {
        let mut frontier = BinaryHeap::from_vec_cmp(vec![], MaxValueBound);
        frontier.push(node(1.0, 2.0));
        frontier.push(node(4.0, 3.0));
        frontier.push(node(2.0, 2.0));

        let first = frontier.pop().unwrap();
        let second = frontier.pop().unwrap();
        let third = frontier.pop().unwrap();

        assert_eq!(first.value + first.bound, 7.0);
        assert_eq!(second.value + second.bound, 4.0);
        assert_eq!(third.value + third.bound, 3.0);
        assert!(frontier.pop().is_none());
    }

    #[test]
    fn matches_the_flexible_optimum() {
        let tasks = vec![
            Task::new("one", 15, 25, 10, 12.0, 8),
            Task::new("two", 30, 20, 15, 9.0, 10),
            Task::new("three", 20, 30, 10, 7.0, 9),
        ];
        let servers = vec![
            Server::new("a", 40, 30, 25),
            Server::new("b", 35, 40, 30),
        ];
        let mut search_model = Model::new(tasks, servers);
        let mut optimal_model = search_model.clone();

        let search = branch_bound_algorithm(&mut search_model, &SolveLimits::none());
        let optimal = flexible_optimal(&mut optimal_model, &SolveLimits::none());

        assert_eq!(search.social_welfare, optimal.social_welfare);
        assert!(search_model.allocation_feasible());
    }

    #[test]
    fn singleton_allocates_the_only_task() {
        let mut model = Model::new(
            vec![Task::new("solo", 10, 10, 10, 5.0, 9)],
            vec![Server::new("alpha", 100, 100, 100)],
        );

        let result = branch_bound_algorithm(&mut model, &SolveLimits::none());

        assert_eq!(result.social_welfare, 5.0);
        assert!(model.task(TaskId(0)).is_allocated());
    }
}
