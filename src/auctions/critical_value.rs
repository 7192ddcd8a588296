use crate::prelude::*;
use crate::greedy::greedy_allocate;

pub mod prelude {
    pub use super::critical_value_auction;
}

/// The second-price analogue over the greedy allocator: everything the
/// greedy allocates is priced at its critical value, the least declared
/// value at which the greedy would still allocate it.
///
/// The priority function must be non-decreasing in the declared value;
/// construction asserts it.
pub fn critical_value_auction(model: &mut Model, priority: TaskPriority,
                              selection: &ServerSelection, allocation: &ResourceAllocation,
                              rng: &mut rand::rngs::StdRng) -> MechanismResult {
    assert!(priority.is_value_monotone(),
            "critical value auction requires a value-monotone priority");

    let start = std::time::Instant::now();
    debug_assert!(model.tasks.iter().all(|task| !task.is_allocated()));

    greedy_allocate(model, priority, selection, allocation, rng);

    let winners: Vec<(TaskId, ServerId, SpeedTriple)> = model.allocated_task_ids().iter()
        .map(|task| {
            let placed = model.task(*task).allocation.as_ref().unwrap();
            (*task, placed.server, model.task(*task).allocated_speeds().unwrap())
        })
        .collect();

    let mut critical_values = Vec::with_capacity(winners.len());
    for (task, _, _) in &winners {
        critical_values.push(critical_value(model, *task, priority, selection, allocation, rng));
    }

    // re-run the winning allocation with the critical values as prices
    model.reset(true);
    for ((task, server, speeds), critical) in winners.iter().zip(critical_values.iter()) {
        model.allocate(*task, *server, *speeds, Some(*critical));
    }

    let algorithm = format!("Critical Value Auction {}, {}, {}",
                            priority.name(), selection.name(), allocation.name());
    MechanismResult::new(&algorithm, model, start.elapsed()).auction()
}

/// The infimum declared value keeping the task allocated. The allocation
/// outcome can only change where the task's density crosses another task's,
/// so the scan runs over the inverse-density candidates in ascending order.
/// Each gap between consecutive candidates is probed at its midpoint as
/// well: a sort tie at the crossing itself may go either way, so the
/// infimum can sit at a candidate that only wins strictly above it.
fn critical_value(model: &mut Model, task: TaskId, priority: TaskPriority,
                  selection: &ServerSelection, allocation: &ResourceAllocation,
                  rng: &mut rand::rngs::StdRng) -> f64 {
    let declared = model.task(task).value;

    let mut candidates: Vec<f64> = model.task_ids()
        .filter(|other| *other != task)
        .map(|other| priority.inverse(model.task(task), priority.evaluate(model.task(other))))
        .filter(|candidate| 0.0 <= *candidate && *candidate <= declared)
        .collect();
    candidates.push(0.0);
    candidates.push(declared);
    candidates.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    candidates.dedup();

    let mut probes: Vec<f64> = Vec::with_capacity(2 * candidates.len());
    for (pos, candidate) in candidates.iter().enumerate() {
        probes.push(*candidate);
        if let Some(next) = candidates.get(pos + 1) {
            probes.push((candidate + next) / 2.0);
        }
    }

    let first_winning = first_satisfying(probes.len(), |pos| {
        model.reset(true);
        model.tasks[task.0].value = probes[pos];
        greedy_allocate(model, priority, selection, allocation, rng);
        model.task(task).is_allocated()
    });

    model.tasks[task.0].value = declared;
    // a winning midpoint pins the infimum to the candidate on its left
    first_winning.map(|pos| candidates[pos / 2]).unwrap_or(declared)
}

// =============================================================================
