use crate::prelude::*;

pub mod prelude {
    pub use super::{
        feasible,
        min_compute_speed,
        speed_candidates,
        can_run,
        SpeedCandidate,
    };
}

/// A Pareto entry of the per-server speed search: using `bandwidth` units of
/// loading + sending leaves `speeds.compute` as the least computation speed
/// meeting the deadline.
#[derive(Clone, Copy)]
#[derive(Debug)]
pub struct SpeedCandidate {
    pub speeds: SpeedTriple,
    pub bandwidth: u64,
}

/// The deadline feasibility inequality in integer form:
/// S·w·r + s·C·r + s·w·R ≤ d·s·w·r, with every speed at least one.
pub fn feasible(task: &Task, loading: u64, compute: u64, sending: u64) -> bool {
    if loading == 0 || compute == 0 || sending == 0 {
        return false;
    }

    let (s, w, r) = (loading as u128, compute as u128, sending as u128);
    let storage = task.required_storage as u128;
    let computation = task.required_computation as u128;
    let results_data = task.required_results_data as u128;
    let deadline = task.deadline as u128;

    storage * w * r + s * computation * r + s * w * results_data <= deadline * s * w * r
}

/// The least compute speed meeting the deadline for the given loading and
/// sending speeds, or None when no compute speed can.
pub fn min_compute_speed(task: &Task, loading: u64, sending: u64) -> Option<u64> {
    if loading == 0 || sending == 0 {
        return None;
    }

    let (s, r) = (loading as u128, sending as u128);
    let storage = task.required_storage as u128;
    let computation = task.required_computation as u128;
    let results_data = task.required_results_data as u128;
    let deadline = task.deadline as u128;

    // S·w·r + s·C·r + s·w·R ≤ d·s·w·r  ⇔  s·C·r ≤ w·(d·s·r − S·r − s·R)
    let supply = deadline * s * r;
    let demand = storage * r + s * results_data;
    if supply <= demand {
        return None;
    }

    let compute = num::integer::div_ceil(s * computation * r, supply - demand);
    u64::try_from(compute).ok()
}

/// Enumerate the Pareto frontier of (bandwidth, computation) footprints for
/// a task: ascending bandwidth, strictly descending compute speed. Restricting
/// any allocation search to this frontier is lossless since speeds never
/// enter an objective.
pub fn speed_candidates(task: &Task, max_computation: u64, max_bandwidth: u64) -> Vec<SpeedCandidate> {
    let mut candidates: Vec<SpeedCandidate> = Vec::new();

    for bandwidth in 2..=max_bandwidth {
        let best = (1..bandwidth)
            .filter_map(|loading| {
                min_compute_speed(task, loading, bandwidth - loading)
                    .map(|compute| (compute, loading))
            })
            .min();

        if let Some((compute, loading)) = best {
            if compute > max_computation {
                continue;
            }
            if candidates.last().is_none_or(|last| compute < last.speeds.compute) {
                candidates.push(SpeedCandidate {
                    speeds: SpeedTriple { loading, compute, sending: bandwidth - loading },
                    bandwidth,
                });
            }
        }
    }

    candidates
}

/// Holds iff a feasible speed triple exists within the server's available
/// resources (the fixed triple, for a fixed task).
pub fn can_run(task: &Task, server: &Server) -> bool {
    if task.required_storage > server.available_storage {
        return false;
    }

    if let Some(fixed) = task.fixed_speeds {
        return fixed.compute <= server.available_computation &&
            fixed.loading + fixed.sending <= server.available_bandwidth;
    }

    for loading in 1..server.available_bandwidth {
        for sending in 1..=(server.available_bandwidth - loading) {
            if let Some(compute) = min_compute_speed(task, loading, sending) {
                if compute <= server.available_computation {
                    return true;
                }
            }
        }
    }

    false
}

// =============================================================================

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn task() -> Task {
        Task::new("sample", 10, 10, 10, 5.0, 9)
    }

    #[test]
    fn feasibility_matches_the_deadline_inequality() {
        // 10/5 + 10/5 + 10/5 = 6 ≤ 9
        assert!(feasible(&task(), 5, 5, 5));
        // 10/2 + 10/2 + 10/2 = 15 > 9
        assert!(!feasible(&task(), 2, 2, 2));
        assert!(!feasible(&task(), 0, 5, 5));
    }

    #[test]
    fn min_compute_speed_is_tight() {
        let task = task();

        // 10/5 + 10/w + 10/5 ≤ 9 ⇔ w ≥ 2
        assert_eq!(min_compute_speed(&task, 5, 5), Some(2));
        assert!(feasible(&task, 5, 2, 5));
        assert!(!feasible(&task, 5, 1, 5));

        // 10/1 + 10/w + 10/1 = 20 + 10/w > 9 for every w
        assert_eq!(min_compute_speed(&task, 1, 1), None);
    }

    #[test]
    fn candidates_form_a_pareto_frontier() {
        let candidates = speed_candidates(&task(), 100, 100);

        assert!(!candidates.is_empty());
        for pair in candidates.windows(2) {
            assert!(pair[0].bandwidth < pair[1].bandwidth);
            assert!(pair[0].speeds.compute > pair[1].speeds.compute);
        }
        for candidate in &candidates {
            let speeds = candidate.speeds;
            assert_eq!(speeds.loading + speeds.sending, candidate.bandwidth);
            assert!(feasible(&task(), speeds.loading, speeds.compute, speeds.sending));
        }
    }

    #[test]
    fn can_run_respects_available_resources() {
        let task = task();
        let server = Server::new("alpha", 100, 100, 100);
        assert!(can_run(&task, &server));

        let mut starved = Server::new("beta", 100, 100, 100);
        starved.available_storage = 5;
        assert!(!can_run(&task, &starved));

        let mut narrow = Server::new("gamma", 100, 100, 100);
        narrow.available_bandwidth = 3;
        // loading + sending ≤ 3 leaves at best 10/1 + 10/w + 10/2 > 9
        assert!(!can_run(&task, &narrow));
    }

    #[test]
    fn fixed_tasks_use_their_fixed_footprint() {
        let mut task = task();
        task.fixed_speeds = Some(SpeedTriple { loading: 5, compute: 2, sending: 5 });

        let server = Server::new("alpha", 100, 100, 100);
        assert!(can_run(&task, &server));

        let mut narrow = Server::new("beta", 100, 100, 100);
        narrow.available_bandwidth = 9;
        assert!(!can_run(&task, &narrow));
    }
}
