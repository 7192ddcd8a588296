use crate::prelude::*;

pub mod prelude {
    pub use super::optimize;
}

/// Exact search over an assignment problem: depth-first over items in weight
/// order, bounded by the remaining-weight sum, honouring the wall-clock time
/// limit and relative optimality gap. The single seam every constraint model
/// in the crate is solved through.
pub fn optimize(problem: &AssignmentProblem, limits: &SolveLimits) -> Solution {
    let start = std::time::Instant::now();

    let mut order: Vec<usize> = (0..problem.items.len()).collect();
    order.sort_by(|a, b| {
        let (a, b) = (&problem.items[*a], &problem.items[*b]);
        b.forced.cmp(&a.forced)
            .then(b.weight.partial_cmp(&a.weight).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut suffix_weights = vec![0.0; order.len() + 1];
    for pos in (0..order.len()).rev() {
        suffix_weights[pos] = suffix_weights[pos + 1] + problem.items[order[pos]].weight.max(0.0);
    }

    let any_forced = problem.items.iter().any(|item| item.forced);
    let mut search = Search {
        problem,
        order,
        suffix_weights,
        capacities: problem.capacities.clone(),
        assignment: vec![None; problem.items.len()],
        value: 0.0,
        incumbent: if any_forced {
            None
        } else {
            // the empty assignment is always feasible without forced items
            Some((0.0, vec![None; problem.items.len()]))
        },
        relative_gap: limits.relative_gap,
        deadline: limits.time_limit.map(|limit| start + limit),
        timed_out: false,
    };
    search.explore(0);

    let (status, objective, assignment) = match (search.timed_out, search.incumbent) {
        (false, Some((value, assignment))) => (SolveStatus::Optimal, value, assignment),
        (false, None) => (SolveStatus::Infeasible, 0.0, vec![None; problem.items.len()]),
        (true, Some((value, assignment))) => (SolveStatus::Feasible, value, assignment),
        (true, None) => (SolveStatus::Unknown, 0.0, vec![None; problem.items.len()]),
    };

    Solution { status, objective, assignment, solve_time: start.elapsed() }
}

struct Search<'a> {
    problem: &'a AssignmentProblem,
    order: Vec<usize>,
    suffix_weights: Vec<f64>,
    capacities: Vec<ResourceCapacity>,
    assignment: Vec<Option<(usize, SpeedTriple)>>,
    value: f64,
    incumbent: Option<(f64, Vec<Option<(usize, SpeedTriple)>>)>,
    relative_gap: f64,
    deadline: Option<std::time::Instant>,
    timed_out: bool,
}

impl Search<'_> {
    fn explore(&mut self, pos: usize) {
        if self.timed_out {
            return;
        }
        if let Some(deadline) = self.deadline {
            if std::time::Instant::now() >= deadline {
                self.timed_out = true;
                return;
            }
        }

        if pos == self.order.len() {
            let improves = match &self.incumbent {
                Some((best, _)) => self.value > *best,
                None => true,
            };
            if improves {
                self.incumbent = Some((self.value, self.assignment.clone()));
            }
            return;
        }

        if let Some((best, _)) = &self.incumbent {
            if self.value + self.suffix_weights[pos] <= best + self.relative_gap * best.abs() {
                return;
            }
        }

        let item_pos = self.order[pos];
        let item = &self.problem.items[item_pos];

        for server in 0..self.capacities.len() {
            for candidate in 0..item.candidates[server].len() {
                let footprint = item.candidates[server][candidate];
                if !self.capacities[server].fits(&footprint) {
                    continue;
                }

                self.capacities[server].take(&footprint);
                self.assignment[item_pos] = Some((server, footprint.speeds));
                self.value += item.weight;

                self.explore(pos + 1);

                self.value -= item.weight;
                self.assignment[item_pos] = None;
                self.capacities[server].give_back(&footprint);
            }
        }

        if !item.forced {
            self.explore(pos + 1);
        }
    }
}

// =============================================================================

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn footprint(storage: u64, computation: u64, bandwidth: u64) -> CandidateFootprint {
        CandidateFootprint {
            storage,
            computation,
            bandwidth,
            speeds: SpeedTriple { loading: 1, compute: computation, sending: bandwidth.saturating_sub(1).max(1) },
        }
    }

    #[test]
    fn picks_the_highest_weight_subset() {
        // two items compete for storage; only one fits
        let problem = AssignmentProblem {
            items: vec![
                ProblemItem { weight: 10.0, forced: false, candidates: vec![vec![footprint(10, 5, 5)]] },
                ProblemItem { weight: 3.0, forced: false, candidates: vec![vec![footprint(10, 5, 5)]] },
            ],
            capacities: vec![ResourceCapacity { storage: 10, computation: 100, bandwidth: 100 }],
        };

        let solution = optimize(&problem, &SolveLimits::none());

        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.objective, 10.0);
        assert!(solution.assignment[0].is_some());
        assert!(solution.assignment[1].is_none());
    }

    #[test]
    fn assigns_across_servers() {
        let problem = AssignmentProblem {
            items: vec![
                ProblemItem {
                    weight: 4.0,
                    forced: false,
                    candidates: vec![vec![footprint(10, 5, 5)], vec![footprint(10, 5, 5)]],
                },
                ProblemItem {
                    weight: 6.0,
                    forced: false,
                    candidates: vec![vec![footprint(10, 5, 5)], vec![footprint(10, 5, 5)]],
                },
            ],
            capacities: vec![
                ResourceCapacity { storage: 10, computation: 100, bandwidth: 100 },
                ResourceCapacity { storage: 10, computation: 100, bandwidth: 100 },
            ],
        };

        let solution = optimize(&problem, &SolveLimits::none());

        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.objective, 10.0);
        let servers: Vec<usize> = solution.assignment.iter().map(|a| a.unwrap().0).collect();
        assert_ne!(servers[0], servers[1]);
    }

    #[test]
    fn forced_items_must_be_assigned() {
        let problem = AssignmentProblem {
            items: vec![
                ProblemItem { weight: 10.0, forced: false, candidates: vec![vec![footprint(10, 5, 5)]] },
                ProblemItem { weight: 0.0, forced: true, candidates: vec![vec![footprint(10, 5, 5)]] },
            ],
            capacities: vec![ResourceCapacity { storage: 10, computation: 100, bandwidth: 100 }],
        };

        let solution = optimize(&problem, &SolveLimits::none());

        // admitting the forced item displaces the weighty one
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.objective, 0.0);
        assert!(solution.assignment[0].is_none());
        assert!(solution.assignment[1].is_some());
    }

    #[test]
    fn unplaceable_forced_item_is_infeasible() {
        let problem = AssignmentProblem {
            items: vec![
                ProblemItem { weight: 0.0, forced: true, candidates: vec![vec![footprint(50, 5, 5)]] },
            ],
            capacities: vec![ResourceCapacity { storage: 10, computation: 100, bandwidth: 100 }],
        };

        let solution = optimize(&problem, &SolveLimits::none());

        assert_eq!(solution.status, SolveStatus::Infeasible);
    }

    #[test]
    fn empty_problem_is_optimal_at_zero() {
        let problem = AssignmentProblem { items: vec![], capacities: vec![] };
        let solution = optimize(&problem, &SolveLimits::none());

        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.objective, 0.0);
    }
}
