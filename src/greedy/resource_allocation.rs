use crate::prelude::*;

use rand::Rng;
use rand_distr::StandardNormal;

pub mod prelude {
    pub use super::ResourceAllocation;
}

/// How a server picks the speed triple for a task it has agreed to run:
/// minimise the evaluator over the feasible grid with
/// loading + sending ≤ available bandwidth and compute ≤ available
/// computation.
#[derive(Clone)]
#[derive(Debug)]
pub enum ResourceAllocation {
    SumPercentage,
    SumPowPercentage,
    SumSpeed,
    DeadlinePercent,
    EvolutionStrategy {
        loading_weight: f64,
        compute_weight: f64,
        sending_weight: f64,
    },
}

// =============================================================================

impl ResourceAllocation {
    /// The CMA-ES style evaluator with weights drawn from the shared RNG.
    pub fn evolution_strategy(rng: &mut rand::rngs::StdRng) -> Self {
        ResourceAllocation::EvolutionStrategy {
            loading_weight: rng.sample(StandardNormal),
            compute_weight: rng.sample(StandardNormal),
            sending_weight: rng.sample(StandardNormal),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResourceAllocation::SumPercentage => "Percent Sum",
            ResourceAllocation::SumPowPercentage => "Pow Percent Sum",
            ResourceAllocation::SumSpeed => "Sum of Speeds",
            ResourceAllocation::DeadlinePercent => "Deadline Percent",
            ResourceAllocation::EvolutionStrategy { .. } => "CMA-ES",
        }
    }

    fn evaluate(&self, task: &Task, server: &Server, speeds: SpeedTriple) -> f64 {
        let (loading, compute, sending) =
            (speeds.loading as f64, speeds.compute as f64, speeds.sending as f64);

        match self {
            ResourceAllocation::SumPercentage =>
                compute / server.available_computation as f64 +
                    (loading + sending) / server.available_bandwidth as f64,
            ResourceAllocation::SumPowPercentage =>
                (compute / server.available_computation as f64).powi(3) +
                    ((loading + sending) / server.available_bandwidth as f64).powi(3),
            ResourceAllocation::SumSpeed => loading + compute + sending,
            ResourceAllocation::DeadlinePercent =>
                (task.required_storage as f64 / loading +
                    task.required_computation as f64 / compute +
                    task.required_results_data as f64 / sending) / task.deadline as f64,
            ResourceAllocation::EvolutionStrategy { loading_weight, compute_weight, sending_weight } =>
                loading_weight * loading + compute_weight * compute + sending_weight * sending,
        }
    }

    /// The evaluator-minimal feasible speed triple on the server, or None
    /// when nothing fits. A fixed task always receives its pinned triple.
    pub fn allocate(&self, task: &Task, server: &Server) -> Option<SpeedTriple> {
        if let Some(fixed) = task.fixed_speeds {
            let fits = fixed.compute <= server.available_computation &&
                fixed.loading + fixed.sending <= server.available_bandwidth;
            return fits.then_some(fixed);
        }

        let mut best: Option<(ordered_float::OrderedFloat<f64>, SpeedTriple)> = None;
        for loading in 1..server.available_bandwidth {
            for sending in 1..=(server.available_bandwidth - loading) {
                let Some(least) = min_compute_speed(task, loading, sending) else { continue; };
                if least > server.available_computation {
                    continue;
                }

                // every evaluator is monotone in the compute speed, so only
                // the two extremes can be optimal for a given split
                for compute in [least, server.available_computation] {
                    let speeds = SpeedTriple { loading, compute, sending };
                    let score = ordered_float::OrderedFloat(self.evaluate(task, server, speeds));
                    if best.is_none_or(|(best_score, _)| score < best_score) {
                        best = Some((score, speeds));
                    }
                }
            }
        }

        best.map(|(_, speeds)| speeds)
    }
}

// =============================================================================
