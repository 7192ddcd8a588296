use crate::prelude::*;

use rand::seq::SliceRandom;

pub mod prelude {
    pub use super::ServerSelection;
}

/// How greedy picks the hosting server among those that can run the task.
/// `Random` is selection-only: it has no value function to call.
#[derive(Clone)]
#[derive(Debug)]
pub enum ServerSelection {
    SumResources { maximise: bool },
    ProductResources { maximise: bool },
    SumExpResources { maximise: bool },
    Random,
    JobSumResources { allocation: ResourceAllocation, maximise: bool },
}

// =============================================================================

impl ServerSelection {
    pub fn name(&self) -> String {
        let (label, maximise) = match self {
            ServerSelection::SumResources { maximise } => ("Sum", maximise),
            ServerSelection::ProductResources { maximise } => ("Product", maximise),
            ServerSelection::SumExpResources { maximise } => ("Exponential Sum", maximise),
            ServerSelection::Random => return "Random".to_string(),
            ServerSelection::JobSumResources { allocation, maximise } =>
                return format!("{} Job Sum of {}",
                               if *maximise { "maximise" } else { "minimise" }, allocation.name()),
        };

        format!("{} {label}", if *maximise { "maximise" } else { "minimise" })
    }

    pub fn select(&self, model: &Model, task: TaskId,
                  rng: &mut rand::rngs::StdRng) -> Option<ServerId> {
        let runnable: Vec<ServerId> = model.server_ids()
            .filter(|server| model.server(*server).can_run(model.task(task)))
            .collect();

        match self {
            ServerSelection::Random => runnable.choose(rng).copied(),
            _ => {
                let score = |server: &ServerId| {
                    ordered_float::OrderedFloat(self.value(model.task(task), model.server(*server)))
                };

                if self.maximise() {
                    runnable.into_iter().max_by_key(score)
                } else {
                    runnable.into_iter().min_by_key(score)
                }
            },
        }
    }

    fn maximise(&self) -> bool {
        match self {
            ServerSelection::SumResources { maximise } |
            ServerSelection::ProductResources { maximise } |
            ServerSelection::SumExpResources { maximise } |
            ServerSelection::JobSumResources { maximise, .. } => *maximise,
            ServerSelection::Random => false,
        }
    }

    fn value(&self, task: &Task, server: &Server) -> f64 {
        match self {
            ServerSelection::SumResources { .. } => server.sum_available_resources() as f64,
            ServerSelection::ProductResources { .. } =>
                server.available_storage as f64 *
                    server.available_computation as f64 *
                    server.available_bandwidth as f64,
            ServerSelection::SumExpResources { .. } =>
                (server.available_storage as f64).exp() +
                    (server.available_computation as f64).exp() +
                    (server.available_bandwidth as f64).exp(),
            ServerSelection::JobSumResources { allocation, .. } => {
                match allocation.allocate(task, server) {
                    Some(speeds) =>
                        task.required_storage as f64 / server.available_storage as f64 +
                            speeds.compute as f64 / server.available_computation as f64 +
                            (speeds.loading + speeds.sending) as f64 / server.available_bandwidth as f64,
                    None => f64::INFINITY,
                }
            },
            ServerSelection::Random => unreachable!("random selection has no value function"),
        }
    }
}

// =============================================================================

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use rand::SeedableRng;

    fn model() -> Model {
        Model::new(
            vec![Task::new("sample", 10, 10, 10, 5.0, 9)],
            vec![
                Server::new("roomy", 100, 100, 100),
                Server::new("snug", 40, 40, 40),
            ],
        )
    }

    #[test]
    fn sum_resources_prefers_the_requested_extreme() {
        let model = model();
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);

        let widest = ServerSelection::SumResources { maximise: true }
            .select(&model, TaskId(0), &mut rng);
        let tightest = ServerSelection::SumResources { maximise: false }
            .select(&model, TaskId(0), &mut rng);

        assert_eq!(widest, Some(ServerId(0)));
        assert_eq!(tightest, Some(ServerId(1)));
    }

    #[test]
    fn only_runnable_servers_are_candidates() {
        let mut model = model();
        model.servers[0].available_storage = 5;
        model.servers[1].available_bandwidth = 3;
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);

        let selected = ServerSelection::SumResources { maximise: true }
            .select(&model, TaskId(0), &mut rng);

        assert_eq!(selected, None);
    }

    #[test]
    fn random_selection_picks_some_runnable_server() {
        let model = model();
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);

        let selected = ServerSelection::Random.select(&model, TaskId(0), &mut rng);

        assert!(selected.is_some());
    }
}
