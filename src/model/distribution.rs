use crate::prelude::*;

use rand::Rng;
use rand_distr::StandardNormal;

pub mod prelude {
    pub use super::{
        ModelDistribution,
        TaskDistribution,
        ServerDistribution,
        DistributionParseError,
    };
}

/// A named population recipe: task and server attribute distributions with
/// selection probabilities summing to one per list.
#[derive(Clone)]
#[derive(Debug)]
#[derive(serde::Deserialize)]
pub struct ModelDistribution {
    pub name: String,
    #[serde(rename = "task distributions")]
    pub task_distributions: Vec<TaskDistribution>,
    #[serde(rename = "server distributions")]
    pub server_distributions: Vec<ServerDistribution>,
}

#[derive(Clone)]
#[derive(Debug)]
#[derive(serde::Deserialize)]
pub struct TaskDistribution {
    pub name: String,
    pub probability: f64,
    pub required_storage_mean: f64,
    pub required_storage_std: f64,
    pub required_computation_mean: f64,
    pub required_computation_std: f64,
    pub required_results_data_mean: f64,
    pub required_results_data_std: f64,
    pub value_mean: f64,
    pub value_std: f64,
    pub deadline_mean: f64,
    pub deadline_std: f64,
}

#[derive(Clone)]
#[derive(Debug)]
#[derive(serde::Deserialize)]
pub struct ServerDistribution {
    pub name: String,
    pub probability: f64,
    pub maximum_storage_mean: f64,
    pub maximum_storage_std: f64,
    pub maximum_computation_mean: f64,
    pub maximum_computation_std: f64,
    pub maximum_bandwidth_mean: f64,
    pub maximum_bandwidth_std: f64,
}

#[derive(Debug)]
pub enum DistributionParseError {
    JSONError(serde_json::Error),
    InvalidProbabilities(String),
    InvalidDeviation(String),
}

// =============================================================================

impl ModelDistribution {
    pub fn from_json(data: &str) -> Result<Self, DistributionParseError> {
        let distribution: ModelDistribution = serde_json::from_str(data)?;

        let task_probability: f64 = distribution.task_distributions.iter()
            .map(|dist| dist.probability)
            .sum();
        let server_probability: f64 = distribution.server_distributions.iter()
            .map(|dist| dist.probability)
            .sum();
        if (task_probability - 1.0).abs() > 1e-6 || (server_probability - 1.0).abs() > 1e-6 {
            return Err(DistributionParseError::InvalidProbabilities(distribution.name));
        }

        let task_deviations = distribution.task_distributions.iter()
            .flat_map(|dist| [dist.required_storage_std, dist.required_computation_std,
                              dist.required_results_data_std, dist.value_std, dist.deadline_std])
            .all(|std| std >= 0.0);
        let server_deviations = distribution.server_distributions.iter()
            .flat_map(|dist| [dist.maximum_storage_std, dist.maximum_computation_std,
                              dist.maximum_bandwidth_std])
            .all(|std| std >= 0.0);
        if !task_deviations || !server_deviations {
            return Err(DistributionParseError::InvalidDeviation(distribution.name));
        }

        Ok(distribution)
    }

    /// Sample a population: each entity picks its distribution by cumulative
    /// probability, then draws every attribute as max(1, round(N(μ, σ))).
    pub fn generate(&self, num_tasks: usize, num_servers: usize, rng: &mut rand::rngs::StdRng) -> Model {
        let tasks = (0..num_tasks)
            .map(|pos| {
                let mut prob: f64 = rng.r#gen();
                let dist = self.task_distributions.iter()
                    .find(|dist| {
                        if prob < dist.probability {
                            true
                        } else {
                            prob -= dist.probability;
                            false
                        }
                    })
                    .unwrap_or_else(|| self.task_distributions.last().expect("validated non-empty"));

                dist.create_task(pos, rng)
            })
            .collect();

        let servers = (0..num_servers)
            .map(|pos| {
                let mut prob: f64 = rng.r#gen();
                let dist = self.server_distributions.iter()
                    .find(|dist| {
                        if prob < dist.probability {
                            true
                        } else {
                            prob -= dist.probability;
                            false
                        }
                    })
                    .unwrap_or_else(|| self.server_distributions.last().expect("validated non-empty"));

                dist.create_server(pos, rng)
            })
            .collect();

        Model::new(tasks, servers)
    }
}

impl TaskDistribution {
    pub fn create_task(&self, pos: usize, rng: &mut rand::rngs::StdRng) -> Task {
        Task::new(
            &format!("{} {}", self.name, pos),
            positive_normal(self.required_storage_mean, self.required_storage_std, rng),
            positive_normal(self.required_computation_mean, self.required_computation_std, rng),
            positive_normal(self.required_results_data_mean, self.required_results_data_std, rng),
            positive_normal(self.value_mean, self.value_std, rng) as f64,
            positive_normal(self.deadline_mean, self.deadline_std, rng),
        )
    }
}

impl ServerDistribution {
    pub fn create_server(&self, pos: usize, rng: &mut rand::rngs::StdRng) -> Server {
        Server::new(
            &format!("{} {}", self.name, pos),
            positive_normal(self.maximum_storage_mean, self.maximum_storage_std, rng),
            positive_normal(self.maximum_computation_mean, self.maximum_computation_std, rng),
            positive_normal(self.maximum_bandwidth_mean, self.maximum_bandwidth_std, rng),
        )
    }
}

fn positive_normal(mean: f64, std: f64, rng: &mut rand::rngs::StdRng) -> u64 {
    let noise: f64 = rng.sample(StandardNormal);
    (mean + std * noise).round().max(1.0) as u64
}

impl std::fmt::Display for DistributionParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Model Distribution Error, ")?;
        match self {
            DistributionParseError::JSONError(error) => write!(f, "JSON: {error}")?,
            DistributionParseError::InvalidProbabilities(name) =>
                write!(f, "probabilities of '{name}' do not sum to one")?,
            DistributionParseError::InvalidDeviation(name) =>
                write!(f, "negative standard deviation in '{name}'")?,
        };

        Ok(())
    }
}

impl std::error::Error for DistributionParseError {}

impl From<serde_json::Error> for DistributionParseError {
    fn from(value: serde_json::Error) -> Self {
        Self::JSONError(value)
    }
}

// =============================================================================

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use rand::SeedableRng;

    fn basic_distribution() -> &'static str {
        r#"{
            "name": "basic",
            "task distributions": [
                { "name": "small", "probability": 0.7,
                  "required_storage_mean": 40.0, "required_storage_std": 10.0,
                  "required_computation_mean": 50.0, "required_computation_std": 10.0,
                  "required_results_data_mean": 20.0, "required_results_data_std": 5.0,
                  "value_mean": 30.0, "value_std": 10.0,
                  "deadline_mean": 10.0, "deadline_std": 2.0 },
                { "name": "large", "probability": 0.3,
                  "required_storage_mean": 80.0, "required_storage_std": 20.0,
                  "required_computation_mean": 100.0, "required_computation_std": 20.0,
                  "required_results_data_mean": 40.0, "required_results_data_std": 10.0,
                  "value_mean": 60.0, "value_std": 20.0,
                  "deadline_mean": 12.0, "deadline_std": 3.0 }
            ],
            "server distributions": [
                { "name": "rack", "probability": 1.0,
                  "maximum_storage_mean": 400.0, "maximum_storage_std": 50.0,
                  "maximum_computation_mean": 300.0, "maximum_computation_std": 40.0,
                  "maximum_bandwidth_mean": 200.0, "maximum_bandwidth_std": 30.0 }
            ]
        }"#
    }

    #[test]
    fn generation_is_reproducible_per_seed() {
        let distribution = ModelDistribution::from_json(basic_distribution()).unwrap();

        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let first = distribution.generate(6, 2, &mut rng);
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let second = distribution.generate(6, 2, &mut rng);

        assert_eq!(first.tasks.len(), 6);
        assert_eq!(first.servers.len(), 2);
        for (a, b) in first.tasks.iter().zip(second.tasks.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.required_storage, b.required_storage);
            assert_eq!(a.value, b.value);
            assert_eq!(a.deadline, b.deadline);
        }
    }

    #[test]
    fn sampled_attributes_are_positive() {
        let distribution = ModelDistribution::from_json(basic_distribution()).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);

        let model = distribution.generate(50, 10, &mut rng);

        for task in &model.tasks {
            assert!(task.required_storage >= 1 && task.required_computation >= 1);
            assert!(task.required_results_data >= 1 && task.deadline >= 1);
            assert!(task.value >= 1.0);
        }
        for server in &model.servers {
            assert!(server.storage_capacity >= 1 && server.bandwidth_capacity >= 1);
        }
    }

    #[test]
    fn bad_probabilities_are_rejected() {
        let broken = basic_distribution().replace("0.7", "0.9");

        assert!(matches!(
            ModelDistribution::from_json(&broken),
            Err(DistributionParseError::InvalidProbabilities(_))
        ));
    }
}
