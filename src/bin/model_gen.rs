use cra_engine::prelude::*;

use rand::SeedableRng;

#[derive(clap::Parser)]
pub struct Args {
    /// Model distribution file
    #[arg(short='f', value_name="MODEL FILE")]
    pub file: String,

    /// Number of tasks to sample
    #[arg(short='t', value_name="# TASKS", default_value="10")]
    pub tasks: usize,

    /// Number of servers to sample
    #[arg(short='s', value_name="# SERVERS", default_value="3")]
    pub servers: usize,

    /// Seed for the shared random source
    #[arg(long="seed", value_name="SEED", default_value="0")]
    pub seed: u64,
}

fn main() {
    let args = <Args as clap::Parser>::parse();

    let data = std::fs::read_to_string(&args.file).unwrap();
    let distribution = ModelDistribution::from_json(&data).unwrap();

    let mut rng = rand::rngs::StdRng::seed_from_u64(args.seed);
    let model = distribution.generate(args.tasks, args.servers, &mut rng);

    println!("{}", serde_json::to_string_pretty(&serde_json::json!({
        "name": distribution.name,
        "tasks": model.tasks,
        "servers": model.servers,
    })).unwrap());
}
