use crate::prelude::*;
use cra_engine::prelude::*;

use rand::SeedableRng;

const DEFAULT_PRICE_CHANGE: f64 = 3.0;
const DEFAULT_INITIAL_PRICE: f64 = 25.0;

/// The auction evaluation sweep: sample `repeat` populations from the model
/// distribution and run the VCG auctions, the decentralised iterative
/// auction and the critical-value grid on each, collecting one JSON record
/// per repeat.
pub fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read_to_string(&args.file)?;
    let distribution = ModelDistribution::from_json(&data)?;

    let mut rng = rand::rngs::StdRng::seed_from_u64(args.seed);
    let limits = SolveLimits::with_time_limit(args.time_limit);

    let run_flexible = matches!(args.extra.as_str(), "" | "full optimal");
    let run_fixed = matches!(args.extra.as_str(), "" | "full optimal" | "fixed optimal");

    let mut records = Vec::with_capacity(args.repeat);
    for repeat in 0..args.repeat {
        println!("Repeat: {repeat}");
        let mut model = distribution.generate(args.tasks, args.servers, &mut rng);
        model.set_server_heuristics(DEFAULT_PRICE_CHANGE, DEFAULT_INITIAL_PRICE);
        print_population(&model);

        let mut record = serde_json::Map::new();
        record.insert("model".to_string(), serde_json::json!({
            "tasks": &model.tasks,
            "servers": &model.servers,
        }));

        if run_flexible {
            let result = vcg_auction(&mut model, &limits);
            store(&mut record, result)?;
            model.reset(true);
        }

        if run_fixed {
            match fix_model(&model, FixedSpeedPolicy::SumSpeedPow) {
                Ok(mut fixed) => {
                    let result = fixed_vcg_auction(&mut fixed, &limits);
                    store(&mut record, result)?;
                },
                Err(err) => eprintln!("Skipping the fixed VCG auction: {err}"),
            }
        }

        let result = optimal_decentralised_iterative_auction(&mut model, &limits, &mut rng);
        store(&mut record, result)?;
        model.reset(true);

        for priority in [TaskPriority::ValuePerResources, TaskPriority::ValueDeadlinePerResources] {
            for selection in [ServerSelection::SumResources { maximise: true },
                              ServerSelection::ProductResources { maximise: true }] {
                for allocation in [ResourceAllocation::SumPercentage,
                                   ResourceAllocation::SumPowPercentage] {
                    let result = critical_value_auction(&mut model, priority, &selection,
                                                        &allocation, &mut rng);
                    store(&mut record, result)?;
                    model.reset(true);
                }
            }
        }

        records.push(serde_json::Value::Object(record));
    }

    let output = serde_json::to_string_pretty(&records)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, output)?;
            println!("Results saved to {path}");
        },
        None => println!("{output}"),
    }

    Ok(())
}

fn store(record: &mut serde_json::Map<String, serde_json::Value>,
         result: MechanismResult) -> Result<(), Box<dyn std::error::Error>> {
    result.pretty_print();
    record.insert(result.algorithm.clone(), serde_json::to_value(&result)?);

    Ok(())
}

fn print_population(model: &Model) {
    println!("Task Name | Storage | Computation | Results Data | Value | Deadline");
    for task in &model.tasks {
        println!("{:^10}|{:^9}|{:^13}|{:^14}|{:^7.1}|{:^9}",
                 task.name, task.required_storage, task.required_computation,
                 task.required_results_data, task.value, task.deadline);
    }

    println!("\nServer Name | Storage | Computation | Bandwidth");
    for server in &model.servers {
        println!("{:^12}|{:^9}|{:^13}|{:^11}",
                 server.name, server.storage_capacity, server.computation_capacity,
                 server.bandwidth_capacity);
    }
    println!();
}
