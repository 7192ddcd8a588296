use crate::prelude::*;
use crate::optimal::placement_footprints;

use rand::Rng;

pub mod prelude {
    pub use super::{
        PriceDensity,
        optimal_decentralised_iterative_auction,
        greedy_decentralised_iterative_auction,
    };
}

/// How the greedy re-pack orders a server's residents when a newcomer must
/// be squeezed in: highest price density is re-inserted first.
#[derive(Clone, Copy)]
#[derive(Debug)]
pub enum PriceDensity {
    ResourcePerDeadline,
}

/// One server's answer to "what would admitting this task cost": the price
/// quote, the fate of each current resident, and the newcomer's speeds.
struct Quote {
    price: f64,
    plan: Vec<(TaskId, Option<SpeedTriple>)>,
    new_speeds: SpeedTriple,
}

// =============================================================================

impl PriceDensity {
    pub fn name(&self) -> &'static str {
        match self {
            PriceDensity::ResourcePerDeadline => "Price * Resource Sum / Deadline",
        }
    }

    pub fn evaluate(&self, task: &Task) -> f64 {
        match self {
            PriceDensity::ResourcePerDeadline =>
                task.price * task.total_requirements() as f64 / task.deadline as f64,
        }
    }
}

/// DIA with the exact re-pack: every quote re-optimises the server's resident
/// set around the forced newcomer.
pub fn optimal_decentralised_iterative_auction(model: &mut Model, limits: &SolveLimits,
                                               rng: &mut rand::rngs::StdRng) -> MechanismResult {
    let start = std::time::Instant::now();
    debug_assert!(model.tasks.iter().all(|task| !task.is_allocated()));

    let outcome = dia_solver(model, rng, |model, task, server| {
        optimal_task_quote(model, task, server, &limits.remaining(start.elapsed()))
    });

    match outcome {
        Ok(rounds) => dia_result("Optimal DIA", model, start.elapsed(), rounds),
        Err(status) => {
            model.reset(true);
            MechanismResult::failed("Optimal DIA", model, start.elapsed(), status).auction()
        },
    }
}

/// DIA with the greedy re-pack: residents are re-inserted in descending
/// price density through the resource allocation policy, dropping whatever
/// no longer fits.
pub fn greedy_decentralised_iterative_auction(model: &mut Model, price_density: PriceDensity,
                                              allocation: &ResourceAllocation,
                                              rng: &mut rand::rngs::StdRng) -> MechanismResult {
    let start = std::time::Instant::now();
    debug_assert!(model.tasks.iter().all(|task| !task.is_allocated()));

    let outcome = dia_solver(model, rng, |model, task, server| {
        Ok(greedy_task_quote(model, task, server, price_density, allocation))
    });

    match outcome {
        Ok(rounds) => dia_result("Greedy DIA", model, start.elapsed(), rounds),
        Err(status) => {
            model.reset(true);
            MechanismResult::failed("Greedy DIA", model, start.elapsed(), status).auction()
        },
    }
}

/// The auction loop. Draw an unallocated task uniformly, gather one quote
/// per server, admit at the cheapest quote when it does not exceed the
/// task's value, otherwise reject with a zero price. Admission re-packs the
/// chosen server and pushes any displaced resident back into the pool with
/// its price cleared.
fn dia_solver<F>(model: &mut Model, rng: &mut rand::rngs::StdRng,
                 mut quote_for: F) -> Result<u64, SolveStatus>
    where F: FnMut(&Model, TaskId, ServerId) -> Result<Option<Quote>, SolveStatus>,
{
    let mut unallocated: Vec<TaskId> = model.task_ids().collect();
    let mut rounds = 0;

    while !unallocated.is_empty() {
        let task = unallocated.remove(rng.gen_range(0..unallocated.len()));

        // cheapest quote wins, first server on ties
        let mut best: Option<(ServerId, Quote)> = None;
        for server in model.server_ids() {
            if let Some(quote) = quote_for(model, task, server)? {
                if best.as_ref().is_none_or(|(_, current)| quote.price < current.price) {
                    best = Some((server, quote));
                }
            }
        }

        match best {
            Some((server, quote)) if quote.price <= model.task(task).value => {
                model.reset_server(server, false);
                for (resident, speeds) in quote.plan {
                    match speeds {
                        Some(speeds) => model.allocate(resident, server, speeds, None),
                        None => {
                            model.tasks[resident.0].price = 0.0;
                            unallocated.push(resident);
                        },
                    }
                }
                model.allocate(task, server, quote.new_speeds, Some(quote.price));
            },
            _ => {
                model.tasks[task.0].price = 0.0;
            },
        }

        rounds += 1;
    }

    Ok(rounds)
}

fn optimal_task_quote(model: &Model, task: TaskId, server: ServerId,
                      limits: &SolveLimits) -> Result<Option<Quote>, SolveStatus> {
    let capacity = ResourceCapacity::full_capacity(model.server(server));
    let residents = model.server(server).resident_tasks.clone();

    // maximise the retained resident prices while forcing the newcomer in
    let mut items: Vec<ProblemItem> = residents.iter()
        .map(|resident| ProblemItem {
            weight: model.task(*resident).price,
            forced: false,
            candidates: vec![placement_footprints(model.task(*resident), &capacity)],
        })
        .collect();
    items.push(ProblemItem {
        weight: 0.0,
        forced: true,
        candidates: vec![placement_footprints(model.task(task), &capacity)],
    });

    let solution = optimize(&AssignmentProblem { items, capacities: vec![capacity] }, limits);
    match solution.status {
        SolveStatus::Infeasible => Ok(None),
        SolveStatus::Unknown => Err(SolveStatus::Unknown),
        SolveStatus::Optimal | SolveStatus::Feasible => {
            let Some((_, new_speeds)) = solution.assignment[residents.len()] else {
                return Err(SolveStatus::Unknown);
            };

            let plan = residents.iter().enumerate()
                .map(|(pos, resident)| (*resident, solution.assignment[pos].map(|(_, speeds)| speeds)))
                .collect();

            Ok(Some(Quote {
                price: task_price(model, server, solution.objective),
                plan,
                new_speeds,
            }))
        },
    }
}

fn greedy_task_quote(model: &Model, task: TaskId, server: ServerId,
                     price_density: PriceDensity, allocation: &ResourceAllocation) -> Option<Quote> {
    let mut scratch = model.server(server).clone();
    scratch.available_storage = scratch.storage_capacity;
    scratch.available_computation = scratch.computation_capacity;
    scratch.available_bandwidth = scratch.bandwidth_capacity;
    scratch.resident_tasks.clear();

    // the newcomer is seated first
    if !scratch.can_run(model.task(task)) {
        return None;
    }
    let new_speeds = allocation.allocate(model.task(task), &scratch)?;
    occupy(&mut scratch, model.task(task), new_speeds);

    let mut residents = model.server(server).resident_tasks.clone();
    residents.sort_by_key(|resident| {
        std::cmp::Reverse(ordered_float::OrderedFloat(price_density.evaluate(model.task(*resident))))
    });

    let mut plan = Vec::with_capacity(residents.len());
    let mut new_revenue = 0.0;
    for resident in residents {
        let kept = scratch.can_run(model.task(resident))
            .then(|| allocation.allocate(model.task(resident), &scratch))
            .flatten();

        if let Some(speeds) = kept {
            occupy(&mut scratch, model.task(resident), speeds);
            new_revenue += model.task(resident).price;
        }
        plan.push((resident, kept));
    }

    Some(Quote {
        price: task_price(model, server, new_revenue),
        plan,
        new_speeds,
    })
}

/// The server's opportunity cost of admission plus its price increment,
/// floored at its initial price.
fn task_price(model: &Model, server: ServerId, new_revenue: f64) -> f64 {
    let old_revenue = model.server_revenue(server);
    let s = model.server(server);

    (old_revenue - new_revenue + s.price_change).max(s.initial_price)
}

fn occupy(scratch: &mut Server, task: &Task, speeds: SpeedTriple) {
    scratch.available_storage -= task.required_storage;
    scratch.available_computation -= speeds.compute;
    scratch.available_bandwidth -= speeds.loading + speeds.sending;
}

fn dia_result(algorithm: &str, model: &Model, solve_time: std::time::Duration,
              rounds: u64) -> MechanismResult {
    let price_changes: std::collections::BTreeMap<String, f64> = model.servers.iter()
        .map(|server| (server.name.clone(), server.price_change))
        .collect();
    let initial_prices: std::collections::BTreeMap<String, f64> = model.servers.iter()
        .map(|server| (server.name.clone(), server.initial_price))
        .collect();

    MechanismResult::new(algorithm, model, solve_time)
        .auction()
        .with_extra("rounds", serde_json::json!(rounds))
        .with_extra("price change", serde_json::json!(price_changes))
        .with_extra("initial price", serde_json::json!(initial_prices))
}

// =============================================================================
