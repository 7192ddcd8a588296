use crate::prelude::*;
use crate::optimal::{build_problem, optimal_welfare};

pub mod prelude {
    pub use super::{
        vcg_auction,
        fixed_vcg_auction,
    };
}

const PRICE_TOLERANCE: f64 = 1e-9;

/// The VCG auction over the flexible-speed optimum: each winner pays its
/// externality, the welfare the others lose by its presence.
pub fn vcg_auction(model: &mut Model, limits: &SolveLimits) -> MechanismResult {
    vcg_solve("Flexible VCG", model, limits)
}

/// The VCG auction over a fixed-speed population; only the assignment
/// decisions remain, the payments work the same way.
pub fn fixed_vcg_auction(model: &mut Model, limits: &SolveLimits) -> MechanismResult {
    assert!(model.tasks.iter().all(|task| task.is_fixed()),
            "fixed VCG requires a fixed-speed population");

    vcg_solve("Fixed VCG", model, limits)
}

fn vcg_solve(algorithm: &str, model: &mut Model, limits: &SolveLimits) -> MechanismResult {
    let start = std::time::Instant::now();
    debug_assert!(model.tasks.iter().all(|task| !task.is_allocated()));

    let lifted = build_problem(model, None, None);
    let solution = optimize(&lifted.problem, &limits.remaining(start.elapsed()));
    if !solution.status.is_solved() {
        return MechanismResult::failed(algorithm, model, start.elapsed(), solution.status).auction();
    }
    let welfare = solution.objective;

    let mut winners: Vec<(TaskId, ServerId, SpeedTriple)> = Vec::new();
    for (pos, assignment) in solution.assignment.iter().enumerate() {
        if let Some((server_pos, speeds)) = assignment {
            winners.push((lifted.task_ids[pos], lifted.server_ids[*server_pos], *speeds));
        }
    }

    // marginal-absence solve per winner; the payment is the winner's value
    // minus its marginal contribution
    let mut prices: Vec<f64> = Vec::with_capacity(winners.len());
    let mut out_of_range = false;
    for (task, _, _) in &winners {
        let without = match optimal_welfare(model, Some(*task), None, &limits.remaining(start.elapsed())) {
            Ok(without) => without,
            Err(status) =>
                return MechanismResult::failed(algorithm, model, start.elapsed(), status).auction(),
        };

        let value = model.task(*task).value;
        let price = value - (welfare - without);
        if price < -PRICE_TOLERANCE || value + PRICE_TOLERANCE < price {
            // only a sub-solve stopped short of its optimum can produce this
            out_of_range = true;
        }
        prices.push(price.clamp(0.0, value));
    }

    // marginal value of each server under absence
    let mut marginal_values = std::collections::BTreeMap::new();
    for server in model.server_ids() {
        let without = match optimal_welfare(model, None, Some(server), &limits.remaining(start.elapsed())) {
            Ok(without) => without,
            Err(status) =>
                return MechanismResult::failed(algorithm, model, start.elapsed(), status).auction(),
        };

        marginal_values.insert(model.server(server).name.clone(), welfare - without);
    }

    // final solve commits: restore the optimum and stamp prices
    model.reset(true);
    for ((task, server, speeds), price) in winners.iter().zip(prices.iter()) {
        model.allocate(*task, *server, *speeds, Some(*price));
    }

    // the task payments must add up to the marginal-absence revenue of the
    // fleet; a mismatch is flagged, not fatal
    let price_sum: f64 = prices.iter().sum();
    let revenue_sum: f64 = marginal_values.values().sum();
    let tolerance = limits.relative_gap * welfare.abs() + PRICE_TOLERANCE;
    let balanced = (price_sum - revenue_sum).abs() <= tolerance;

    let mut result = MechanismResult::new(algorithm, model, start.elapsed())
        .auction()
        .with_status(solution.status)
        .with_extra("server marginal values", serde_json::json!(marginal_values));
    result.failure = out_of_range || !balanced;
    result
}

// =============================================================================

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    /// Two tasks worth 10 and 3 after one seat: the classic second-price
    /// setting.
    fn second_price_model() -> Model {
        Model::new(
            vec![
                Task::new("high", 50, 10, 10, 10.0, 9),
                Task::new("low", 50, 10, 10, 3.0, 9),
            ],
            vec![Server::new("alpha", 50, 100, 100)],
        )
    }

    #[test]
    fn winner_pays_the_second_price() {
        let mut model = fix_model(&second_price_model(), FixedSpeedPolicy::SumSpeeds).unwrap();

        let result = fixed_vcg_auction(&mut model, &SolveLimits::none());

        assert_eq!(result.social_welfare, 10.0);
        assert!(model.task(TaskId(0)).is_allocated());
        assert!((model.task(TaskId(0)).price - 3.0).abs() < 1e-9);
        assert!(!model.task(TaskId(1)).is_allocated());
        assert_eq!(model.task(TaskId(1)).price, 0.0);

        // the lone server's marginal-absence revenue is the whole optimum,
        // which the 3.0 of collected payments cannot cover: the engine must
        // flag the price-balance mismatch
        let marginal = result.extra["server marginal values"]["alpha"].as_f64().unwrap();
        assert_eq!(marginal, 10.0);
        assert!(result.failure);
    }

    #[test]
    fn flexible_vcg_agrees_on_the_second_price() {
        let mut model = second_price_model();

        let result = vcg_auction(&mut model, &SolveLimits::none());

        assert!((model.task(TaskId(0)).price - 3.0).abs() < 1e-9);
        assert!(result.failure);
    }

    #[test]
    fn payments_are_individually_rational() {
        let mut model = Model::new(
            vec![
                Task::new("one", 15, 25, 10, 12.0, 8),
                Task::new("two", 30, 20, 15, 9.0, 10),
                Task::new("three", 20, 30, 10, 7.0, 9),
            ],
            vec![
                Server::new("a", 40, 30, 25),
                Server::new("b", 35, 40, 30),
            ],
        );

        vcg_auction(&mut model, &SolveLimits::none());

        for task in &model.tasks {
            if task.is_allocated() {
                assert!(task.price <= task.value + 1e-9);
                assert!(task.price >= 0.0);
            }
        }
    }

    #[test]
    fn uncontested_winners_balance_at_zero() {
        // one task per server and every server can host both: nobody's
        // absence costs anything, so payments and marginal revenues agree
        let model = Model::new(
            vec![
                Task::new("one", 10, 10, 10, 5.0, 9),
                Task::new("two", 10, 10, 10, 4.0, 9),
            ],
            vec![
                Server::new("a", 100, 100, 100),
                Server::new("b", 100, 100, 100),
            ],
        );
        let mut fixed = fix_model(&model, FixedSpeedPolicy::SumSpeedPow).unwrap();

        let result = fixed_vcg_auction(&mut fixed, &SolveLimits::none());

        assert!(!result.failure);
        assert_eq!(result.social_welfare, 9.0);
        for task in &fixed.tasks {
            assert!(task.is_allocated());
            assert!(task.price.abs() < 1e-9);
        }
        for (_, marginal) in result.extra["server marginal values"].as_object().unwrap() {
            assert!(marginal.as_f64().unwrap().abs() < 1e-9);
        }
    }
}
