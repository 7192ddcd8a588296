pub mod prelude {
    pub use super::task::prelude::*;
    pub use super::server::prelude::*;
    pub use super::fixed_task::prelude::*;
    pub use super::result::prelude::*;
    pub use super::distribution::prelude::*;
    pub use super::{
        TaskId,
        ServerId,
        SpeedTriple,
        Model,
        ModelSnapshot,
    };
}

pub mod task;
pub mod server;
pub mod fixed_task;
pub mod result;
pub mod distribution;

use self::task::{Task, TaskAllocation};
use self::server::Server;

#[derive(Clone, Copy)]
#[derive(Debug)]
#[derive(PartialEq, Eq, Hash)]
pub struct TaskId(pub usize);

#[derive(Clone, Copy)]
#[derive(Debug)]
#[derive(PartialEq, Eq, Hash)]
pub struct ServerId(pub usize);

/// A loading / compute / sending speed assignment for a single task.
#[derive(Clone, Copy)]
#[derive(Debug)]
#[derive(PartialEq, Eq)]
pub struct SpeedTriple {
    pub loading: u64,
    pub compute: u64,
    pub sending: u64,
}

/// The population arena. Tasks refer to servers through `ServerId` and
/// servers to their residents through `TaskId`, so the task/server cycle
/// never materialises as references.
#[derive(Clone)]
#[derive(Debug)]
pub struct Model {
    pub tasks: Vec<Task>,
    pub servers: Vec<Server>,
}

/// Allocation state captured on mechanism entry and restored on exit.
#[derive(Clone)]
#[derive(Debug)]
pub struct ModelSnapshot {
    allocations: Vec<Option<TaskAllocation>>,
    prices: Vec<f64>,
}

// =============================================================================

impl Model {
    pub fn new(tasks: Vec<Task>, servers: Vec<Server>) -> Self {
        Self { tasks, servers }
    }

    pub fn task(&self, task: TaskId) -> &Task {
        &self.tasks[task.0]
    }

    pub fn server(&self, server: ServerId) -> &Server {
        &self.servers[server.0]
    }

    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> {
        (0..self.tasks.len()).map(TaskId)
    }

    pub fn server_ids(&self) -> impl Iterator<Item = ServerId> {
        (0..self.servers.len()).map(ServerId)
    }

    /// Allocate a task to a server with the given speeds, updating both sides
    /// of the arena. The caller must have checked `can_run`; violating the
    /// capacity or deadline preconditions is a programmer error.
    pub fn allocate(&mut self, task: TaskId, server: ServerId, speeds: SpeedTriple, price: Option<f64>) {
        let t = &mut self.tasks[task.0];
        let s = &mut self.servers[server.0];

        assert!(t.allocation.is_none(), "{} is already allocated", t.name);
        assert!(t.required_storage <= s.available_storage &&
                speeds.compute <= s.available_computation &&
                speeds.loading + speeds.sending <= s.available_bandwidth,
                "{} does not fit on {}", t.name, s.name);
        debug_assert!(crate::solver::feasibility::feasible(t, speeds.loading, speeds.compute, speeds.sending));
        if let Some(fixed) = t.fixed_speeds {
            debug_assert!(speeds == fixed, "fixed task {} allocated foreign speeds", t.name);
        }

        t.allocation = Some(TaskAllocation {
            loading_speed: speeds.loading,
            compute_speed: speeds.compute,
            sending_speed: speeds.sending,
            server,
        });
        if let Some(price) = price {
            t.price = price;
        }

        s.available_storage -= t.required_storage;
        s.available_computation -= speeds.compute;
        s.available_bandwidth -= speeds.loading + speeds.sending;
        s.resident_tasks.push(task);
    }

    /// Return every task and server to the unallocated state. Prices are
    /// cleared unless `forgot_price` is false.
    pub fn reset(&mut self, forgot_price: bool) {
        for task in self.tasks.iter_mut() {
            task.allocation = None;
            if forgot_price {
                task.price = 0.0;
            }
        }

        for server in self.servers.iter_mut() {
            server.available_storage = server.storage_capacity;
            server.available_computation = server.computation_capacity;
            server.available_bandwidth = server.bandwidth_capacity;
            server.resident_tasks.clear();
        }
    }

    /// Deallocate every task resident on a single server, leaving the other
    /// servers untouched.
    pub fn reset_server(&mut self, server: ServerId, forgot_price: bool) {
        let residents = std::mem::take(&mut self.servers[server.0].resident_tasks);
        for task in residents {
            self.tasks[task.0].allocation = None;
            if forgot_price {
                self.tasks[task.0].price = 0.0;
            }
        }

        let s = &mut self.servers[server.0];
        s.available_storage = s.storage_capacity;
        s.available_computation = s.computation_capacity;
        s.available_bandwidth = s.bandwidth_capacity;
    }

    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            allocations: self.tasks.iter().map(|task| task.allocation.clone()).collect(),
            prices: self.tasks.iter().map(|task| task.price).collect(),
        }
    }

    pub fn restore(&mut self, snapshot: &ModelSnapshot) {
        self.reset(true);
        for (pos, allocation) in snapshot.allocations.iter().enumerate() {
            if let Some(allocation) = allocation {
                self.allocate(
                    TaskId(pos),
                    allocation.server,
                    SpeedTriple {
                        loading: allocation.loading_speed,
                        compute: allocation.compute_speed,
                        sending: allocation.sending_speed,
                    },
                    None,
                );
            }
            self.tasks[pos].price = snapshot.prices[pos];
        }
    }

    pub fn allocated_task_ids(&self) -> Vec<TaskId> {
        self.task_ids()
            .filter(|task| self.task(*task).allocation.is_some())
            .collect()
    }

    /// Sum of values of the allocated tasks.
    pub fn social_welfare(&self) -> f64 {
        self.tasks.iter()
            .filter(|task| task.allocation.is_some())
            .map(|task| task.value)
            .sum()
    }

    pub fn percentage_tasks_allocated(&self) -> f64 {
        if self.tasks.is_empty() {
            0.0
        } else {
            let allocated = self.tasks.iter().filter(|task| task.allocation.is_some()).count();
            allocated as f64 / self.tasks.len() as f64
        }
    }

    pub fn server_revenue(&self, server: ServerId) -> f64 {
        self.servers[server.0].resident_tasks.iter()
            .map(|task| self.tasks[task.0].price)
            .sum()
    }

    pub fn total_revenue(&self) -> f64 {
        self.server_ids().map(|server| self.server_revenue(server)).sum()
    }

    /// Uniform assignment of the two auction parameters across the fleet.
    pub fn set_server_heuristics(&mut self, price_change: f64, initial_price: f64) {
        for server in self.servers.iter_mut() {
            server.price_change = price_change;
            server.initial_price = initial_price;
        }
    }

    /// Holds iff every server capacity bound and every allocated task's
    /// deadline inequality are satisfied.
    pub fn allocation_feasible(&self) -> bool {
        let capacities = self.servers.iter().enumerate().all(|(pos, server)| {
            let residents: Vec<&Task> = server.resident_tasks.iter()
                .map(|task| &self.tasks[task.0])
                .collect();

            let storage: u64 = residents.iter().map(|task| task.required_storage).sum();
            let computation: u64 = residents.iter()
                .map(|task| task.allocation.as_ref().unwrap().compute_speed)
                .sum();
            let bandwidth: u64 = residents.iter()
                .map(|task| {
                    let allocation = task.allocation.as_ref().unwrap();
                    allocation.loading_speed + allocation.sending_speed
                })
                .sum();

            storage <= server.storage_capacity &&
                computation <= server.computation_capacity &&
                bandwidth <= server.bandwidth_capacity &&
                residents.iter().all(|task| task.allocation.as_ref().unwrap().server == ServerId(pos))
        });

        let deadlines = self.tasks.iter().all(|task| {
            match &task.allocation {
                Some(allocation) => crate::solver::feasibility::feasible(
                    task, allocation.loading_speed, allocation.compute_speed, allocation.sending_speed),
                None => true,
            }
        });

        capacities && deadlines
    }
}
