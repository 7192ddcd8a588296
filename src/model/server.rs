use crate::prelude::*;

pub mod prelude {
    pub use super::{
        Server,
        SuperServer,
    };
}

/// A server: immutable capacities and auction parameters, plus the mutable
/// resident set with its cached available quantities.
#[derive(Clone)]
#[derive(Debug)]
#[derive(serde::Serialize)]
pub struct Server {
    pub name: String,
    pub storage_capacity: u64,
    pub computation_capacity: u64,
    pub bandwidth_capacity: u64,
    pub price_change: f64,
    pub initial_price: f64,

    #[serde(skip)]
    pub available_storage: u64,
    #[serde(skip)]
    pub available_computation: u64,
    #[serde(skip)]
    pub available_bandwidth: u64,
    #[serde(skip)]
    pub resident_tasks: Vec<TaskId>,
}

pub struct SuperServer;

// =============================================================================

impl Server {
    pub fn new(name: &str, storage_capacity: u64, computation_capacity: u64,
               bandwidth_capacity: u64) -> Self {
        assert!(storage_capacity > 0 && computation_capacity > 0 && bandwidth_capacity > 0,
                "{name} requires positive capacities");

        Self {
            name: name.to_string(),
            storage_capacity,
            computation_capacity,
            bandwidth_capacity,
            price_change: 1.0,
            initial_price: 0.0,
            available_storage: storage_capacity,
            available_computation: computation_capacity,
            available_bandwidth: bandwidth_capacity,
            resident_tasks: Vec::new(),
        }
    }

    /// Holds iff some feasible speed triple exists for the task within the
    /// server's currently available resources.
    pub fn can_run(&self, task: &Task) -> bool {
        crate::solver::feasibility::can_run(task, self)
    }

    pub fn sum_available_resources(&self) -> u64 {
        self.available_storage + self.available_computation + self.available_bandwidth
    }
}

impl SuperServer {
    /// The virtual aggregate of a fleet: capacities are the member sums.
    /// Upper bounds any welfare achievable on the real servers.
    pub fn aggregate(servers: &[Server]) -> Server {
        assert!(!servers.is_empty(), "cannot aggregate an empty fleet");

        Server::new(
            "Super Server",
            servers.iter().map(|server| server.storage_capacity).sum(),
            servers.iter().map(|server| server.computation_capacity).sum(),
            servers.iter().map(|server| server.bandwidth_capacity).sum(),
        )
    }
}

impl std::fmt::Display for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Server (storage: {}, computation: {}, bandwidth: {})",
               self.name, self.storage_capacity, self.computation_capacity, self.bandwidth_capacity)
    }
}

#[test]
fn super_server_sums_capacities() {
    let servers = [
        Server::new("a", 10, 20, 30),
        Server::new("b", 5, 10, 15),
    ];

    let aggregate = SuperServer::aggregate(&servers);

    assert_eq!(aggregate.storage_capacity, 15);
    assert_eq!(aggregate.computation_capacity, 30);
    assert_eq!(aggregate.bandwidth_capacity, 45);
}
