pub mod prelude {
    pub use super::feasibility::prelude::*;
    pub use super::problem::prelude::*;
    pub use super::engine::prelude::*;
}

pub mod feasibility;
pub mod problem;
pub mod engine;
