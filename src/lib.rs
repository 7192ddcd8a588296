pub mod prelude {
    pub use super::common::prelude::*;
    pub use super::model::prelude::*;
    pub use super::solver::prelude::*;
    pub use super::optimal::prelude::*;
    pub use super::greedy::prelude::*;
    pub use super::auctions::prelude::*;
    pub use super::branch_bound::prelude::*;
}

pub mod common;
pub mod model;
pub mod solver;
pub mod optimal;
pub mod greedy;
pub mod auctions;
pub mod branch_bound;
