pub mod prelude {
    pub use super::vcg::prelude::*;
    pub use super::dia::prelude::*;
    pub use super::critical_value::prelude::*;
}

pub mod vcg;
pub mod dia;
pub mod critical_value;
