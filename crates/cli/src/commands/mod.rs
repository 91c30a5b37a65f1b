//! Command implementations.

mod run;
mod validate;

pub use run::run_gateway;
pub use validate::run_validate;
