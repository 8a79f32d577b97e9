//! different utility modules used throughout the project
/// terminal logger setup shared by the solvers
pub mod logger;
