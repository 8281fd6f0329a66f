pub mod schema;

pub use schema::{BuildPhases, BuildSpec, PhaseCommands};
