//! Build specification generation
//!
//! - [`environment`]: plain build variables (baseline + caller overrides)
//! - [`secrets`]: build-time secret fetch commands and `$NAME` build args
//! - [`phases`] / [`generator`]: the four-phase command sequence

pub mod args;
pub mod environment;
pub mod generator;
pub mod phases;
pub mod secrets;
pub mod vars;

pub use args::BuildArgument;
pub use environment::{assemble, BuildEnvironment};
pub use generator::{BuildSpecGenerator, GeneratorInput};
pub use phases::commit_tag;
pub use secrets::{forward, BuildSecrets, ForwardedSecrets};
pub use vars::OrderedVars;
