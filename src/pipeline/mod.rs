pub mod assembler;
pub mod context;
pub mod definition;

pub use assembler::PipelineAssembler;
pub use context::{SynthContext, ValidatedInput};
pub use definition::{ImageRepository, PipelineDefinition, PipelineStage};

use crate::config::{DeployTarget, PipelineInput};
use crate::error::SynthError;

/// Validates `input` and assembles its pipeline definition with the default
/// generator and checks.
pub fn synthesize(
    input: &PipelineInput,
    target: DeployTarget,
) -> Result<PipelineDefinition, SynthError> {
    let ctx = SynthContext::from_input(input, target)?;
    PipelineAssembler::default().assemble(&ctx)
}
