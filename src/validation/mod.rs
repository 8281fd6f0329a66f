pub mod input;
pub mod rules;
pub mod validator;

pub use input::{
    check_build_variables, parse_image_repository_name, parse_repository, parse_resource_name,
    parse_stage, CredentialRef, DeploymentStage, RawRepository, RepositoryReference,
    ValidationError,
};
pub use validator::Validator;
