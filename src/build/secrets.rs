//! Build secret forwarding
//!
//! Secrets are resolved by the build itself, at build time, into shell
//! variables that live only for the duration of the build step. The generated
//! build specification only ever carries the secret *identifier* and a
//! `$NAME` reference, so it is safe to log and store.
//!
//! Each secret `NAME -> ID` produces:
//!
//! ```text
//! NAME="$(aws secretsmanager get-secret-value --secret-id ID | jq .SecretString | xargs echo)"
//! --build-arg=NAME="$NAME"
//! ```
//!
//! The variable is assigned without `export`, so it is never written into the
//! persisted build environment and is not inherited by unrelated processes.

use super::args::BuildArgument;
use super::vars::OrderedVars;
use serde::Serialize;
use tracing::debug;

/// Ordered mapping of environment variable name to secret store identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BuildSecrets(OrderedVars);

impl BuildSecrets {
    pub fn new(vars: OrderedVars) -> Self {
        Self(vars)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<OrderedVars> for BuildSecrets {
    fn from(vars: OrderedVars) -> Self {
        Self(vars)
    }
}

/// Shell fragments that forward secrets into the image build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardedSecrets {
    /// One fetch-and-bind command per secret, in mapping order
    pub fetch_commands: Vec<String>,
    /// One `$NAME` build argument per secret, in mapping order
    pub build_args: Vec<BuildArgument>,
}

/// Command that fetches `secret_id` and binds it to the local shell variable `name`.
pub fn fetch_command(name: &str, secret_id: &str) -> String {
    format!(
        "{}=\"$(aws secretsmanager get-secret-value --secret-id {} | jq .SecretString | xargs echo)\"",
        name, secret_id
    )
}

pub fn forward(secrets: &BuildSecrets) -> ForwardedSecrets {
    let mut forwarded = ForwardedSecrets::default();
    for (name, secret_id) in secrets.iter() {
        debug!(name, secret_id, "Forwarding build secret");
        forwarded.fetch_commands.push(fetch_command(name, secret_id));
        forwarded
            .build_args
            .push(BuildArgument::secret_reference(name));
    }
    forwarded
}
