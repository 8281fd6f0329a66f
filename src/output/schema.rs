//! Build specification schema
//!
//! This module defines the generated build specification: a four-phase
//! declarative command document in the CodeBuild `buildspec` format. Field
//! order is significant and fixed by declaration order, so serializing the
//! same value always yields the same bytes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BUILD_SPEC_VERSION: &str = "0.2";

/// Complete build specification handed to the build project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpec {
    /// Buildspec format version
    pub version: String,
    /// Ordered build phases
    pub phases: BuildPhases,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPhases {
    pub install: PhaseCommands,
    pub pre_build: PhaseCommands,
    pub build: PhaseCommands,
    pub post_build: PhaseCommands,
}

/// Commands executed in order within one phase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseCommands {
    #[serde(default)]
    pub commands: Vec<String>,
}

impl PhaseCommands {
    pub fn new(commands: Vec<String>) -> Self {
        Self { commands }
    }
}

impl BuildPhases {
    /// Phases paired with their buildspec names, in execution order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &PhaseCommands)> {
        [
            ("install", &self.install),
            ("pre_build", &self.pre_build),
            ("build", &self.build),
            ("post_build", &self.post_build),
        ]
        .into_iter()
    }
}

impl BuildSpec {
    pub fn new(phases: BuildPhases) -> Self {
        Self {
            version: BUILD_SPEC_VERSION.to_string(),
            phases,
        }
    }

    /// Every command across all phases, in execution order
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.phases
            .iter()
            .flat_map(|(_, phase)| phase.commands.iter().map(String::as_str))
    }

    /// Serialize the BuildSpec to YAML format
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize BuildSpec to YAML")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize BuildSpec to JSON")
    }
}

impl fmt::Display for BuildSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Build Specification (version {})", self.version)?;
        for (name, phase) in self.phases.iter() {
            writeln!(f, "  {}:", name)?;
            if phase.commands.is_empty() {
                writeln!(f, "    (no commands)")?;
            }
            for cmd in &phase.commands {
                writeln!(f, "    - {}", cmd)?;
            }
        }
        Ok(())
    }
}
