//! Manifest schema definitions.
//!
//! These structs map to the `convoy.yml` format:
//!
//! ```yaml
//! version: 1
//! project: token-launch
//! targets:
//!   local:
//!     rpc_url: http://127.0.0.1:8545
//!     env:
//!       CHAIN_ID: "31337"
//! steps:
//!   - index: 0
//!     label: migrations
//!     run: ./deploy.sh migrations
//!     check:
//!       file_exists: deployments/local/Migrations.json
//!   - index: 1
//!     label: issuance
//!     run: ./deploy.sh issuance
//!     check:
//!       command_succeeds: ./probe.sh issuance
//!     timeout_secs: 120
//! ```

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConvoyError, Result};
use crate::registry::{ActionRegistry, Step};
use crate::steps::{CommandAction, ProbeSpec};
use crate::target::{DeployContext, TargetId};

/// Root manifest structure for convoy.yml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Manifest format version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Project name (for display purposes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Declared deployment targets by name.
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,

    /// Ordered deployment steps.
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

fn default_version() -> u32 {
    1
}

/// One declared deployment target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// RPC endpoint exported to deploy commands as CONVOY_RPC_URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,

    /// Environment variables exported to every step on this target.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    /// Default deadline in seconds for steps on this target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// One deployment step declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    /// Unique, strictly increasing index. Gaps are fine.
    pub index: u32,

    /// Human-readable step name.
    pub label: String,

    /// The deployment command. Carries its own signing/transport concerns
    /// (the user's deploy script, a `forge create` invocation, etc).
    pub run: String,

    /// Already-applied probe. Without one the step always looks
    /// unapplied, so crash-resume safety rests on the command's own
    /// idempotence.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_yaml::with::singleton_map"
    )]
    pub check: Option<CheckConfig>,

    /// Step-level environment, merged over the target's.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    /// Step-level deadline in seconds, overriding the target default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Already-applied probe declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckConfig {
    /// Applied when the file or directory exists (relative to the
    /// project root), e.g. a written deployment artifact.
    #[serde(rename = "file_exists")]
    FileExists(String),

    /// Applied when the command exits 0, e.g. a script querying the
    /// target for expected contract code.
    #[serde(rename = "command_succeeds")]
    CommandSucceeds(String),
}

impl Manifest {
    /// Validate the manifest. Collects all errors rather than stopping at
    /// the first, so users can fix multiple issues at once.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.version != 1 {
            problems.push(format!("unsupported manifest version {}", self.version));
        }

        for (name, target) in &self.targets {
            if name.trim().is_empty() {
                problems.push("target with empty name".to_string());
            }
            if let Some(timeout) = target.timeout_secs {
                if timeout == 0 {
                    problems.push(format!("target '{}' has a zero timeout", name));
                }
            }
        }

        for step in &self.steps {
            if step.label.trim().is_empty() {
                problems.push(format!("step {} has an empty label", step.index));
            }
            if step.run.trim().is_empty() {
                problems.push(format!(
                    "step {} ('{}') has an empty run command",
                    step.index, step.label
                ));
            }
            if step.timeout_secs == Some(0) {
                problems.push(format!(
                    "step {} ('{}') has a zero timeout",
                    step.index, step.label
                ));
            }
        }

        if !problems.is_empty() {
            return Err(ConvoyError::ManifestValidation {
                message: problems.join("; "),
            });
        }

        // Index ordering is the registry's construction-time invariant;
        // checking here keeps all configuration errors pre-run.
        let mut prev: Option<(u32, &str)> = None;
        for step in &self.steps {
            if let Some((p, _)) = prev {
                if step.index == p {
                    return Err(ConvoyError::DuplicateIndex {
                        index: step.index,
                        label: step.label.clone(),
                    });
                }
                if step.index < p {
                    return Err(ConvoyError::UnorderedIndex {
                        index: step.index,
                        prev: p,
                        label: step.label.clone(),
                    });
                }
            }
            prev = Some((step.index, &step.label));
        }

        Ok(())
    }

    /// Look up a declared target.
    pub fn target(&self, name: &str) -> Result<&TargetConfig> {
        self.targets
            .get(name)
            .ok_or_else(|| ConvoyError::UnknownTarget {
                name: name.to_string(),
            })
    }

    /// Build the deploy context for a declared target.
    pub fn context_for(
        &self,
        name: &str,
        project_root: impl Into<std::path::PathBuf>,
    ) -> Result<DeployContext> {
        let target = self.target(name)?;
        let mut ctx = DeployContext::new(TargetId::new(name), project_root)
            .with_env(target.env.clone())
            .with_default_timeout(target.timeout_secs.map(Duration::from_secs));
        if let Some(url) = &target.rpc_url {
            ctx = ctx.with_rpc_url(url.clone());
        }
        Ok(ctx)
    }

    /// Compile the step list into an action registry of command-backed
    /// steps.
    pub fn to_registry(&self) -> Result<ActionRegistry> {
        self.validate()?;

        let steps = self
            .steps
            .iter()
            .map(|config| {
                let mut action = CommandAction::new(&config.label, &config.run)
                    .with_env(config.env.clone())
                    .with_timeout(config.timeout_secs.map(Duration::from_secs));
                if let Some(check) = &config.check {
                    action = action.with_probe(check.to_probe());
                }
                Step::new(config.index, &config.label, Box::new(action))
            })
            .collect();

        ActionRegistry::new(steps)
    }
}

impl CheckConfig {
    fn to_probe(&self) -> ProbeSpec {
        match self {
            CheckConfig::FileExists(path) => ProbeSpec::FileExists { path: path.clone() },
            CheckConfig::CommandSucceeds(command) => ProbeSpec::CommandSucceeds {
                command: command.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
version: 1
project: token-launch
targets:
  local:
    rpc_url: http://127.0.0.1:8545
    env:
      CHAIN_ID: "31337"
steps:
  - index: 0
    label: migrations
    run: ./deploy.sh migrations
    check:
      file_exists: deployments/local/Migrations.json
  - index: 1
    label: issuance
    run: ./deploy.sh issuance
    check:
      command_succeeds: ./probe.sh issuance
    timeout_secs: 120
"#;

    #[test]
    fn example_manifest_parses() {
        let manifest: Manifest = serde_yaml::from_str(EXAMPLE).unwrap();
        assert_eq!(manifest.version, 1);
        assert_eq!(manifest.project.as_deref(), Some("token-launch"));
        assert_eq!(manifest.steps.len(), 2);
        assert_eq!(
            manifest.steps[1].check,
            Some(CheckConfig::CommandSucceeds("./probe.sh issuance".into()))
        );
        assert_eq!(manifest.steps[1].timeout_secs, Some(120));
    }

    #[test]
    fn example_manifest_validates_and_compiles() {
        let manifest: Manifest = serde_yaml::from_str(EXAMPLE).unwrap();
        manifest.validate().unwrap();

        let registry = manifest.to_registry().unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.steps()[0].label, "migrations");
    }

    #[test]
    fn context_for_carries_target_config() {
        let manifest: Manifest = serde_yaml::from_str(EXAMPLE).unwrap();
        let ctx = manifest.context_for("local", "/work").unwrap();

        assert_eq!(ctx.target().name(), "local");
        assert_eq!(ctx.rpc_url(), Some("http://127.0.0.1:8545"));
        assert_eq!(ctx.env().get("CHAIN_ID").map(String::as_str), Some("31337"));
    }

    #[test]
    fn unknown_target_is_configuration_error() {
        let manifest: Manifest = serde_yaml::from_str(EXAMPLE).unwrap();
        let err = manifest.context_for("mainnet", "/work").unwrap_err();
        assert!(matches!(err, ConvoyError::UnknownTarget { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn duplicate_index_rejected() {
        let manifest: Manifest = serde_yaml::from_str(
            r#"
steps:
  - { index: 0, label: a, run: "true" }
  - { index: 0, label: b, run: "true" }
"#,
        )
        .unwrap();
        let err = manifest.validate().unwrap_err();
        assert!(matches!(err, ConvoyError::DuplicateIndex { index: 0, .. }));
    }

    #[test]
    fn unordered_index_rejected() {
        let manifest: Manifest = serde_yaml::from_str(
            r#"
steps:
  - { index: 5, label: a, run: "true" }
  - { index: 2, label: b, run: "true" }
"#,
        )
        .unwrap();
        let err = manifest.validate().unwrap_err();
        assert!(matches!(
            err,
            ConvoyError::UnorderedIndex { index: 2, prev: 5, .. }
        ));
    }

    #[test]
    fn empty_run_rejected_with_context() {
        let manifest: Manifest = serde_yaml::from_str(
            r#"
steps:
  - { index: 0, label: token, run: "  " }
"#,
        )
        .unwrap();
        let err = manifest.validate().unwrap_err();
        match err {
            ConvoyError::ManifestValidation { message } => {
                assert!(message.contains("token"));
                assert!(message.contains("empty run"));
            }
            other => panic!("expected ManifestValidation, got {:?}", other),
        }
    }

    #[test]
    fn validation_collects_multiple_problems() {
        let manifest: Manifest = serde_yaml::from_str(
            r#"
steps:
  - { index: 0, label: "", run: "" }
"#,
        )
        .unwrap();
        let err = manifest.validate().unwrap_err();
        match err {
            ConvoyError::ManifestValidation { message } => {
                assert!(message.contains("empty label"));
                assert!(message.contains("empty run"));
            }
            other => panic!("expected ManifestValidation, got {:?}", other),
        }
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: std::result::Result<Manifest, _> = serde_yaml::from_str(
            r#"
steps:
  - { index: 0, label: a, run: "true", retries: 3 }
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn gapped_indices_accepted() {
        let manifest: Manifest = serde_yaml::from_str(
            r#"
steps:
  - { index: 0, label: a, run: "true" }
  - { index: 10, label: b, run: "true" }
"#,
        )
        .unwrap();
        manifest.validate().unwrap();
    }
}
