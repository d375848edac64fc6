//! Per-run deployment context.
//!
//! Everything a deployment action needs to reach its target is carried in
//! [`DeployContext`] and threaded explicitly Sequencer → StepRunner →
//! Action. Nothing here is ambient or global; two sequencers in one
//! process can deploy to different targets without sharing state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::TargetId;

/// Context passed to every step execution.
#[derive(Debug, Clone)]
pub struct DeployContext {
    /// The target being deployed to.
    target: TargetId,

    /// Project root; commands run with this as their working directory.
    project_root: PathBuf,

    /// RPC endpoint for the target, if the manifest declares one.
    rpc_url: Option<String>,

    /// Environment variables exported to every action on this target.
    env: HashMap<String, String>,

    /// Default execution deadline for steps that don't set their own.
    default_timeout: Option<Duration>,
}

impl DeployContext {
    /// Create a context for a target rooted at the given project directory.
    pub fn new(target: TargetId, project_root: impl Into<PathBuf>) -> Self {
        Self {
            target,
            project_root: project_root.into(),
            rpc_url: None,
            env: HashMap::new(),
            default_timeout: None,
        }
    }

    /// Set the RPC endpoint.
    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    /// Merge target-level environment variables.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    /// Set the default step timeout.
    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// The target being deployed to.
    pub fn target(&self) -> &TargetId {
        &self.target
    }

    /// Project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// RPC endpoint, if declared.
    pub fn rpc_url(&self) -> Option<&str> {
        self.rpc_url.as_deref()
    }

    /// Target-level environment variables.
    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Default step timeout.
    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout
    }

    /// Environment exported to child processes: target-level variables plus
    /// the `CONVOY_*` identity of this run.
    pub fn child_env(&self) -> HashMap<String, String> {
        let mut env = self.env.clone();
        env.insert("CONVOY_TARGET".to_string(), self.target.name().to_string());
        if let Some(url) = &self.rpc_url {
            env.insert("CONVOY_RPC_URL".to_string(), url.clone());
        }
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_env_exports_target_name() {
        let ctx = DeployContext::new(TargetId::new("sepolia"), "/work");
        let env = ctx.child_env();
        assert_eq!(env.get("CONVOY_TARGET").map(String::as_str), Some("sepolia"));
        assert!(!env.contains_key("CONVOY_RPC_URL"));
    }

    #[test]
    fn child_env_exports_rpc_url_when_set() {
        let ctx = DeployContext::new(TargetId::new("local"), "/work")
            .with_rpc_url("http://127.0.0.1:8545");
        let env = ctx.child_env();
        assert_eq!(
            env.get("CONVOY_RPC_URL").map(String::as_str),
            Some("http://127.0.0.1:8545")
        );
    }

    #[test]
    fn child_env_carries_target_level_vars() {
        let mut vars = HashMap::new();
        vars.insert("CHAIN_ID".to_string(), "31337".to_string());

        let ctx = DeployContext::new(TargetId::new("local"), "/work").with_env(vars);
        let env = ctx.child_env();
        assert_eq!(env.get("CHAIN_ID").map(String::as_str), Some("31337"));
    }

    #[test]
    fn default_timeout_round_trips() {
        let ctx = DeployContext::new(TargetId::new("local"), "/work")
            .with_default_timeout(Some(Duration::from_secs(60)));
        assert_eq!(ctx.default_timeout(), Some(Duration::from_secs(60)));
    }
}
