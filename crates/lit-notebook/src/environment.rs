//! Execution environment detection.
//!
//! Decides once per process whether the kernel runs inside a hosted
//! runtime that can proxy local ports to the browser, or inside a generic
//! local notebook where the front-end reaches the server directly.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::render::{EmbedRenderer, HostedProxyRenderer, LocalFrameRenderer};

/// Variable exported by hosted Colab kernels.
pub const HOSTED_MARKER_VAR: &str = "COLAB_RELEASE_TAG";

/// Variable that forces the detected environment (`hosted` or `local`).
pub const OVERRIDE_VAR: &str = "LIT_NOTEBOOK_ENVIRONMENT";

static DETECTED: OnceLock<ExecutionEnvironment> = OnceLock::new();

/// Where the notebook kernel is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionEnvironment {
    /// Hosted runtime with a port-proxying API in the browser.
    HostedProxyCapable,
    /// Local notebook sharing a reachable host with the server.
    GenericLocal,
}

impl ExecutionEnvironment {
    /// Detect the environment of this process.
    ///
    /// The result is computed on first call and reused afterwards.
    pub fn detect() -> Self {
        *DETECTED.get_or_init(|| {
            let env = Self::detect_with(|key| std::env::var(key).ok());
            tracing::debug!(?env, "Detected notebook environment");
            env
        })
    }

    /// Run the detection against an arbitrary variable lookup.
    pub fn detect_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(forced) = lookup(OVERRIDE_VAR) {
            match forced.parse::<Self>() {
                Ok(env) => return env,
                Err(()) => tracing::warn!(
                    value = %forced,
                    "Ignoring unknown {} value",
                    OVERRIDE_VAR
                ),
            }
        }

        if lookup(HOSTED_MARKER_VAR).is_some() {
            Self::HostedProxyCapable
        } else {
            Self::GenericLocal
        }
    }

    /// The embed renderer for this environment.
    pub fn renderer(self) -> &'static dyn EmbedRenderer {
        match self {
            Self::HostedProxyCapable => &HostedProxyRenderer,
            Self::GenericLocal => &LocalFrameRenderer,
        }
    }

    /// Short name used in logs and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HostedProxyCapable => "hosted",
            Self::GenericLocal => "local",
        }
    }
}

impl std::str::FromStr for ExecutionEnvironment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hosted" | "colab" => Ok(Self::HostedProxyCapable),
            "local" | "jupyter" => Ok(Self::GenericLocal),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ExecutionEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_no_marker_is_local() {
        assert_eq!(
            ExecutionEnvironment::detect_with(lookup(&[])),
            ExecutionEnvironment::GenericLocal
        );
    }

    #[test]
    fn test_marker_is_hosted() {
        let env = ExecutionEnvironment::detect_with(lookup(&[(HOSTED_MARKER_VAR, "release-2026")]));
        assert_eq!(env, ExecutionEnvironment::HostedProxyCapable);
    }

    #[test]
    fn test_override_wins_over_marker() {
        let env = ExecutionEnvironment::detect_with(lookup(&[
            (HOSTED_MARKER_VAR, "release-2026"),
            (OVERRIDE_VAR, "Local"),
        ]));
        assert_eq!(env, ExecutionEnvironment::GenericLocal);
    }

    #[test]
    fn test_unknown_override_falls_back() {
        let env = ExecutionEnvironment::detect_with(lookup(&[(OVERRIDE_VAR, "mainframe")]));
        assert_eq!(env, ExecutionEnvironment::GenericLocal);
    }

    #[test]
    fn test_detect_is_memoized() {
        assert_eq!(ExecutionEnvironment::detect(), ExecutionEnvironment::detect());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("colab".parse::<ExecutionEnvironment>(), Ok(ExecutionEnvironment::HostedProxyCapable));
        assert_eq!("jupyter".parse::<ExecutionEnvironment>(), Ok(ExecutionEnvironment::GenericLocal));
        assert_eq!(ExecutionEnvironment::HostedProxyCapable.to_string(), "hosted");
    }
}
