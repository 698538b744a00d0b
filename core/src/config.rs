//! Config types for declarative registry construction.
//!
//! These types mirror the runtime registry types but are serde-deserializable,
//! enabling config-driven construction from JSON or YAML documents.
//!
//! # Relationship to runtime types
//!
//! | Config type | Runtime type | Builder |
//! |-------------|-------------|---------|
//! | [`EnvironmentsConfig`] | [`Environments`](crate::Environments) | [`EnvironmentsConfig::build()`] |
//! | [`EnvironmentConfig`] | one registered rule | via `build()` |
//! | [`IdentityConfig`] | [`Identity`](crate::Identity) | [`IdentityConfig::to_identity()`] |

use crate::{Environments, Identity, Properties, ANY_SENTINEL};
use serde::Deserialize;
use std::fmt;

/// Configuration for an [`Environments`] registry.
///
/// Deserializes from JSON/YAML and builds the runtime registry via
/// [`build()`](EnvironmentsConfig::build):
///
/// ```yaml
/// defaults:
///   log_level: info
/// require_environment: true
/// environments:
///   - identity:
///       hostname: web-1.example.com
///     properties:
///       name: production
///   - identity: any
///     properties:
///       name: local
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentsConfig {
    /// Properties layered beneath every environment's own properties, and
    /// returned unmodified when nothing matches in non-strict mode.
    #[serde(default)]
    pub defaults: Properties,

    /// When `true` (the default), resolution fails if no environment matches.
    /// When `false`, the defaults are returned instead.
    #[serde(default = "default_require_environment")]
    pub require_environment: bool,

    /// Environments to register, in document order (first-match-wins).
    #[serde(default)]
    pub environments: Vec<EnvironmentConfig>,
}

fn default_require_environment() -> bool {
    true
}

impl EnvironmentsConfig {
    /// Builds the runtime registry, registering environments in document order.
    #[must_use]
    pub fn build(&self) -> Environments {
        let mut environments = if self.require_environment {
            Environments::new(self.defaults.clone())
        } else {
            Environments::with_fallback(self.defaults.clone())
        };
        for environment in &self.environments {
            environments.register(
                environment.identity.to_identity(),
                environment.properties.clone(),
            );
        }
        environments
    }
}

/// Configuration for a single environment rule.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    /// The identity that selects this environment.
    /// Omitting it is the same as writing `identity: any`.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Properties merged over the registry defaults when this environment wins.
    #[serde(default)]
    pub properties: Properties,
}

/// Identity in config form: either the catch-all sentinel string `"any"` or
/// a map of criteria.
///
/// Untagged: serde tries the variants in declaration order, so the sentinel
/// must stay first (order matters!).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdentityConfig {
    /// The literal string `"any"`: matches every context.
    Any(AnySentinel),

    /// Criteria that must all hold.
    /// Unknown keys are rejected so a misspelled criterion cannot silently
    /// turn into a catch-all.
    Criteria(Identity),
}

impl Default for IdentityConfig {
    fn default() -> Self {
        IdentityConfig::Any(AnySentinel)
    }
}

impl IdentityConfig {
    /// Converts to the runtime [`Identity`].
    #[must_use]
    pub fn to_identity(&self) -> Identity {
        match self {
            IdentityConfig::Any(_) => Identity::any(),
            IdentityConfig::Criteria(identity) => identity.clone(),
        }
    }
}

/// Marker that deserializes only from the literal string [`ANY_SENTINEL`].
#[derive(Debug, Clone, Copy)]
pub struct AnySentinel;

impl<'de> Deserialize<'de> for AnySentinel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SentinelVisitor;

        impl serde::de::Visitor<'_> for SentinelVisitor {
            type Value = AnySentinel;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "the string {ANY_SENTINEL:?}")
            }

            fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Self::Value, E> {
                if value == ANY_SENTINEL {
                    Ok(AnySentinel)
                } else {
                    Err(E::invalid_value(serde::de::Unexpected::Str(value), &self))
                }
            }
        }

        deserializer.deserialize_str(SentinelVisitor)
    }
}
