//! Compose and routing generation engine for Wharf.
//!
//! A pure, side-effect-free transformation: declarative catalog service
//! specs plus the user's exposure form become a compose document string
//! and reverse-proxy labels. This crate knows nothing about jobs, app
//! state, or the container runtime.

pub mod builder;
pub mod compose;
pub mod input;
pub mod overrides;
pub mod traefik;

pub use builder::{
    build_service, BuiltHealthCheck, BuiltService, ExposureForm, APP_ID_PLACEHOLDER,
    GUEST_DASHBOARD_LABEL,
};
pub use compose::{generate, private_network_name, ComposeFile, NetworkDef, MAIN_NETWORK};
pub use input::{
    parse_compose_spec_str, Command, ComposeSpec, DependsCondition, DependsOn, DependsOnCondition,
    Deploy, HealthCheck, LabelValue, ResourceLimits, ServiceInput, ServicePort, ServiceVolume,
    Ulimit, Ulimits,
};
pub use overrides::{merge_architecture_overrides, ArchitectureOverride};
pub use traefik::{build_traefik_labels, TraefikArgs, AUTH_MIDDLEWARE, MANAGED_LABEL};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("failed to parse compose spec: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("failed to serialize compose document: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("service is missing a name")]
    MissingName,
    #[error("service '{0}' is missing an image")]
    MissingImage(String),
    #[error("compose spec declares no services")]
    NoServices,
}
