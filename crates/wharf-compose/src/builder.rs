//! Transformation of declarative [`ServiceInput`]s into compose-ready
//! [`BuiltService`]s.
//!
//! Built services are ephemeral: they exist only for the duration of one
//! generation call and are never persisted.

use crate::compose::{private_network_name, MAIN_NETWORK};
use crate::input::{
    Command, DependsOn, Deploy, HealthCheck, LabelValue, ServiceInput, ServicePort, ServiceVolume,
    Ulimits,
};
use crate::traefik::{build_traefik_labels, TraefikArgs, MANAGED_LABEL};
use crate::ComposeError;
use serde::Serialize;
use std::collections::BTreeMap;
use wharf_schema::AppUrn;

/// Token catalog authors may embed in label keys and values; replaced
/// with the concrete `<app_name>-<store_id>` identifier at build time.
pub const APP_ID_PLACEHOLDER: &str = "{{WHARF_APP_ID}}";

/// Label carrying an app's guest-dashboard visibility, main service only.
pub const GUEST_DASHBOARD_LABEL: &str = "wharf.guest_dashboard";

const RESTART_POLICY: &str = "unless-stopped";

/// Exposure flags and user-facing settings for one generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExposureForm {
    pub exposed: bool,
    pub exposed_local: bool,
    pub open_port: bool,
    pub enable_auth: bool,
    pub domain: Option<String>,
    pub local_domain: String,
    /// Host port bound to the main service's internal port when
    /// `open_port` is set.
    pub app_port: Option<u16>,
    pub is_visible_on_guest_dashboard: bool,
}

/// One service entry of the generated compose document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltService {
    pub image: String,
    pub container_name: String,
    pub restart: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Command>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<Command>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<DependsOn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<BuiltHealthCheck>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, LabelValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy: Option<Deploy>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cap_add: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cap_drop: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_hosts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_opt: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shm_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_grace_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_signal: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sysctls: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ulimits: Option<Ulimits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

/// `healthcheck` entry in compose key spelling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltHealthCheck {
    pub test: Command,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_period: Option<String>,
}

impl From<HealthCheck> for BuiltHealthCheck {
    fn from(h: HealthCheck) -> Self {
        Self {
            test: h.test,
            interval: h.interval,
            timeout: h.timeout,
            retries: h.retries,
            start_period: h.start_period,
        }
    }
}

/// Materialize one declarative service for the given app and exposure.
pub fn build_service(
    input: &ServiceInput,
    form: &ExposureForm,
    urn: &AppUrn,
) -> Result<BuiltService, ComposeError> {
    if input.name.is_empty() {
        return Err(ComposeError::MissingName);
    }
    if input.image.is_empty() {
        return Err(ComposeError::MissingImage(input.name.clone()));
    }

    let app_id = urn.app_id();
    let container_name = if input.is_main {
        app_id.to_string()
    } else {
        format!("{}-{app_id}", input.name)
    };

    let mut ports: Vec<String> = Vec::new();
    if input.is_main && form.open_port {
        if let (Some(host), Some(container)) = (form.app_port, input.internal_port) {
            ports.push(format!("{host}:{container}"));
        }
    }
    for port in &input.add_ports {
        ports.extend(format_port(port));
    }

    let mut labels = BTreeMap::new();
    if input.is_main {
        if let Some(internal_port) = input.internal_port {
            labels = build_traefik_labels(&TraefikArgs {
                urn,
                internal_port,
                exposed: form.exposed,
                exposed_local: form.exposed_local,
                enable_auth: form.enable_auth,
                domain: form.domain.as_deref(),
                local_domain: &form.local_domain,
            });
        } else {
            labels.insert(MANAGED_LABEL.to_owned(), LabelValue::Bool(true));
        }
        if form.is_visible_on_guest_dashboard {
            labels.insert(GUEST_DASHBOARD_LABEL.to_owned(), LabelValue::Bool(true));
        }
    } else {
        labels.insert(MANAGED_LABEL.to_owned(), LabelValue::Bool(true));
    }
    merge_labels(&mut labels, &input.labels);
    let labels = template_labels(labels, app_id.as_str());

    let mut networks = Vec::new();
    if input.is_main || input.join_main_network {
        networks.push(MAIN_NETWORK.to_owned());
    }
    networks.push(private_network_name(urn));

    // A service pinned to a network mode cannot also publish ports or
    // join networks.
    if input.network_mode.is_some() {
        ports.clear();
        networks.clear();
    }

    Ok(BuiltService {
        image: input.image.clone(),
        container_name,
        restart: RESTART_POLICY.to_owned(),
        command: input.command.clone(),
        entrypoint: input.entrypoint.clone(),
        environment: input.environment.clone(),
        ports,
        volumes: input.volumes.iter().map(format_volume).collect(),
        devices: input.devices.clone(),
        networks,
        network_mode: input.network_mode.clone(),
        depends_on: input.depends_on.clone(),
        healthcheck: input.health_check.clone().map(Into::into),
        labels,
        deploy: input.deploy.clone(),
        cap_add: input.cap_add.clone(),
        cap_drop: input.cap_drop.clone(),
        extra_hosts: input.extra_hosts.clone(),
        hostname: input.hostname.clone(),
        read_only: input.read_only,
        security_opt: input.security_opt.clone(),
        shm_size: input.shm_size.clone(),
        stop_grace_period: input.stop_grace_period.clone(),
        stop_signal: input.stop_signal.clone(),
        sysctls: input.sysctls.clone(),
        ulimits: input.ulimits.clone(),
        user: input.user.clone(),
        working_dir: input.working_dir.clone(),
    })
}

/// Extend `base` with `extra`; keys already present are overwritten,
/// everything else is kept.
fn merge_labels(base: &mut BTreeMap<String, LabelValue>, extra: &BTreeMap<String, LabelValue>) {
    for (key, value) in extra {
        base.insert(key.clone(), value.clone());
    }
}

fn template_labels(
    labels: BTreeMap<String, LabelValue>,
    app_id: &str,
) -> BTreeMap<String, LabelValue> {
    labels
        .into_iter()
        .map(|(key, value)| {
            let key = key.replace(APP_ID_PLACEHOLDER, app_id);
            let value = match value {
                LabelValue::Text(text) => {
                    LabelValue::Text(text.replace(APP_ID_PLACEHOLDER, app_id))
                }
                other => other,
            };
            (key, value)
        })
        .collect()
}

fn format_port(port: &ServicePort) -> Vec<String> {
    let base = match &port.interface {
        Some(interface) => {
            format!("{interface}:{}:{}", port.host_port, port.container_port)
        }
        None => format!("{}:{}", port.host_port, port.container_port),
    };
    match (port.tcp, port.udp) {
        (true, true) => vec![format!("{base}/tcp"), format!("{base}/udp")],
        (true, false) => vec![format!("{base}/tcp")],
        (false, true) => vec![format!("{base}/udp")],
        (false, false) => vec![base],
    }
}

fn format_volume(volume: &ServiceVolume) -> String {
    let mut spec = format!("{}:{}", volume.host_path, volume.container_path);
    if volume.read_only {
        spec.push_str(":ro");
    }
    spec
}
