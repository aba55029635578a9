//! Assembly and serialization of the compose document.

use crate::builder::{build_service, BuiltService, ExposureForm};
use crate::input::ServiceInput;
use crate::ComposeError;
use serde::Serialize;
use std::collections::BTreeMap;
use wharf_schema::AppUrn;

/// Shared reverse-proxy network, owned by the platform rather than any
/// single app; declared `external` in every generated document.
pub const MAIN_NETWORK: &str = "wharf_main_network";

/// Name of the private per-app network isolating an app's services.
pub fn private_network_name(urn: &AppUrn) -> String {
    format!("{}_network", urn.app_id())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposeFile {
    pub services: BTreeMap<String, BuiltService>,
    pub networks: BTreeMap<String, NetworkDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipam: Option<Ipam>,
}

impl NetworkDef {
    fn external(name: &str) -> Self {
        Self {
            external: Some(true),
            name: Some(name.to_owned()),
            ipam: None,
        }
    }

    fn private(subnet: &str) -> Self {
        Self {
            external: None,
            name: None,
            ipam: Some(Ipam {
                driver: "default".to_owned(),
                config: vec![IpamSubnet {
                    subnet: subnet.to_owned(),
                }],
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ipam {
    pub driver: String,
    pub config: Vec<IpamSubnet>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IpamSubnet {
    pub subnet: String,
}

/// Generate the compose document for one app.
///
/// Pure text-in, text-out: the caller owns architecture-override merging
/// beforehand and writing the result to disk afterwards. Identical inputs
/// produce byte-identical output.
pub fn generate(
    services: &[ServiceInput],
    form: &ExposureForm,
    urn: &AppUrn,
    subnet: &str,
) -> Result<String, ComposeError> {
    if services.is_empty() {
        return Err(ComposeError::NoServices);
    }

    let mut built = BTreeMap::new();
    for input in services {
        built.insert(input.name.clone(), build_service(input, form, urn)?);
    }

    let mut networks = BTreeMap::new();
    networks.insert(MAIN_NETWORK.to_owned(), NetworkDef::external(MAIN_NETWORK));
    networks.insert(private_network_name(urn), NetworkDef::private(subnet));

    Ok(serde_yaml::to_string(&ComposeFile {
        services: built,
        networks,
    })?)
}
