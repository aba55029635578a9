//! Reverse-proxy label derivation.
//!
//! Labels are a pure function of the exposure flags and identifiers,
//! never of container runtime state, so regenerating a compose document
//! always yields byte-identical routing metadata.

use crate::input::LabelValue;
use std::collections::BTreeMap;
use wharf_schema::AppUrn;

/// Label marking a container as owned by Wharf, present on every service.
pub const MANAGED_LABEL: &str = "wharf.managed";
/// Shared forward-auth middleware attached when an app opts into auth.
pub const AUTH_MIDDLEWARE: &str = "wharf-auth";

#[derive(Debug, Clone, Copy)]
pub struct TraefikArgs<'a> {
    pub urn: &'a AppUrn,
    pub internal_port: u16,
    pub exposed: bool,
    pub exposed_local: bool,
    pub enable_auth: bool,
    /// Public FQDN; routers for `exposed` are only emitted when present.
    pub domain: Option<&'a str>,
    pub local_domain: &'a str,
}

fn text(value: impl Into<String>) -> LabelValue {
    LabelValue::Text(value.into())
}

/// Derive the routing labels for an app's main service.
pub fn build_traefik_labels(args: &TraefikArgs<'_>) -> BTreeMap<String, LabelValue> {
    let mut labels = BTreeMap::new();
    labels.insert(MANAGED_LABEL.to_owned(), LabelValue::Bool(true));

    let routed = (args.exposed && args.domain.is_some()) || args.exposed_local;
    if !routed {
        return labels;
    }

    let rid = args.urn.router_id();
    labels.insert("traefik.enable".to_owned(), LabelValue::Bool(true));
    labels.insert(
        format!("traefik.http.services.{rid}.loadbalancer.server.port"),
        text(args.internal_port.to_string()),
    );
    labels.insert(
        format!("traefik.http.middlewares.{rid}-redirect.redirectscheme.scheme"),
        text("https"),
    );

    if args.exposed {
        if let Some(domain) = args.domain {
            let rule = format!("Host(`{domain}`)");
            insert_router_pair(
                &mut labels,
                &rid,
                &rid,
                &format!("{rid}-insecure"),
                &rule,
                args.enable_auth,
                // Public exposure terminates TLS through the ACME resolver.
                Some("myresolver"),
            );
        }
    }

    if args.exposed_local {
        let host = format!("{}.{}", args.urn.app_id(), args.local_domain);
        let rule = format!("Host(`{host}`)");
        insert_router_pair(
            &mut labels,
            &rid,
            &format!("{rid}-local"),
            &format!("{rid}-local-insecure"),
            &rule,
            args.enable_auth,
            // Local subdomains use the proxy's self-signed default cert.
            None,
        );
    }

    labels
}

fn insert_router_pair(
    labels: &mut BTreeMap<String, LabelValue>,
    rid: &str,
    secure: &str,
    insecure: &str,
    rule: &str,
    enable_auth: bool,
    cert_resolver: Option<&str>,
) {
    labels.insert(
        format!("traefik.http.routers.{insecure}.rule"),
        text(rule),
    );
    labels.insert(
        format!("traefik.http.routers.{insecure}.entrypoints"),
        text("web"),
    );
    labels.insert(
        format!("traefik.http.routers.{insecure}.service"),
        text(rid),
    );
    labels.insert(
        format!("traefik.http.routers.{insecure}.middlewares"),
        text(format!("{rid}-redirect")),
    );

    labels.insert(format!("traefik.http.routers.{secure}.rule"), text(rule));
    labels.insert(
        format!("traefik.http.routers.{secure}.entrypoints"),
        text("websecure"),
    );
    labels.insert(format!("traefik.http.routers.{secure}.service"), text(rid));
    match cert_resolver {
        Some(resolver) => {
            labels.insert(
                format!("traefik.http.routers.{secure}.tls.certresolver"),
                text(resolver),
            );
        }
        None => {
            labels.insert(
                format!("traefik.http.routers.{secure}.tls"),
                LabelValue::Bool(true),
            );
        }
    }
    if enable_auth {
        labels.insert(
            format!("traefik.http.routers.{secure}.middlewares"),
            text(AUTH_MIDDLEWARE),
        );
    }
}
