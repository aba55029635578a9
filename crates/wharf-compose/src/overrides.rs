//! Per-architecture patches applied to the base service list before a
//! compose document is generated.

use crate::input::ServiceInput;
use crate::ComposeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wharf_schema::AppArchitecture;

/// A set of service fragments that replace parts of the base services
/// when the host runs the named architecture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureOverride {
    pub architecture: AppArchitecture,
    #[serde(default)]
    pub services: Vec<Value>,
}

/// Merge matching override fragments onto the base services.
///
/// Fragments are matched to base services by `name`; a fragment without a
/// name, or naming a service absent from the base list, is ignored.
/// Object fields merge recursively; array-valued fields are replaced
/// wholesale by the override. Base ordering is preserved.
pub fn merge_architecture_overrides(
    base: &[ServiceInput],
    overrides: &[ArchitectureOverride],
    architecture: AppArchitecture,
) -> Result<Vec<ServiceInput>, ComposeError> {
    let Some(active) = overrides.iter().find(|o| o.architecture == architecture) else {
        return Ok(base.to_vec());
    };

    let mut merged = Vec::with_capacity(base.len());
    for service in base {
        let fragment = active.services.iter().find(|f| {
            f.get("name").and_then(Value::as_str) == Some(service.name.as_str())
        });
        match fragment {
            Some(fragment) => {
                let mut value = serde_json::to_value(service)?;
                deep_merge(&mut value, fragment);
                merged.push(serde_json::from_value(value)?);
            }
            None => merged.push(service.clone()),
        }
    }
    Ok(merged)
}

fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        // Arrays and scalars: the override value wins outright.
        (target, patch) => *target = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parse_compose_spec_str;
    use serde_json::json;

    fn base_services() -> Vec<ServiceInput> {
        parse_compose_spec_str(
            r#"{"services": [
                {"name": "web", "image": "acme/web:1", "isMain": true, "internalPort": 80,
                 "volumes": [{"hostPath": "/data", "containerPath": "/srv"}]},
                {"name": "db", "image": "postgres:16",
                 "environment": {"POSTGRES_DB": "acme"}}
            ]}"#,
        )
        .unwrap()
        .services
    }

    #[test]
    fn no_overrides_returns_base_unchanged() {
        let base = base_services();
        let merged =
            merge_architecture_overrides(&base, &[], AppArchitecture::Arm64).unwrap();
        assert_eq!(merged, base);
    }

    #[test]
    fn other_architecture_returns_base_unchanged() {
        let base = base_services();
        let overrides = vec![ArchitectureOverride {
            architecture: AppArchitecture::Arm64,
            services: vec![json!({"name": "web", "image": "acme/web:1-arm"})],
        }];
        let merged =
            merge_architecture_overrides(&base, &overrides, AppArchitecture::Amd64).unwrap();
        assert_eq!(merged, base);
    }

    #[test]
    fn matching_fragment_replaces_scalar_fields() {
        let base = base_services();
        let overrides = vec![ArchitectureOverride {
            architecture: AppArchitecture::Arm64,
            services: vec![json!({"name": "web", "image": "acme/web:1-arm"})],
        }];
        let merged =
            merge_architecture_overrides(&base, &overrides, AppArchitecture::Arm64).unwrap();
        assert_eq!(merged[0].image, "acme/web:1-arm");
        // Untouched fields survive the merge.
        assert_eq!(merged[0].internal_port, Some(80));
        assert!(merged[0].is_main);
        assert_eq!(merged[1], base[1]);
    }

    #[test]
    fn arrays_are_replaced_not_concatenated() {
        let base = base_services();
        let overrides = vec![ArchitectureOverride {
            architecture: AppArchitecture::Arm64,
            services: vec![json!({
                "name": "web",
                "volumes": [{"hostPath": "/arm-data", "containerPath": "/srv"}]
            })],
        }];
        let merged =
            merge_architecture_overrides(&base, &overrides, AppArchitecture::Arm64).unwrap();
        assert_eq!(merged[0].volumes.len(), 1);
        assert_eq!(merged[0].volumes[0].host_path, "/arm-data");
    }

    #[test]
    fn nested_objects_merge_recursively() {
        let base = base_services();
        let overrides = vec![ArchitectureOverride {
            architecture: AppArchitecture::Arm64,
            services: vec![json!({
                "name": "db",
                "environment": {"POSTGRES_INITDB_ARGS": "--data-checksums"}
            })],
        }];
        let merged =
            merge_architecture_overrides(&base, &overrides, AppArchitecture::Arm64).unwrap();
        let env = &merged[1].environment;
        assert_eq!(env.get("POSTGRES_DB").unwrap(), "acme");
        assert_eq!(env.get("POSTGRES_INITDB_ARGS").unwrap(), "--data-checksums");
    }

    #[test]
    fn nameless_fragment_is_ignored() {
        let base = base_services();
        let overrides = vec![ArchitectureOverride {
            architecture: AppArchitecture::Arm64,
            services: vec![json!({"image": "acme/web:evil"})],
        }];
        let merged =
            merge_architecture_overrides(&base, &overrides, AppArchitecture::Arm64).unwrap();
        assert_eq!(merged, base);
    }

    #[test]
    fn unknown_name_fragment_is_ignored() {
        let base = base_services();
        let overrides = vec![ArchitectureOverride {
            architecture: AppArchitecture::Arm64,
            services: vec![json!({"name": "ghost", "image": "acme/ghost:1"})],
        }];
        let merged =
            merge_architecture_overrides(&base, &overrides, AppArchitecture::Arm64).unwrap();
        assert_eq!(merged, base);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn base_ordering_is_preserved() {
        let base = base_services();
        let overrides = vec![ArchitectureOverride {
            architecture: AppArchitecture::Arm64,
            services: vec![
                json!({"name": "db", "image": "postgres:16-arm"}),
                json!({"name": "web", "image": "acme/web:1-arm"}),
            ],
        }];
        let merged =
            merge_architecture_overrides(&base, &overrides, AppArchitecture::Arm64).unwrap();
        assert_eq!(merged[0].name, "web");
        assert_eq!(merged[1].name, "db");
    }
}
