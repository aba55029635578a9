//! Newtype wrappers for Wharf's string identifiers.
//!
//! Each identifier doubles as an on-disk file name or a wire key (app
//! record files, job files, event payloads), so every newtype
//! serializes transparently as a plain string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance from a string.
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Return the inner string as a slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<String> for $name {
            fn eq(&self, other: &String) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$name> for String {
            fn eq(&self, other: &$name) -> bool {
                *self == other.0
            }
        }

        impl AsRef<std::path::Path> for $name {
            fn as_ref(&self) -> &std::path::Path {
                std::path::Path::new(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_newtype!(
    /// Identifier of one installed-or-attempted app instance,
    /// formed as `<app_name>-<store_id>`. Unique key of the app repository.
    AppId
);

string_newtype!(
    /// Identifier of the app store a catalog entry was installed from.
    StoreId
);

string_newtype!(
    /// Identifier of one dispatched job, prefixed with its creation
    /// timestamp so lexicographic order is dispatch order.
    JobId
);

/// The two halves an [`AppId`] is derived from.
///
/// `app_id()` is the hyphenated form used as repository key, container
/// name prefix, and local-domain hostname; `router_id()` is the
/// underscore form used in reverse-proxy router and service names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUrn {
    pub app_name: String,
    pub store_id: StoreId,
}

impl AppUrn {
    pub fn new(app_name: impl Into<String>, store_id: impl Into<StoreId>) -> Self {
        Self {
            app_name: app_name.into(),
            store_id: store_id.into(),
        }
    }

    pub fn app_id(&self) -> AppId {
        AppId::new(format!("{}-{}", self.app_name, self.store_id))
    }

    pub fn router_id(&self) -> String {
        format!("{}_{}", self.app_name, self.store_id)
    }
}

impl fmt::Display for AppUrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.app_name, self.store_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_id_display_and_as_ref() {
        let id = AppId::new("nginx-1");
        assert_eq!(id.to_string(), "nginx-1");
        assert_eq!(id.as_str(), "nginx-1");
        assert_eq!(AsRef::<str>::as_ref(&id), "nginx-1");
    }

    #[test]
    fn app_id_serde_roundtrip() {
        let id = AppId::new("gitea-2");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"gitea-2\"");
        let back: AppId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn job_id_from_str() {
        let jid = JobId::from("20250101000000-install-abc");
        assert_eq!(jid.as_str(), "20250101000000-install-abc");
    }

    #[test]
    fn store_id_into_inner() {
        let sid = StoreId::new("1".to_owned());
        assert_eq!(sid.into_inner(), "1");
    }

    #[test]
    fn urn_derives_both_identifier_forms() {
        let urn = AppUrn::new("nginx", "1");
        assert_eq!(urn.app_id(), AppId::new("nginx-1"));
        assert_eq!(urn.router_id(), "nginx_1");
        assert_eq!(urn.to_string(), "nginx-1");
    }
}
