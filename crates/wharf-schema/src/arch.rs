use serde::{Deserialize, Serialize};

/// CPU architectures an app catalog entry may declare support for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppArchitecture {
    Amd64,
    Arm64,
}

impl std::fmt::Display for AppArchitecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppArchitecture::Amd64 => write!(f, "amd64"),
            AppArchitecture::Arm64 => write!(f, "arm64"),
        }
    }
}

impl std::str::FromStr for AppArchitecture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "amd64" => Ok(AppArchitecture::Amd64),
            "arm64" => Ok(AppArchitecture::Arm64),
            other => Err(format!("unknown architecture '{other}'")),
        }
    }
}

/// The architecture of the host this process runs on, if it is one
/// Wharf can run apps on.
pub fn host_architecture() -> Option<AppArchitecture> {
    match std::env::consts::ARCH {
        "x86_64" => Some(AppArchitecture::Amd64),
        "aarch64" => Some(AppArchitecture::Arm64),
        _ => None,
    }
}
