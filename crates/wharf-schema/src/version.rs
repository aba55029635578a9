use semver::Version;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("invalid version '{version}': {source}")]
    Invalid {
        version: String,
        source: semver::Error,
    },
}

fn parse(version: &str) -> Result<Version, VersionError> {
    let trimmed = version.trim().trim_start_matches('v');
    Version::parse(trimmed).map_err(|source| VersionError::Invalid {
        version: version.to_owned(),
        source,
    })
}

/// Whether the running host version satisfies a catalog entry's declared
/// minimum. A leading `v` is tolerated on either side.
pub fn satisfies_minimum(current: &str, minimum: &str) -> Result<bool, VersionError> {
    Ok(parse(current)? >= parse(minimum)?)
}
