use anyhow::{Context, Result};
use semver::{BuildMetadata, Version};

/// Version assumed when `package.json` has none.
pub const DEFAULT_VERSION: &str = "0.0.1";

/// `major.minor.(patch + 1)+<timestamp>`. Pre-release and build metadata of
/// the current version are dropped.
pub fn next_version(current: Option<&str>, timestamp_ms: u128) -> Result<Version> {
    let current = current.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(DEFAULT_VERSION);
    let parsed =
        Version::parse(current).with_context(|| format!("Invalid version '{}' in package.json", current))?;

    let mut next = Version::new(parsed.major, parsed.minor, parsed.patch + 1);
    next.build = BuildMetadata::new(&timestamp_ms.to_string())?;
    Ok(next)
}
