use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{ConfigError, InputError};
use crate::model::config::EngineConfig;
use crate::model::profile::{PositionProfile, parse_profile};

const PROFILES_KEY: &str = "position_profiles";
const ENGINE_KEY: &str = "engine";

/// Parsed configuration file. Profiles that failed to parse are listed in
/// `errors` and absent from `profiles`.
#[derive(Debug, Clone, Default)]
pub struct ProfileFile {
    pub engine: EngineConfig,
    pub profiles: Vec<PositionProfile>,
    pub errors: Vec<ConfigError>,
}

impl ProfileFile {
    /// Restricts the run to the named profiles.
    pub fn select(&mut self, names: &[String]) -> Result<(), ConfigError> {
        if names.is_empty() {
            return Ok(());
        }
        for name in names {
            if !self.profiles.iter().any(|p| p.id.eq_ignore_ascii_case(name)) {
                return Err(ConfigError::UnknownProfile(name.clone()));
            }
        }
        self.profiles
            .retain(|p| names.iter().any(|n| p.id.eq_ignore_ascii_case(n)));
        Ok(())
    }
}

pub fn load_profiles(path: &Path) -> Result<ProfileFile, InputError> {
    let text = fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let file = parse_profile_file(&value).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        profiles = file.profiles.len(),
        rejected = file.errors.len(),
        "profile configuration loaded"
    );
    Ok(file)
}

/// Each profile is parsed on its own so one malformed entry does not take
/// the others down. The `engine` section is optional.
pub fn parse_profile_file(value: &Value) -> Result<ProfileFile, serde_json::Error> {
    let engine = match value.get(ENGINE_KEY) {
        Some(section) => serde_json::from_value(section.clone())?,
        None => EngineConfig::default(),
    };

    let mut file = ProfileFile {
        engine,
        ..ProfileFile::default()
    };
    let Some(profiles) = value.get(PROFILES_KEY).and_then(Value::as_object) else {
        warn!("configuration has no {PROFILES_KEY} section");
        return Ok(file);
    };
    for (name, entry) in profiles {
        match parse_profile(name, entry) {
            Ok(profile) => file.profiles.push(profile),
            Err(err) => {
                warn!(profile = %name, error = %err, "profile rejected");
                file.errors.push(err);
            }
        }
    }
    Ok(file)
}
