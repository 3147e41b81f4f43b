use std::path::PathBuf;

const CONFIG_FILE: &str = ".flux.toml";

/// Load config file content from CWD first, then home directory
///
/// Searches for .flux.toml in:
/// 1. Current working directory
/// 2. Home directory
/// 3. The platform config directory as `flux/config.toml`
///
/// Returns the file content if found, None otherwise.
pub fn load_config_file() -> Option<String> {
    if let Ok(content) = std::fs::read_to_string(CONFIG_FILE) {
        log::debug!("Loaded config from {}", CONFIG_FILE);
        return Some(content);
    }

    for path in [home_config_path(), crate::paths::global_config_path().ok()]
        .into_iter()
        .flatten()
    {
        if let Ok(content) = std::fs::read_to_string(&path) {
            log::debug!("Loaded config from {}", path.display());
            return Some(content);
        }
    }

    None
}

/// ~/.flux.toml, if the home directory is known
fn home_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE))
}
