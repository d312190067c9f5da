use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use dirs::home_dir;

const DEFAULT_DIR_NAME: &str = ".member_form";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const COLLECTIONS_DIR: &str = "collections";

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "MEMBER_FORM_HOME";

/// Returns the application data directory, defaulting to `~/.member_form`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// JSON array file backing the named collection.
pub fn collection_file_in(base: &Path, name: &str) -> PathBuf {
    base.join(COLLECTIONS_DIR).join(format!("{}.json", name))
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_under_base() {
        let base = Path::new("/data");
        assert_eq!(config_file_in(base), Path::new("/data/config/config.json"));
        assert_eq!(
            collection_file_in(base, "members"),
            Path::new("/data/collections/members.json")
        );
    }
}
