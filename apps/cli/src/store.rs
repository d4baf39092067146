use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use solfa_domain::Settings;

/// JSON settings file, read once at start and rewritten after every change.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<config dir>/solfa/settings.json`
    pub fn default_location() -> Option<Self> {
        let base = dirs::config_dir()?;
        Some(Self::new(base.join("solfa").join("settings.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files give the defaults.
    pub fn load(&self) -> Settings {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => {
                info!(path = %self.path.display(), "loaded settings");
                Settings::from_json(&text)
            }
            Err(err) => {
                debug!(?err, path = %self.path.display(), "no saved settings, using defaults");
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create settings dir {:?}", dir))?;
        }
        let json = settings.to_json()?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write settings {:?}", self.path))?;
        Ok(())
    }

    pub fn reset(&self) -> Result<()> {
        self.save(&Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solfa_domain::Exercise;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn saved_settings_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("nested").join("settings.json"));
        let mut settings = Settings::default();
        settings.exercise = Exercise::Melody;
        settings.melody.set_bpm(96);
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
        store.reset().unwrap();
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(SettingsStore::new(path).load(), Settings::default());
    }
}
