//! Applications and per-hive application lists

use crate::error::Result;
use crate::platform::OsVersion;
use crate::registry::{CompatStore, GLOBAL_DISPLAY_NAME, GLOBAL_VALUE_NAME, Hive};
use crate::settings::{SettingsRecord, SharedSettings, shared};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One editable entry: an executable path, or the global layer
#[derive(Debug, Clone)]
pub struct Application {
    path: String,
    value_name: String,
    store: Arc<dyn CompatStore>,
    settings: SharedSettings,
    selected: bool,
    global: bool,
}

impl Application {
    /// Load the settings stored for `path`; a read error leaves them empty
    pub fn load(path: impl Into<String>, store: Arc<dyn CompatStore>, os: OsVersion, selected: bool) -> Self {
        let path = path.into();
        Self::load_value(path.clone(), path, store, os, selected, false)
    }

    /// Load the global layer from the user environment store
    pub fn load_global(store: Arc<dyn CompatStore>, os: OsVersion) -> Self {
        Self::load_value(
            GLOBAL_DISPLAY_NAME.to_string(),
            GLOBAL_VALUE_NAME.to_string(),
            store,
            os,
            false,
            true,
        )
    }

    fn load_value(
        path: String,
        value_name: String,
        store: Arc<dyn CompatStore>,
        os: OsVersion,
        selected: bool,
        global: bool,
    ) -> Self {
        let line = store.get(&value_name).unwrap_or_else(|e| {
            warn!("Failed to read {} from {}: {}", value_name, store.location(), e);
            None
        });
        let settings = shared(SettingsRecord::from_registry_string(line.as_deref(), os));
        Self {
            path,
            value_name,
            store,
            settings,
            selected,
            global,
        }
    }

    /// Executable path, or `Global` for the global layer
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name of the value in the store
    pub fn value_name(&self) -> &str {
        &self.value_name
    }

    /// Store the settings are read from and saved to
    pub fn store(&self) -> &Arc<dyn CompatStore> {
        &self.store
    }

    /// Shared settings record
    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    /// Whether the application is part of the selection
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether this is the `__COMPAT_LAYER` pseudo-application
    pub fn is_global(&self) -> bool {
        self.global
    }

    /// Current layer string (empty when cleared)
    pub fn registry_string(&self, os: OsVersion) -> String {
        self.settings.lock().to_registry_string(os)
    }

    /// Read the stored layer string
    pub fn read_stored(&self) -> Result<Option<String>> {
        self.store.get(&self.value_name)
    }

    fn matches(&self, path: &str) -> bool {
        self.path.eq_ignore_ascii_case(path) || self.value_name.eq_ignore_ascii_case(path)
    }
}

/// The applications stored under one hive's layers key
#[derive(Debug)]
pub struct ApplicationList {
    hive: Hive,
    store: Arc<dyn CompatStore>,
    applications: Vec<Application>,
}

impl ApplicationList {
    /// Load every entry of `store`; the global layer, when given, comes first
    pub fn load(
        hive: Hive,
        store: Arc<dyn CompatStore>,
        global: Option<Arc<dyn CompatStore>>,
        os: OsVersion,
    ) -> Result<Self> {
        let names = store.names()?;
        let mut applications: Vec<Application> = global
            .map(|environment| Application::load_global(environment, os))
            .into_iter()
            .collect();
        applications.extend(
            names
                .into_par_iter()
                .map(|name| Application::load(name, Arc::clone(&store), os, false))
                .collect::<Vec<_>>(),
        );

        info!(
            "Loaded {} applications from {}",
            applications.len(),
            store.location()
        );
        Ok(Self {
            hive,
            store,
            applications,
        })
    }

    /// Hive this list belongs to
    pub fn hive(&self) -> Hive {
        self.hive
    }

    /// Heading shown above the list
    pub fn title(&self) -> &'static str {
        self.hive.label()
    }

    /// Applications in display order
    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    /// Number of applications
    pub fn len(&self) -> usize {
        self.applications.len()
    }

    /// Whether the list has no applications
    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }

    /// Find an application by path (case-insensitive, as registry value names are)
    pub fn get(&self, path: &str) -> Option<&Application> {
        self.applications.iter().find(|app| app.matches(path))
    }

    /// Whether `path` is already listed
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Add the paths not already listed, selected; returns how many were added
    pub(crate) fn add_paths(&mut self, paths: Vec<String>, os: OsVersion) -> usize {
        let mut fresh: Vec<String> = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.trim().to_string();
            if path.is_empty() || self.contains(&path) {
                continue;
            }
            if !fresh.iter().any(|known| known.eq_ignore_ascii_case(&path)) {
                fresh.push(path);
            }
        }

        let added: Vec<Application> = fresh
            .into_par_iter()
            .map(|path| Application::load(path, Arc::clone(&self.store), os, true))
            .collect();
        let count = added.len();
        self.applications.extend(added);
        debug!("Added {} applications to {}", count, self.title());
        count
    }

    /// Select or deselect one application; returns `false` when it is not listed
    pub(crate) fn set_selected(&mut self, path: &str, selected: bool) -> bool {
        match self.applications.iter_mut().find(|app| app.matches(path)) {
            Some(app) => {
                app.selected = selected;
                true
            }
            None => false,
        }
    }

    /// Select or deselect everything
    pub(crate) fn set_all_selected(&mut self, selected: bool) {
        for app in &mut self.applications {
            app.selected = selected;
        }
    }

    /// Drop the named non-global entries
    pub(crate) fn remove(&mut self, value_names: &[String]) {
        self.applications
            .retain(|app| app.global || !value_names.iter().any(|name| name == &app.value_name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::CompatibilityMode;
    use crate::registry::MemoryStore;

    const OS: OsVersion = OsVersion::Windows10;

    fn store() -> Arc<dyn CompatStore> {
        Arc::new(MemoryStore::with_entries(
            "layers",
            [("C:\\Games\\a.exe", "~ WIN95"), ("C:\\Games\\b.exe", "~ RUNASADMIN")],
        ))
    }

    #[test]
    fn test_load_with_global_first() {
        let environment: Arc<dyn CompatStore> =
            Arc::new(MemoryStore::with_entries("env", [(GLOBAL_VALUE_NAME, "~ WIN98")]));
        let list = ApplicationList::load(Hive::CurrentUser, store(), Some(environment), OS).unwrap();

        assert_eq!(list.len(), 3);
        let global = &list.applications()[0];
        assert!(global.is_global());
        assert_eq!(global.path(), GLOBAL_DISPLAY_NAME);
        assert_eq!(
            global.settings().lock().compatibility_mode(),
            CompatibilityMode::Win98
        );
    }

    #[test]
    fn test_add_paths_deduplicates_and_selects() {
        let mut list = ApplicationList::load(Hive::CurrentUser, store(), None, OS).unwrap();
        let added = list.add_paths(
            vec![
                "C:\\GAMES\\A.EXE".to_string(),
                "C:\\Games\\c.exe".to_string(),
                "c:\\games\\c.exe".to_string(),
                "  ".to_string(),
            ],
            OS,
        );
        assert_eq!(added, 1);
        assert_eq!(list.len(), 3);
        assert!(list.get("C:\\Games\\c.exe").unwrap().is_selected());
        assert!(!list.get("C:\\Games\\a.exe").unwrap().is_selected());
    }

    #[test]
    fn test_remove_keeps_global() {
        let environment: Arc<dyn CompatStore> = Arc::new(MemoryStore::new("env"));
        let mut list = ApplicationList::load(Hive::CurrentUser, store(), Some(environment), OS).unwrap();
        list.remove(&[GLOBAL_VALUE_NAME.to_string(), "C:\\Games\\a.exe".to_string()]);
        assert_eq!(list.len(), 2);
        assert!(list.get(GLOBAL_DISPLAY_NAME).is_some());
        assert!(!list.contains("C:\\Games\\a.exe"));
    }
}
