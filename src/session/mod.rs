//! Editing session
//!
//! The session is the controller between a front end and the stores. It owns
//! one application list per available hive, tracks the selection, shows
//! either the single selected record or an aggregate of all selected records,
//! and runs bulk reload and save passes.
//!
//! # Event Flow
//!
//! ```text
//! front end -> Session::{select, edit, save_selected, ...} -> stores
//!                  |
//!                  +-> SessionEvent -> front end
//! ```
//!
//! # Saving
//!
//! Each selected application is encoded from a snapshot taken with every
//! selected record locked. An empty string deletes the stored value and drops
//! the application from its list (the global layer stays listed). A failing
//! entry is reported and the rest of the batch continues. Written entries are
//! read back so the editor shows exactly what was stored.

mod application;
mod events;

pub use application::{Application, ApplicationList};
pub use events::{EntryFailure, ReloadReport, SaveReport, SessionEvent};

use crate::config::{AppConfig, ConfigManager};
use crate::error::{CompatError, Result};
use crate::platform::{self, OsVersion};
use crate::registry::{self, CompatStore, Hive, LAYERS_KEY};
use crate::settings::{
    AggregatedSettings, SettingsEdit, SettingsRecord, SharedSettings, lock_all,
};
use crate::utils::find_executables;
use rayon::prelude::*;
use std::path::Path;
use std::sync::{Arc, mpsc};
use tracing::{debug, info, warn};

/// Stores a session reads from and writes to
#[derive(Debug, Clone)]
pub struct SessionStores {
    /// Per-user layers key
    pub current_user: Arc<dyn CompatStore>,
    /// Machine-wide layers key; absent unless elevated
    pub local_machine: Option<Arc<dyn CompatStore>>,
    /// User environment key holding the global layer
    pub environment: Option<Arc<dyn CompatStore>>,
}

impl SessionStores {
    /// Open the registry stores available to this process
    pub fn open(elevated: bool) -> Result<Self> {
        let current_user = registry::open_layers_store(Hive::CurrentUser, elevated)
            .ok_or_else(|| CompatError::StoreUnavailable(format!("HKEY_CURRENT_USER\\{LAYERS_KEY}")))?;
        Ok(Self {
            current_user,
            local_machine: registry::open_layers_store(Hive::LocalMachine, elevated),
            environment: registry::open_environment_store(),
        })
    }
}

/// Settings shown in the editor for the current selection
#[derive(Debug, Default)]
pub enum DisplayedSettings {
    /// Nothing selected
    #[default]
    Empty,
    /// Exactly one application selected; edits go straight to its record
    Single(SharedSettings),
    /// Several applications selected; edits fan out to every member
    Aggregated(AggregatedSettings),
}

impl DisplayedSettings {
    /// Copy of what the editor shows
    pub fn snapshot(&self) -> Option<SettingsRecord> {
        match self {
            Self::Empty => None,
            Self::Single(settings) => Some(settings.lock().clone()),
            Self::Aggregated(aggregate) => Some(aggregate.view().clone()),
        }
    }

    /// Whether several applications are shown at once
    pub fn is_aggregated(&self) -> bool {
        matches!(self, Self::Aggregated(_))
    }
}

/// Editing session over the compatibility layers of this machine
#[derive(Debug)]
pub struct Session {
    os: OsVersion,
    elevated: bool,
    lists: Vec<ApplicationList>,
    displayed: DisplayedSettings,
    config: AppConfig,
    persist_config: bool,
    events: Option<mpsc::SyncSender<SessionEvent>>,
}

impl Session {
    /// Create a session over the given stores
    ///
    /// Preferences are kept in memory only; see [`Session::set_persist_config`].
    pub fn new(stores: SessionStores, os: OsVersion, elevated: bool, config: AppConfig) -> Result<Self> {
        let mut lists = vec![ApplicationList::load(
            Hive::CurrentUser,
            stores.current_user,
            stores.environment,
            os,
        )?];
        if let Some(store) = stores.local_machine {
            lists.push(ApplicationList::load(Hive::LocalMachine, store, None, os)?);
        }

        info!(
            "Session opened on {:?} (elevated: {}, lists: {})",
            os,
            elevated,
            lists.len()
        );
        Ok(Self {
            os,
            elevated,
            lists,
            displayed: DisplayedSettings::Empty,
            config,
            persist_config: false,
            events: None,
        })
    }

    /// Open a session on the registry of this machine, persisting preferences
    pub fn open(config: AppConfig) -> Result<Self> {
        let os = OsVersion::detect()?;
        let elevated = platform::is_elevated();
        let stores = SessionStores::open(elevated)?;
        let mut session = Self::new(stores, os, elevated, config)?;
        session.persist_config = true;
        Ok(session)
    }

    /// Publish events to `sender`
    #[must_use]
    pub fn with_events(mut self, sender: mpsc::SyncSender<SessionEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Save preferences to disk whenever a last used value changes
    pub fn set_persist_config(&mut self, persist: bool) {
        self.persist_config = persist;
    }

    /// Windows release the layer strings are encoded for
    pub fn os(&self) -> OsVersion {
        self.os
    }

    /// Whether the machine-wide list is editable
    pub fn is_elevated(&self) -> bool {
        self.elevated
    }

    /// Current preferences
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Application lists, current user first
    pub fn lists(&self) -> &[ApplicationList] {
        &self.lists
    }

    /// List of one hive, if available
    pub fn list(&self, hive: Hive) -> Option<&ApplicationList> {
        self.lists.iter().find(|list| list.hive() == hive)
    }

    fn list_mut(&mut self, hive: Hive) -> Result<&mut ApplicationList> {
        self.lists
            .iter_mut()
            .find(|list| list.hive() == hive)
            .ok_or_else(|| CompatError::StoreUnavailable(hive.label().to_string()))
    }

    /// Every application of every list
    pub fn applications(&self) -> impl Iterator<Item = &Application> {
        self.lists.iter().flat_map(|list| list.applications())
    }

    /// Selected applications, in list order
    pub fn selected_applications(&self) -> impl Iterator<Item = &Application> {
        self.applications().filter(|app| app.is_selected())
    }

    /// Whether anything is selected (reload and save are no-ops otherwise)
    pub fn is_any_selected(&self) -> bool {
        self.selected_applications().next().is_some()
    }

    /// Settings shown for the current selection
    pub fn displayed(&self) -> &DisplayedSettings {
        &self.displayed
    }

    fn emit(&self, event: SessionEvent) {
        let Some(sender) = &self.events else {
            return;
        };
        if let Err(e) = sender.try_send(event) {
            warn!("Failed to publish session event: {}", e);
        }
    }

    fn refresh_displayed(&mut self) {
        let mut selected: Vec<SharedSettings> = self
            .selected_applications()
            .map(|app| Arc::clone(app.settings()))
            .collect();

        self.displayed = match selected.len() {
            0 => DisplayedSettings::Empty,
            1 => DisplayedSettings::Single(selected.swap_remove(0)),
            _ => AggregatedSettings::new(selected)
                .map_or(DisplayedSettings::Empty, DisplayedSettings::Aggregated),
        };
    }

    fn selection_changed(&mut self) {
        self.refresh_displayed();
        self.emit(SessionEvent::SelectionChanged);
    }

    /// Select or deselect one application; returns `false` when it is not listed
    pub fn select(&mut self, hive: Hive, path: &str, selected: bool) -> Result<bool> {
        let found = self.list_mut(hive)?.set_selected(path, selected);
        if found {
            self.selection_changed();
        }
        Ok(found)
    }

    /// Select or deselect every application of one list
    pub fn select_all(&mut self, hive: Hive, selected: bool) -> Result<()> {
        self.list_mut(hive)?.set_all_selected(selected);
        self.selection_changed();
        Ok(())
    }

    /// Add executables to a list; new entries are selected
    pub fn add_paths<I, P>(&mut self, hive: Hive, paths: I) -> Result<usize>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        let os = self.os;

        self.emit(SessionEvent::Busy(true));
        let added = self.list_mut(hive).map(|list| list.add_paths(paths, os));
        self.emit(SessionEvent::Busy(false));

        let added = added?;
        if added > 0 {
            info!("Added {} applications to {}", added, hive.label());
            self.selection_changed();
        }
        Ok(added)
    }

    /// Add every executable found below `folder`
    pub fn add_folder(&mut self, hive: Hive, folder: &Path) -> Result<usize> {
        let paths = find_executables(folder)
            .into_iter()
            .map(|path| path.to_string_lossy().into_owned());
        self.add_paths(hive, paths)
    }

    /// Apply an edit to the displayed settings
    ///
    /// With a single selection the record is edited directly; with several,
    /// every selected record is edited. A freshly picked enum value becomes
    /// the last used value for that category.
    pub fn edit(&mut self, edit: SettingsEdit) -> Result<()> {
        let last_used = self.config.last_used;
        match &mut self.displayed {
            DisplayedSettings::Empty => {
                debug!("Ignoring {:?}: nothing selected", edit);
                return Ok(());
            }
            DisplayedSettings::Single(settings) => {
                edit.validate()?;
                settings.lock().apply(&edit, &last_used)?;
            }
            DisplayedSettings::Aggregated(aggregate) => aggregate.apply(&edit, &last_used)?,
        }

        self.remember(&edit);
        self.emit(SessionEvent::SettingsChanged);
        Ok(())
    }

    /// Untick every category of the selected applications
    pub fn clear_selected(&mut self) -> Result<()> {
        self.edit(SettingsEdit::Clear)
    }

    fn remember(&mut self, edit: &SettingsEdit) {
        let last_used = &mut self.config.last_used;
        let changed = match edit {
            SettingsEdit::CompatibilityMode(mode) => last_used.remember_compatibility_mode(*mode),
            SettingsEdit::ColorMode(mode) => last_used.remember_color_mode(*mode),
            SettingsEdit::DpiScaling(scaling) => last_used.remember_dpi_scaling(*scaling),
            _ => false,
        };

        if changed && self.persist_config {
            // Keep going with the in-memory value if the file cannot be written
            if let Err(e) = ConfigManager::save(&self.config) {
                warn!("Failed to save preferences: {}", e);
            }
        }
    }

    fn single(&self) -> Result<&SharedSettings> {
        match &self.displayed {
            DisplayedSettings::Single(settings) => Ok(settings),
            _ => Err(CompatError::NotSingleSelection),
        }
    }

    /// Append a blank additional flag to the single selected application
    pub fn add_additional_flag(&mut self) -> Result<usize> {
        let index = self.single()?.lock().add_additional_flag();
        self.emit(SessionEvent::SettingsChanged);
        Ok(index)
    }

    /// Edit an additional flag of the single selected application
    pub fn set_additional_flag(&mut self, index: usize, flag: impl Into<String>) -> Result<bool> {
        let found = self.single()?.lock().set_additional_flag(index, flag.into())?;
        if found {
            self.emit(SessionEvent::SettingsChanged);
        }
        Ok(found)
    }

    /// Remove an additional flag of the single selected application
    pub fn remove_additional_flag(&mut self, index: usize) -> Result<Option<String>> {
        let removed = self.single()?.lock().remove_additional_flag(index);
        if removed.is_some() {
            self.emit(SessionEvent::SettingsChanged);
        }
        Ok(removed)
    }

    fn selected_with_hive(&self) -> Vec<(Hive, Application)> {
        self.lists
            .iter()
            .flat_map(|list| {
                list.applications()
                    .iter()
                    .filter(|app| app.is_selected())
                    .map(|app| (list.hive(), app.clone()))
            })
            .collect()
    }

    /// Discard unsaved edits of the selected applications
    pub fn reload_selected(&mut self) -> ReloadReport {
        let targets = self.selected_with_hive();
        self.emit(SessionEvent::Busy(true));

        let lines: Vec<Result<Option<String>>> = targets
            .par_iter()
            .map(|(_, app)| app.read_stored())
            .collect();

        let mut report = ReloadReport::default();
        let mut settings = Vec::with_capacity(targets.len());
        let mut fresh = Vec::with_capacity(targets.len());
        for ((hive, app), line) in targets.iter().zip(lines) {
            match line {
                Ok(line) => {
                    settings.push(Arc::clone(app.settings()));
                    fresh.push(line);
                }
                Err(e) => report.failed.push(EntryFailure {
                    hive: *hive,
                    path: app.path().to_string(),
                    message: e.to_string(),
                }),
            }
        }

        {
            let mut guards = lock_all(&settings);
            for (guard, line) in guards.iter_mut().zip(&fresh) {
                guard.reload(line.as_deref(), self.os);
            }
            report.reloaded = guards.len();
        }

        self.refresh_displayed();
        info!(
            "Reloaded {} applications ({} failed)",
            report.reloaded,
            report.failed.len()
        );
        self.emit(SessionEvent::Busy(false));
        self.emit(SessionEvent::Reloaded(report.clone()));
        report
    }

    /// Write the selected applications to their stores
    pub fn save_selected(&mut self) -> SaveReport {
        let targets = self.selected_with_hive();
        self.emit(SessionEvent::Busy(true));

        let settings: Vec<SharedSettings> = targets
            .iter()
            .map(|(_, app)| Arc::clone(app.settings()))
            .collect();
        let lines: Vec<String> = lock_all(&settings)
            .iter()
            .map(|record| record.to_registry_string(self.os))
            .collect();

        let outcomes: Vec<Result<bool>> = targets
            .par_iter()
            .zip(lines.par_iter())
            .map(|((_, app), line)| {
                if line.trim().is_empty() {
                    app.store()
                        .delete_if_present(app.value_name())
                        .map(|()| false)
                } else {
                    app.store().set(app.value_name(), line).map(|()| true)
                }
            })
            .collect();

        let mut report = SaveReport::default();
        let mut read_back: Vec<&Application> = Vec::new();
        let mut removed: Vec<(Hive, String)> = Vec::new();
        let mut global_saved = false;

        for ((hive, app), outcome) in targets.iter().zip(outcomes) {
            match outcome {
                Ok(written) => {
                    global_saved |= app.is_global();
                    if written {
                        report.written.push(app.path().to_string());
                        read_back.push(app);
                    } else {
                        report.deleted.push(app.path().to_string());
                        if app.is_global() {
                            read_back.push(app);
                        } else {
                            removed.push((*hive, app.value_name().to_string()));
                        }
                    }
                }
                Err(e) => {
                    warn!("Failed to save {}: {}", app.path(), e);
                    report.failed.push(EntryFailure {
                        hive: *hive,
                        path: app.path().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        read_back.par_iter().for_each(|app| match app.read_stored() {
            Ok(line) => app.settings().lock().reload(line.as_deref(), self.os),
            Err(e) => warn!("Failed to read back {}: {}", app.path(), e),
        });

        for list in &mut self.lists {
            let names: Vec<String> = removed
                .iter()
                .filter(|(hive, _)| *hive == list.hive())
                .map(|(_, name)| name.clone())
                .collect();
            if !names.is_empty() {
                list.remove(&names);
            }
        }

        if global_saved {
            platform::notify_environment_changed();
        }

        self.refresh_displayed();
        info!(
            "Saved {} applications, deleted {}, {} failed",
            report.written.len(),
            report.deleted.len(),
            report.failed.len()
        );
        self.emit(SessionEvent::Busy(false));
        self.emit(SessionEvent::Saved(report.clone()));
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{CompatibilityMode, DpiScaling, OtherFlags};
    use crate::registry::{GLOBAL_VALUE_NAME, MemoryStore};
    use crate::settings::{Category, CheckState};
    use crate::test_utils::FailingStore;

    const OS: OsVersion = OsVersion::Windows10;

    fn session_with(entries: &[(&str, &str)]) -> (Session, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_entries("layers", entries.iter().copied()));
        let stores = SessionStores {
            current_user: store.clone(),
            local_machine: None,
            environment: None,
        };
        let session = Session::new(stores, OS, false, AppConfig::default()).unwrap();
        (session, store)
    }

    #[test]
    fn test_displayed_follows_selection() {
        let (mut session, _) = session_with(&[("C:\\a.exe", "~ WIN95"), ("C:\\b.exe", "~ WIN98")]);
        assert!(session.displayed().snapshot().is_none());

        session.select(Hive::CurrentUser, "C:\\a.exe", true).unwrap();
        assert!(!session.displayed().is_aggregated());

        session.select(Hive::CurrentUser, "C:\\b.exe", true).unwrap();
        assert!(session.displayed().is_aggregated());
        let view = session.displayed().snapshot().unwrap();
        assert_eq!(view.checked(Category::CompatibilityMode), CheckState::Indeterminate);

        assert!(!session.select(Hive::CurrentUser, "C:\\missing.exe", true).unwrap());
        assert!(session.select(Hive::LocalMachine, "C:\\a.exe", true).is_err());
    }

    #[test]
    fn test_edit_remembers_last_used_value() {
        let (mut session, _) = session_with(&[("C:\\a.exe", "~ WIN95")]);
        session.select_all(Hive::CurrentUser, true).unwrap();

        session
            .edit(SettingsEdit::DpiScaling(DpiScaling::DpiUnaware))
            .unwrap();
        assert_eq!(session.config().last_used.dpi_scaling, DpiScaling::DpiUnaware);

        session
            .edit(SettingsEdit::Checked(Category::DpiScaling, CheckState::Checked))
            .unwrap();
        let view = session.displayed().snapshot().unwrap();
        assert_eq!(view.dpi_scaling(), DpiScaling::DpiUnaware);
    }

    #[test]
    fn test_additional_flags_need_single_selection() {
        let (mut session, _) = session_with(&[("C:\\a.exe", "~ WIN95"), ("C:\\b.exe", "~ WIN95")]);
        session.select_all(Hive::CurrentUser, true).unwrap();
        assert!(matches!(
            session.add_additional_flag(),
            Err(CompatError::NotSingleSelection)
        ));

        session.select(Hive::CurrentUser, "C:\\b.exe", false).unwrap();
        let index = session.add_additional_flag().unwrap();
        assert!(session.set_additional_flag(index, "FOOBAR").unwrap());
        assert!(session.set_additional_flag(index, "two words").is_err());
    }

    #[test]
    fn test_save_writes_and_deletes() {
        let (mut session, store) =
            session_with(&[("C:\\a.exe", "~ WIN95"), ("C:\\b.exe", "~ RUNASADMIN")]);
        session.select_all(Hive::CurrentUser, true).unwrap();
        session.select(Hive::CurrentUser, "C:\\b.exe", false).unwrap();
        session.clear_selected().unwrap();

        session.select(Hive::CurrentUser, "C:\\b.exe", true).unwrap();
        session.select(Hive::CurrentUser, "C:\\a.exe", false).unwrap();
        session
            .edit(SettingsEdit::OtherFlags(
                OtherFlags::RUN_AS_ADMIN | OtherFlags::RESOLUTION_640X480,
            ))
            .unwrap();

        session.select_all(Hive::CurrentUser, true).unwrap();
        let report = session.save_selected();
        assert!(report.is_success());
        assert_eq!(report.deleted, vec!["C:\\a.exe".to_string()]);
        assert_eq!(report.written, vec!["C:\\b.exe".to_string()]);

        let stored = store.snapshot();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored["C:\\b.exe"], "~ 640X480 RUNASADMIN");

        let list = session.list(Hive::CurrentUser).unwrap();
        assert!(!list.contains("C:\\a.exe"));
        assert!(!list.get("C:\\b.exe").unwrap().settings().lock().has_changed());
    }

    #[test]
    fn test_global_layer_is_never_removed() {
        let environment = Arc::new(MemoryStore::with_entries(
            "env",
            [(GLOBAL_VALUE_NAME, "~ WIN7RTM")],
        ));
        let stores = SessionStores {
            current_user: Arc::new(MemoryStore::new("layers")),
            local_machine: None,
            environment: Some(environment.clone()),
        };
        let mut session = Session::new(stores, OS, false, AppConfig::default()).unwrap();

        session.select(Hive::CurrentUser, "Global", true).unwrap();
        session.clear_selected().unwrap();
        let report = session.save_selected();

        assert_eq!(report.deleted, vec!["Global".to_string()]);
        assert!(environment.snapshot().is_empty());
        let list = session.list(Hive::CurrentUser).unwrap();
        let global = list.get("Global").unwrap();
        assert!(global.is_global());
        assert_eq!(
            global.settings().lock().compatibility_mode(),
            CompatibilityMode::None
        );
    }

    #[test]
    fn test_failed_entry_does_not_stop_batch() {
        let store = MemoryStore::with_entries(
            "layers",
            [("C:\\a.exe", "~ WIN95"), ("C:\\b.exe", "~ WIN95")],
        );
        let stores = SessionStores {
            current_user: Arc::new(FailingStore::new(store, "C:\\a.exe")),
            local_machine: None,
            environment: None,
        };
        let mut session = Session::new(stores, OS, false, AppConfig::default()).unwrap();
        session.select_all(Hive::CurrentUser, true).unwrap();
        session
            .edit(SettingsEdit::CompatibilityMode(CompatibilityMode::VistaRtm))
            .unwrap();

        let report = session.save_selected();
        assert_eq!(report.written, vec!["C:\\b.exe".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, "C:\\a.exe");

        let list = session.list(Hive::CurrentUser).unwrap();
        let failed = list.get("C:\\a.exe").unwrap().settings().lock().clone();
        assert!(failed.has_changed());
        assert_eq!(failed.compatibility_mode(), CompatibilityMode::VistaRtm);
        assert_eq!(
            list.get("C:\\a.exe").unwrap().read_stored().unwrap().as_deref(),
            Some("~ WIN95")
        );
    }

    #[test]
    fn test_reload_discards_edits() {
        let (mut session, store) = session_with(&[("C:\\a.exe", "~ WIN95")]);
        session.select_all(Hive::CurrentUser, true).unwrap();
        session
            .edit(SettingsEdit::CompatibilityMode(CompatibilityMode::Win8Rtm))
            .unwrap();

        store.set("C:\\a.exe", "~ WIN98 HIGHDPIAWARE").unwrap();
        let report = session.reload_selected();
        assert_eq!(report.reloaded, 1);

        let view = session.displayed().snapshot().unwrap();
        assert_eq!(view.compatibility_mode(), CompatibilityMode::Win98);
        assert_eq!(view.dpi_scaling(), DpiScaling::HighDpiAware);
        assert!(!view.has_changed());
    }

    #[test]
    fn test_events_are_published() {
        let (session, _) = session_with(&[("C:\\a.exe", "~ WIN95")]);
        let (tx, rx) = mpsc::sync_channel(16);
        let mut session = session.with_events(tx);

        session.select_all(Hive::CurrentUser, true).unwrap();
        session.save_selected();

        let events: Vec<SessionEvent> = rx.try_iter().collect();
        assert_eq!(events[0], SessionEvent::SelectionChanged);
        assert!(events.contains(&SessionEvent::Busy(true)));
        assert!(matches!(events.last(), Some(SessionEvent::Saved(report)) if report.is_success()));
    }
}
