//! Settings of a single application

use super::CheckState;
use crate::codec::{self, CompatFlags, validate_additional_flag, validate_single_word};
use crate::config::LastUsedValues;
use crate::error::Result;
use crate::flags::{ColorMode, CompatibilityMode, DpiScaling, OtherFlags};
use crate::platform::OsVersion;
use tracing::debug;

/// A settings category with its own checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Compatibility mode selector
    CompatibilityMode,
    /// Reduced color mode selector
    ColorMode,
    /// DPI scaling selector
    DpiScaling,
    /// `640X480` flag
    Resolution640x480,
    /// `DISABLEDXMAXIMIZEDWINDOWEDMODE` flag
    DisableFullscreenOptimizations,
    /// `RUNASADMIN` flag
    RunAsAdmin,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Self; 6] = [
        Self::CompatibilityMode,
        Self::ColorMode,
        Self::DpiScaling,
        Self::Resolution640x480,
        Self::DisableFullscreenOptimizations,
        Self::RunAsAdmin,
    ];

    /// The flag bit a flag category controls; `None` for the enum categories
    pub fn flag(self) -> Option<OtherFlags> {
        match self {
            Self::CompatibilityMode | Self::ColorMode | Self::DpiScaling => None,
            Self::Resolution640x480 => Some(OtherFlags::RESOLUTION_640X480),
            Self::DisableFullscreenOptimizations => {
                Some(OtherFlags::DISABLE_FULLSCREEN_OPTIMIZATIONS)
            }
            Self::RunAsAdmin => Some(OtherFlags::RUN_AS_ADMIN),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A single change made through the settings editor
///
/// Applying an edit to an aggregate applies it to every member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEdit {
    /// Pick a compatibility mode
    CompatibilityMode(CompatibilityMode),
    /// Pick a color mode
    ColorMode(ColorMode),
    /// Pick a DPI scaling override
    DpiScaling(DpiScaling),
    /// Replace the flag bits (flag checkboxes follow)
    OtherFlags(OtherFlags),
    /// Tick, untick or reset a category checkbox
    Checked(Category, CheckState),
    /// Replace the additional flags
    AdditionalFlags(Vec<String>),
    /// Replace everything with decoded flags
    Replace(CompatFlags),
    /// Untick every category and drop the additional flags
    Clear,
}

impl SettingsEdit {
    /// Reject additional flags that would not survive a round trip
    ///
    /// User-entered flags must stay out of the vocabulary. Decoded flags in a
    /// `Replace` only need to be single words.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::AdditionalFlags(flags) => flags.iter().try_for_each(|f| validate_additional_flag(f)),
            Self::Replace(flags) => flags
                .additional_flags
                .iter()
                .try_for_each(|f| validate_single_word(f)),
            _ => Ok(()),
        }
    }
}

/// Editable compatibility settings of one application
///
/// The enum fields hold the last value picked even while their category is
/// unticked; the public getters gate them by the checkbox so that unticking
/// and ticking again restores the previous choice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettingsRecord {
    compatibility_mode: CompatibilityMode,
    color_mode: ColorMode,
    dpi_scaling: DpiScaling,
    other_flags: OtherFlags,
    additional_flags: Vec<String>,
    checks: [CheckState; Category::ALL.len()],
    has_changed: bool,
}

impl SettingsRecord {
    /// Empty settings (every category unticked)
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings as read from decoded flags; each category is ticked when it has a value
    pub fn from_flags(flags: CompatFlags) -> Self {
        let mut record = Self {
            compatibility_mode: flags.compatibility_mode,
            color_mode: flags.color_mode,
            dpi_scaling: flags.dpi_scaling,
            other_flags: flags.other_flags,
            additional_flags: flags.additional_flags,
            ..Self::default()
        };
        record.checks = record.checks_from_values();
        record
    }

    /// Settings decoded from a layer string (absent means no settings)
    pub fn from_registry_string(line: Option<&str>, os: OsVersion) -> Self {
        Self::from_flags(codec::decode(line, os))
    }

    fn checks_from_values(&self) -> [CheckState; Category::ALL.len()] {
        Category::ALL.map(|category| {
            CheckState::from(match category {
                Category::CompatibilityMode => self.compatibility_mode != CompatibilityMode::None,
                Category::ColorMode => self.color_mode != ColorMode::None,
                Category::DpiScaling => self.dpi_scaling != DpiScaling::None,
                flag_category => flag_category
                    .flag()
                    .is_some_and(|flag| self.other_flags.contains(flag)),
            })
        })
    }

    /// Effective compatibility mode (`None` unless its category is ticked)
    pub fn compatibility_mode(&self) -> CompatibilityMode {
        if self.checked(Category::CompatibilityMode).is_checked() {
            self.compatibility_mode
        } else {
            CompatibilityMode::None
        }
    }

    /// Effective color mode (`None` unless its category is ticked)
    pub fn color_mode(&self) -> ColorMode {
        if self.checked(Category::ColorMode).is_checked() {
            self.color_mode
        } else {
            ColorMode::None
        }
    }

    /// Effective DPI scaling (`None` unless its category is ticked)
    pub fn dpi_scaling(&self) -> DpiScaling {
        if self.checked(Category::DpiScaling).is_checked() {
            self.dpi_scaling
        } else {
            DpiScaling::None
        }
    }

    /// Flag bits
    pub fn other_flags(&self) -> OtherFlags {
        self.other_flags
    }

    /// Additional flags, in order, including blank placeholders
    pub fn additional_flags(&self) -> &[String] {
        &self.additional_flags
    }

    /// Checkbox state of a category
    pub fn checked(&self, category: Category) -> CheckState {
        self.checks[category.index()]
    }

    /// Whether anything changed since the last load
    pub fn has_changed(&self) -> bool {
        self.has_changed
    }

    /// Whether saving would delete the registry value
    pub fn is_cleared(&self) -> bool {
        self.effective_flags().is_empty()
    }

    /// The flags that would be written, gated by the checkboxes
    pub fn effective_flags(&self) -> CompatFlags {
        CompatFlags {
            compatibility_mode: self.compatibility_mode(),
            color_mode: self.color_mode(),
            dpi_scaling: self.dpi_scaling(),
            other_flags: self.other_flags,
            additional_flags: self.additional_flags.clone(),
        }
    }

    /// Encode the effective flags; empty means "delete the value"
    pub fn to_registry_string(&self, os: OsVersion) -> String {
        codec::encode(&self.effective_flags(), os)
    }

    fn touch(&mut self, changed: bool) {
        if changed {
            self.has_changed = true;
        }
    }

    /// Pick a compatibility mode
    pub fn set_compatibility_mode(&mut self, mode: CompatibilityMode) {
        let changed = self.compatibility_mode != mode;
        self.compatibility_mode = mode;
        self.touch(changed);
    }

    /// Pick a color mode
    pub fn set_color_mode(&mut self, mode: ColorMode) {
        let changed = self.color_mode != mode;
        self.color_mode = mode;
        self.touch(changed);
    }

    /// Pick a DPI scaling override
    pub fn set_dpi_scaling(&mut self, scaling: DpiScaling) {
        let changed = self.dpi_scaling != scaling;
        self.dpi_scaling = scaling;
        self.touch(changed);
    }

    /// Replace the flag bits; the flag checkboxes follow the bits
    pub fn set_other_flags(&mut self, flags: OtherFlags) {
        let mut changed = self.other_flags != flags;
        self.other_flags = flags;
        for category in Category::ALL {
            if let Some(flag) = category.flag() {
                let state = CheckState::from(flags.contains(flag));
                changed |= self.checks[category.index()] != state;
                self.checks[category.index()] = state;
            }
        }
        self.touch(changed);
    }

    /// Set a category checkbox
    ///
    /// Ticking an enum category whose stored value is `None` starts from the
    /// last used value. Flag categories set their bit only when ticked.
    pub fn set_checked(&mut self, category: Category, state: CheckState, last_used: &LastUsedValues) {
        let mut changed = self.checks[category.index()] != state;

        match category.flag() {
            Some(flag) => {
                let before = self.other_flags;
                self.other_flags.set(flag, state.is_checked());
                changed |= before != self.other_flags;
            }
            None if state.is_checked() => match category {
                Category::CompatibilityMode if self.compatibility_mode == CompatibilityMode::None => {
                    self.compatibility_mode = last_used.compatibility_mode;
                }
                Category::ColorMode if self.color_mode == ColorMode::None => {
                    self.color_mode = last_used.color_mode;
                }
                Category::DpiScaling if self.dpi_scaling == DpiScaling::None => {
                    self.dpi_scaling = last_used.dpi_scaling;
                }
                _ => {}
            },
            None => {}
        }

        self.checks[category.index()] = state;
        self.touch(changed);
    }

    /// Replace the additional flags after validating each one
    pub fn set_additional_flags(&mut self, flags: Vec<String>) -> Result<()> {
        flags.iter().try_for_each(|f| validate_additional_flag(f))?;
        let changed = self.additional_flags != flags;
        self.additional_flags = flags;
        self.touch(changed);
        Ok(())
    }

    /// Append a blank additional flag and return its index
    pub fn add_additional_flag(&mut self) -> usize {
        self.additional_flags.push(String::new());
        self.touch(true);
        self.additional_flags.len() - 1
    }

    /// Edit one additional flag; returns `false` when `index` is out of range
    pub fn set_additional_flag(&mut self, index: usize, flag: String) -> Result<bool> {
        validate_additional_flag(&flag)?;
        let Some(slot) = self.additional_flags.get_mut(index) else {
            return Ok(false);
        };
        let changed = *slot != flag;
        *slot = flag;
        self.touch(changed);
        Ok(true)
    }

    /// Remove one additional flag
    pub fn remove_additional_flag(&mut self, index: usize) -> Option<String> {
        if index >= self.additional_flags.len() {
            return None;
        }
        let removed = self.additional_flags.remove(index);
        self.touch(true);
        Some(removed)
    }

    /// Untick every category and drop the additional flags
    pub fn clear(&mut self, last_used: &LastUsedValues) {
        for category in Category::ALL {
            self.set_checked(category, CheckState::Unchecked, last_used);
        }
        let changed = !self.additional_flags.is_empty();
        self.additional_flags.clear();
        self.touch(changed);
    }

    /// Replace every value with `flags`, ticking the categories that have one
    pub fn replace(&mut self, flags: CompatFlags) -> Result<()> {
        flags
            .additional_flags
            .iter()
            .try_for_each(|f| validate_single_word(f))?;
        let has_changed = self.has_changed;
        let replacement = Self::from_flags(flags);
        let changed = replacement.effective_flags() != self.effective_flags()
            || replacement.checks != self.checks;
        *self = replacement;
        self.has_changed = has_changed;
        self.touch(changed);
        Ok(())
    }

    /// Reload from the stored layer string, discarding unsaved changes
    ///
    /// An enum category that is absent from the string keeps its previous
    /// value (unticked), so ticking it again brings that value back.
    pub fn reload(&mut self, line: Option<&str>, os: OsVersion) {
        let fresh = Self::from_registry_string(line, os);

        if fresh.compatibility_mode != CompatibilityMode::None {
            self.compatibility_mode = fresh.compatibility_mode;
        }
        if fresh.color_mode != ColorMode::None {
            self.color_mode = fresh.color_mode;
        }
        if fresh.dpi_scaling != DpiScaling::None {
            self.dpi_scaling = fresh.dpi_scaling;
        }
        self.other_flags = fresh.other_flags;
        self.additional_flags = fresh.additional_flags;
        self.checks = fresh.checks;
        self.has_changed = false;
        debug!("Reloaded settings from {:?}", line);
    }

    /// Apply an editor change
    pub fn apply(&mut self, edit: &SettingsEdit, last_used: &LastUsedValues) -> Result<()> {
        match edit {
            SettingsEdit::CompatibilityMode(mode) => self.set_compatibility_mode(*mode),
            SettingsEdit::ColorMode(mode) => self.set_color_mode(*mode),
            SettingsEdit::DpiScaling(scaling) => self.set_dpi_scaling(*scaling),
            SettingsEdit::OtherFlags(flags) => self.set_other_flags(*flags),
            SettingsEdit::Checked(category, state) => self.set_checked(*category, *state, last_used),
            SettingsEdit::AdditionalFlags(flags) => self.set_additional_flags(flags.clone())?,
            SettingsEdit::Replace(flags) => self.replace(flags.clone())?,
            SettingsEdit::Clear => self.clear(last_used),
        }
        Ok(())
    }

    /// Value edit to send to every record before ticking an enum category
    ///
    /// `None` unless the edit ticks an enum category and the records' stored
    /// values for it differ; ticking then falls back to the last used value on
    /// all of them.
    pub(crate) fn tick_fallback(
        records: &[&Self],
        edit: &SettingsEdit,
        last_used: &LastUsedValues,
    ) -> Option<SettingsEdit> {
        fn differ<T: PartialEq>(mut values: impl Iterator<Item = T>) -> bool {
            values.next().is_some_and(|first| values.any(|value| value != first))
        }

        let SettingsEdit::Checked(category, CheckState::Checked) = edit else {
            return None;
        };
        match category {
            Category::CompatibilityMode if differ(records.iter().map(|r| r.compatibility_mode)) => {
                Some(SettingsEdit::CompatibilityMode(last_used.compatibility_mode))
            }
            Category::ColorMode if differ(records.iter().map(|r| r.color_mode)) => {
                Some(SettingsEdit::ColorMode(last_used.color_mode))
            }
            Category::DpiScaling if differ(records.iter().map(|r| r.dpi_scaling)) => {
                Some(SettingsEdit::DpiScaling(last_used.dpi_scaling))
            }
            _ => None,
        }
    }

    /// Merge several records into the read-only view shown for a multi-selection
    ///
    /// Enum values survive only when every record agrees, flag bits only when
    /// every record has them. A category that merges to ticked but has nothing
    /// to show becomes `Indeterminate`. Additional flags are never merged.
    pub(crate) fn merged(records: &[&Self]) -> Self {
        fn common<T: Copy + PartialEq + Default>(mut values: impl Iterator<Item = T>) -> T {
            let Some(first) = values.next() else {
                return T::default();
            };
            if values.all(|value| value == first) {
                first
            } else {
                T::default()
            }
        }

        let other_flags = records
            .iter()
            .map(|record| record.other_flags)
            .reduce(|acc, flags| acc & flags)
            .unwrap_or_default();

        let mut merged = Self {
            compatibility_mode: common(records.iter().map(|r| r.compatibility_mode())),
            color_mode: common(records.iter().map(|r| r.color_mode())),
            dpi_scaling: common(records.iter().map(|r| r.dpi_scaling())),
            other_flags,
            additional_flags: Vec::new(),
            checks: Category::ALL
                .map(|category| CheckState::merge(records.iter().map(|r| r.checked(category)))),
            has_changed: records.iter().any(|record| record.has_changed),
        };

        for category in Category::ALL {
            let has_value = match category {
                Category::CompatibilityMode => merged.compatibility_mode != CompatibilityMode::None,
                Category::ColorMode => merged.color_mode != ColorMode::None,
                Category::DpiScaling => merged.dpi_scaling != DpiScaling::None,
                flag_category => flag_category
                    .flag()
                    .is_some_and(|flag| merged.other_flags.contains(flag)),
            };
            if merged.checks[category.index()].is_checked() && !has_value {
                merged.checks[category.index()] = CheckState::Indeterminate;
            }
        }

        merged
    }
}
