//! Tri-state checkbox value

/// Whether a settings category is active
///
/// `Indeterminate` only arises on an aggregate whose members disagree.
/// Anything but `Checked` gates the category's value off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CheckState {
    /// Category inactive
    #[default]
    Unchecked,
    /// Category active
    Checked,
    /// Members of an aggregate disagree
    Indeterminate,
}

impl CheckState {
    /// Whether the category's value takes effect
    pub fn is_checked(self) -> bool {
        self == Self::Checked
    }

    /// Merge the states of several records: the common value, or `Indeterminate`
    ///
    /// An empty input merges to `Unchecked`.
    pub fn merge(states: impl IntoIterator<Item = Self>) -> Self {
        let mut states = states.into_iter();
        let Some(first) = states.next() else {
            return Self::Unchecked;
        };
        if states.all(|state| state == first) {
            first
        } else {
            Self::Indeterminate
        }
    }
}

impl From<bool> for CheckState {
    fn from(value: bool) -> Self {
        if value { Self::Checked } else { Self::Unchecked }
    }
}
