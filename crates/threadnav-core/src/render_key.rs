use std::fmt;
use std::hash::{Hash, Hasher};

use crate::document::Role;
use crate::collections::FingerprintHasher;
use crate::identity::MessageId;

/// Which roles the navigator lists.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    UserOnly,
    #[default]
    UserAndAssistant,
}

impl DisplayMode {
    /// Unknown roles are never listed.
    pub fn admits(self, role: Role) -> bool {
        match self {
            DisplayMode::UserOnly => role == Role::User,
            DisplayMode::UserAndAssistant => matches!(role, Role::User | Role::Assistant),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::UserOnly => "user",
            DisplayMode::UserAndAssistant => "both",
        }
    }
}

/// Structural fingerprint of a visible set: the mode plus the ordered
/// `(identity, role)` pairs. Text does not participate.
///
/// Equality compares the full sequence; [`RenderKey::fingerprint`] is a
/// compact hash for logs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RenderKey {
    mode: DisplayMode,
    entries: Vec<(MessageId, Role)>,
}

impl RenderKey {
    pub fn new(mode: DisplayMode, entries: impl IntoIterator<Item = (MessageId, Role)>) -> Self {
        Self {
            mode,
            entries: entries.into_iter().collect(),
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stable within one process; not meant to be persisted.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FingerprintHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

impl fmt::Display for RenderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.mode.as_str())?;
        for (index, (id, role)) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str("|")?;
            }
            write!(f, "{id}:{role}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(mode: DisplayMode, entries: &[(&str, Role)]) -> RenderKey {
        RenderKey::new(
            mode,
            entries.iter().map(|(id, role)| (MessageId::from(*id), *role)),
        )
    }

    const BASE: &[(&str, Role)] = &[("ctn-0", Role::User), ("ctn-1", Role::Assistant)];

    #[test]
    fn equal_sequences_give_equal_keys() {
        let a = key(DisplayMode::UserAndAssistant, BASE);
        let b = key(DisplayMode::UserAndAssistant, BASE);
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.to_string(), "both:ctn-0:user|ctn-1:assistant");
    }

    #[test]
    fn identity_swap_changes_the_key() {
        let base = key(DisplayMode::UserAndAssistant, BASE);
        let swapped = key(
            DisplayMode::UserAndAssistant,
            &[("ctn-0", Role::User), ("ctn-2", Role::Assistant)],
        );
        assert_eq!(base.len(), swapped.len());
        assert_ne!(base, swapped);
        assert_ne!(base.fingerprint(), swapped.fingerprint());
    }

    #[test]
    fn role_change_changes_the_key() {
        let base = key(DisplayMode::UserAndAssistant, BASE);
        let changed = key(
            DisplayMode::UserAndAssistant,
            &[("ctn-0", Role::User), ("ctn-1", Role::User)],
        );
        assert_ne!(base, changed);
        assert_ne!(base.fingerprint(), changed.fingerprint());
    }

    #[test]
    fn reorder_changes_the_key() {
        let base = key(DisplayMode::UserAndAssistant, BASE);
        let reordered = key(
            DisplayMode::UserAndAssistant,
            &[("ctn-1", Role::Assistant), ("ctn-0", Role::User)],
        );
        assert_eq!(base.len(), reordered.len());
        assert_ne!(base, reordered);
        assert_ne!(base.fingerprint(), reordered.fingerprint());
    }

    #[test]
    fn mode_changes_the_key() {
        let both = key(DisplayMode::UserAndAssistant, &[("ctn-0", Role::User)]);
        let users = key(DisplayMode::UserOnly, &[("ctn-0", Role::User)]);
        assert_ne!(both, users);
        assert_eq!(users.mode(), DisplayMode::UserOnly);
        assert_ne!(both.fingerprint(), users.fingerprint());
    }

    #[test]
    fn empty_keys_still_carry_the_mode() {
        let empty = key(DisplayMode::UserOnly, &[]);
        assert!(empty.is_empty());
        assert_ne!(empty, key(DisplayMode::UserAndAssistant, &[]));
    }
}
