//! The Protection Policy Engine (spec §4.D): a pure function deciding
//! whether a proposed write is admissible given the current head's flags.
//! Grounded on the inline protection-check ordering in `main.py`'s
//! `POST /entity` handler (archived → locked → mass_edit_protected →
//! semi_protected).

use entity_store_types::ProtectionFlags;

/// The protection-relevant facts about the incoming request, independent
/// of the entity body itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestFlags {
    pub is_mass_edit: bool,
    pub is_not_autoconfirmed_user: bool,
}

/// Evaluates the five ordered rules of §4.D. `None` means the write is
/// admitted; `Some(reason)` names the first rule that denied it.
#[must_use]
pub fn admit(current: &ProtectionFlags, request: &RequestFlags) -> Option<&'static str> {
    if current.is_archived {
        return Some("archived");
    }
    if current.is_locked {
        return Some("locked");
    }
    if current.is_mass_edit_protected && request.is_mass_edit {
        return Some("mass-edits-blocked");
    }
    if current.is_semi_protected && request.is_not_autoconfirmed_user {
        return Some("semi-protected");
    }
    None
}

/// Additional checks §4.F applies to a redirect *target* on top of [`admit`]:
/// the target must not be archived or locked. (Deletion is checked
/// separately by the caller since it produces a different error kind.)
#[must_use]
pub fn admit_redirect_target(target_flags: &ProtectionFlags) -> Option<&'static str> {
    if target_flags.is_archived {
        return Some("archived");
    }
    if target_flags.is_locked {
        return Some("locked");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags() -> ProtectionFlags {
        ProtectionFlags::default()
    }

    #[test]
    fn allows_by_default() {
        assert_eq!(admit(&flags(), &RequestFlags::default()), None);
    }

    #[test]
    fn archived_wins_over_everything() {
        let current = ProtectionFlags {
            is_archived: true,
            is_locked: true,
            ..flags()
        };
        assert_eq!(admit(&current, &RequestFlags::default()), Some("archived"));
    }

    #[test]
    fn locked_denies_regardless_of_request() {
        let current = ProtectionFlags {
            is_locked: true,
            ..flags()
        };
        assert_eq!(admit(&current, &RequestFlags::default()), Some("locked"));
    }

    #[test]
    fn mass_edit_protection_only_blocks_mass_edits() {
        let current = ProtectionFlags {
            is_mass_edit_protected: true,
            ..flags()
        };
        assert_eq!(
            admit(&current, &RequestFlags { is_mass_edit: true, ..Default::default() }),
            Some("mass-edits-blocked")
        );
        assert_eq!(
            admit(&current, &RequestFlags { is_mass_edit: false, ..Default::default() }),
            None
        );
    }

    #[test]
    fn semi_protection_only_blocks_non_autoconfirmed() {
        let current = ProtectionFlags {
            is_semi_protected: true,
            ..flags()
        };
        assert_eq!(
            admit(
                &current,
                &RequestFlags { is_not_autoconfirmed_user: true, ..Default::default() }
            ),
            Some("semi-protected")
        );
        assert_eq!(
            admit(
                &current,
                &RequestFlags { is_not_autoconfirmed_user: false, ..Default::default() }
            ),
            None
        );
    }
}
