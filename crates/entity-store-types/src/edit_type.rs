use std::fmt;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

/// Classification of a revision's edit, used for audit queries and the
/// `/entities?edit_type=` listing endpoint.
///
/// Unlike most enums in this crate this one keeps an `Other` escape hatch:
/// the upstream taxonomy includes open-ended families (`cleanup-*`,
/// `migration-*`) that are not worth enumerating exhaustively here. It is
/// serialized as the plain wire string via `as_str`/`from_str_loose` rather
/// than a derived enum representation, since that escape hatch isn't
/// expressible with `#[serde(untagged)]` on a single variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditType {
    Unspecified,
    BotImport,
    BotCleanup,
    BotMerge,
    BotSplit,
    ManualCreate,
    ManualUpdate,
    ManualCorrection,
    SoftDelete,
    HardDelete,
    Undelete,
    RedirectCreate,
    RedirectRevert,
    LockAdded,
    LockRemoved,
    SemiProtectionAdded,
    SemiProtectionRemoved,
    ArchiveAdded,
    ArchiveRemoved,
    MassProtectionAdded,
    MassProtectionRemoved,
    Other(String),
}

impl Serialize for EditType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EditType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer).map_err(D::Error::custom)?;
        Ok(Self::from_str_loose(&s))
    }
}

impl Default for EditType {
    fn default() -> Self {
        Self::Unspecified
    }
}

impl fmt::Display for EditType {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default();
        write!(fmt, "{s}")
    }
}

impl EditType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unspecified => "",
            Self::BotImport => "bot-import",
            Self::BotCleanup => "bot-cleanup",
            Self::BotMerge => "bot-merge",
            Self::BotSplit => "bot-split",
            Self::ManualCreate => "manual-create",
            Self::ManualUpdate => "manual-update",
            Self::ManualCorrection => "manual-correction",
            Self::SoftDelete => "soft-delete",
            Self::HardDelete => "hard-delete",
            Self::Undelete => "undelete",
            Self::RedirectCreate => "redirect-create",
            Self::RedirectRevert => "redirect-revert",
            Self::LockAdded => "lock-added",
            Self::LockRemoved => "lock-removed",
            Self::SemiProtectionAdded => "semi-protection-added",
            Self::SemiProtectionRemoved => "semi-protection-removed",
            Self::ArchiveAdded => "archive-added",
            Self::ArchiveRemoved => "archive-removed",
            Self::MassProtectionAdded => "mass-protection-added",
            Self::MassProtectionRemoved => "mass-protection-removed",
            Self::Other(s) => s,
        }
    }

    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s {
            "" => Self::Unspecified,
            "bot-import" => Self::BotImport,
            "bot-cleanup" => Self::BotCleanup,
            "bot-merge" => Self::BotMerge,
            "bot-split" => Self::BotSplit,
            "manual-create" => Self::ManualCreate,
            "manual-update" => Self::ManualUpdate,
            "manual-correction" => Self::ManualCorrection,
            "soft-delete" => Self::SoftDelete,
            "hard-delete" => Self::HardDelete,
            "undelete" => Self::Undelete,
            "redirect-create" => Self::RedirectCreate,
            "redirect-revert" => Self::RedirectRevert,
            "lock-added" => Self::LockAdded,
            "lock-removed" => Self::LockRemoved,
            "semi-protection-added" => Self::SemiProtectionAdded,
            "semi-protection-removed" => Self::SemiProtectionRemoved,
            "archive-added" => Self::ArchiveAdded,
            "archive-removed" => Self::ArchiveRemoved,
            "mass-protection-added" => Self::MassProtectionAdded,
            "mass-protection-removed" => Self::MassProtectionRemoved,
            other => Self::Other(other.to_owned()),
        }
    }
}
