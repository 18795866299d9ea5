use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referenced table
    pub table: String,

    /// Referenced column
    pub column: String,

    pub on_update: FkAction,
    pub on_delete: FkAction,
}

/// Referential action run when the referenced row changes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FkAction {
    /// `NO ACTION`; treated as `Restrict`
    #[default]
    None,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl FkAction {
    /// Parses the rule names reported by `information_schema`.
    pub fn from_rule(rule: &str) -> FkAction {
        match rule.trim().to_ascii_uppercase().as_str() {
            "CASCADE" => FkAction::Cascade,
            "SET NULL" => FkAction::SetNull,
            "SET DEFAULT" => FkAction::SetDefault,
            "RESTRICT" => FkAction::Restrict,
            _ => FkAction::None,
        }
    }

    /// Dependents block the change.
    pub fn is_restrict(self) -> bool {
        matches!(self, FkAction::None | FkAction::Restrict)
    }
}
