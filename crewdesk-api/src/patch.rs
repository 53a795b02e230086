/// Three-way optional fields for update requests
///
/// A JSON update body needs to distinguish "leave this field unchanged"
/// from "clear this field" from "set this field". [`Patch`] makes the
/// three states explicit instead of overloading sentinel values:
///
/// - field absent        → `Keep`  (leave unchanged)
/// - field `null` or `""` → `Clear` (set to NULL)
/// - field has a value   → `Set(value)`
///
/// The empty string is accepted as a clear signal for wire compatibility
/// with clients of the original service.
///
/// # Example
///
/// ```
/// use crewdesk_api::patch::Patch;
/// use serde::Deserialize;
/// use uuid::Uuid;
///
/// #[derive(Deserialize)]
/// struct UpdateRequest {
///     #[serde(default)]
///     assignee_id: Patch<Uuid>,
/// }
///
/// let req: UpdateRequest = serde_json::from_str("{}").unwrap();
/// assert!(matches!(req.assignee_id, Patch::Keep));
///
/// let req: UpdateRequest = serde_json::from_str(r#"{"assignee_id": null}"#).unwrap();
/// assert!(matches!(req.assignee_id, Patch::Clear));
/// ```

use serde::de::{Deserialize, DeserializeOwned, Deserializer, Error};
use serde_json::Value;

/// A tagged three-way update field: keep, clear, or set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field was absent: leave the current value unchanged
    Keep,

    /// Field was explicitly emptied: clear the current value
    Clear,

    /// Field carries a new value
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    /// Returns the new value when one was supplied
    pub fn set_value(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            _ => None,
        }
    }

    /// Converts to the doubly-optional shape the model layer uses:
    /// `None` = unchanged, `Some(None)` = clear, `Some(Some(v))` = set
    pub fn into_update(self) -> Option<Option<T>> {
        match self {
            Patch::Keep => None,
            Patch::Clear => Some(None),
            Patch::Set(value) => Some(Some(value)),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;

        match value {
            Value::Null => Ok(Patch::Clear),
            Value::String(ref s) if s.is_empty() => Ok(Patch::Clear),
            other => T::deserialize(other).map(Patch::Set).map_err(Error::custom),
        }
    }
}
