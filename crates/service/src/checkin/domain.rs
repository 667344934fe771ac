use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::ServiceError;

pub const SHARED_ITEMS_KEY: &str = "sharedItems";
pub const MISSING_USER_ID: &str = "Missing UserId";

/// Legacy top-level key from the global (pre per-user) layout.
const LEGACY_CHECKINS_KEY: &str = "checkins";

/// Opaque per-user state; the store never looks inside.
pub type UserState = Map<String, Value>;

/// The whole persisted state, one JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: BTreeMap<String, UserState>,
    #[serde(default, rename = "sharedItems", deserialize_with = "array_or_empty")]
    pub shared_items: Vec<Value>,
    /// Unknown top-level keys, written back as found.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A stored `sharedItems` that is not an array loads as empty and is
/// overwritten by the next save that supplies one.
fn array_or_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Ok(items),
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(other) => {
            warn!(found = %other, "stored sharedItems is not an array; treating as empty");
            Ok(Vec::new())
        }
    }
}

impl Document {
    /// The user's state (or the default for an unseen user) with `sharedItems` merged in.
    /// The shared list wins over a same-named user field.
    pub fn user_view(&self, user_id: &UserId) -> UserState {
        let mut view = self
            .users
            .get(user_id.as_str())
            .cloned()
            .unwrap_or_else(default_user_state);
        view.insert(SHARED_ITEMS_KEY.to_owned(), Value::Array(self.shared_items.clone()));
        view
    }

    /// Replace the user's state wholesale, and the shared list when one was supplied.
    pub fn apply(&mut self, user_id: &UserId, update: UserUpdate) {
        self.users.insert(user_id.as_str().to_owned(), update.user_state);
        if let Some(items) = update.shared_items {
            self.shared_items = items;
        }
    }

    pub fn has_legacy_checkins(&self) -> bool {
        self.extra.contains_key(LEGACY_CHECKINS_KEY)
    }
}

/// State handed out for a user id that has never been saved.
pub fn default_user_state() -> UserState {
    let mut state = UserState::new();
    state.insert("checkins".into(), Value::Array(Vec::new()));
    state.insert("streak".into(), Value::from(0));
    state.insert("lastCheckin".into(), Value::Null);
    state
}

/// Client-supplied user identifier. Not authenticated, only required to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn parse(raw: Option<&str>) -> Result<Self, ServiceError> {
        match raw {
            Some(id) if !id.is_empty() => Ok(Self(id.to_owned())),
            _ => Err(ServiceError::Validation(MISSING_USER_ID.into())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A save payload split into the user's own fields and the optional shared list.
#[derive(Debug, Clone, PartialEq)]
pub struct UserUpdate {
    pub user_state: UserState,
    pub shared_items: Option<Vec<Value>>,
}

impl UserUpdate {
    /// Split a raw request body. A falsy `sharedItems` (`null`, `false`, `0`, `""`)
    /// counts as not supplied and is dropped from the user fields as well.
    pub fn from_payload(payload: Value) -> Result<Self, ServiceError> {
        let Value::Object(mut fields) = payload else {
            return Err(ServiceError::Validation("Body must be a JSON object".into()));
        };
        let shared_items = match fields.remove(SHARED_ITEMS_KEY) {
            Some(value) if is_truthy(&value) => match value {
                Value::Array(items) => Some(items),
                _ => return Err(ServiceError::Validation("sharedItems must be an array".into())),
            },
            _ => None,
        };
        Ok(Self { user_state: fields, shared_items })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
