//! Session records
//!
//! A session exists in two shapes. [`ErasedSession`] is what stores persist:
//! the application payload is an uninterpreted JSON document, so a single
//! store can serve scenes with unrelated data types. [`Session<T>`] is what
//! scene code works with: the payload is decoded into the scene's own type.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::utils::errors::{ScenarioError, Result};

/// Bound for data carried by a typed session
pub trait SessionData: Serialize + DeserializeOwned + Default + Send + Sync + 'static {}

impl<T> SessionData for T where T: Serialize + DeserializeOwned + Default + Send + Sync + 'static {}

/// Storage shape of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErasedSession {
    pub chat_id: i64,
    pub user_id: i64,
    /// Active scene; empty when no scene is active
    #[serde(default)]
    pub scene: String,
    #[serde(default)]
    pub step: i32,
    #[serde(default = "empty_payload")]
    pub data: Value,
    #[serde(default = "Utc::now")]
    pub updated: DateTime<Utc>,
}

impl ErasedSession {
    /// A session with no active scene and no data
    pub fn empty(chat_id: i64, user_id: i64) -> Self {
        Self {
            chat_id,
            user_id,
            scene: String::new(),
            step: 0,
            data: empty_payload(),
            updated: Utc::now(),
        }
    }

    pub fn has_scene(&self) -> bool {
        !self.scene.is_empty()
    }
}

/// Typed shape of a session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session<T> {
    pub chat_id: i64,
    pub user_id: i64,
    pub scene: String,
    pub step: i32,
    pub data: T,
    pub updated: DateTime<Utc>,
}

impl<T: SessionData> Session<T> {
    /// Encode into the storage shape, stamping `updated` with the current time
    pub fn to_erased(&self) -> Result<ErasedSession> {
        let data = match serde_json::to_value(&self.data).map_err(ScenarioError::Encode)? {
            Value::Null => empty_payload(),
            value => value,
        };

        Ok(ErasedSession {
            chat_id: self.chat_id,
            user_id: self.user_id,
            scene: self.scene.clone(),
            step: self.step,
            data,
            updated: Utc::now(),
        })
    }

    /// Decode from the storage shape.
    ///
    /// A missing session, `null` or `{}` payload yields `T::default()`.
    pub fn from_erased(erased: Option<&ErasedSession>) -> Result<Self> {
        let Some(erased) = erased else {
            return Ok(Self::default());
        };

        Ok(Self {
            chat_id: erased.chat_id,
            user_id: erased.user_id,
            scene: erased.scene.clone(),
            step: erased.step,
            data: decode_payload(&erased.data)?,
            updated: erased.updated,
        })
    }
}

/// Decode a stored payload into `T`, treating empty payloads as no value
pub fn decode_payload<T: SessionData>(payload: &Value) -> Result<T> {
    match payload {
        Value::Null => Ok(T::default()),
        Value::Object(map) if map.is_empty() => Ok(T::default()),
        other => T::deserialize(other).map_err(ScenarioError::Decode),
    }
}

fn empty_payload() -> Value {
    Value::Object(serde_json::Map::new())
}
