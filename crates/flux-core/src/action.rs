//! Actions: a string `type` plus an arbitrary payload.

use serde_json::{Map, Value};
use thiserror::Error;

/// Everything in an action except its `type`
pub type Payload = Map<String, Value>;

/// Field carrying the action discriminator
pub const TYPE_FIELD: &str = "type";

/// Why a raw value is not an action
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("action is not an object")]
    NotAnObject,

    #[error("action has no `type` field")]
    MissingType,

    #[error("action `type` is not a string")]
    NonStringType,
}

/// A well-formed action
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    action_type: String,
    payload: Payload,
}

impl Action {
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            payload: Payload::new(),
        }
    }

    /// Add a payload field
    ///
    /// A `type` key is ignored; the discriminator is fixed at construction.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != TYPE_FIELD {
            self.payload.insert(key, value.into());
        }
        self
    }

    /// Validate a raw action and split off its payload
    pub fn parse(raw: Value) -> Result<Self, ActionError> {
        let Value::Object(mut fields) = raw else {
            return Err(ActionError::NotAnObject);
        };

        match fields.remove(TYPE_FIELD) {
            Some(Value::String(action_type)) => Ok(Self {
                action_type,
                payload: fields,
            }),
            Some(_) => Err(ActionError::NonStringType),
            None => Err(ActionError::MissingType),
        }
    }

    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_parts(self) -> (String, Payload) {
        (self.action_type, self.payload)
    }

    /// The full action as a JSON object, `type` included
    pub fn to_value(&self) -> Value {
        let mut fields = self.payload.clone();
        fields.insert(TYPE_FIELD.to_string(), Value::String(self.action_type.clone()));
        Value::Object(fields)
    }
}

impl From<Action> for Value {
    fn from(action: Action) -> Self {
        action.to_value()
    }
}

impl TryFrom<Value> for Action {
    type Error = ActionError;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}
