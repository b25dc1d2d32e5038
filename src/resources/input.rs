use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single input reported by `giveInput`, for one control. `raw` retains
/// the full params object so callers can read fields this type doesn't
/// project, without re-parsing the frame.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ControlInput {
    pub control_id: String,
    pub event: ControlInputEvent,
    pub raw: Value,
}

/// The typed projection of an input event. `Generic` is the forward
/// compatibility sentinel for event names this type doesn't know about;
/// it serializes back to its original event name with no extra fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlInputEvent {
    MouseDown,
    MouseUp,
    KeyDown { key_code: i32 },
    KeyUp { key_code: i32 },
    Move { x: f64, y: f64 },
    Submit { value: Option<String> },
    Generic(String),
}

impl Serialize for ControlInputEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        #[derive(Serialize)]
        #[serde(tag = "event", rename_all = "camelCase")]
        enum Wire {
            MouseDown,
            MouseUp,
            KeyDown { key_code: i32 },
            KeyUp { key_code: i32 },
            Move { x: f64, y: f64 },
            Submit { value: Option<String> },
        }

        match self {
            Self::MouseDown => Wire::MouseDown.serialize(serializer),
            Self::MouseUp => Wire::MouseUp.serialize(serializer),
            Self::KeyDown { key_code } => Wire::KeyDown { key_code: *key_code }.serialize(serializer),
            Self::KeyUp { key_code } => Wire::KeyUp { key_code: *key_code }.serialize(serializer),
            Self::Move { x, y } => Wire::Move { x: *x, y: *y }.serialize(serializer),
            Self::Submit { value } => Wire::Submit { value: value.clone() }.serialize(serializer),
            Self::Generic(name) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("event", name)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ControlInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let control_id = raw
            .get("controlID")
            .and_then(Value::as_str)
            .ok_or_else(|| DeError::custom("input missing controlID"))?
            .to_string();
        let event = ControlInputEvent::from_raw(&raw)
            .map_err(|err| DeError::custom(err.to_string()))?;
        Ok(ControlInput {
            control_id,
            event,
            raw,
        })
    }
}

impl ControlInputEvent {
    fn from_raw(raw: &Value) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(tag = "event", rename_all = "camelCase")]
        enum Wire {
            KeyDown { key_code: i32 },
            KeyUp { key_code: i32 },
            Move { x: f64, y: f64 },
            Submit {
                #[serde(default)]
                value: Option<String>,
            },
        }

        let event_name = raw.get("event").and_then(Value::as_str).unwrap_or("");
        match event_name {
            "mouseDown" => Ok(Self::MouseDown),
            "mouseUp" => Ok(Self::MouseUp),
            "keyDown" | "keyUp" | "move" | "submit" => match serde_json::from_value(raw.clone())? {
                Wire::KeyDown { key_code } => Ok(Self::KeyDown { key_code }),
                Wire::KeyUp { key_code } => Ok(Self::KeyUp { key_code }),
                Wire::Move { x, y } => Ok(Self::Move { x, y }),
                Wire::Submit { value } => Ok(Self::Submit { value }),
            },
            other => Ok(Self::Generic(other.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::MouseDown => "mouseDown",
            Self::MouseUp => "mouseUp",
            Self::KeyDown { .. } => "keyDown",
            Self::KeyUp { .. } => "keyUp",
            Self::Move { .. } => "move",
            Self::Submit { .. } => "submit",
            Self::Generic(name) => name,
        }
    }
}
