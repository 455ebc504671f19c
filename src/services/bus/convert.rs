//! Conversions between bus variants and modem values.

use std::collections::HashMap;

use zbus::zvariant::{OwnedValue, Value};

use crate::services::modem::{ModemStatus, Properties, PropertyValue};

use super::BusError;

/// Property bag of a `Simple.Connect` call.
pub fn properties_from_bus(dict: &HashMap<String, OwnedValue>) -> Properties {
    dict.iter()
        .map(|(name, value)| (name.clone(), property_value(value)))
        .collect()
}

fn property_value(value: &Value<'_>) -> PropertyValue {
    match value {
        Value::Str(text) => PropertyValue::String(text.to_string()),
        Value::U32(number) => PropertyValue::U32(*number),
        Value::I32(number) => PropertyValue::I32(*number),
        Value::Bool(flag) => PropertyValue::Bool(*flag),
        Value::Value(inner) => property_value(inner),
        other => PropertyValue::Other(other.value_signature().to_string()),
    }
}

/// Status dictionary of a `Simple.GetStatus` reply.
///
/// # Errors
/// Returns `BusError::ZBus` if a value cannot be converted
pub fn status_to_bus(status: &ModemStatus) -> Result<HashMap<String, OwnedValue>, BusError> {
    let mut dict = HashMap::new();

    if let Some(quality) = status.signal_quality {
        dict.insert("signal_quality".to_owned(), owned(Value::from(quality))?);
    }
    if let Some(band_class) = status.band_class {
        dict.insert("band_class".to_owned(), owned(Value::from(band_class))?);
    }
    if let Some(band) = status.band {
        dict.insert("band".to_owned(), owned(Value::from(band.to_string()))?);
    }
    if let Some(sid) = status.sid {
        dict.insert("sid".to_owned(), owned(Value::from(sid))?);
    }

    Ok(dict)
}

fn owned(value: Value<'_>) -> Result<OwnedValue, BusError> {
    OwnedValue::try_from(value).map_err(|err| BusError::ZBus(err.into()))
}
