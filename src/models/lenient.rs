// Lenient decoders for upstream numeric fields.
// The feed is loosely typed (numbers, numeric strings, null); bad values degrade instead of failing the update.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::Maintainer;

/// Reads a count. Absent, null, negative, non-finite or non-numeric values become 0.
pub fn count_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    if let Some(Value::Number(n)) = &value
        && let Some(exact) = n.as_u64()
    {
        return Ok(exact);
    }
    Ok(value.as_ref().and_then(value_to_f64).map_or(0, f64_to_count))
}

/// Reads an optional score. Non-numeric values are treated as absent.
pub fn score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_f64))
}

/// Reads an optional display string. Numbers are stringified, anything else is absent.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_text))
}

/// Reads the maintainer list. Null or non-array values become empty; bare strings are names;
/// entries with neither a name nor a username are skipped.
pub fn maintainers<'de, D>(deserializer: D) -> Result<Vec<Maintainer>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(entries)) = value else {
        return Ok(Vec::new());
    };
    Ok(entries.iter().filter_map(value_to_maintainer).collect())
}

fn value_to_maintainer(value: &Value) -> Option<Maintainer> {
    let maintainer = match value {
        Value::String(name) => Maintainer {
            name: Some(name.clone()),
            username: None,
        },
        Value::Object(fields) => Maintainer {
            name: fields.get("name").and_then(value_to_text),
            username: fields.get("username").and_then(value_to_text),
        },
        _ => return None,
    };
    maintainer.display_name().is_some().then_some(maintainer)
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn f64_to_count(n: f64) -> u64 {
    if n <= 0.0 { 0 } else { n.trunc() as u64 }
}
