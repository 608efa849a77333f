use serde::{Deserialize, Deserializer};

/// Treat an explicit YAML `null` (e.g. a bare `proxies:` key in a template)
/// the same as a missing field.
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
