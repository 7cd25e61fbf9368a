use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Live connection facts for one device (or the `total` aggregate).
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct ConnectionSample {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub paused: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_version: Option<String>,
    #[serde(default, rename(deserialize = "type"), skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_counter")]
    pub in_bytes_total: Option<u64>,
    #[serde(default, deserialize_with = "lenient_counter")]
    pub out_bytes_total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    /// Set only after a two-point sample; never negative.
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub in_bps: Option<f64>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub out_bps: Option<f64>,
}

/// A counter that is not a non-negative integer reads as unknown.
fn lenient_counter<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_u64())
}

/// Response of `rest/system/connections`.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ConnectionsSnapshot {
    #[serde(default)]
    pub total: ConnectionSample,
    #[serde(default)]
    pub connections: HashMap<String, ConnectionSample>,
}

impl ConnectionsSnapshot {
    pub fn get(&self, device_id: &str) -> Option<&ConnectionSample> {
        self.connections.get(device_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_counters_read_as_unknown() {
        let sample: ConnectionSample = serde_json::from_str(
            r#"{"connected": true, "inBytesTotal": "1000", "outBytesTotal": -5}"#,
        )
        .unwrap();
        assert!(sample.connected);
        assert_eq!(sample.in_bytes_total, None);
        assert_eq!(sample.out_bytes_total, None);

        let sample: ConnectionSample =
            serde_json::from_str(r#"{"inBytesTotal": 12.5, "outBytesTotal": 42}"#).unwrap();
        assert_eq!(sample.in_bytes_total, None);
        assert_eq!(sample.out_bytes_total, Some(42));
    }
}
