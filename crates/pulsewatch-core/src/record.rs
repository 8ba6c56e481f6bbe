//! Wire types for the statewise data feed.

use serde::{Deserialize, Deserializer, Serialize};

/// One row of the `statewise` array.
///
/// Row 0 is the aggregate (national) row and is the only one whose delta
/// columns and `lastupdatedtime` are read. Counts arrive as strings in the
/// public feed; plain JSON numbers are accepted as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionRecord {
    pub state: String,
    pub statecode: String,
    #[serde(deserialize_with = "string_or_number")]
    pub confirmed: String,
    #[serde(deserialize_with = "string_or_number")]
    pub active: String,
    #[serde(deserialize_with = "string_or_number")]
    pub recovered: String,
    #[serde(deserialize_with = "string_or_number")]
    pub deaths: String,
    #[serde(deserialize_with = "string_or_number")]
    pub deltaconfirmed: String,
    #[serde(deserialize_with = "string_or_number")]
    pub deltarecovered: String,
    #[serde(deserialize_with = "string_or_number")]
    pub deltadeaths: String,
    pub lastupdatedtime: String,
}

/// Body of `GET <data url>`.
///
/// A body without a `statewise` key deserializes to `None` and is ignored by
/// the watcher.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatewisePayload {
    #[serde(default)]
    pub statewise: Option<Vec<RegionRecord>>,
}

impl StatewisePayload {
    /// Rows of the payload, empty when the key was missing.
    pub fn rows(&self) -> &[RegionRecord] {
        self.statewise.as_deref().unwrap_or_default()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number count, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_public_feed_shape() {
        let json = r#"{
            "statewise": [
                {
                    "active": "4",
                    "confirmed": "10",
                    "deaths": "1",
                    "deltaconfirmed": "5",
                    "deltadeaths": "1",
                    "deltarecovered": "2",
                    "lastupdatedtime": "26/04/2020 21:21:28",
                    "recovered": "5",
                    "state": "Total",
                    "statecode": "TT"
                },
                { "state": "Kerala", "confirmed": "10", "active": "4", "recovered": "5", "deaths": "1" }
            ]
        }"#;
        let payload: StatewisePayload = serde_json::from_str(json).unwrap();
        let rows = payload.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].statecode, "TT");
        assert_eq!(rows[0].lastupdatedtime, "26/04/2020 21:21:28");
        assert_eq!(rows[1].state, "Kerala");
        assert_eq!(rows[1].deltaconfirmed, "");
    }

    #[test]
    fn accepts_numeric_counts() {
        let row: RegionRecord =
            serde_json::from_str(r#"{"confirmed": 12, "deaths": null}"#).unwrap();
        assert_eq!(row.confirmed, "12");
        assert_eq!(row.deaths, "");
    }

    #[test]
    fn rejects_structured_counts() {
        let result = serde_json::from_str::<RegionRecord>(r#"{"confirmed": [1]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_statewise_is_empty() {
        let payload: StatewisePayload = serde_json::from_str(r#"{"tested": []}"#).unwrap();
        assert!(payload.statewise.is_none());
        assert!(payload.rows().is_empty());
    }
}
