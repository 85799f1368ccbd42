use super::CellValue;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Dashboard payload built from a user's worksheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub labels: Vec<CellValue>,
    pub dashboard_summary: CellValue,
    pub comparison_summary: CellValue,
    pub compare_stats: Vec<StatRow>,
    pub performance: Vec<PerformancePoint>,
    pub compare_performance: Vec<ComparePoint>,
}

/// `{label, value1, value2, ...}`
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub label: CellValue,
    pub values: Vec<CellValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformancePoint {
    #[serde(skip_serializing_if = "CellValue::is_empty")]
    pub name: CellValue,
    pub value: CellValue,
}

/// `{name, value1, value2, ...}`
#[derive(Debug, Clone, PartialEq)]
pub struct ComparePoint {
    pub name: CellValue,
    pub values: Vec<CellValue>,
}

fn serialize_numbered<S: Serializer>(
    serializer: S,
    key: &str,
    head: &CellValue,
    values: &[CellValue],
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(None)?;
    if !head.is_empty() {
        map.serialize_entry(key, head)?;
    }
    for (idx, value) in values.iter().enumerate() {
        map.serialize_entry(&format!("value{}", idx + 1), value)?;
    }
    map.end()
}

impl Serialize for StatRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_numbered(serializer, "label", &self.label, &self.values)
    }
}

impl Serialize for ComparePoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_numbered(serializer, "name", &self.name, &self.values)
    }
}
