use serde::{Deserialize, Deserializer};
use std::io::Read;

/// Raw CSV row as exported from the program database. Field validation and
/// conversion happen in [`super::mapping`].
#[derive(Debug, Deserialize)]
pub(crate) struct ProgramRow {
    #[serde(rename = "Program ID")]
    pub(crate) id: String,
    #[serde(rename = "Name")]
    pub(crate) name: String,
    #[serde(rename = "Category")]
    pub(crate) category: String,
    #[serde(rename = "Region", default, deserialize_with = "empty_string_as_none")]
    pub(crate) region: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    pub(crate) status: Option<String>,
    #[serde(rename = "Formula")]
    pub(crate) formula: String,
    #[serde(rename = "Rate", default)]
    pub(crate) rate: Option<f64>,
    #[serde(rename = "Cap", default)]
    pub(crate) cap: Option<f64>,
    #[serde(
        rename = "Project Types",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) project_types: Option<String>,
    #[serde(rename = "Min Units", default)]
    pub(crate) min_units: Option<u32>,
    #[serde(rename = "Max Units", default)]
    pub(crate) max_units: Option<u32>,
    #[serde(rename = "Min Budget", default)]
    pub(crate) min_budget: Option<f64>,
    #[serde(rename = "Max Budget", default)]
    pub(crate) max_budget: Option<f64>,
    #[serde(
        rename = "Exclusive With",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) exclusive_with: Option<String>,
    #[serde(rename = "Confidence", default)]
    pub(crate) confidence: Option<f64>,
    #[serde(
        rename = "Expires On",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) expires_on: Option<String>,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ProgramRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader.deserialize::<ProgramRow>().collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
