use crate::measurement::value::MeasureValue;
use crate::prelude::{CoreError, CoreResult};
use crate::projection::SourceSlice;
use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// Flat name → value mapping kept in source insertion order.
pub type MeasureMap = IndexMap<String, MeasureValue>;

/// One period of the simulation time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecord {
    #[serde(default = "MeasureValue::missing")]
    pub population: MeasureValue,
    #[serde(default = "MeasureValue::missing")]
    pub biodiversity_index: MeasureValue,
}

impl PeriodRecord {
    pub fn new(population: impl Into<MeasureValue>, biodiversity_index: f64) -> Self {
        Self {
            population: population.into(),
            biodiversity_index: MeasureValue::Number(biodiversity_index),
        }
    }

    fn unreadable() -> Self {
        Self {
            population: MeasureValue::missing(),
            biodiversity_index: MeasureValue::missing(),
        }
    }
}

impl MeasureValue {
    pub(crate) fn missing() -> Self {
        MeasureValue::Unreadable(serde_json::Value::Null)
    }
}

/// The simulation's raw data at one point in time.
///
/// Each section may be empty but is never absent: a missing or malformed
/// section deserializes to an empty map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSnapshot {
    #[serde(
        rename = "speciesData",
        alias = "speciesPopulations",
        default,
        deserialize_with = "lenient_measures"
    )]
    pub species_populations: MeasureMap,
    #[serde(
        rename = "environmentalFactors",
        default,
        deserialize_with = "lenient_measures"
    )]
    pub environmental_factors: MeasureMap,
    #[serde(
        rename = "timeSeriesData",
        alias = "timeSeries",
        default,
        deserialize_with = "lenient_series"
    )]
    pub time_series: IndexMap<String, PeriodRecord>,
}

/// A value that will be plotted as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueIssue {
    pub slice: SourceSlice,
    pub label: String,
    pub field: &'static str,
}

impl MeasurementSnapshot {
    pub fn from_json_str(contents: &str) -> CoreResult<Self> {
        serde_json::from_str(contents).map_err(|err| CoreError::Snapshot(err.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|err| {
            CoreError::Snapshot(format!("reading {}: {}", path_ref.display(), err))
        })?;
        Self::from_json_str(&contents)
    }

    /// Number of entries in the given section.
    pub fn entry_count(&self, slice: SourceSlice) -> usize {
        match slice {
            SourceSlice::Species => self.species_populations.len(),
            SourceSlice::Environmental => self.environmental_factors.len(),
            SourceSlice::TimeSeries => self.time_series.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.species_populations.is_empty()
            && self.environmental_factors.is_empty()
            && self.time_series.is_empty()
    }

    /// Lists every value that projection would coerce to zero.
    pub fn validate(&self) -> Vec<ValueIssue> {
        let mut issues = Vec::new();
        let flat = [
            (SourceSlice::Species, &self.species_populations),
            (SourceSlice::Environmental, &self.environmental_factors),
        ];
        for (slice, section) in flat {
            for (label, value) in section {
                if value.as_finite().is_none() {
                    issues.push(ValueIssue {
                        slice,
                        label: label.clone(),
                        field: "value",
                    });
                }
            }
        }
        for (label, record) in &self.time_series {
            if record.population.as_finite().is_none() {
                issues.push(ValueIssue {
                    slice: SourceSlice::TimeSeries,
                    label: label.clone(),
                    field: "population",
                });
            }
            if record.biodiversity_index.as_finite().is_none() {
                issues.push(ValueIssue {
                    slice: SourceSlice::TimeSeries,
                    label: label.clone(),
                    field: "biodiversityIndex",
                });
            }
        }
        issues
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSection<T> {
    Entries(IndexMap<String, T>),
    Other(serde_json::Value),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPeriod {
    Record(PeriodRecord),
    Other(serde_json::Value),
}

fn lenient_measures<'de, D>(deserializer: D) -> Result<MeasureMap, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawSection::<MeasureValue>::deserialize(deserializer)? {
        RawSection::Entries(entries) => entries,
        RawSection::Other(other) => {
            discard_section(&other);
            MeasureMap::new()
        }
    })
}

fn lenient_series<'de, D>(deserializer: D) -> Result<IndexMap<String, PeriodRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawSection::<RawPeriod>::deserialize(deserializer)? {
        RawSection::Entries(entries) => entries
            .into_iter()
            .map(|(period, raw)| {
                let record = match raw {
                    RawPeriod::Record(record) => record,
                    RawPeriod::Other(_) => {
                        warn!("period {} is not a record; plotting it as zero", period);
                        PeriodRecord::unreadable()
                    }
                };
                (period, record)
            })
            .collect(),
        RawSection::Other(other) => {
            discard_section(&other);
            IndexMap::new()
        }
    })
}

fn discard_section(value: &serde_json::Value) {
    if !value.is_null() {
        warn!("snapshot section is not a mapping ({}); treating it as empty", value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_default_to_empty() {
        let snapshot = MeasurementSnapshot::from_json_str("{}").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn malformed_sections_normalize_to_empty() {
        let snapshot = MeasurementSnapshot::from_json_str(
            r#"{"speciesData": [1, 2], "environmentalFactors": "hot", "timeSeriesData": null}"#,
        )
        .unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn flat_sections_keep_source_order() {
        let snapshot = MeasurementSnapshot::from_json_str(
            r#"{"speciesData": {"Wolf": 3, "Deer": "40", "Bear": 5}}"#,
        )
        .unwrap();
        let labels: Vec<&str> = snapshot
            .species_populations
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(labels, vec!["Wolf", "Deer", "Bear"]);
    }

    #[test]
    fn accepts_long_section_names() {
        let snapshot = MeasurementSnapshot::from_json_str(
            r#"{"speciesPopulations": {"Fox": 10}, "timeSeries": {"2020": {"population": 1}}}"#,
        )
        .unwrap();
        assert_eq!(snapshot.entry_count(SourceSlice::Species), 1);
        assert_eq!(snapshot.entry_count(SourceSlice::TimeSeries), 1);
    }

    #[test]
    fn malformed_period_keeps_its_slot() {
        let snapshot = MeasurementSnapshot::from_json_str(
            r#"{"timeSeriesData": {"2020": 7, "2021": {"population": 950, "biodiversityIndex": 0.75}}}"#,
        )
        .unwrap();
        assert_eq!(snapshot.time_series.len(), 2);
        assert_eq!(snapshot.time_series["2020"].population.as_plot_value(), 0.0);
        assert_eq!(
            snapshot.time_series["2021"].biodiversity_index.as_plot_value(),
            0.75
        );
    }

    #[test]
    fn validate_reports_coerced_values() {
        let snapshot = MeasurementSnapshot::from_json_str(
            r#"{
                "speciesData": {"Fox": 10, "Owl": "unknown"},
                "environmentalFactors": {"Temperature": -3.5},
                "timeSeriesData": {"2020": {"population": "n/a", "biodiversityIndex": 0.8}}
            }"#,
        )
        .unwrap();
        let issues = snapshot.validate();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].slice, SourceSlice::Species);
        assert_eq!(issues[0].label, "Owl");
        assert_eq!(issues[1].field, "population");
    }

    #[test]
    fn load_reports_missing_file() {
        let err = MeasurementSnapshot::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CoreError::Snapshot(_)));
    }

    #[test]
    fn load_reads_snapshot_file_in_order() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"speciesPopulations": {{"Wolves": 12, "Bears": 3}}, "timeSeries": {{"2021": {{"population": 40, "biodiversityIndex": 0.6}}}}}}"#
        )
        .unwrap();
        let snapshot = MeasurementSnapshot::load(file.path()).unwrap();
        let species: Vec<_> = snapshot.species_populations.keys().cloned().collect();
        assert_eq!(species, vec!["Wolves", "Bears"]);
        assert_eq!(snapshot.entry_count(SourceSlice::TimeSeries), 1);
    }
}
