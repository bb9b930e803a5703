use crate::prelude::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Section of the snapshot a chart draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SourceSlice {
    #[default]
    #[serde(rename = "species")]
    Species,
    #[serde(rename = "environmental")]
    Environmental,
    #[serde(rename = "timeSeries")]
    TimeSeries,
}

impl SourceSlice {
    pub const ALL: [SourceSlice; 3] = [
        SourceSlice::Species,
        SourceSlice::Environmental,
        SourceSlice::TimeSeries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceSlice::Species => "species",
            SourceSlice::Environmental => "environmental",
            SourceSlice::TimeSeries => "timeSeries",
        }
    }

    /// Human-readable tab title.
    pub fn title(&self) -> &'static str {
        match self {
            SourceSlice::Species => "Species Population",
            SourceSlice::Environmental => "Environmental Factors",
            SourceSlice::TimeSeries => "Time Series Data",
        }
    }
}

/// How a renderer is expected to read a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Pie,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Bar, ChartKind::Line, ChartKind::Pie];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
        }
    }
}

/// Active slice and chart kind, always changed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationSelection {
    pub source_slice: SourceSlice,
    pub chart_kind: ChartKind,
}

impl VisualizationSelection {
    pub fn new(source_slice: SourceSlice, chart_kind: ChartKind) -> Self {
        Self {
            source_slice,
            chart_kind,
        }
    }
}

impl fmt::Display for SourceSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for VisualizationSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source_slice, self.chart_kind)
    }
}

impl FromStr for SourceSlice {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "species" => Ok(SourceSlice::Species),
            "environmental" => Ok(SourceSlice::Environmental),
            "timeSeries" | "timeseries" | "time-series" => Ok(SourceSlice::TimeSeries),
            other => Err(CoreError::InvalidSelection(format!(
                "unknown source slice {:?}",
                other
            ))),
        }
    }
}

impl FromStr for ChartKind {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "bar" => Ok(ChartKind::Bar),
            "line" => Ok(ChartKind::Line),
            "pie" => Ok(ChartKind::Pie),
            other => Err(CoreError::InvalidSelection(format!(
                "unknown chart kind {:?}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for slice in SourceSlice::ALL {
            assert_eq!(slice.as_str().parse::<SourceSlice>().unwrap(), slice);
        }
        for kind in ChartKind::ALL {
            assert_eq!(kind.to_string().parse::<ChartKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(matches!(
            "scatter".parse::<ChartKind>(),
            Err(CoreError::InvalidSelection(_))
        ));
        assert!("fungi".parse::<SourceSlice>().is_err());
    }

    #[test]
    fn selection_serializes_with_wire_names() {
        let selection = VisualizationSelection::new(SourceSlice::TimeSeries, ChartKind::Line);
        let json = serde_json::to_value(selection).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"sourceSlice": "timeSeries", "chartKind": "line"})
        );
    }
}
