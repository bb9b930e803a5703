use crate::math::stats::StatsHelper;
use crate::projection::selection::VisualizationSelection;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One labelled value handed to a chart renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<IndexMap<String, f64>>,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            extra: None,
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: f64) -> Self {
        self.extra
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), value);
        self
    }

    pub fn extra_value(&self, key: &str) -> Option<f64> {
        self.extra.as_ref().and_then(|extra| extra.get(key).copied())
    }
}

/// Renderer-agnostic output of a projection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartDataset {
    pub selection: VisualizationSelection,
    pub points: Vec<ChartPoint>,
}

impl ChartDataset {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|point| point.label.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.value).collect()
    }

    pub fn total(&self) -> f64 {
        StatsHelper::sum(&self.values())
    }

    /// Percentage share of each point, as shown on pie legends. Negative
    /// values get no slice.
    pub fn proportions(&self) -> Vec<(String, f64)> {
        let shares = StatsHelper::part_of_whole(&self.values());
        self.points
            .iter()
            .zip(shares)
            .map(|(point, share)| (point.label.clone(), share * 100.0))
            .collect()
    }
}
