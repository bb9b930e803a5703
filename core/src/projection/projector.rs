use crate::measurement::snapshot::{MeasureMap, MeasurementSnapshot, PeriodRecord};
use crate::projection::dataset::{ChartDataset, ChartPoint};
use crate::projection::selection::{SourceSlice, VisualizationSelection};
use std::cmp::Ordering;

pub const BIODIVERSITY_INDEX: &str = "biodiversityIndex";

/// Projects one section of `snapshot` into a chart dataset.
///
/// Total over every snapshot: empty sections give an empty dataset and
/// unreadable values plot as zero. The chart kind is carried along but never
/// changes the points.
pub fn project(snapshot: &MeasurementSnapshot, selection: VisualizationSelection) -> ChartDataset {
    let points = match selection.source_slice {
        SourceSlice::Species => flat_points(&snapshot.species_populations),
        SourceSlice::Environmental => flat_points(&snapshot.environmental_factors),
        SourceSlice::TimeSeries => series_points(snapshot.time_series.iter()),
    };
    ChartDataset { selection, points }
}

fn flat_points(section: &MeasureMap) -> Vec<ChartPoint> {
    section
        .iter()
        .map(|(label, value)| ChartPoint::new(label.clone(), value.as_plot_value()))
        .collect()
}

fn series_points<'a>(
    periods: impl Iterator<Item = (&'a String, &'a PeriodRecord)>,
) -> Vec<ChartPoint> {
    let mut ordered: Vec<_> = periods.collect();
    ordered.sort_by(|(a, _), (b, _)| compare_periods(a, b));
    ordered
        .into_iter()
        .map(|(period, record)| {
            ChartPoint::new(period.clone(), record.population.as_plot_value()).with_extra(
                BIODIVERSITY_INDEX,
                record.biodiversity_index.as_plot_value(),
            )
        })
        .collect()
}

/// Chronological order of period labels.
///
/// Integer labels (years) compare by value and come first; anything else
/// falls back to plain string order.
pub fn compare_periods(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
