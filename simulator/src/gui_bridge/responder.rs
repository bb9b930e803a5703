use ecosimcore::measurement::MeasurementSnapshot;
use ecosimcore::projection::{
    project, ChartKind, ChartPoint, SourceSlice, VisualizationSelection, BIODIVERSITY_INDEX,
};

/// Canned assistant that answers from the current snapshot.
///
/// Mentions of a species or factor get its current value, questions about
/// trends get the time-series span, anything else gets an overview.
pub fn reply(snapshot: &MeasurementSnapshot, message: &str) -> String {
    let lowered = message.to_lowercase();

    for slice in [SourceSlice::Species, SourceSlice::Environmental] {
        let dataset = project(snapshot, VisualizationSelection::new(slice, ChartKind::Bar));
        if let Some(point) = dataset
            .points
            .iter()
            .find(|point| lowered.contains(&point.label.to_lowercase()))
        {
            return describe_point(slice, point);
        }
    }

    let asks_for_trend = ["trend", "biodiversity", "over time", "year"]
        .iter()
        .any(|keyword| lowered.contains(keyword));
    if asks_for_trend {
        if let Some(summary) = describe_trend(snapshot) {
            return summary;
        }
    }

    format!(
        "This simulation tracks {} species, {} environmental factors and {} periods. \
         Ask about a species, a factor or the biodiversity trend.",
        snapshot.entry_count(SourceSlice::Species),
        snapshot.entry_count(SourceSlice::Environmental),
        snapshot.entry_count(SourceSlice::TimeSeries)
    )
}

fn describe_point(slice: SourceSlice, point: &ChartPoint) -> String {
    match slice {
        SourceSlice::Species => format!(
            "The {} population currently stands at {}.",
            point.label, point.value
        ),
        _ => format!("{} is currently at {}.", point.label, point.value),
    }
}

fn describe_trend(snapshot: &MeasurementSnapshot) -> Option<String> {
    let dataset = project(
        snapshot,
        VisualizationSelection::new(SourceSlice::TimeSeries, ChartKind::Line),
    );
    let first = dataset.points.first()?;
    let last = dataset.points.last()?;
    let index = |point: &ChartPoint| point.extra_value(BIODIVERSITY_INDEX).unwrap_or(0.0);
    Some(format!(
        "Between {} and {} the population moved from {} to {} and the biodiversity index from {:.2} to {:.2}.",
        first.label,
        last.label,
        first.value,
        last.value,
        index(first),
        index(last)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecosimcore::measurement::mock_snapshot;

    #[test]
    fn species_question_gets_its_count() {
        let answer = reply(&mock_snapshot(), "How many wolves are left?");
        assert_eq!(answer, "The Wolves population currently stands at 120.");
    }

    #[test]
    fn factor_question_gets_its_value() {
        let answer = reply(&mock_snapshot(), "what about rainfall");
        assert_eq!(answer, "Rainfall is currently at 68.");
    }

    #[test]
    fn trend_question_spans_the_series() {
        let answer = reply(&mock_snapshot(), "Show me the biodiversity trend");
        assert!(answer.starts_with("Between 2020 and 2024"));
        assert!(answer.contains("0.80 to 0.78"));
    }

    #[test]
    fn empty_snapshot_gets_an_overview() {
        let answer = reply(&MeasurementSnapshot::default(), "any trend?");
        assert!(answer.starts_with("This simulation tracks 0 species"));
    }
}
