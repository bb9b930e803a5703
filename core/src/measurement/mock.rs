use crate::measurement::snapshot::{MeasureMap, MeasurementSnapshot, PeriodRecord};
use indexmap::IndexMap;

/// Fixed snapshot used until a simulation backend supplies real data.
pub fn mock_snapshot() -> MeasurementSnapshot {
    let species_populations: MeasureMap = [
        ("Wolves", 120.0),
        ("Deer", 850.0),
        ("Rabbits", 2300.0),
        ("Foxes", 310.0),
        ("Hawks", 95.0),
    ]
    .into_iter()
    .map(|(name, count)| (name.to_string(), count.into()))
    .collect();

    let environmental_factors: MeasureMap = [
        ("Temperature", -2.5),
        ("Rainfall", 68.0),
        ("Soil Quality", 72.0),
        ("Air Quality", 81.0),
        ("Pollution", 23.0),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.into()))
    .collect();

    let time_series: IndexMap<String, PeriodRecord> = [
        ("2020", 1000.0, 0.80),
        ("2021", 950.0, 0.75),
        ("2022", 980.0, 0.77),
        ("2023", 1040.0, 0.79),
        ("2024", 1010.0, 0.78),
    ]
    .into_iter()
    .map(|(period, population, index)| (period.to_string(), PeriodRecord::new(population, index)))
    .collect();

    MeasurementSnapshot {
        species_populations,
        environmental_factors,
        time_series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_snapshot_is_fully_numeric() {
        let snapshot = mock_snapshot();
        assert!(snapshot.validate().is_empty());
        assert_eq!(snapshot.species_populations.len(), 5);
        assert_eq!(snapshot.time_series.len(), 5);
    }
}
