use anyhow::{ensure, Context};
use ecosimcore::measurement::{MeasureMap, MeasureValue, MeasurementSnapshot, PeriodRecord};
use indexmap::IndexMap;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for generating a synthetic ecosystem snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub species: Vec<String>,
    pub factors: Vec<String>,
    pub start_year: i32,
    pub years: u32,
    pub base_population: f64,
    pub volatility: f64,
    pub seed: u64,
    pub description: Option<String>,
    pub scenario: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            species: ["Wolves", "Deer", "Rabbits", "Foxes", "Hawks"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
            factors: ["Temperature", "Rainfall", "Soil Quality", "Air Quality", "Pollution"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
            start_year: 2020,
            years: 5,
            base_population: 1000.0,
            volatility: 0.05,
            seed: 0,
            description: None,
            scenario: None,
        }
    }
}

fn build_time_series(
    config: &GeneratorConfig,
    rng: &mut StdRng,
) -> anyhow::Result<IndexMap<String, PeriodRecord>> {
    let years = i32::try_from(config.years).context("year count does not fit a calendar")?;
    config
        .start_year
        .checked_add(years)
        .context("overflow computing the last generated year")?;

    let volatility = config.volatility.abs();
    let mut population = config.base_population.max(0.0);
    let mut biodiversity: f64 = rng.gen_range(0.6..0.9);
    let mut series = IndexMap::with_capacity(config.years as usize);

    for offset in 0..years {
        let period = (config.start_year + offset).to_string();
        series.insert(
            period,
            PeriodRecord::new(population.round(), (biodiversity * 100.0).round() / 100.0),
        );
        let drift = if volatility > 0.0 {
            rng.gen_range(-volatility..volatility)
        } else {
            0.0
        };
        population = (population * (1.0 + drift)).max(0.0);
        biodiversity = (biodiversity + drift / 2.0).clamp(0.0, 1.0);
    }

    Ok(series)
}

pub fn build_snapshot_from_config(config: &GeneratorConfig) -> anyhow::Result<MeasurementSnapshot> {
    ensure!(
        config.base_population.is_finite(),
        "base population must be a finite number"
    );
    let mut rng = StdRng::seed_from_u64(config.seed);

    let species_populations: MeasureMap = config
        .species
        .iter()
        .map(|name| {
            let count = f64::from(rng.gen_range(10u32..2500));
            (name.clone(), MeasureValue::from(count))
        })
        .collect();

    let environmental_factors: MeasureMap = config
        .factors
        .iter()
        .map(|name| {
            let value: f64 = rng.gen_range(-10.0..100.0);
            (name.clone(), MeasureValue::from((value * 10.0).round() / 10.0))
        })
        .collect();

    let time_series = build_time_series(config, &mut rng)?;

    Ok(MeasurementSnapshot {
        species_populations,
        environmental_factors,
        time_series,
    })
}

pub fn build_snapshot(seed: u64) -> anyhow::Result<MeasurementSnapshot> {
    let config = GeneratorConfig {
        seed,
        ..Default::default()
    };
    build_snapshot_from_config(&config)
}
