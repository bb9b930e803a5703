pub struct StatsHelper;

impl StatsHelper {
    pub fn sum(values: &[f64]) -> f64 {
        values.iter().sum()
    }

    /// Fraction of the total carried by each value; all zero when the total is zero.
    pub fn shares(values: &[f64]) -> Vec<f64> {
        let total = Self::sum(values);
        if total == 0.0 || !total.is_finite() {
            return vec![0.0; values.len()];
        }
        values.iter().map(|&value| value / total).collect()
    }

    /// Shares of a whole where negative readings count as nothing.
    pub fn part_of_whole(values: &[f64]) -> Vec<f64> {
        let magnitudes: Vec<f64> = values.iter().map(|value| value.max(0.0)).collect();
        Self::shares(&magnitudes)
    }

    /// Lower and upper bounds of the values, used to scale chart axes.
    pub fn extent(values: &[f64]) -> Option<(f64, f64)> {
        if values.is_empty() {
            return None;
        }
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_of_zero_total_are_zero() {
        assert_eq!(StatsHelper::shares(&[]), Vec::<f64>::new());
        assert_eq!(StatsHelper::shares(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn part_of_whole_ignores_negative_readings() {
        assert_eq!(
            StatsHelper::part_of_whole(&[-2.5, 30.0, 10.0]),
            vec![0.0, 0.75, 0.25]
        );
        assert_eq!(StatsHelper::part_of_whole(&[-1.0, -3.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn extent_handles_single_value() {
        assert_eq!(StatsHelper::extent(&[4.0]), Some((4.0, 4.0)));
        assert_eq!(StatsHelper::extent(&[-2.0, 9.0, 3.0]), Some((-2.0, 9.0)));
        assert_eq!(StatsHelper::extent(&[]), None);
    }
}
