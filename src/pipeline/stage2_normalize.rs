use crate::model::clip01;
use crate::model::config::{EngineConfig, PercentageFastPath};
use crate::resolve::names::is_percentage;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesScale {
    /// Reference lies within [0, 100]; divide by 100.
    Percentage,
    MinMax { min: f64, max: f64 },
    /// Every reference value is equal; everything maps to 0.5.
    Constant,
    /// No usable reference value at all.
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    pub fast_path: PercentageFastPath,
    pub missing_default: f64,
}

impl Normalizer {
    pub fn new(fast_path: PercentageFastPath, missing_default: f64) -> Self {
        Self {
            fast_path,
            missing_default,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.percentage_fast_path, config.missing_default)
    }

    pub fn fit(&self, field: &str, reference: &[Option<f64>]) -> SeriesScale {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut n = 0usize;
        for v in reference.iter().flatten() {
            if !v.is_finite() {
                continue;
            }
            min = min.min(*v);
            max = max.max(*v);
            n += 1;
        }
        if n == 0 {
            return SeriesScale::Empty;
        }
        let fast_path_allowed = match self.fast_path {
            PercentageFastPath::PercentageMetricsOnly => is_percentage(field),
            PercentageFastPath::AnyBoundedSeries => true,
        };
        if fast_path_allowed && min >= 0.0 && max <= 100.0 {
            return SeriesScale::Percentage;
        }
        if max == min {
            return SeriesScale::Constant;
        }
        SeriesScale::MinMax { min, max }
    }

    pub fn apply(&self, scale: SeriesScale, value: Option<f64>) -> f64 {
        let Some(x) = value.filter(|v| v.is_finite()) else {
            return self.missing_default;
        };
        match scale {
            SeriesScale::Percentage => clip01(x / 100.0),
            SeriesScale::MinMax { min, max } => clip01((x - min) / (max - min)),
            SeriesScale::Constant => 0.5,
            SeriesScale::Empty => self.missing_default,
        }
    }

    pub fn normalize(
        &self,
        field: &str,
        values: &[Option<f64>],
        reference: &[Option<f64>],
    ) -> Vec<f64> {
        let scale = self.fit(field, reference);
        values.iter().map(|v| self.apply(scale, *v)).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_normalize.rs"]
mod tests;
