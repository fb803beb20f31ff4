use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn label(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Grade::A),
            "B" => Some(Grade::B),
            "C" => Some(Grade::C),
            "D" => Some(Grade::D),
            "F" => Some(Grade::F),
            _ => None,
        }
    }

    /// True when `self` is `other` or better.
    pub fn at_least(self, other: Grade) -> bool {
        self <= other
    }
}

pub fn grade_order() -> &'static [Grade] {
    &[Grade::A, Grade::B, Grade::C, Grade::D, Grade::F]
}

/// Which input a letter grade is read from. Both use the same cut numbers
/// (90/80/70/60 on percentile, 9/8/7/6 on the 1-10 score).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeStrategy {
    PercentileGrade,
    DirectScoreGrade,
}

impl GradeStrategy {
    pub fn label(self) -> &'static str {
        match self {
            GradeStrategy::PercentileGrade => "percentile_grade",
            GradeStrategy::DirectScoreGrade => "direct_score_grade",
        }
    }

    pub fn grade(self, percentile: f64, score_1_to_10: f64) -> Grade {
        match self {
            GradeStrategy::PercentileGrade => grade_from_percentile(percentile),
            GradeStrategy::DirectScoreGrade => grade_from_score(score_1_to_10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeBands {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl GradeBands {
    pub fn percentile_v1() -> Self {
        Self {
            a: 90.0,
            b: 80.0,
            c: 70.0,
            d: 60.0,
        }
    }

    pub fn direct_score_v1() -> Self {
        Self {
            a: 9.0,
            b: 8.0,
            c: 7.0,
            d: 6.0,
        }
    }

    pub fn classify(&self, value: f64) -> Grade {
        if value >= self.a {
            Grade::A
        } else if value >= self.b {
            Grade::B
        } else if value >= self.c {
            Grade::C
        } else if value >= self.d {
            Grade::D
        } else {
            Grade::F
        }
    }
}

pub fn grade_from_percentile(percentile: f64) -> Grade {
    GradeBands::percentile_v1().classify(percentile)
}

pub fn grade_from_score(score_1_to_10: f64) -> Grade {
    GradeBands::direct_score_v1().classify(score_1_to_10)
}

/// Decile band plus the fractional remainder, clamped below at 1.0.
pub fn score_1_to_10(percentile: f64) -> f64 {
    if !percentile.is_finite() || percentile < 10.0 {
        return 1.0;
    }
    let p = percentile.min(100.0);
    let band = (p / 10.0).floor();
    let remainder = p - band * 10.0;
    band + remainder / 10.0
}
