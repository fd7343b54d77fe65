//! Threshold tables that turn raw metrics into graded labels.
//!
//! Each table lists its bands from the highest floor down; the first band
//! whose floor the value reaches wins, and values below every floor get the
//! table's fallback grade.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grade {
    Excellent,
    Acceptable,
    Critical,
    Slow,
    High,
    Attention,
    Ok,
    Few,
    Some,
    Many,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Warn,
    Bad,
}

impl Grade {
    pub fn label(&self) -> &'static str {
        match self {
            Grade::Excellent => "EXCELLENT",
            Grade::Acceptable => "ACCEPTABLE",
            Grade::Critical => "CRITICAL",
            Grade::Slow => "SLOW",
            Grade::High => "HIGH",
            Grade::Attention => "ATTENTION",
            Grade::Ok => "OK",
            Grade::Few => "FEW",
            Grade::Some => "SOME",
            Grade::Many => "MANY",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Grade::Excellent | Grade::Ok | Grade::Few => Tone::Good,
            Grade::Acceptable | Grade::Attention | Grade::Some => Tone::Warn,
            Grade::Critical | Grade::Slow | Grade::High | Grade::Many => Tone::Bad,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Band<T> {
    pub floor: T,
    pub grade: Grade,
}

#[derive(Debug, Clone, Copy)]
pub struct GradeTable<T: 'static> {
    pub bands: &'static [Band<T>],
    pub fallback: Grade,
}

impl<T: PartialOrd + Copy + 'static> GradeTable<T> {
    pub fn grade(&self, value: T) -> Grade {
        self.bands
            .iter()
            .find(|band| value >= band.floor)
            .map(|band| band.grade)
            .unwrap_or(self.fallback)
    }
}

/// Today's success percentage, already rounded to two decimals.
pub const SUCCESS_RATE: GradeTable<f64> = GradeTable {
    bands: &[
        Band {
            floor: 99.0,
            grade: Grade::Excellent,
        },
        Band {
            floor: 95.0,
            grade: Grade::Acceptable,
        },
    ],
    fallback: Grade::Critical,
};

/// Average duration of today's successful records, in milliseconds.
pub const LATENCY_MS: GradeTable<i64> = GradeTable {
    bands: &[
        Band {
            floor: 5000,
            grade: Grade::Slow,
        },
        Band {
            floor: 2000,
            grade: Grade::Acceptable,
        },
    ],
    fallback: Grade::Excellent,
};

/// Integer part of the mean attempt count.
pub const MEAN_ATTEMPTS: GradeTable<i64> = GradeTable {
    bands: &[
        Band {
            floor: 3,
            grade: Grade::High,
        },
        Band {
            floor: 2,
            grade: Grade::Acceptable,
        },
    ],
    fallback: Grade::Excellent,
};

pub const DEAD_LETTER_FILES: GradeTable<usize> = GradeTable {
    bands: &[
        Band {
            floor: 4,
            grade: Grade::Critical,
        },
        Band {
            floor: 1,
            grade: Grade::Attention,
        },
    ],
    fallback: Grade::Excellent,
};

pub const QUARANTINE_FILES: GradeTable<usize> = GradeTable {
    bands: &[Band {
        floor: 6,
        grade: Grade::Attention,
    }],
    fallback: Grade::Ok,
};

pub const LOG_ERROR_LINES: GradeTable<u64> = GradeTable {
    bands: &[
        Band {
            floor: 101,
            grade: Grade::Many,
        },
        Band {
            floor: 11,
            grade: Grade::Some,
        },
    ],
    fallback: Grade::Few,
};

/// Mean attempts are graded on their integer part, so 1.9 still counts as 1.
pub fn grade_mean_attempts(mean: f64) -> Grade {
    MEAN_ATTEMPTS.grade(mean.trunc() as i64)
}
