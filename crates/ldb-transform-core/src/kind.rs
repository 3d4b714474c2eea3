//! Transform kinds and their positional arguments.
//!
//! | kind              | arguments                  | output suffix            |
//! |-------------------|----------------------------|--------------------------|
//! | `rotate`          | `[ANGLE...]` (default 90)  | each angle as typed      |
//! | `random_rotate`   | `[[start] stop [step]]`    | range args joined by `-` |
//! | `flip_horizontal` | none                       | none                     |
//! | `flip_vertical`   | none                       | none                     |
//!
//! Arguments are checked here, before any file is opened.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transform::FlipAxis;

const RANDOM_ROTATE_USAGE: &str = "usage: random_rotate [ [start] stop [step] ]";

/// Wrong argument count or shape for a transform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("unknown transform {0:?} (expected rotate, random_rotate, flip_horizontal or flip_vertical)")]
    UnknownKind(String),

    #[error("{kind} takes no arguments, got {given}")]
    UnexpectedArguments { kind: TransformKind, given: usize },

    #[error("too many arguments for random_rotate: got {given}, at most 3\n{usage}", usage = RANDOM_ROTATE_USAGE)]
    TooManyRangeArguments { given: usize },

    #[error("invalid angle {0:?}: expected a finite number of degrees")]
    InvalidAngle(String),

    #[error("invalid range bound {0:?}: expected an integer\n{usage}", usage = RANDOM_ROTATE_USAGE)]
    InvalidInteger(String),

    #[error("random_rotate step must not be zero")]
    ZeroStep,

    #[error("empty range for random_rotate ({start}, {stop}, {step})")]
    EmptyRange { start: i64, stop: i64, step: i64 },
}

/// The transforms this crate implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Rotate,
    RandomRotate,
    FlipHorizontal,
    FlipVertical,
}

impl TransformKind {
    pub const ALL: [TransformKind; 4] = [
        TransformKind::Rotate,
        TransformKind::RandomRotate,
        TransformKind::FlipHorizontal,
        TransformKind::FlipVertical,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TransformKind::Rotate => "rotate",
            TransformKind::RandomRotate => "random_rotate",
            TransformKind::FlipHorizontal => "flip_horizontal",
            TransformKind::FlipVertical => "flip_vertical",
        }
    }

    /// Validate `args` for this kind and turn them into a plan.
    pub fn plan(self, args: &[String]) -> Result<TransformPlan, UsageError> {
        match self {
            TransformKind::Rotate => {
                let angles = if args.is_empty() {
                    vec![Angle::parse("90")?]
                } else {
                    args.iter()
                        .map(|a| Angle::parse(a))
                        .collect::<Result<_, _>>()?
                };
                Ok(TransformPlan::Rotate { angles })
            }
            TransformKind::RandomRotate => Ok(TransformPlan::RandomRotate {
                range: RandomRange::parse(args)?,
            }),
            TransformKind::FlipHorizontal | TransformKind::FlipVertical => {
                if !args.is_empty() {
                    return Err(UsageError::UnexpectedArguments {
                        kind: self,
                        given: args.len(),
                    });
                }
                let axis = if self == TransformKind::FlipHorizontal {
                    FlipAxis::Horizontal
                } else {
                    FlipAxis::Vertical
                };
                Ok(TransformPlan::Flip(axis))
            }
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransformKind {
    type Err = UsageError;

    /// Accepts `snake_case` and `kebab-case` names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| UsageError::UnknownKind(s.to_string()))
    }
}

/// An explicit rotation angle and the text it was given as.
#[derive(Debug, Clone, PartialEq)]
pub struct Angle {
    pub degrees: f64,
    pub label: String,
}

impl Angle {
    pub fn parse(text: &str) -> Result<Self, UsageError> {
        let trimmed = text.trim();
        let degrees: f64 = trimmed
            .parse()
            .map_err(|_| UsageError::InvalidAngle(text.to_string()))?;
        if !degrees.is_finite() {
            return Err(UsageError::InvalidAngle(text.to_string()));
        }
        Ok(Self {
            degrees,
            label: trimmed.to_string(),
        })
    }
}

/// Integer range `start..stop` by `step`, sampled uniformly.
///
/// Argument forms follow the usual `range` conventions: `stop`,
/// `start stop`, or `start stop step`. With no arguments the range is
/// `0..360`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomRange {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
    label: String,
}

impl RandomRange {
    pub fn parse(args: &[String]) -> Result<Self, UsageError> {
        if args.len() > 3 {
            return Err(UsageError::TooManyRangeArguments { given: args.len() });
        }
        let values = args
            .iter()
            .map(|a| {
                a.trim()
                    .parse::<i64>()
                    .map_err(|_| UsageError::InvalidInteger(a.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_bounds(&values)
    }

    pub fn from_bounds(values: &[i64]) -> Result<Self, UsageError> {
        let (start, stop, step) = match *values {
            [] => (0, 360, 1),
            [stop] => (0, stop, 1),
            [start, stop] => (start, stop, 1),
            [start, stop, step] => (start, stop, step),
            _ => {
                return Err(UsageError::TooManyRangeArguments {
                    given: values.len(),
                })
            }
        };
        if step == 0 {
            return Err(UsageError::ZeroStep);
        }

        let label = if values.is_empty() {
            "360".to_string()
        } else {
            values
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join("-")
        };
        let range = Self {
            start,
            stop,
            step,
            label,
        };
        if range.len() == 0 {
            return Err(UsageError::EmptyRange { start, stop, step });
        }
        Ok(range)
    }

    /// Number of values in the range.
    pub fn len(&self) -> u64 {
        let (start, stop, step) = (self.start as i128, self.stop as i128, self.step as i128);
        let span = if step > 0 { stop - start } else { start - stop };
        if span <= 0 {
            return 0;
        }
        let step = step.abs();
        ((span + step - 1) / step) as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Draw one value.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        let index = rng.gen_range(0..self.len()) as i128;
        (self.start as i128 + index * self.step as i128) as i64
    }

    /// The range arguments as used in output names.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Validated work for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformPlan {
    Rotate { angles: Vec<Angle> },
    RandomRotate { range: RandomRange },
    Flip(FlipAxis),
}
