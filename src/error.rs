use std::fmt;

/// Why a tuning document was rejected.
///
/// The simulation itself never fails; only configuration loaded from outside
/// the engine can.
#[derive(Debug)]
pub enum TuningError {
    Parse(serde_json::Error),
    OutOfRange { field: &'static str, value: f64 },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "malformed tuning document: {err}"),
            Self::OutOfRange { field, value } => {
                write!(f, "tuning value out of range: {field} = {value}")
            }
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::OutOfRange { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}
