//! Domain error types.

/// Top-level error type for backcast.
#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("price series is empty")]
    EmptySeries,

    #[error("timestamps must be strictly increasing (bar {index} is not after the previous bar)")]
    UnorderedSeries { index: usize },

    #[error("starting capital must be positive, got {capital}")]
    InvalidCapital { capital: f64 },

    #[error("strategy '{name}' not found")]
    UnknownStrategy { name: String },

    #[error("strategy '{strategy}' produced no 'signal' column")]
    MissingSignal { strategy: String },

    #[error("signal at bar {index} must be -1, 0 or 1, got {value}")]
    InvalidSignal { index: usize, value: f64 },

    #[error("'{transform}' produced column '{column}' with {got} values for {expected} bars")]
    ColumnLength {
        transform: String,
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("periods per year must be positive, got {periods}")]
    InvalidPeriodsPerYear { periods: f64 },

    #[error("unknown parameter '{key}' for '{transform}'")]
    UnknownParameter { transform: String, key: String },

    #[error("invalid parameter '{key}' for '{transform}': {reason}")]
    InvalidParameter {
        transform: String,
        key: String,
        reason: String,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BacktestError {
    /// True for errors caused by the caller's series or request. These abort
    /// the backtest before any result is produced.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            BacktestError::EmptySeries
                | BacktestError::UnorderedSeries { .. }
                | BacktestError::InvalidCapital { .. }
                | BacktestError::UnknownStrategy { .. }
                | BacktestError::MissingSignal { .. }
                | BacktestError::InvalidSignal { .. }
                | BacktestError::ColumnLength { .. }
                | BacktestError::InvalidPeriodsPerYear { .. }
                | BacktestError::UnknownParameter { .. }
                | BacktestError::InvalidParameter { .. }
        )
    }
}

impl BacktestError {
    /// Process exit status: 1 I/O or internal, 2 config, 3 data, 4 input.
    pub fn exit_code(&self) -> u8 {
        match self {
            BacktestError::Io(_) | BacktestError::Json(_) | BacktestError::Internal { .. } => 1,
            BacktestError::ConfigParse { .. }
            | BacktestError::ConfigMissing { .. }
            | BacktestError::ConfigInvalid { .. } => 2,
            BacktestError::Data { .. } => 3,
            BacktestError::EmptySeries
            | BacktestError::UnorderedSeries { .. }
            | BacktestError::InvalidCapital { .. }
            | BacktestError::UnknownStrategy { .. }
            | BacktestError::MissingSignal { .. }
            | BacktestError::InvalidSignal { .. }
            | BacktestError::ColumnLength { .. }
            | BacktestError::InvalidPeriodsPerYear { .. }
            | BacktestError::UnknownParameter { .. }
            | BacktestError::InvalidParameter { .. } => 4,
        }
    }
}

impl From<&BacktestError> for std::process::ExitCode {
    fn from(err: &BacktestError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
