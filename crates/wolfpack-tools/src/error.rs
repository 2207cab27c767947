use std::io;

use thiserror::Error;

use wolfpack_ai::HuntError;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("trace i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("malformed trace json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported trace format {found} (expected {expected})")]
    Format { found: u32, expected: u32 },

    #[error("hunt setup failed: {0}")]
    Hunt(#[from] HuntError),

    #[error("replay diverged at tick {tick}")]
    Diverged { tick: u64 },
}
