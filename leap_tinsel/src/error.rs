//! Error types at the application boundary.
//!
//! Nothing on the per-frame path returns these; they surface only from
//! start-up, configuration loading and classifier lifecycle calls.

use std::path::PathBuf;

use thiserror::Error;
use tinsel_field::ColorParseError;

/// Failures of the gesture classifier resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    /// The classifier could not be created (no device, missing library…).
    #[error("classifier initialisation failed: {0}")]
    Init(String),
    /// A previous `acquire` is still initialising.
    #[error("classifier initialisation already in flight")]
    InitInFlight,
    /// The slot already hands out a live classifier.
    #[error("classifier already acquired")]
    AlreadyHeld,
    /// One frame could not be classified.
    #[error("gesture sensing failed: {0}")]
    Sensing(String),
    /// The worker thread exited unexpectedly.
    #[error("classifier worker stopped")]
    WorkerGone,
}

/// Anything that stops [`crate::app::run`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error("window: {0}")]
    Window(#[from] minifb::Error),

    #[error("reading config {path:?}: {source}")]
    ConfigIo {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {path:?}: {source}")]
    ConfigParse {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialising config: {0}")]
    ConfigWrite(#[source] serde_json::Error),

    #[error("particle colour: {0}")]
    Color(#[from] ColorParseError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}
