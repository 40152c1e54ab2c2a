//! Errors raised while installing logging or operating the metrics registry.

use std::string::FromUtf8Error;

use prometheus::Error as PrometheusError;
use thiserror::Error;
use tracing_subscriber::util::TryInitError;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised by telemetry helpers.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("failed to install logging subscriber")]
    Logging {
        /// Underlying subscriber error.
        #[source]
        source: TryInitError,
    },
    /// A collector could not be built or added to the registry.
    #[error("metrics collector rejected")]
    Collector {
        /// Metric name.
        name: &'static str,
        /// `build` or `register`.
        stage: &'static str,
        /// Underlying Prometheus error.
        #[source]
        source: PrometheusError,
    },
    /// Encoding the registry in the text exposition format failed.
    #[error("failed to render metrics")]
    Render {
        /// Underlying Prometheus error.
        #[source]
        source: PrometheusError,
    },
    /// The encoder produced bytes that are not UTF-8.
    #[error("rendered metrics are not valid utf-8")]
    RenderEncoding {
        /// Underlying conversion error.
        #[source]
        source: FromUtf8Error,
    },
}
