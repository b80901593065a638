//! Logging setup for Transloadit binaries
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use std::fmt;
use std::str::FromStr;
use tracing_subscriber::{
    fmt as layer_fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

/// Output shape of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines on stderr
    #[default]
    Console,
    /// One JSON object per line on stderr
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "console" | "text" | "pretty" => Ok(LogFormat::Console),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format `{}`", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Console => "console",
            LogFormat::Json => "json",
        })
    }
}

/// `RUST_LOG` wins over `default_level`
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber
///
/// Logs go to stderr so that stdout stays free for command output. Fails if
/// a subscriber is already installed.
pub fn try_init_logging(
    app_name: &str,
    default_level: &str,
    format: LogFormat,
) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter(default_level));

    match format {
        LogFormat::Json => registry
            .with(
                layer_fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .try_init()?,
        LogFormat::Console => registry
            .with(
                layer_fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init()?,
    }

    tracing::debug!(app = app_name, format = %format, "Logging initialized");
    Ok(())
}

/// Like [`try_init_logging`], ignoring an already installed subscriber
pub fn init_logging(app_name: &str, default_level: &str, format: LogFormat) {
    let _ = try_init_logging(app_name, default_level, format);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("console".parse::<LogFormat>().unwrap(), LogFormat::Console);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Console);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_second_init_is_rejected() {
        init_logging("test", "warn", LogFormat::Console);
        assert!(try_init_logging("test", "warn", LogFormat::Json).is_err());
    }
}
