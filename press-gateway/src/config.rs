//! Gateway configuration read from the environment.

use std::time::Duration;

use press_executor::{CompilerConfig, DiagnosticFormat};

/// Default socket address to listen on.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3030";

/// Default request body limit (2 MiB, axum's own default).
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Default compile timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// An environment variable is set to a value that cannot be used.
    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings for the gateway binary.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GatewayConfig {
    /// Address passed to `TcpListener::bind` (`PRESS_LISTEN_ADDR`).
    pub listen_addr: String,
    /// Maximum accepted request body size (`PRESS_MAX_BODY_BYTES`).
    pub max_body_bytes: usize,
    /// How the compiler is run.
    pub compiler: CompilerConfig,
}

impl GatewayConfig {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// | variable                     | default          |
    /// |------------------------------|------------------|
    /// | `PRESS_LISTEN_ADDR`          | `127.0.0.1:3030` |
    /// | `PRESS_TYPST_BIN`            | `typst`          |
    /// | `PRESS_TYPST_GLOBAL_ARGS`    | empty            |
    /// | `PRESS_DIAGNOSTIC_FORMAT`    | unset            |
    /// | `PRESS_COMPILE_TIMEOUT_SECS` | `60`             |
    /// | `PRESS_MAX_BODY_BYTES`       | `2097152`        |
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if a variable is set to an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr = lookup("PRESS_LISTEN_ADDR")
            .map(|v| v.trim().to_owned())
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned());
        if listen_addr.is_empty() {
            return Err(invalid("PRESS_LISTEN_ADDR", &listen_addr, "must not be empty"));
        }

        let mut compiler = match lookup("PRESS_TYPST_BIN") {
            Some(bin) if !bin.trim().is_empty() => CompilerConfig::new(bin.trim()),
            Some(bin) => return Err(invalid("PRESS_TYPST_BIN", &bin, "must not be empty")),
            None => CompilerConfig::default(),
        };

        if let Some(args) = lookup("PRESS_TYPST_GLOBAL_ARGS") {
            compiler.global_args = args.split_whitespace().map(str::to_owned).collect();
        }

        if let Some(format) = lookup("PRESS_DIAGNOSTIC_FORMAT") {
            let parsed = format
                .parse::<DiagnosticFormat>()
                .map_err(|e| invalid("PRESS_DIAGNOSTIC_FORMAT", &format, &e.to_string()))?;
            compiler.diagnostic_format = Some(parsed);
        }

        let timeout_secs = positive("PRESS_COMPILE_TIMEOUT_SECS", &lookup, DEFAULT_TIMEOUT_SECS)?;
        compiler.timeout = Duration::from_secs(timeout_secs);

        let max_body_bytes = positive("PRESS_MAX_BODY_BYTES", &lookup, DEFAULT_MAX_BODY_BYTES)?;

        Ok(Self { listen_addr, max_body_bytes, compiler })
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_owned(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            compiler: CompilerConfig::default(),
        }
    }
}

fn positive<T, F>(var: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<T>()
        .map_err(|e| invalid(var, &raw, &e.to_string()))?;
    if value == T::default() {
        return Err(invalid(var, &raw, "must be greater than zero"));
    }
    Ok(value)
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_owned(),
        reason: reason.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        GatewayConfig::from_lookup(|var| map.get(var).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = match config_from(&[]) {
            Ok(c) => c,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(config.listen_addr, "127.0.0.1:3030");
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.compiler.program, PathBuf::from("typst"));
        assert_eq!(config.compiler.timeout, Duration::from_secs(60));
        assert!(config.compiler.diagnostic_format.is_none());
    }

    #[test]
    fn variables_override_defaults() {
        let config = config_from(&[
            ("PRESS_LISTEN_ADDR", "0.0.0.0:8080"),
            ("PRESS_TYPST_BIN", "/usr/local/bin/typst"),
            ("PRESS_TYPST_GLOBAL_ARGS", "--color  never"),
            ("PRESS_DIAGNOSTIC_FORMAT", "short"),
            ("PRESS_COMPILE_TIMEOUT_SECS", "5"),
            ("PRESS_MAX_BODY_BYTES", "1024"),
        ]);
        let config = match config {
            Ok(c) => c,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.compiler.program, PathBuf::from("/usr/local/bin/typst"));
        assert_eq!(config.compiler.global_args, vec!["--color", "never"]);
        assert_eq!(config.compiler.diagnostic_format, Some(DiagnosticFormat::Short));
        assert_eq!(config.compiler.timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = config_from(&[("PRESS_COMPILE_TIMEOUT_SECS", "0")]);
        assert!(
            matches!(err, Err(ConfigError::Invalid { var: "PRESS_COMPILE_TIMEOUT_SECS", .. })),
            "got {err:?}"
        );
    }

    #[test]
    fn non_numeric_body_limit_is_rejected() {
        let err = config_from(&[("PRESS_MAX_BODY_BYTES", "lots")]);
        assert!(matches!(err, Err(ConfigError::Invalid { var: "PRESS_MAX_BODY_BYTES", .. })));
    }

    #[test]
    fn unknown_diagnostic_format_is_rejected() {
        let err = config_from(&[("PRESS_DIAGNOSTIC_FORMAT", "json")]);
        match err {
            Err(e) => assert!(e.to_string().contains("json"), "got {e}"),
            Ok(c) => panic!("expected error, got {c:?}"),
        }
    }

    #[test]
    fn blank_binary_is_rejected() {
        assert!(config_from(&[("PRESS_TYPST_BIN", "  ")]).is_err());
    }
}
