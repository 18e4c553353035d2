use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gateway_radio::logging::LoggingMode;
use gateway_radio::RadioConfig;

/// Control the FM radio of a Xiaomi gateway
///
/// Connection settings come from a JSON config file (by default
/// `<config dir>/gateway-radio/config.json`), and can be overridden with
/// flags or the `GATEWAY_RADIO_HOST` and `GATEWAY_RADIO_TOKEN` variables.
#[derive(Parser, Debug)]
#[command(name = "gateway-radio")]
#[command(about = "Control the FM radio of a Xiaomi gateway")]
#[command(version)]
pub struct Args {
    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Gateway address, optionally with :port
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// 32-character hexadecimal device token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Display name of the radio
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Log output (silent, development, debug)
    #[arg(long, global = true)]
    pub log_mode: Option<LoggingMode>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show the device identity
    Info,
    /// Query and print the current radio state
    Status,
    /// Turn the radio on
    On,
    /// Turn the radio off
    Off,
    /// Set the volume as a fraction between 0.0 and 1.0
    Volume {
        #[arg(value_parser = parse_level)]
        level: f64,
    },
    /// Raise the volume by one unit
    Up,
    /// Lower the volume by one unit
    Down,
    /// Mute the radio
    Mute,
    /// Unmute the radio
    Unmute,
    /// Skip to the next station
    Next,
    /// Poll the radio and print every state change until interrupted
    Watch {
        /// Poll interval in seconds
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

fn parse_level(value: &str) -> std::result::Result<f64, String> {
    let level: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if (0.0..=1.0).contains(&level) {
        Ok(level)
    } else {
        Err(format!("{} is not within 0.0..=1.0", level))
    }
}

impl Args {
    /// Logging mode from the flag, then `GATEWAY_RADIO_LOG_MODE`, then development
    pub fn logging_mode(&self) -> LoggingMode {
        self.log_mode
            .or_else(|| {
                std::env::var("GATEWAY_RADIO_LOG_MODE")
                    .ok()
                    .and_then(|value| value.parse().ok())
            })
            .unwrap_or(LoggingMode::Development)
    }

    /// Build the radio configuration from the file, environment and flags
    ///
    /// Flags take precedence over environment variables, which take
    /// precedence over the file.
    pub fn resolve_config(&self) -> Result<RadioConfig> {
        let mut config = self.load_file()?;

        let host = self
            .host
            .clone()
            .or_else(|| std::env::var("GATEWAY_RADIO_HOST").ok())
            .or_else(|| config.as_ref().map(|c| c.host.clone()));
        let token = self
            .token
            .clone()
            .or_else(|| std::env::var("GATEWAY_RADIO_TOKEN").ok())
            .or_else(|| config.as_ref().map(|c| c.token.clone()));

        let (Some(host), Some(token)) = (host, token) else {
            anyhow::bail!("No gateway configured: pass --host and --token or provide a config file");
        };

        let mut resolved = match config.take() {
            Some(file) => RadioConfig { host, token, ..file },
            None => RadioConfig::new(host, token),
        };

        if let Some(name) = &self.name {
            resolved.name = Some(name.clone());
        }
        if let Command::Watch { interval: Some(secs) } = self.command {
            resolved = resolved.with_poll_interval_secs(secs);
        }

        resolved.validate()?;
        Ok(resolved)
    }

    fn load_file(&self) -> Result<Option<RadioConfig>> {
        if let Some(path) = &self.config {
            return RadioConfig::from_file(path)
                .map(Some)
                .with_context(|| format!("Could not load {}", path.display()));
        }

        match RadioConfig::default_path() {
            Ok(path) if path.exists() => RadioConfig::from_file(&path)
                .map(Some)
                .with_context(|| format!("Could not load {}", path.display())),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    const TOKEN: &str = "00112233445566778899aabbccddeeff";

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("gateway-radio").chain(args.iter().copied())).unwrap()
    }

    #[rstest]
    #[case(&["on"], Command::On)]
    #[case(&["off"], Command::Off)]
    #[case(&["up"], Command::Up)]
    #[case(&["mute"], Command::Mute)]
    #[case(&["volume", "0.35"], Command::Volume { level: 0.35 })]
    #[case(&["watch", "--interval", "15"], Command::Watch { interval: Some(15) })]
    fn test_parse_commands(#[case] args: &[&str], #[case] expected: Command) {
        assert_eq!(parse(args).command, expected);
    }

    #[rstest]
    #[case("1.5")]
    #[case("-0.1")]
    #[case("loud")]
    fn test_rejects_bad_volume(#[case] level: &str) {
        assert!(Args::try_parse_from(["gateway-radio", "volume", level]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["status", "--host", "10.0.0.5", "--token", TOKEN, "--log-mode", "debug"]);

        assert_eq!(args.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(args.log_mode, Some(LoggingMode::Debug));
    }

    #[test]
    fn test_resolve_from_flags() {
        let args = parse(&[
            "--host", "10.0.0.5", "--token", TOKEN, "--name", "Hall", "watch", "-i", "30",
        ]);

        let config = args.resolve_config().unwrap();
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.display_name(), "Hall");
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_resolve_flags_override_file() {
        let path = std::env::temp_dir().join(format!("gateway-radio-cli-{}.json", std::process::id()));
        std::fs::write(
            &path,
            format!(r#"{{"host": "10.0.0.9", "token": "{}", "volume_step": 7}}"#, TOKEN),
        )
        .unwrap();

        let args = parse(&["--config", path.to_str().unwrap(), "--host", "10.0.0.5", "status"]);
        let config = args.resolve_config();
        std::fs::remove_file(&path).ok();

        let config = config.unwrap();
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.token, TOKEN);
        assert_eq!(config.volume_step, 7);
    }

    #[test]
    fn test_resolve_rejects_invalid_token() {
        let args = parse(&["--host", "10.0.0.5", "--token", "short", "status"]);
        assert!(args.resolve_config().is_err());
    }
}
