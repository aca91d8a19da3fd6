//! `folio serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_server::{Completion, Server, ServerOptions};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Theme directory served under /theme (overrides config).
    #[arg(long)]
    theme_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long, allow_negative_numbers = true)]
    port: Option<i64>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable live updates (default: enabled).
    #[arg(long)]
    live_reload: Option<bool>,

    /// Disable live updates.
    #[arg(long, conflicts_with = "live_reload")]
    no_live_reload: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// Runs until the server stops on its own or Ctrl-C is received.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let live_reload_enabled = self.resolve_live_reload_enabled();
        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            source_dir: self.source_dir,
            theme_dir: self.theme_dir,
            live_reload_enabled,
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.setting(
            "Source directory",
            &config.content_resolved.source_dir.display().to_string(),
        );
        output.setting(
            "Theme directory",
            &config.content_resolved.theme_dir.display().to_string(),
        );
        output.setting(
            "Live reload",
            if config.live_reload.enabled {
                "enabled"
            } else {
                "disabled"
            },
        );

        let server = Server::new(ServerOptions::from_config(&config, version));
        let completion = server.start().await?;
        output.success(&format!("Serving {}", config.base_url()));

        run_until_interrupted(&server, completion).await?;
        output.info("Server stopped");
        Ok(())
    }

    /// Resolve `live_reload_enabled` from --live-reload/--no-live-reload flags.
    fn resolve_live_reload_enabled(&self) -> Option<bool> {
        self.no_live_reload.then_some(false).or(self.live_reload)
    }
}

/// Wait for the server to finish, stopping it on Ctrl-C.
async fn run_until_interrupted(server: &Server, mut completion: Completion) -> Result<(), CliError> {
    let result = tokio::select! {
        result = &mut completion => result,
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            }
            tracing::info!("Shutting down");
            server.stop();
            completion.await
        }
    };

    result.map_err(|_| CliError::Aborted)??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ServeArgs,
    }

    fn parse(args: &[&str]) -> ServeArgs {
        TestCli::try_parse_from(std::iter::once("serve").chain(args.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_live_reload_defaults_to_config() {
        assert_eq!(parse(&[]).resolve_live_reload_enabled(), None);
    }

    #[test]
    fn test_no_live_reload_disables() {
        assert_eq!(
            parse(&["--no-live-reload"]).resolve_live_reload_enabled(),
            Some(false)
        );
    }

    #[test]
    fn test_live_reload_explicit_value() {
        assert_eq!(
            parse(&["--live-reload", "true"]).resolve_live_reload_enabled(),
            Some(true)
        );
    }

    #[test]
    fn test_negative_port_parses() {
        assert_eq!(parse(&["--port", "-1"]).port, Some(-1));
    }

    #[tokio::test]
    async fn test_invalid_port_is_reported() {
        let dir = temp_dir_arg();
        let args = parse(&["--port", "0", "--source-dir", &dir]);

        let result = args.execute("test").await;

        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[tokio::test]
    async fn test_missing_config_is_reported() {
        let args = parse(&["--config", "/nonexistent/folio.toml"]);

        let result = args.execute("test").await;

        assert!(matches!(result, Err(CliError::Config(_))));
    }

    fn temp_dir_arg() -> String {
        std::env::temp_dir().display().to_string()
    }
}
