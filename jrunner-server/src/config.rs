//! Server configuration
//!
//! Defines the environment-derived settings for the dashboard server:
//! listen port, production mode, and the project directory the config
//! files and child processes live in.

use std::path::PathBuf;

use crate::store::MANIFEST_FILE;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port the server listens on
    pub port: u16,

    /// Whether to serve the pre-built UI bundle alongside the API
    pub production: bool,

    /// Project directory holding the manifest and config files; also the
    /// working directory for launched commands
    pub project_dir: PathBuf,

    /// Location of the pre-built UI bundle, used in production mode
    pub ui_dir: PathBuf,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - PORT (optional, default: 3000; zero or unparseable falls back)
    /// - JRUNNER_ENV (optional, "production" enables UI serving)
    /// - JRUNNER_DIR (optional, default: current directory)
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .filter(|port| *port != 0)
            .unwrap_or(3000);

        let production = std::env::var("JRUNNER_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);

        let project_dir = std::env::var("JRUNNER_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        Self {
            port,
            production,
            project_dir,
            ui_dir: PathBuf::from("dist/ui"),
        }
    }

    /// Validates the configuration
    ///
    /// The project directory must contain a package manifest; everything
    /// else the server does depends on it.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.project_dir.join(MANIFEST_FILE).exists() {
            anyhow::bail!(
                "no {} found in {}",
                MANIFEST_FILE,
                self.project_dir.display()
            );
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            production: false,
            project_dir: PathBuf::from("."),
            ui_dir: PathBuf::from("dist/ui"),
        }
    }
}
