use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use serde::Deserialize;

/// Terminal control panel for Soma FM
#[derive(Debug, Parser)]
#[command(name = "soma-panel", version, about)]
pub struct Cli {
    /// JSON options file, e.g. {"theme": "dark"}
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Theme to use, overriding the options file (light or dark)
    #[arg(long)]
    pub theme: Option<String>,

    /// Write log output to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Theme::Light,
            "dark" => Theme::Dark,
            other => {
                debug!("unknown theme {:?}, using light", other);
                Theme::Light
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// User options, the same object the options view edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Options {
    #[serde(default)]
    pub theme: Option<String>,
}

impl Options {
    /// A missing file means defaults; a file that does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading options from {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing options in {}", path.display()))
    }

    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut options = match &cli.options {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(theme) = &cli.theme {
            options.theme = Some(theme.clone());
        }
        Ok(options)
    }

    pub fn theme(&self) -> Theme {
        self.theme.as_deref().map(Theme::from_name).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn theme_defaults_to_light() {
        assert_eq!(Options::default().theme(), Theme::Light);
        let options = Options { theme: Some("neon".into()) };
        assert_eq!(options.theme(), Theme::Light);
    }

    #[test]
    fn cli_theme_overrides_file() {
        let path = std::env::temp_dir().join(format!("soma-panel-options-{}.json", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        write!(file, r#"{{"theme":"light"}}"#).unwrap();

        let cli = Cli::parse_from(["soma-panel", "--options", path.to_str().unwrap(), "--theme", "dark"]);
        let options = Options::from_cli(&cli).unwrap();
        assert_eq!(options.theme(), Theme::Dark);

        let cli = Cli::parse_from(["soma-panel", "--options", path.to_str().unwrap()]);
        assert_eq!(Options::from_cli(&cli).unwrap().theme(), Theme::Light);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_options_file_is_default() {
        let options = Options::load(Path::new("/nonexistent/soma-panel.json")).unwrap();
        assert_eq!(options, Options::default());
    }
}
