use std::process::{Command, Stdio};

use anyhow::{Context, Result};

/// Target suffix that marks the link to the panel's own options view.
const OPTIONS_SUFFIX: &str = "#options";

pub const OPTIONS_LINK: &str = "options.html#options";
pub const SOMAFM_LINK: &str = "https://somafm.com/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Options,
    External(String),
}

pub fn route(href: &str) -> LinkTarget {
    if href.ends_with(OPTIONS_SUFFIX) {
        LinkTarget::Options
    } else {
        LinkTarget::External(href.to_string())
    }
}

/// Opens links that leave the panel.
pub trait Navigator {
    fn open_external(&self, url: &str) -> Result<()>;
}

/// Hands URLs to the desktop's opener.
pub struct SystemNavigator;

impl SystemNavigator {
    fn command(url: &str) -> Command {
        let mut cmd = if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]);
            cmd
        } else {
            Command::new("xdg-open")
        };
        cmd.arg(url);
        cmd
    }
}

impl Navigator for SystemNavigator {
    fn open_external(&self, url: &str) -> Result<()> {
        let mut cmd = Self::command(url);
        let program = cmd.get_program().to_string_lossy().into_owned();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("launching {} for {}", program, url))?;
        Ok(())
    }
}
