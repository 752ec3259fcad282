/*
[INPUT]:  Interactive user input via CLI
[OUTPUT]: Generated YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When TrackerConfig schema changes
*/

use anyhow::{Context, Result, anyhow};
use console::style;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::path::PathBuf;

use megaweb_tracker::config::{FormsConfig, PollingConfig, ServerConfig, default_download_folder};
use megaweb_tracker::TrackerConfig;

pub fn run_init(output: Option<PathBuf>) -> Result<()> {
    let output = output
        .or_else(TrackerConfig::default_path)
        .ok_or_else(|| anyhow!("no home directory, pass --output"))?;

    println!("{}", style("Welcome to Mega-Web init").bold().cyan());
    println!(
        "{}",
        style("This will guide you through creating a tracker configuration.").dim()
    );

    let theme = ColorfulTheme::default();

    if output.exists()
        && !Confirm::with_theme(&theme)
            .with_prompt(format!("{} exists, overwrite?", output.display()))
            .default(false)
            .interact()?
    {
        println!("{}", style("Aborted, nothing written.").yellow());
        return Ok(());
    }

    println!("\n{}", style("--- Server ---").bold());
    let defaults = ServerConfig::default();
    let base_url: String = Input::with_theme(&theme)
        .with_prompt("Mega-Web URL")
        .default(defaults.base_url.clone())
        .validate_with(|value: &String| -> Result<(), String> {
            url::Url::parse(value).map(|_| ()).map_err(|err| err.to_string())
        })
        .interact_text()?;

    println!("\n{}", style("--- Polling ---").bold());
    let interval_ms: u64 = Input::with_theme(&theme)
        .with_prompt("Poll interval (ms)")
        .default(PollingConfig::default().interval_ms)
        .validate_with(|value: &u64| -> Result<(), &str> {
            if *value == 0 { Err("must be greater than zero") } else { Ok(()) }
        })
        .interact_text()?;

    let max_attempts: String = Input::with_theme(&theme)
        .with_prompt("Maximum polls per task (empty for no limit)")
        .allow_empty(true)
        .interact_text()?;
    let max_attempts = parse_optional::<u32>(&max_attempts).context("maximum polls")?;

    let timeout_secs: String = Input::with_theme(&theme)
        .with_prompt("Give up after seconds (empty for no limit)")
        .allow_empty(true)
        .interact_text()?;
    let timeout_secs = parse_optional::<u64>(&timeout_secs).context("timeout")?;

    println!("\n{}", style("--- Forms ---").bold());
    let default_folder: String = Input::with_theme(&theme)
        .with_prompt("Default download folder")
        .default(default_download_folder().to_string_lossy().into_owned())
        .interact_text()?;

    let config = TrackerConfig {
        server: ServerConfig {
            base_url,
            ..defaults
        },
        polling: PollingConfig {
            interval_ms,
            max_attempts,
            timeout_secs,
        },
        forms: FormsConfig {
            default_folder: Some(PathBuf::from(default_folder)),
        },
    };
    config.validate()?;

    let yaml = config.to_yaml()?;
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&output, yaml)
        .with_context(|| format!("failed to write config to {}", output.display()))?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!(
        "Configuration written to: {}",
        style(output.display()).cyan()
    );

    Ok(())
}

fn parse_optional<T>(raw: &str) -> Result<Option<T>>
where
    T: std::str::FromStr + PartialEq + From<u8>,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: T = raw.parse()?;
    if value == T::from(0) {
        return Err(anyhow!("must be greater than zero"));
    }
    Ok(Some(value))
}
