//! Lectern - a static site generator and server for markdown courses.

mod build;
mod cli;
mod config;
mod content;
mod generator;
mod logger;
mod render;
mod serve;
mod settings;
mod site;
mod ui;
mod utils;

use anyhow::Result;
use build::build_site;
use clap::Parser;
use cli::{Cli, Commands, SettingsAction};
use config::SiteConfig;
use serve::serve_site;
use settings::{ExecutionContext, FileStorage, RootElement, SettingsStore};
use std::path::Path;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static SiteConfig = Box::leak(Box::new(load_config(cli)?));

    match &cli.command {
        Commands::Build { .. } => build_site(config),
        Commands::Serve { .. } => serve_site(config),
        Commands::Settings { action } => run_settings(config, action),
    }
}

/// Load and validate configuration from CLI arguments.
///
/// A missing config file means every section keeps its defaults.
fn load_config(cli: &'static Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        SiteConfig::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}

/// Run a `settings` subcommand against the persisted store.
fn run_settings(config: &SiteConfig, action: &SettingsAction) -> Result<()> {
    let mut store = SettingsStore::new(
        ExecutionContext::Interactive,
        &config.settings.key,
        FileStorage::new(&config.settings.path),
        RootElement::new(),
    );

    match action {
        SettingsAction::Show => {}
        SettingsAction::Set { field, value } => {
            if !store.set_field(*field, value)? {
                log!("settings"; "`{}` unchanged", field.key());
            }
        }
        SettingsAction::ToggleTheme => {
            let theme = store.toggle_theme();
            log!("settings"; "theme: {theme}");
        }
        SettingsAction::ToggleCodeTheme => {
            let theme = store.toggle_code_theme();
            log!("settings"; "codeTheme: {theme}");
        }
        SettingsAction::Reset => {
            store.reset();
            log!("settings"; "restored defaults");
        }
    }

    println!("{}", serde_json::to_string_pretty(store.settings())?);
    println!("<html{}>", store.surface().html_attributes());
    Ok(())
}
