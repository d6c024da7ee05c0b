//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use crate::settings::SettingField;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lectern course site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Content directory path (relative to project root)
    #[arg(short, long)]
    pub content: Option<PathBuf>,

    /// Assets directory path (relative to project root)
    #[arg(short, long)]
    pub assets: Option<PathBuf>,

    /// Config file name (default: lectern.toml)
    #[arg(short = 'C', long, default_value = "lectern.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments of the Build command
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Clean output directory completely before building
    #[arg(long)]
    pub clean: bool,

    /// Minify the html content
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// enable sitemap generation
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub sitemap: Option<bool>,

    /// Override base URL for the site.
    ///
    /// Useful for CI/CD deployments where the production URL differs from local development.
    ///
    /// Example:
    ///   lectern build --base-url "https://easyflutter-course.vercel.app"
    #[arg(long = "base-url")]
    pub base_url: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render every lesson, the chapter listing, sitemap and search index
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Serve the course from memory
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Inspect or change the persisted reader settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

/// `settings` subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsAction {
    /// Print the current settings and the presentation attributes they produce
    Show,

    /// Change a single field
    Set {
        /// Field to change
        #[arg(value_enum)]
        field: SettingField,

        /// New value (e.g. `dark`, `18`, `1.6`, `dracula`)
        value: String,
    },

    /// Flip the site theme between light and dark
    ToggleTheme,

    /// Flip the code theme between light and dark
    ToggleCodeTheme,

    /// Restore every field to its default
    Reset,
}

#[allow(unused)]
impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
    pub const fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }
    pub const fn is_settings(&self) -> bool {
        matches!(self.command, Commands::Settings { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_flags() {
        let cli = Cli::parse_from(["lectern", "build", "--clean", "--minify", "false"]);
        let Commands::Build { build_args } = &cli.command else {
            panic!("expected build");
        };
        assert!(build_args.clean);
        assert_eq!(build_args.minify, Some(false));
        assert_eq!(build_args.sitemap, None);
        assert!(cli.is_build());
    }

    #[test]
    fn test_parse_settings_set() {
        let cli = Cli::parse_from(["lectern", "settings", "set", "font-size", "18"]);
        let Commands::Settings {
            action: SettingsAction::Set { field, value },
        } = &cli.command
        else {
            panic!("expected settings set");
        };
        assert_eq!(*field, SettingField::FontSize);
        assert_eq!(value, "18");
    }

    #[test]
    fn test_parse_global_paths() {
        let cli = Cli::parse_from(["lectern", "-r", "site", "-c", "lessons", "serve", "-p", "8080"]);
        assert_eq!(cli.root, Some(PathBuf::from("site")));
        assert_eq!(cli.content, Some(PathBuf::from("lessons")));
        assert!(matches!(cli.command, Commands::Serve { port: Some(8080), .. }));
    }
}
