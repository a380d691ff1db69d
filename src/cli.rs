use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate, generate_to};
use mktdash::InputFormat;

pub const DEFAULT_HTML_PATH: &str = "data/output/report.html";
pub const DEFAULT_CSV_PATH: &str = "data/output/table.csv";
pub const DEFAULT_SERIES_PATH: &str = "data/output/series.json";
pub const DEFAULT_TITLE: &str = "Market Comparison";

pub const INPUT_HELP: &str = "Table to compare: a JSON object of columns or a CSV file with a header row. Reads stdin when omitted or '-'.";
pub const SAVE_HTML_HELP: &str = "Save the HTML report with the table and comparison chart to the given file (defaults to data/output/report.html when no path is provided).";
pub const SAVE_CSV_HELP: &str = "Save the formatted comparison table to the given CSV file (defaults to data/output/table.csv when no path is provided).";
pub const SAVE_SERIES_HELP: &str = "Save the chart series as JSON to the given file (defaults to data/output/series.json when no path is provided).";

#[derive(Debug, Parser)]
#[command(
    name = "mktdash",
    about = "Compare two periods of market metrics as a formatted table and dual-axis chart.",
    version = env!("CARGO_PKG_VERSION"),
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[arg(value_name = "INPUT", help = INPUT_HELP)]
    pub input: Option<PathBuf>,
    #[arg(
        long,
        value_enum,
        default_value_t = FormatArg::Auto,
        help = "Input encoding; 'auto' uses the file extension, then the first character."
    )]
    pub format: FormatArg,
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_HTML_PATH,
        help = SAVE_HTML_HELP
    )]
    pub save_html: Option<PathBuf>,
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_CSV_PATH,
        help = SAVE_CSV_HELP
    )]
    pub save_csv: Option<PathBuf>,
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_SERIES_PATH,
        help = SAVE_SERIES_HELP
    )]
    pub save_series: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_TITLE, help = "Heading used in the terminal summary and HTML report.")]
    pub title: String,
    #[arg(long, help = "Disable colored terminal output.")]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Auto,
    Json,
    Csv,
}

impl FormatArg {
    pub const fn fixed(self) -> Option<InputFormat> {
        match self {
            Self::Auto => None,
            Self::Json => Some(InputFormat::Json),
            Self::Csv => Some(InputFormat::Csv),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate shell completion scripts, optionally installing them for the current user.
    Completions {
        #[arg(value_enum, help = "Shell to generate completions for.")]
        shell: Shell,
        #[arg(
            long,
            value_name = "DIR",
            help = "Directory to write the completion script to."
        )]
        output_dir: Option<PathBuf>,
        #[arg(
            long,
            help = "Install the completion script into the default location for the selected shell."
        )]
        install: bool,
    },
}

pub fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Completions {
            shell,
            output_dir,
            install,
        } => generate_completions(shell, output_dir, install),
    }
}

fn generate_completions(shell: Shell, output_dir: Option<PathBuf>, install: bool) -> Result<()> {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();

    let target_dir = if let Some(dir) = output_dir {
        Some(dir)
    } else if install {
        Some(default_install_dir(shell)?)
    } else {
        None
    };

    if let Some(dir) = target_dir {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create completion directory {}", dir.display()))?;
        let path = generate_to(shell, &mut command, bin_name, &dir)
            .context("failed to write completion file")?;
        println!("Installed {shell:?} completions to {}", path.display());
    } else {
        let mut stdout = io::stdout().lock();
        generate(shell, &mut command, bin_name, &mut stdout);
        stdout
            .flush()
            .context("failed to flush completion output")?;
    }

    Ok(())
}

fn default_install_dir(shell: Shell) -> Result<PathBuf> {
    let home = std::env::var_os("HOME").ok_or_else(|| {
        anyhow!("HOME environment variable is not set; use --output-dir to specify a path")
    })?;
    let home = PathBuf::from(home);
    let dir = match shell {
        Shell::Bash => home.join(".local/share/bash-completion/completions"),
        Shell::Zsh => home.join(".zfunc"),
        Shell::Fish => home.join(".config/fish/completions"),
        Shell::Elvish => home.join(".config/elvish/lib"),
        Shell::PowerShell => home.join(".config/powershell/Completions"),
        _ => {
            return Err(anyhow!(
                "no default install location for {shell:?}; use --output-dir"
            ));
        }
    };
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn save_flags_fall_back_to_default_paths() {
        let cli = Cli::try_parse_from(["mktdash", "table.json", "--save-html", "--save-csv"])
            .unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("table.json")));
        assert_eq!(cli.save_html, Some(PathBuf::from(DEFAULT_HTML_PATH)));
        assert_eq!(cli.save_csv, Some(PathBuf::from(DEFAULT_CSV_PATH)));
        assert!(cli.save_series.is_none());
        assert_eq!(cli.format, FormatArg::Auto);
        assert_eq!(cli.title, DEFAULT_TITLE);
    }

    #[test]
    fn explicit_format_overrides_detection() {
        let cli = Cli::try_parse_from(["mktdash", "--format", "csv"]).unwrap();
        assert_eq!(cli.format.fixed(), Some(InputFormat::Csv));
        assert!(cli.input.is_none());
    }
}
