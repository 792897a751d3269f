use crate::writers::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wind-rose-processor")]
#[command(about = "Wind rose frequency tables from synoptic station archives")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Settings file (TOML, YAML or JSON); WINDROSE__* variables override it"
    )]
    pub config: Option<PathBuf>,
}

/// Date window and filters shared by `rose` and `batch`.
#[derive(Args, Debug, Clone)]
pub struct WindowArgs {
    #[arg(long, help = "Window start: DD.MM.YYYY [HH:MM]")]
    pub from: String,

    #[arg(long, help = "Window end: DD.MM.YYYY [HH:MM]")]
    pub to: String,

    #[arg(
        long,
        help = "Snap calendar dates onto synoptic observations instead of using an open interval"
    )]
    pub synoptic: bool,

    #[arg(long, help = "Only observations with snow")]
    pub snow_only: bool,

    #[arg(long = "wind-at-least-3", help = "Only observations with wind of 3 m/s and above")]
    pub wind_at_least_3: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the wind rose of one station archive
    Rose {
        #[arg(short, long, help = "Normalized station archive (CSV)")]
        input: PathBuf,

        #[arg(short, long, help = "Station name [default: archive file stem]")]
        station: Option<String>,

        #[arg(long, help = "Station name as used in report titles")]
        locative: Option<String>,

        #[command(flatten)]
        window: WindowArgs,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        #[arg(short, long, help = "Table output path [default: stdout]")]
        output: Option<PathBuf>,

        #[arg(long, help = "Write filtered (azimuth, speed) samples for plotting")]
        samples: Option<PathBuf>,

        #[arg(
            long,
            help = "Write table and samples under output/ with default names",
            conflicts_with_all = ["output", "samples"]
        )]
        save: bool,
    },

    /// Build wind roses for every station in the settings file
    Batch {
        #[command(flatten)]
        window: WindowArgs,

        #[arg(short, long, value_enum, default_value = "csv")]
        format: OutputFormat,

        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        #[arg(long, help = "Worker threads [default: settings max_workers]")]
        max_workers: Option<usize>,
    },

    /// Display statistics about a station archive
    Info {
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_rose_command() {
        let cli = Cli::try_parse_from([
            "wind-rose-processor",
            "--verbose",
            "rose",
            "--input",
            "orel.csv",
            "--from",
            "01.01.2020",
            "--to",
            "01.02.2020",
            "--snow-only",
            "--format",
            "json",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Rose {
                input,
                window,
                format,
                save,
                ..
            } => {
                assert_eq!(input, PathBuf::from("orel.csv"));
                assert!(window.snow_only);
                assert!(!window.wind_at_least_3);
                assert!(!window.synoptic);
                assert_eq!(format, OutputFormat::Json);
                assert!(!save);
            }
            _ => panic!("expected rose command"),
        }
    }

    #[test]
    fn test_save_conflicts_with_output() {
        let result = Cli::try_parse_from([
            "wind-rose-processor",
            "rose",
            "-i",
            "orel.csv",
            "--from",
            "01.01.2020",
            "--to",
            "02.01.2020",
            "--save",
            "--output",
            "x.csv",
        ]);
        assert!(result.is_err());
    }
}
