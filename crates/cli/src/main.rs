// genverify CLI - PIM vs SAGER generation verification

mod exit_codes;

use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use genverify_cli::{InputFile, RunError, RunParams, Session};
use genverify_config::Settings;
use genverify_io::csv::write_comparison_csv;
use genverify_io::{read_report, write_template};
use genverify_recon::Alignment;

use exit_codes::{
    run_exit_code, EXIT_CONFIG, EXIT_ERROR, EXIT_FORMAT, EXIT_INPUT_MISSING, EXIT_MISMATCH,
    EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "genverify")]
#[command(about = "Verify plant generation: PIM telemetry against SAGER settlement")]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/genverify/settings.json)
    #[arg(long, global = true, env = "GENVERIFY_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a PIM export against a SAGER export and write the verified report
    #[command(after_help = "\
Examples:
  genverify run --pim pim.xlsx --sager sager.xlsx
  genverify run --pim pim.xlsx --sager sager.xlsx -o maio.xlsx --tolerance 2
  genverify run --pim pim.xlsx --sager sager.xlsx --by-row-key --json

Exit codes:
  0  every cell within tolerance
  3  report written, mismatches found
  4  input missing    5  input unreadable
  6  comparison failed    7  report not written")]
    Run {
        /// Reference spreadsheet (PIM)
        #[arg(long)]
        pim: PathBuf,

        /// Candidate spreadsheet (SAGER)
        #[arg(long)]
        sager: PathBuf,

        /// Report file to write
        #[arg(long, short = 'o', default_value = "geracao_verificada.xlsx")]
        output: PathBuf,

        /// Tolerance in MW (overrides settings)
        #[arg(long)]
        tolerance: Option<f64>,

        /// Pair rows by timestamp instead of by position
        #[arg(long)]
        by_row_key: bool,

        /// Also write the full comparison table as CSV
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,

        /// Print the run summary as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Write a blank SAGER entry template for the configured plants
    Template {
        #[arg(long, short = 'o', default_value = "sager_template.xlsx")]
        output: PathBuf,
    },

    /// Show pass/fail counts of a previously written report
    Inspect {
        file: PathBuf,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// View or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective settings as JSON
    Show,

    /// Change settings and save them
    #[command(after_help = "\
Examples:
  genverify config set --tolerance 2.5
  genverify config set --plants CETR,CEAB,CEMA")]
    Set {
        /// Generation tolerance in MW
        #[arg(long)]
        tolerance: Option<f64>,

        /// Timestamp tolerance in minutes
        #[arg(long)]
        tolerance_minutes: Option<f64>,

        /// Comma-separated plant list, in report order
        #[arg(long)]
        plants: Option<String>,
    },

    /// Print the settings file location
    Path,
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    /// Create error from a failed run with the matching exit code.
    pub fn run(err: RunError) -> Self {
        let hint = match &err {
            RunError::InputMissing(source) => {
                Some(format!("check the --{} path", source.to_string().to_lowercase()))
            }
            RunError::Parse { .. } => Some(
                "the first sheet needs plant names in row 1 and timestamps in column A".to_string(),
            ),
            _ => None,
        };
        Self { code: run_exit_code(&err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings_path = cli.config.unwrap_or_else(Settings::config_path);
    let mut session = Session::open(&settings_path);

    let result = match cli.command {
        Commands::Run {
            pim,
            sager,
            output,
            tolerance,
            by_row_key,
            csv,
            json,
        } => cmd_run(&mut session, pim, sager, output, tolerance, by_row_key, csv, json),
        Commands::Template { output } => cmd_template(&session, &output),
        Commands::Inspect { file, json } => cmd_inspect(&file, json),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cmd_config_show(&session),
            ConfigCommands::Set {
                tolerance,
                tolerance_minutes,
                plants,
            } => cmd_config_set(&mut session, tolerance, tolerance_minutes, plants),
            ConfigCommands::Path => {
                println!("{}", session.settings_path().display());
                Ok(())
            }
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// run
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    session: &mut Session,
    pim: PathBuf,
    sager: PathBuf,
    output_path: PathBuf,
    tolerance: Option<f64>,
    by_row_key: bool,
    csv_path: Option<PathBuf>,
    json_output: bool,
) -> Result<(), CliError> {
    let mut params = RunParams::from_settings(session.settings());
    if let Some(tolerance) = tolerance {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(CliError::usage(format!("invalid --tolerance {tolerance}"))
                .with_hint("tolerance is a non-negative number of MW"));
        }
        params.options.tolerance = tolerance;
    }
    if by_row_key {
        params.options.alignment = Alignment::RowKey;
    }

    let output = session
        .run_with(&InputFile::Path(pim), &InputFile::Path(sager), &params)
        .map_err(CliError::run)?;

    fs::write(&output_path, &output.artifact).map_err(|e| {
        CliError::new(EXIT_FORMAT, format!("cannot write {}: {e}", output_path.display()))
    })?;
    eprintln!("wrote {}", output_path.display());

    if let Some(ref path) = csv_path {
        let file = fs::File::create(path)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot create {}: {e}", path.display())))?;
        write_comparison_csv(&output.comparison, BufWriter::new(file))
            .map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;
        eprintln!("wrote {}", path.display());
    }

    let s = &output.summary;
    if json_output {
        let value = serde_json::json!({
            "output": output_path.display().to_string(),
            "tolerance": params.options.tolerance,
            "sheets": output.sheet_order,
            "summary": s,
        });
        let json_str = serde_json::to_string_pretty(&value)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human summary to stderr
    eprintln!(
        "{} plants, {} rows: {} of {} cells within {} MW",
        s.plants.len(),
        s.rows,
        s.passed,
        s.checked,
        params.options.tolerance,
    );
    for plant in &s.plants {
        eprintln!(
            "  {:<8} {} passed, {} mismatched, {} missing",
            plant.plant, plant.passed, plant.mismatched, plant.missing
        );
    }

    if !s.all_passed() {
        return Err(CliError::new(
            EXIT_MISMATCH,
            format!("{} cells outside tolerance", s.failed),
        ));
    }
    Ok(())
}

// ============================================================================
// template
// ============================================================================

fn cmd_template(session: &Session, output_path: &Path) -> Result<(), CliError> {
    let plants = session.settings().plant_list();
    if plants.is_empty() {
        return Err(CliError::usage("no plants configured")
            .with_hint("genverify config set --plants CETR,CEAB,..."));
    }

    let bytes = write_template(&plants).map_err(|e| CliError::new(EXIT_FORMAT, e.to_string()))?;
    fs::write(output_path, bytes).map_err(|e| {
        CliError::new(EXIT_FORMAT, format!("cannot write {}: {e}", output_path.display()))
    })?;
    eprintln!("wrote {} ({} plants)", output_path.display(), plants.len());
    Ok(())
}

// ============================================================================
// inspect
// ============================================================================

fn cmd_inspect(file: &Path, json_output: bool) -> Result<(), CliError> {
    let bytes = fs::read(file).map_err(|e| {
        let code = if e.kind() == io::ErrorKind::NotFound { EXIT_INPUT_MISSING } else { EXIT_ERROR };
        CliError::new(code, format!("cannot read {}: {e}", file.display()))
    })?;
    let sheets = read_report(&bytes).map_err(|e| CliError::new(EXIT_PARSE, e.to_string()))?;

    if json_output {
        let entries: Vec<serde_json::Value> = sheets
            .iter()
            .map(|sheet| {
                let (passed, failed) = sheet.status_counts();
                serde_json::json!({
                    "name": sheet.name,
                    "rows": sheet.row_keys.len(),
                    "columns": sheet.headers,
                    "passed": passed,
                    "failed": failed,
                })
            })
            .collect();
        let json_str = serde_json::to_string_pretty(&entries)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    for sheet in &sheets {
        let (passed, failed) = sheet.status_counts();
        println!(
            "{}: {} rows, {} passed, {} failed",
            sheet.name,
            sheet.row_keys.len(),
            passed,
            failed
        );
    }
    Ok(())
}

// ============================================================================
// config
// ============================================================================

fn cmd_config_show(session: &Session) -> Result<(), CliError> {
    let json_str = serde_json::to_string_pretty(session.settings())
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
    println!("{json_str}");
    Ok(())
}

fn cmd_config_set(
    session: &mut Session,
    tolerance: Option<f64>,
    tolerance_minutes: Option<f64>,
    plants: Option<String>,
) -> Result<(), CliError> {
    if tolerance.is_none() && tolerance_minutes.is_none() && plants.is_none() {
        return Err(CliError::usage("nothing to set")
            .with_hint("pass --tolerance, --tolerance-minutes or --plants"));
    }

    let settings = session.settings_mut();
    if let Some(tolerance) = tolerance {
        settings.tolerance_generation = tolerance;
    }
    if let Some(minutes) = tolerance_minutes {
        settings.tolerance_minutes = minutes;
    }
    if let Some(plants) = plants {
        settings.set_plants(plants.split(','));
    }

    session
        .save_settings()
        .map_err(|e| CliError::new(EXIT_CONFIG, format!("settings not saved: {e}")))?;
    eprintln!("saved {}", session.settings_path().display());
    Ok(())
}
