//! Policy report CLI - extract, clean and report on reimbursement policy bulletins
//!
//! Usage: policy-report-cli [OPTIONS] <COMMAND>
//!
//! Command output goes to stdout (or --output), progress and errors to stderr.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use policy_report_lib::{elog, log};
use policy_report_lib::error::{Error, Result};
use policy_report_lib::logging;
use policy_report_lib::policy::{cleaner, pdf_extractor, report, PolicyData};
use policy_report_lib::settings;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "policy-report-cli")]
#[command(version, about = "Reimbursement policy extraction and reporting CLI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON for scripting (config commands)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress progress output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Don't write a log file for this run
    #[arg(long, global = true)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract raw text from a policy PDF
    Extract {
        /// PDF file
        input: PathBuf,
        /// Write to file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Extract (for .pdf) and clean policy text
    Clean {
        /// PDF or plain text file
        input: PathBuf,
        /// Write to file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Use built-in defaults, ignoring configured noise phrases and fallback length
        #[arg(long)]
        raw: bool,
    },
    /// Render rule JSON as an HTML report
    Render {
        /// JSON file with policy_name and rules
        input: PathBuf,
        /// Write to file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// HTML-escape interpolated values
        #[arg(long)]
        escape: bool,
    },
    /// Configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all settings
    List,
    /// Get a setting value
    Get {
        /// Setting key
        key: String,
    },
    /// Set a setting value
    Set {
        /// Setting key
        key: String,
        /// Setting value
        value: String,
    },
    /// Add a phrase to strip during cleaning
    AddNoise {
        phrase: String,
    },
    /// Remove all configured noise phrases
    ClearNoise,
}

fn main() {
    // Ignore SIGPIPE so piping through head/tail doesn't kill the process.
    #[cfg(unix)]
    unsafe { libc::signal(libc::SIGPIPE, libc::SIG_IGN); }

    // println! panics on a closed pipe even with SIGPIPE ignored; exit quietly instead.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe") {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    if let Err(e) = run_cli(cli) {
        elog!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    settings::init(settings::default_app_dir());
    logging::set_quiet(cli.quiet);

    // Handle completions first (no logging needed)
    if let Commands::Completions { shell } = &cli.command {
        generate(*shell, &mut Cli::command(), "policy-report-cli", &mut std::io::stdout());
        return Ok(());
    }

    if !cli.no_log_file && settings::log_to_file() {
        if let Some(log_path) = logging::init_logging(&logging::default_log_dir()) {
            if !cli.quiet {
                eprintln!("Logging to: {}", log_path.display());
            }
        }
    }

    match cli.command {
        Commands::Extract { input, output } => handle_extract(&input, output.as_deref()),
        Commands::Clean { input, output, raw } => handle_clean(&input, output.as_deref(), raw),
        Commands::Render { input, output, escape } => handle_render(&input, output.as_deref(), escape),
        Commands::Config { cmd } => handle_config(cmd, cli.json),
        Commands::Completions { .. } => unreachable!(),
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Write command output to a file, or stdout when no file is given
fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).map_err(|e| Error::Io { path: path.to_path_buf(), source: e })?;
            log!("Wrote {} bytes to {}", content.len(), path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn handle_extract(input: &Path, output: Option<&Path>) -> Result<()> {
    let text = pdf_extractor::extract_text_from_pdf(input)?;
    write_output(output, &text)
}

fn handle_clean(input: &Path, output: Option<&Path>, raw: bool) -> Result<()> {
    let text = if is_pdf(input) {
        pdf_extractor::extract_text_from_pdf(input)?
    } else {
        fs::read_to_string(input).map_err(|e| Error::Io { path: input.to_path_buf(), source: e })?
    };

    let cleaned = if raw {
        cleaner::clean_policy_text(&text)
    } else {
        cleaner::PolicyCleaner::new(&settings::cleaner_config())?.clean(&text)
    };

    log!("[Clean] {} -> {} chars", text.chars().count(), cleaned.chars().count());
    write_output(output, &cleaned)
}

fn handle_render(input: &Path, output: Option<&Path>, escape: bool) -> Result<()> {
    let data = PolicyData::from_json_file(input)?;
    match &data {
        Some(d) => log!("[Render] {} rules for {}", d.rules.len(), d.policy_name.as_ref().and_then(|n| n.as_str()).unwrap_or("unnamed policy")),
        None => log!("[Render] {} has no policy data", input.display()),
    }

    let options = report::RenderOptions { escape_html: escape };
    let html = report::generate_html_with(data.as_ref(), &options);
    write_output(output, &html)
}

fn handle_config(cmd: ConfigCommands, json: bool) -> Result<()> {
    match cmd {
        ConfigCommands::List => {
            let current = settings::current();
            let effective = settings::cleaner_config();
            let path = settings::config_path();

            if json {
                let value = serde_json::json!({
                    "fallback_chars": effective.fallback_chars,
                    "extra_noise_phrases": current.extra_noise_phrases,
                    "log_to_file": current.log_to_file,
                    "config_path": path.as_ref().map(|p| p.display().to_string()),
                });
                println!("{}", value);
            } else {
                println!("fallback-chars:      {}", effective.fallback_chars);
                println!("log-to-file:         {}", current.log_to_file);
                println!("noise-phrases:       {}", current.extra_noise_phrases.len());
                for phrase in &current.extra_noise_phrases {
                    println!("  - {}", phrase);
                }
                println!("config-path:         {}", path.map(|p| p.display().to_string()).unwrap_or_else(|| "not set".to_string()));
            }
        }
        ConfigCommands::Get { key } => {
            let value: String = match key.as_str() {
                "fallback-chars" => settings::cleaner_config().fallback_chars.to_string(),
                "log-to-file" => settings::log_to_file().to_string(),
                "noise-phrases" => settings::current().extra_noise_phrases.join("\n"),
                _ => return Err(Error::Settings(format!("Unknown config key: {}", key))),
            };

            if json {
                println!("{}", serde_json::json!({ key: value }));
            } else {
                println!("{}", value);
            }
        }
        ConfigCommands::Set { key, value } => {
            match key.as_str() {
                "fallback-chars" => {
                    let chars: usize = value.parse()
                        .map_err(|_| Error::Settings(format!("fallback-chars must be a positive integer, got '{}'", value)))?;
                    settings::set_fallback_chars(chars).map_err(Error::Settings)?;
                }
                "log-to-file" => {
                    let enabled: bool = value.parse()
                        .map_err(|_| Error::Settings(format!("log-to-file must be true or false, got '{}'", value)))?;
                    settings::set_log_to_file(enabled).map_err(Error::Settings)?;
                }
                _ => return Err(Error::Settings(format!("Unknown config key: {}", key))),
            }
            log!("Set {} = {}", key, value);
        }
        ConfigCommands::AddNoise { phrase } => {
            settings::add_noise_phrase(&phrase).map_err(Error::Settings)?;
            log!("Added noise phrase: {}", phrase.trim());
        }
        ConfigCommands::ClearNoise => {
            settings::clear_noise_phrases().map_err(Error::Settings)?;
            log!("Cleared noise phrases");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf(Path::new("bulletin.pdf")));
        assert!(is_pdf(Path::new("BULLETIN.PDF")));
        assert!(!is_pdf(Path::new("bulletin.txt")));
        assert!(!is_pdf(Path::new("bulletin")));
    }

    #[test]
    fn test_parse_render_args() {
        let cli = Cli::try_parse_from(["policy-report-cli", "render", "rules.json", "-o", "out.html", "--escape"]).unwrap();
        match cli.command {
            Commands::Render { input, output, escape } => {
                assert_eq!(input, PathBuf::from("rules.json"));
                assert_eq!(output, Some(PathBuf::from("out.html")));
                assert!(escape);
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn test_clean_text_file_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bulletin.txt");
        let output = dir.path().join("cleaned.txt");
        fs::write(&input, "Header\nPURPOSE:\n  Pay once.\nPolicy Applicable Codes: 99213\nRELATED HIGHMARK POLICIES x").unwrap();

        handle_clean(&input, Some(&output), true).unwrap();
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "PURPOSE: Pay once. Policy Applicable Codes: 99213"
        );
    }

    #[test]
    fn test_render_json_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("rules.json");
        let output = dir.path().join("report.html");
        fs::write(&input, r#"{"policy_name": "RP-1", "rules": [{"rule_name": "<x>"}]}"#).unwrap();

        handle_render(&input, Some(&output), false).unwrap();
        let html = fs::read_to_string(&output).unwrap();
        assert!(html.starts_with("<html><body><h1>Policy Name: RP-1</h1>"));
        assert!(html.contains("<h2>Rule Name: <x></h2>"));
    }

    #[test]
    fn test_render_empty_json_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("rules.json");
        let output = dir.path().join("report.html");
        fs::write(&input, "{}").unwrap();

        handle_render(&input, Some(&output), false).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "<h1>No Data Found</h1>");
    }

    #[test]
    fn test_render_empty_rules_is_a_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("rules.json");
        let output = dir.path().join("report.html");
        fs::write(&input, r#"{"rules": []}"#).unwrap();

        handle_render(&input, Some(&output), false).unwrap();
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "<html><body><h1>Policy Name: None</h1><hr><h3>Rules List:</h3></body></html>"
        );
    }
}
