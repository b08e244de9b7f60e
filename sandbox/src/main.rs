//! `scout-bench` — run or benchmark a shard-execution guest.
//!
//! ## About
//!
//! Either a single module is given as `FILENAME`, with its block payload from
//! `--block-data`, or a scenario fixture is given with `--scenario`, in which
//! case every module it lists is run and its post-state root checked.
//!
//! Diagnostics go through `log`; `-v` raises the default level and
//! `RUST_LOG` overrides it. Output defined by the host ABI itself
//! (`debug_printMemHex`, saved post-state roots, `host.print`) is printed to
//! stdout.
//!
//! The process exits with status 1 on any load, link, or execution failure and
//! on any post-state mismatch.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{value_parser, Arg, ArgAction, ArgMatches};
use log::*;

use scout_hostapi::hex;
use scout_sandbox::{run_scenario, Harness, HarnessConfig, HarnessError, ResetPolicy};

////////////////////////////////////////////////////////////////////////////////
// Constants.
////////////////////////////////////////////////////////////////////////////////

/// The name of the application.
const APPLICATION_NAME: &str = "scout-bench";
/// About scout-bench.
const ABOUT: &str = "Runs an eth2 shard-execution WebAssembly guest against the shard host \
                     ABI, optionally in a timed benchmark loop.";

////////////////////////////////////////////////////////////////////////////////
// Command line options and parsing.
////////////////////////////////////////////////////////////////////////////////

/// What the invocation asks for.
enum Target {
    Module(PathBuf),
    Scenario(PathBuf),
}

/// A struct capturing all of the command line options passed to the program.
struct CommandLineOptions {
    target: Target,
    config: HarnessConfig,
    /// Number of timed iterations; `None` runs once without timing.
    iterations: Option<u32>,
    verbosity: u8,
}

fn command() -> clap::Command {
    clap::Command::new(APPLICATION_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about(ABOUT)
        // `-V` is the value stack size, so `--version` has no short form.
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .long("version")
                .help("Print version")
                .action(ArgAction::Version),
        )
        .arg(
            Arg::new("filename")
                .value_name("FILENAME")
                .help("WebAssembly module to run (binary or text format).")
                .value_parser(value_parser!(PathBuf))
                .required_unless_present("scenario")
                .conflicts_with("scenario"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Raise the default log level; repeat for more.")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("value-stack-size")
                .short('V')
                .long("value-stack-size")
                .value_name("SIZE")
                .help("Size in elements of the value stack.")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("call-stack-size")
                .short('C')
                .long("call-stack-size")
                .value_name("SIZE")
                .help("Size in frames of the call stack.")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("trace")
                .short('t')
                .long("trace")
                .help("Trace every host call.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("host-print")
                .long("host-print")
                .help("Bind any imported 'host.print' function and echo its arguments.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("run-all-exports")
                .long("run-all-exports")
                .help("Run every exported function that takes no arguments.")
                .action(ArgAction::SetTrue)
                .conflicts_with("invoke"),
        )
        .arg(
            Arg::new("invoke")
                .long("invoke")
                .value_name("NAME")
                .help("Export to run.")
                .default_value("main"),
        )
        .arg(
            Arg::new("block-data")
                .long("block-data")
                .value_name("PATH")
                .help("File holding the block payload as hex text.")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("scenario")
                .long("scenario")
                .value_name("PATH")
                .help("Scenario fixture (YAML, or JSON by '.json' extension).")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("iterations")
                .long("iterations")
                .value_name("N")
                .help("Run the export N times in a timed loop.")
                .value_parser(value_parser!(u32))
                .conflicts_with_all(["scenario", "run-all-exports"]),
        )
        .arg(
            Arg::new("reset-between-iterations")
                .long("reset-between-iterations")
                .help("Re-instantiate the module before each benchmark iteration.")
                .action(ArgAction::SetTrue)
                .requires("iterations"),
        )
}

/// Builds a `CommandLineOptions` struct out of parsed arguments.
fn options_from_matches(matches: &ArgMatches) -> CommandLineOptions {
    let target = match matches.get_one::<PathBuf>("scenario") {
        Some(path) => Target::Scenario(path.clone()),
        None => Target::Module(
            matches
                .get_one::<PathBuf>("filename")
                .cloned()
                .unwrap_or_default(),
        ),
    };

    let reset_policy = if matches.get_flag("reset-between-iterations") {
        ResetPolicy::FreshInstance
    } else {
        ResetPolicy::SharedInstance
    };

    let config = HarnessConfig {
        entry_point: matches
            .get_one::<String>("invoke")
            .cloned()
            .unwrap_or_else(|| "main".into()),
        run_all_exports: matches.get_flag("run-all-exports"),
        value_stack_size: matches.get_one::<usize>("value-stack-size").copied(),
        call_stack_size: matches.get_one::<usize>("call-stack-size").copied(),
        trace: matches.get_flag("trace"),
        host_print: matches.get_flag("host-print"),
        block_data_path: matches.get_one::<PathBuf>("block-data").cloned(),
        reset_policy,
        ..HarnessConfig::default()
    };

    CommandLineOptions {
        target,
        config,
        iterations: matches.get_one::<u32>("iterations").copied(),
        verbosity: matches.get_count("verbose"),
    }
}

/// Default log filter for a given `-v` count.
fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

////////////////////////////////////////////////////////////////////////////////
// Execution.
////////////////////////////////////////////////////////////////////////////////

/// Run a single module. Returns whether the run counts as a success.
fn run_module(
    path: &Path,
    config: HarnessConfig,
    iterations: Option<u32>,
) -> Result<bool, HarnessError> {
    let run_all_exports = config.run_all_exports;
    let mut harness = Harness::from_config(config)?;
    harness.load_file(path)?;
    harness.instantiate()?;

    if run_all_exports {
        for (name, results) in harness.run_all_exports()? {
            println!(
                "{}() => ({})",
                name,
                scout_sandbox::resolver::format_vals(&results)
            );
        }
    } else if let Some(iterations) = iterations {
        let entry_point = harness.config().entry_point.clone();
        let report = harness.benchmark(&entry_point, iterations)?;
        println!("{}", report);
    } else {
        harness.run()?;
    }

    if let Some(root) = harness.post_state_root() {
        info!("post-state root: {}", hex::encode(&root));
    }
    Ok(true)
}

/// Run every module of a scenario. Returns whether all post-states matched.
fn run_suite(path: &Path, config: &HarnessConfig) -> Result<bool, HarnessError> {
    let outcomes = run_scenario(path, config)?;
    let mut all_matched = true;
    for outcome in &outcomes {
        if !outcome.matched {
            error!(
                "{}: expected post-state {}, got {}",
                outcome.module.display(),
                outcome.expected.as_deref().map(hex::encode).unwrap_or_default(),
                outcome
                    .produced
                    .map(|r| hex::encode(&r))
                    .unwrap_or_else(|| "none".into())
            );
            all_matched = false;
        }
    }
    info!(
        "{} of {} modules matched their post-state",
        outcomes.iter().filter(|o| o.matched).count(),
        outcomes.len()
    );
    Ok(all_matched)
}

/// Entry: parses the command line, initialises logging, and runs the requested
/// module or scenario.
fn main() -> ExitCode {
    let cmdline = options_from_matches(&command().get_matches());

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter(cmdline.verbosity)),
    )
    .init();
    info!("Command line read successfully.");

    let result = match &cmdline.target {
        Target::Module(path) => run_module(path, cmdline.config, cmdline.iterations),
        Target::Scenario(path) => run_suite(path, &cmdline.config),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
