// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `build_api`: route one Build API call.
//!
//! Reads the input message from a JSON file, dispatches it through the router
//! and writes the output message to another JSON file. Successful outcomes
//! exit 0; any other outcome exits with its return code value.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use anyhow::{bail, Context, Result};
use buildapi_config::{CliPrefs, FsConfigStore, PrefsService};
use buildapi_core::{ApiConfig, CallType, DispatchRequest, ReturnCode, Router};
use clap::{ArgGroup, Args as ClapArgs, Parser};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "build_api",
    author,
    version,
    about = "Route a Build API call to its implementation"
)]
struct Args {
    /// Method to call, as `Service/Method` (e.g. chromite.api.ApiService/GetVersion)
    #[arg(
        value_parser = parse_service_method,
        required_unless_present_any = ["list_services", "save_prefs"]
    )]
    service_method: Option<ServiceMethod>,
    /// JSON file holding the input message
    #[arg(long, required_unless_present_any = ["list_services", "save_prefs"])]
    input_json: Option<PathBuf>,
    /// JSON file the output message is written to
    #[arg(long, required_unless_present_any = ["list_services", "save_prefs"])]
    output_json: Option<PathBuf>,
    #[command(flatten)]
    call_type: CallTypeArgs,
    /// Print every registered `Service/Method` and exit
    #[arg(long, conflicts_with_all = ["service_method", "input_json", "output_json"])]
    list_services: bool,
    /// Log filter directive; overrides RUST_LOG and the saved preference
    #[arg(long)]
    log_filter: Option<String>,
    /// Write the output message indented (true) or compact (false)
    #[arg(long, value_name = "BOOL")]
    pretty_output: Option<bool>,
    /// Save the effective preferences, including --log-filter and --pretty-output
    #[arg(long)]
    save_prefs: bool,
}

impl Args {
    /// Saved preferences with this invocation's overrides applied.
    fn effective_prefs(&self, saved: CliPrefs) -> CliPrefs {
        CliPrefs {
            log_filter: self.log_filter.clone().unwrap_or(saved.log_filter),
            pretty_output: self.pretty_output.unwrap_or(saved.pretty_output),
        }
    }
}

#[derive(ClapArgs, Debug, Default)]
#[command(group(ArgGroup::new("call").multiple(false)))]
#[allow(clippy::struct_excessive_bools)]
struct CallTypeArgs {
    /// Only validate the input; do not run the implementation
    #[arg(long, group = "call")]
    validate_only: bool,
    /// Return a mock success response
    #[arg(long, group = "call")]
    mock_call: bool,
    /// Return a mock failure response
    #[arg(long, group = "call")]
    mock_failure: bool,
    /// Return a mock invalid-input response
    #[arg(long, group = "call")]
    mock_invalid: bool,
}

impl CallTypeArgs {
    fn call_type(&self) -> CallType {
        if self.validate_only {
            CallType::ValidateOnly
        } else if self.mock_call {
            CallType::MockSuccess
        } else if self.mock_failure {
            CallType::MockFailure
        } else if self.mock_invalid {
            CallType::MockInvalid
        } else {
            CallType::Call
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ServiceMethod {
    service: String,
    method: String,
}

fn parse_service_method(raw: &str) -> Result<ServiceMethod, String> {
    match raw.split_once('/') {
        Some((service, method))
            if !service.is_empty() && !method.is_empty() && !method.contains('/') =>
        {
            Ok(ServiceMethod {
                service: service.to_owned(),
                method: method.to_owned(),
            })
        }
        _ => Err(format!("expected Service/Method, got {raw:?}")),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let saved = SavedPrefs::load();
    let prefs = args.effective_prefs(saved.prefs.clone());

    if let Err(err) = init_tracing(args.log_filter.as_deref(), &prefs.log_filter) {
        eprintln!("build_api: {err:#}");
        return exit(ReturnCode::Unrecoverable);
    }
    if let Some(err) = &saved.problem {
        warn!("using default preferences: {err:#}");
    }

    match run(&args, &prefs, &saved) {
        Ok(code) => exit(code),
        Err(err) => {
            error!("call failed: {err:#}");
            eprintln!("build_api: {err:#}");
            exit(ReturnCode::Unrecoverable)
        }
    }
}

/// Process status for an outcome. Every successful outcome exits 0.
fn exit_status(code: ReturnCode) -> u8 {
    if code.is_success() {
        0
    } else {
        code.value()
    }
}

fn exit(code: ReturnCode) -> ExitCode {
    ExitCode::from(exit_status(code))
}

/// Preferences as found on disk. Failures fall back to the defaults and are
/// reported once logging is up. Nothing is written here.
struct SavedPrefs {
    service: Option<PrefsService<FsConfigStore>>,
    prefs: CliPrefs,
    problem: Option<anyhow::Error>,
}

impl SavedPrefs {
    fn load() -> Self {
        let service = match FsConfigStore::new() {
            Ok(store) => PrefsService::new(store),
            Err(err) => {
                return Self {
                    service: None,
                    prefs: CliPrefs::default(),
                    problem: Some(err.into()),
                }
            }
        };
        let (prefs, problem) = match service.load() {
            Ok(prefs) => (prefs.unwrap_or_default(), None),
            Err(err) => (
                CliPrefs::default(),
                Some(anyhow::Error::new(err).context("load preferences")),
            ),
        };
        Self {
            service: Some(service),
            prefs,
            problem,
        }
    }

    fn save(&self, prefs: &CliPrefs) -> Result<()> {
        let Some(service) = &self.service else {
            bail!("cannot save preferences: no config directory");
        };
        service.save(prefs).context("save preferences")?;
        info!("saved preferences to {}", service.location());
        Ok(())
    }
}

fn init_tracing(flag: Option<&str>, saved: &str) -> Result<()> {
    let filter = match flag {
        Some(directive) => EnvFilter::try_new(directive).context("parse --log-filter")?,
        None => match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(saved).context("parse saved log filter")?,
        },
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn run(args: &Args, prefs: &CliPrefs, saved: &SavedPrefs) -> Result<ReturnCode> {
    if args.save_prefs {
        saved.save(prefs)?;
    }

    let mut builder = Router::builder();
    buildapi_services::register_all(&mut builder).context("register built-in services")?;
    builder.pretty_output(prefs.pretty_output);
    let router = builder.build();

    if args.list_services {
        let mut out = io::stdout().lock();
        for method in router.list_methods() {
            writeln!(out, "{method}")?;
        }
        return Ok(ReturnCode::Success);
    }

    match (&args.service_method, &args.input_json, &args.output_json) {
        (Some(target), Some(input_path), Some(output_path)) => {
            let call_type = args.call_type.call_type();
            call(&router, target, input_path, output_path, call_type)
        }
        (None, None, None) if args.save_prefs => Ok(ReturnCode::Success),
        _ => bail!("a Service/Method, --input-json and --output-json are required"),
    }
}

fn call(
    router: &Router,
    target: &ServiceMethod,
    input_path: &Path,
    output_path: &Path,
    call_type: CallType,
) -> Result<ReturnCode> {
    if !input_path.is_file() {
        bail!("input file {} does not exist", input_path.display());
    }
    let payload = fs::read_to_string(input_path)
        .with_context(|| format!("read {}", input_path.display()))?;
    debug!(input = %input_path.display(), bytes = payload.len(), "read input");

    let request = DispatchRequest::new(&target.service, &target.method, payload);
    let result = router
        .route_request(&request, &ApiConfig::new(call_type))
        .with_context(|| format!("{}/{}", target.service, target.method))?;

    if let Some(output) = &result.output {
        fs::write(output_path, output)
            .with_context(|| format!("write {}", output_path.display()))?;
        debug!(output = %output_path.display(), "wrote output");
    }
    if let Some(message) = &result.message {
        eprintln!("{message}");
    }
    if result.is_success() {
        info!(code = %result.code, "{}/{} finished", target.service, target.method);
    } else {
        warn!(code = %result.code, "{}/{} failed", target.service, target.method);
    }
    Ok(result.code)
}
