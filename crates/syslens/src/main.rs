//! syslens - system telemetry reporter.
//!
//! Prints CPU, memory, disk, network, service and USB information as text or
//! JSON, and runs service control verbs through the service manager.

mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{Level, debug, error, info};
use tracing_subscriber::EnvFilter;

use syslens_core::collector::{Collector, ServiceAction, ServiceCollector, SystemRunner};
use syslens_core::config::CollectorConfig;

use render::{Section, render_report, render_service_details};

/// System telemetry reporter.
#[derive(Parser)]
#[command(name = "syslens", about = "System telemetry reporter", version)]
struct Args {
    /// Path to the proc filesystem.
    #[arg(long, env = "SYSLENS_PROC", default_value = "/proc")]
    proc_path: PathBuf,

    /// Path to the sysfs filesystem.
    #[arg(long, env = "SYSLENS_SYS", default_value = "/sys")]
    sys_path: PathBuf,

    /// Mount table to read.
    #[arg(long, env = "SYSLENS_MTAB", default_value = "/etc/mtab")]
    mtab: PathBuf,

    /// Time limit in seconds for systemctl and lsusb queries (0 = none).
    #[arg(long, default_value = "30")]
    query_timeout: u64,

    /// Time limit in seconds for service control operations (0 = none).
    #[arg(long, default_value = "120")]
    control_timeout: u64,

    /// Print reports as JSON, one object per line.
    #[arg(long)]
    json: bool,

    /// Sections to print (text output only). Default is all.
    #[arg(short, long, value_enum, value_delimiter = ',')]
    section: Vec<Section>,

    /// Only list services whose name or description contains this text (case-insensitive).
    #[arg(long, value_name = "TEXT")]
    filter: Option<String>,

    /// Number of reports to print.
    #[arg(short = 'n', long, default_value = "1")]
    count: u32,

    /// Seconds between reports when --count is above one.
    #[arg(short, long, default_value = "10")]
    interval: u64,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is warn level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the current state of one service.
    Show {
        /// Unit name, e.g. ssh.service.
        name: String,
    },
    /// Run a control verb on a service: start, stop, restart, reload, enable, disable.
    Service {
        #[arg(value_parser = parse_action)]
        action: ServiceAction,
        /// Unit name, e.g. ssh.service.
        name: String,
    },
}

fn parse_action(s: &str) -> Result<ServiceAction, String> {
    s.parse()
}

impl Args {
    fn config(&self) -> CollectorConfig {
        CollectorConfig {
            proc_root: self.proc_path.clone(),
            sys_root: self.sys_path.clone(),
            mtab_path: self.mtab.clone(),
            query_timeout_secs: self.query_timeout,
            control_timeout_secs: self.control_timeout,
            ..CollectorConfig::default()
        }
    }

    fn sections(&self) -> Vec<Section> {
        if self.section.is_empty() {
            Section::ALL.to_vec()
        } else {
            self.section.clone()
        }
    }
}

/// Initializes the tracing subscriber on stderr.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["syslens", "syslens_core"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let config = args.config();
    debug!(?config, "configuration");

    match &args.command {
        Some(Command::Show { name }) => show_service(&config, name),
        Some(Command::Service { action, name }) => control_service(&config, *action, name),
        None => report(&args, &config),
    }
}

fn report(args: &Args, config: &CollectorConfig) -> ExitCode {
    let sections = args.sections();
    let mut collector = Collector::system(config);
    debug!(timing = ?collector.last_timing(), "initial collection");

    for i in 0..args.count.max(1) {
        if i > 0 {
            std::thread::sleep(Duration::from_secs(args.interval));
            collector.refresh_all();
        }

        let mut report = collector.report();
        if let Some(query) = &args.filter {
            report.services = collector.services().filter_services(query);
        }
        if args.json {
            match serde_json::to_string(&report) {
                Ok(line) => println!("{}", line),
                Err(e) => {
                    error!(error = %e, "cannot serialize report");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            if i > 0 {
                println!();
            }
            print!("{}", render_report(&report, &sections));
        }
    }

    ExitCode::SUCCESS
}

fn show_service(config: &CollectorConfig, name: &str) -> ExitCode {
    let services = ServiceCollector::without_listing(SystemRunner::new(), config);
    match services.service_details(name) {
        Ok(service) => {
            print!("{}", render_service_details(&service));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = name, error = %e, "cannot query service");
            ExitCode::FAILURE
        }
    }
}

fn control_service(config: &CollectorConfig, action: ServiceAction, name: &str) -> ExitCode {
    let services = ServiceCollector::without_listing(SystemRunner::new(), config);
    match services.control(name, action) {
        Ok(()) => {
            info!(service = name, %action, "done");
            println!("{} {}: ok", action, name);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = name, %action, error = %e, "service control failed");
            ExitCode::FAILURE
        }
    }
}
