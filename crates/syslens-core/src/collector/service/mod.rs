//! systemd services via `systemctl`.
//!
//! The unit list comes from one bulk `list-units` query per refresh and is the
//! only source for [`ServiceCollector::get_all_services`]. Detail lookups run a
//! separate `show` query and never modify the list, so the two views may
//! disagree when a unit changes state in between.

mod parser;

pub use parser::{parse_show_properties, parse_unit_line, parse_unit_listing};

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::collector::command::CommandRunner;
use crate::collector::error::CommandError;
use crate::collector::traits::Refresh;
use crate::config::CollectorConfig;
use crate::model::ServiceSnapshot;
use crate::util::is_privileged;

/// Properties requested by the detail query.
const SHOW_PROPERTIES: &str = "--property=Description,LoadState,ActiveState,SubState,UnitFileState";

/// State-changing `systemctl` verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Reload,
    Enable,
    Disable,
}

impl ServiceAction {
    pub const ALL: [ServiceAction; 6] = [
        ServiceAction::Start,
        ServiceAction::Stop,
        ServiceAction::Restart,
        ServiceAction::Reload,
        ServiceAction::Enable,
        ServiceAction::Disable,
    ];

    /// The `systemctl` verb.
    pub fn verb(&self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
            ServiceAction::Reload => "reload",
            ServiceAction::Enable => "enable",
            ServiceAction::Disable => "disable",
        }
    }
}

impl std::str::FromStr for ServiceAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceAction::ALL
            .into_iter()
            .find(|action| action.verb() == s)
            .ok_or_else(|| format!("unknown service action: {}", s))
    }
}

impl std::fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.verb())
    }
}

/// Error type for service queries and control operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Unit name is empty or would be read as an option.
    InvalidName(String),
    /// The external command failed.
    Command(CommandError),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::InvalidName(name) => write!(f, "invalid unit name: {:?}", name),
            ServiceError::Command(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Command(e) => Some(e),
            ServiceError::InvalidName(_) => None,
        }
    }
}

impl From<CommandError> for ServiceError {
    fn from(e: CommandError) -> Self {
        ServiceError::Command(e)
    }
}

fn validate_name(name: &str) -> Result<(), ServiceError> {
    if name.is_empty() || name.starts_with('-') {
        return Err(ServiceError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Case-insensitive substring match on unit name or description.
pub fn filter_services(services: &[ServiceSnapshot], query: &str) -> Vec<ServiceSnapshot> {
    let query = query.to_lowercase();
    services
        .iter()
        .filter(|s| {
            query.is_empty()
                || s.name.to_lowercase().contains(&query)
                || s.description.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

/// Collects and controls systemd services.
pub struct ServiceCollector<R: CommandRunner> {
    runner: R,
    systemctl: String,
    elevate: String,
    query_timeout: Option<Duration>,
    control_timeout: Option<Duration>,
    privileged: bool,
    services: Vec<ServiceSnapshot>,
}

impl<R: CommandRunner> ServiceCollector<R> {
    /// Creates the collector and performs the initial collection.
    pub fn new(runner: R, config: &CollectorConfig) -> Self {
        let mut collector = Self::without_listing(runner, config);
        collector.refresh();
        collector
    }

    /// Creates the collector with an empty service list, for one-shot detail
    /// queries and control verbs.
    pub fn without_listing(runner: R, config: &CollectorConfig) -> Self {
        Self {
            runner,
            systemctl: config.systemctl.clone(),
            elevate: config.elevate.clone(),
            query_timeout: config.query_timeout(),
            control_timeout: config.control_timeout(),
            privileged: is_privileged(),
            services: Vec::new(),
        }
    }

    /// Overrides the detected privilege level.
    pub fn with_privileged(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    /// Runs the bulk unit listing.
    ///
    /// Stdout is parsed even when systemctl exits non-zero.
    pub fn collect(&self) -> Result<Vec<ServiceSnapshot>, CommandError> {
        let output = self.runner.run(
            &self.systemctl,
            &[
                "list-units",
                "--type=service",
                "--all",
                "--no-legend",
                "--plain",
            ],
            self.query_timeout,
        )?;
        if !output.success() {
            debug!(code = ?output.code, "systemctl list-units exited non-zero");
        }

        let (units, skipped) = parse_unit_listing(&output.stdout);
        debug!(units = units.len(), skipped, "parsed unit listing");
        Ok(units)
    }

    /// Services from the last refresh.
    pub fn get_all_services(&self) -> &[ServiceSnapshot] {
        &self.services
    }

    /// Services whose name or description contains `query`, ignoring case.
    /// An empty query matches everything.
    pub fn filter_services(&self, query: &str) -> Vec<ServiceSnapshot> {
        filter_services(&self.services, query)
    }

    /// Queries one service's properties.
    pub fn service_details(&self, name: &str) -> Result<ServiceSnapshot, ServiceError> {
        validate_name(name)?;
        let output = self
            .runner
            .run(&self.systemctl, &["show", name, SHOW_PROPERTIES], self.query_timeout)?
            .check(&self.systemctl)?;
        Ok(parse_show_properties(name, &output.stdout))
    }

    /// Fresh detail query for one service. On failure only `name` is filled.
    pub fn get_service_details(&self, name: &str) -> ServiceSnapshot {
        self.service_details(name).unwrap_or_else(|e| {
            warn!(service = name, error = %e, "cannot query service details");
            ServiceSnapshot {
                name: name.to_string(),
                ..ServiceSnapshot::default()
            }
        })
    }

    /// Runs `systemctl VERB NAME`, through the elevation program when not root.
    pub fn control(&self, name: &str, action: ServiceAction) -> Result<(), ServiceError> {
        validate_name(name)?;

        let verb = action.verb();
        let (program, args) = if self.privileged {
            (self.systemctl.as_str(), vec![verb, name])
        } else {
            (self.elevate.as_str(), vec![self.systemctl.as_str(), verb, name])
        };
        self.runner
            .run(program, &args, self.control_timeout)?
            .check(program)?;

        info!(service = name, action = verb, "service action completed");
        Ok(())
    }

    fn control_ok(&self, name: &str, action: ServiceAction) -> bool {
        match self.control(name, action) {
            Ok(()) => true,
            Err(e) => {
                warn!(service = name, action = action.verb(), error = %e, "service action failed");
                false
            }
        }
    }

    pub fn start_service(&self, name: &str) -> bool {
        self.control_ok(name, ServiceAction::Start)
    }

    pub fn stop_service(&self, name: &str) -> bool {
        self.control_ok(name, ServiceAction::Stop)
    }

    pub fn restart_service(&self, name: &str) -> bool {
        self.control_ok(name, ServiceAction::Restart)
    }

    pub fn reload_service(&self, name: &str) -> bool {
        self.control_ok(name, ServiceAction::Reload)
    }

    pub fn enable_service(&self, name: &str) -> bool {
        self.control_ok(name, ServiceAction::Enable)
    }

    pub fn disable_service(&self, name: &str) -> bool {
        self.control_ok(name, ServiceAction::Disable)
    }
}

impl<R: CommandRunner> Refresh for ServiceCollector<R> {
    fn refresh(&mut self) {
        self.services = match self.collect() {
            Ok(services) => services,
            Err(e) => {
                warn!(error = %e, "cannot list services");
                Vec::new()
            }
        };
    }
}
