use crate::exceptions::ReportError;
use crate::models::ServiceState;
use std::process::{Command, Stdio};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Answers whether the pipeline daemon is running and since when.
pub trait ServiceProbe {
    fn query(&self, service: &str) -> Result<ServiceState, ReportError>;

    /// A probe that cannot answer is treated as a stopped service.
    fn state(&self, service: &str) -> ServiceState {
        match self.query(service) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(service, error = %e, "service state unavailable");
                ServiceState::Inactive
            }
        }
    }
}

/// Queries systemd through `systemctl show`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemctlProbe;

impl ServiceProbe for SystemctlProbe {
    fn query(&self, service: &str) -> Result<ServiceState, ReportError> {
        query_with(service, |properties| systemctl_show(service, properties))
    }
}

fn systemctl_show(service: &str, properties: &[&str]) -> Result<String, ReportError> {
    let output = Command::new("systemctl")
        .arg("show")
        .arg(service)
        .args(properties)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| ReportError::Service(format!("failed to run systemctl: {}", e)))?;

    if !output.status.success() {
        return Err(ReportError::Service(format!(
            "systemctl show {} exited with {}",
            service, output.status
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Resolves the state with plain `show` arguments every systemd accepts.
/// When the default timestamp form cannot be read, the activation time is
/// asked for again with `--timestamp=unix` (systemd 248+); failing that only
/// the uptime is lost.
pub fn query_with<F>(service: &str, show: F) -> Result<ServiceState, ReportError>
where
    F: Fn(&[&str]) -> Result<String, ReportError>,
{
    let state = parse_show_output(&show(&[
        "--property=ActiveState",
        "--property=ActiveEnterTimestamp",
    ])?)?;

    if state != (ServiceState::Active { since: None }) {
        return Ok(state);
    }

    match show(&["--property=ActiveEnterTimestamp", "--timestamp=unix"]) {
        Ok(text) => Ok(ServiceState::Active {
            since: activation_time(&text),
        }),
        Err(e) => {
            tracing::debug!(service, error = %e, "activation time unavailable");
            Ok(state)
        }
    }
}

fn show_values(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
}

fn activation_time(text: &str) -> Option<OffsetDateTime> {
    show_values(text)
        .find(|(key, _)| *key == "ActiveEnterTimestamp")
        .and_then(|(_, value)| parse_timestamp(value))
}

/// Parses `KEY=value` lines from `systemctl show`.
pub fn parse_show_output(text: &str) -> Result<ServiceState, ReportError> {
    let active_state = show_values(text)
        .find(|(key, _)| *key == "ActiveState")
        .map(|(_, value)| value);

    match active_state {
        Some("active") => Ok(ServiceState::Active {
            since: activation_time(text),
        }),
        Some(_) => Ok(ServiceState::Inactive),
        None => Err(ReportError::Service(
            "ActiveState missing from systemctl output".into(),
        )),
    }
}

/// Accepts `@<secs>` and the default `Mon 2026-10-19 01:00:00 -03` form.
/// Named zones other than UTC/GMT are ambiguous and yield `None`.
fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    if let Some(secs) = value.strip_prefix('@') {
        let secs: i64 = secs.parse().ok()?;
        if secs <= 0 {
            return None;
        }
        return OffsetDateTime::from_unix_timestamp(secs).ok();
    }

    let parts: Vec<&str> = value.split_whitespace().collect();
    let [_weekday, date, clock, zone] = parts[..] else {
        return None;
    };
    let local = PrimitiveDateTime::parse(
        &format!("{} {}", date, clock),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .ok()?;
    Some(local.assume_offset(parse_zone(zone)?))
}

fn parse_zone(zone: &str) -> Option<UtcOffset> {
    if matches!(zone, "UTC" | "GMT") {
        return Some(UtcOffset::UTC);
    }
    let (sign, digits) = match zone.split_at_checked(1)? {
        ("+", digits) => (1, digits),
        ("-", digits) => (-1, digits),
        _ => return None,
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes): (i8, i8) = match digits.len() {
        2 => (digits.parse().ok()?, 0),
        4 => (digits[..2].parse().ok()?, digits[2..].parse().ok()?),
        _ => return None,
    };
    UtcOffset::from_hms(sign * hours, sign * minutes, 0).ok()
}

/// Whole hours between `since` and `now`, never negative.
pub fn uptime_hours(since: OffsetDateTime, now: OffsetDateTime) -> i64 {
    (now - since).whole_hours().max(0)
}
