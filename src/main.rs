// MIT License - Copyright (c) 2026 Peter Wright
// Command-line client

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use nx_web_bridge::{NxAlarm, PanelSettings, SystemStatus, SystemTrigger, ZoneFetchMode, Zones};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "nxctl")]
#[command(about = "Query and control an NX-595E alarm panel through its web server")]
#[command(
    after_help = "Panel settings are read from NX_PROTOCOL, NX_HOST, NX_NAME, NX_USER and NX_PIN. \
                  A .env file in the working directory is loaded first; variables already set \
                  in the environment take precedence."
)]
struct Cli {
    /// Print JSON documents instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Fail the zone fetch when any zone-state row cannot be read
    #[arg(long, global = true)]
    strict_zones: bool,

    /// Where the session token is persisted (overrides NX_SESSION_FILE)
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Show the area status
    Status,
    /// Show every zone with its decoded status
    Zones,
    /// Arm away
    Arm,
    /// Arm stay
    Stay,
    /// Disarm
    Disarm,
    /// Toggle chime
    Chime,
    /// Toggle bypass on a zone (0-indexed)
    Bypass { zone: usize },
    /// Log in and store a fresh session
    Login,
    /// Forget the stored session
    Logout,
}

impl Action {
    fn trigger(&self) -> Option<SystemTrigger> {
        match self {
            Action::Arm => Some(SystemTrigger::Arm),
            Action::Stay => Some(SystemTrigger::Stay),
            Action::Disarm => Some(SystemTrigger::Disarm),
            Action::Chime => Some(SystemTrigger::Chime),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON output
// ---------------------------------------------------------------------------

// Every document shares the {now, op, ...} layout

#[derive(Serialize)]
struct StatusOutput<'a> {
    now: i64,
    op: &'static str,
    panel: &'a str,
    armed: bool,
    alarm: bool,
    #[serde(flatten)]
    status: &'a SystemStatus,
}

#[derive(Serialize)]
struct ZoneOutput<'a> {
    id: usize,
    name: Option<&'a str>,
    flags: Vec<&'static str>,
    degraded: bool,
}

#[derive(Serialize)]
struct ZonesOutput<'a> {
    now: i64,
    op: &'static str,
    panel: &'a str,
    zones: Vec<ZoneOutput<'a>>,
}

#[derive(Serialize)]
struct AckOutput<'a> {
    now: i64,
    op: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    zone: Option<usize>,
}

fn now() -> i64 {
    Utc::now().timestamp_millis()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value).context("Failed to serialize output")?);
    Ok(())
}

fn print_status(panel: &str, status: &SystemStatus, json: bool) -> Result<()> {
    if json {
        return print_json(&StatusOutput {
            now: now(),
            op: "status",
            panel,
            armed: status.is_armed(),
            alarm: status.is_alarm(),
            status,
        });
    }

    println!("{panel}");
    println!("  ready:     {}", status.ready);
    println!("  armed:     {}", status.is_armed());
    println!("  away:      {}", status.away);
    println!("  stay:      {}", status.stay);
    println!("  alarm:     {}", status.is_alarm());
    println!("  chime:     {}", status.chime_on);
    println!("  bypass:    {}", status.bypass_on);
    if status.exit_delay {
        println!("  exit delay in progress");
    }
    if status.entry_delay {
        println!("  entry delay in progress");
    }
    if !status.message.is_empty() {
        println!("  message:   {}", status.message);
    }
    Ok(())
}

fn print_zones(panel: &str, zones: &Zones, json: bool) -> Result<()> {
    if json {
        let zones = zones
            .iter()
            .map(|z| ZoneOutput {
                id: z.index,
                name: z.name,
                flags: z.status.map(|s| s.flags.names()).unwrap_or_default(),
                degraded: z.status.is_some_and(|s| s.degraded),
            })
            .collect();
        return print_json(&ZonesOutput {
            now: now(),
            op: "zones",
            panel,
            zones,
        });
    }

    for zone in zones.iter() {
        let flags = zone
            .status
            .map(|s| s.flags.names().join(","))
            .unwrap_or_else(|| "-".to_string());
        let degraded = if zone.status.is_some_and(|s| s.degraded) {
            " (degraded)"
        } else {
            ""
        };
        println!(
            "{:>3}  {:<24} {}{}",
            zone.index,
            zone.name.unwrap_or(""),
            flags,
            degraded
        );
    }
    Ok(())
}

fn print_ack(op: &str, zone: Option<usize>, json: bool) -> Result<()> {
    if json {
        return print_json(&AckOutput {
            now: now(),
            op,
            ok: true,
            zone,
        });
    }
    match zone {
        Some(zone) => println!("{op} zone {zone}: ok"),
        None => println!("{op}: ok"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=debug or RUST_LOG=nx_web_bridge=trace).
    // Default: info. Logs go to stderr so stdout carries only command output.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings =
        PanelSettings::from_env_file(".env").context("Failed to read panel settings")?;
    if let Some(path) = cli.session_file {
        settings.session_file = path;
    }
    if cli.strict_zones {
        settings.zone_fetch_mode = ZoneFetchMode::Strict;
    }
    let panel = settings.name.clone();

    let mut alarm = NxAlarm::new(settings).context("Invalid panel settings")?;

    if let Some(trigger) = cli.command.trigger() {
        alarm
            .set_system(trigger)
            .await
            .with_context(|| format!("Failed to send {}", trigger.as_str()))?;
        return print_ack(trigger.as_str(), None, cli.json);
    }

    match cli.command {
        Action::Status => {
            let status = alarm
                .fetch_system_status()
                .await
                .context("Failed to fetch area status")?;
            print_status(&panel, status, cli.json)?;
        }
        Action::Zones => {
            let zones = alarm
                .fetch_zone_status()
                .await
                .context("Failed to fetch zone status")?;
            print_zones(&panel, zones, cli.json)?;
        }
        Action::Bypass { zone } => {
            alarm
                .set_bypass(zone)
                .await
                .with_context(|| format!("Failed to toggle bypass on zone {zone}"))?;
            print_ack("bypass", Some(zone), cli.json)?;
        }
        Action::Login => {
            alarm.login().await.context("Login failed")?;
            info!("Session stored in {}", alarm.session().path().display());
            print_ack("login", None, cli.json)?;
        }
        Action::Logout => {
            alarm
                .session()
                .remove()
                .await
                .context("Failed to remove session file")?;
            print_ack("logout", None, cli.json)?;
        }
        Action::Arm | Action::Stay | Action::Disarm | Action::Chime => {}
    }

    Ok(())
}
