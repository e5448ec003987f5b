//! Bearcat Scanner Dump Tool
//!
//! Reads the model, firmware version and channel memories of a Uniden
//! scanner over its USB serial port and prints them to stdout.

mod cli;
mod settings;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use bearcat_detect::{list_ports, PortScanner};
use bearcat_session::{run_dumps, ErrorKind, LineTransport, SessionConfig, SessionError};
use bearcat_sim::{spawn_virtual_scanner, VirtualScanner};
use clap::{CommandFactory, Parser};
use tracing::info;

use cli::{Cli, Invocation, Target};
use settings::Settings;

const EXIT_USAGE: u8 = 1;
const EXIT_CONNECTION: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only dump output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "bearcat=info,bearcat_session=info,bearcat_detect=info,bearcat_sim=info".into()
            }),
        )
        .with_writer(io::stderr)
        .init();

    let settings = Settings::load();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match clap_status(&e) {
            Some(status) => {
                let mut stderr = io::stderr();
                let _ = write!(stderr, "{}", e);
                print_ports(&mut stderr);
                return ExitCode::from(status);
            }
            None => e.exit(),
        },
    };

    if cli.list_ports {
        return match list_ports() {
            Ok(ports) => {
                ports.iter().for_each(|port| println!("{}", port));
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("bearcat: {}", e);
                ExitCode::from(EXIT_CONNECTION)
            }
        };
    }

    let invocation = match cli.invocation(&settings) {
        Ok(invocation) => invocation,
        Err(e) => {
            let mut stderr = io::stderr();
            let _ = writeln!(stderr, "bearcat: {}\n\n{}", e, Cli::command().render_help());
            print_ports(&mut stderr);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    match run(invocation).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("bearcat: {:#}", e);
            ExitCode::from(exit_status(&e))
        }
    }
}

async fn run(invocation: Invocation) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match invocation.target {
        Target::Port(port) => {
            info!("Dumping {:?} from {}", invocation.dumps, port);
            let transport = SessionConfig::new(port)
                .with_baud_rate(invocation.baud_rate)
                .open()?;
            run_dumps(transport, &invocation.dumps, &mut out).await?;
        }
        Target::Simulated => {
            info!("Dumping {:?} from the virtual scanner", invocation.dumps);
            let (client, task) = spawn_virtual_scanner(VirtualScanner::with_demo_channels());
            let transport = LineTransport::new("virtual", client);
            let result = run_dumps(transport, &invocation.dumps, &mut out).await;
            task.await
                .context("virtual scanner task failed")?
                .context("virtual scanner stream error")?;
            result?;
        }
    }
    Ok(())
}

/// Process exit status for a failed run
fn exit_status(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<SessionError>().map(SessionError::kind) {
        Some(ErrorKind::Connection) => EXIT_CONNECTION,
        Some(ErrorKind::Io) | None => 3,
        Some(ErrorKind::Protocol) => 4,
        Some(ErrorKind::Mode) => 5,
        Some(ErrorKind::Sequence) => 6,
    }
}

/// Status for arguments clap rejected; `None` for `--help` and `--version`
fn clap_status(error: &clap::Error) -> Option<u8> {
    error.use_stderr().then_some(EXIT_USAGE)
}

fn print_ports(out: &mut impl Write) {
    let scanner = PortScanner::new();
    let _ = match scanner.enumerate_ports() {
        Ok(ports) if ports.is_empty() => writeln!(out, "No serial ports found"),
        Ok(ports) => {
            let _ = writeln!(out, "Available ports:");
            ports
                .iter()
                .try_for_each(|port| writeln!(out, "  {}", port.describe()))
        }
        Err(e) => writeln!(out, "Cannot list serial ports: {}", e),
    };
}
