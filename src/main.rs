use anyhow::Context;
use clap::{Parser, Subcommand};
use motionkit::{
    build_device, default_config_path, find_sutter_ports, init_logging, notification_center,
    Axes, Config, DeviceKind, DeviceNotification, LinearMotionDevice, LogFormat, ObjectId,
    BUILD_DATE, VERSION,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "motionkit")]
#[command(version, about = "Drive a laboratory motion stage", long_about = None)]
struct Args {
    /// Configuration file (.toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the in-memory debug device regardless of configuration
    #[arg(long)]
    debug: bool,

    /// Serial port of the Sutter controller ("auto" to discover, "debug" to simulate)
    #[arg(short, long)]
    port: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the position in steps
    Position,
    /// Print the position in microns
    PositionMicrons,
    /// Move to an absolute position in steps
    MoveTo {
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        y: i32,
        #[arg(allow_negative_numbers = true)]
        z: i32,
    },
    /// Move by a displacement in steps
    MoveBy {
        #[arg(allow_negative_numbers = true)]
        dx: i32,
        #[arg(allow_negative_numbers = true)]
        dy: i32,
        #[arg(allow_negative_numbers = true)]
        dz: i32,
    },
    /// Move to an absolute position in microns
    MoveMicronsTo {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        #[arg(allow_negative_numbers = true)]
        z: f64,
    },
    /// Move by a displacement in microns
    MoveMicronsBy {
        #[arg(allow_negative_numbers = true)]
        dx: f64,
        #[arg(allow_negative_numbers = true)]
        dy: f64,
        #[arg(allow_negative_numbers = true)]
        dz: f64,
    },
    /// Return to the origin
    Home,
    /// List serial ports that belong to Sutter controllers
    Ports,
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::load_or_default(&default_config_path())?,
    };

    if let Some(port) = &args.port {
        config.connection.port = port.clone();
        config.device.kind = DeviceKind::Sutter;
    }
    if args.debug {
        config.device.kind = DeviceKind::Debug;
    }
    Ok(config)
}

/// Log every device notification at debug level
fn trace_notifications(observer: ObjectId) {
    let center = notification_center();
    for event in DeviceNotification::ALL {
        center.add_observer(
            observer,
            |notification| {
                tracing::debug!(
                    "{} from {:?}: {:?}",
                    notification.name(),
                    notification.object(),
                    notification.user_info()
                );
                Ok(())
            },
            event,
            None,
        );
    }
}

fn run(device: &LinearMotionDevice, command: &Command) -> anyhow::Result<()> {
    match *command {
        Command::Position | Command::Ports => {}
        Command::PositionMicrons => {
            println!("{}", device.position_in_microns()?);
            return Ok(());
        }
        Command::MoveTo { x, y, z } => device.move_to(Axes::new(x, y, z))?,
        Command::MoveBy { dx, dy, dz } => device.move_by(Axes::new(dx, dy, dz))?,
        Command::MoveMicronsTo { x, y, z } => device.move_in_microns_to(Axes::new(x, y, z))?,
        Command::MoveMicronsBy { dx, dy, dz } => {
            device.move_in_microns_by(Axes::new(dx, dy, dz))?
        }
        Command::Home => device.home()?,
    }
    println!("{}", device.position()?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(if args.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    })?;
    tracing::debug!("motionkit {} (built {})", VERSION, BUILD_DATE);

    if let Command::Ports = args.command {
        for port in find_sutter_ports()? {
            println!("{}\t{}", port.port_name, port.description);
        }
        return Ok(());
    }

    let config = load_config(&args)?;
    let observer = ObjectId::new();
    trace_notifications(observer);

    let device = build_device(&config, notification_center().clone())?;
    device
        .initialize_device()
        .with_context(|| format!("initializing {} device", config.device.kind))?;

    let result = run(&device, &args.command);
    let shutdown = device.shutdown_device();
    notification_center().remove_observer(observer, None, None);
    finish(result, shutdown)
}

/// Combine the command outcome with the shutdown outcome, command error first
fn finish(
    result: anyhow::Result<()>,
    shutdown: motionkit::Result<()>,
) -> anyhow::Result<()> {
    match (result, shutdown) {
        (Err(e), Err(shutdown_error)) => {
            tracing::warn!("Shutdown also failed: {}", shutdown_error);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), shutdown) => shutdown.context("shutting down device"),
    }
}
