//! TaiSEIA 101 serial to TCP command bridge
//!
//! NOTE: no security measures are implemented. Anyone who can reach the
//! listening port can control the appliance.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use taiseia_bridge::{Bridge, BridgeConfig, DEFAULT_LOCAL_PORT, open_serial};
use taiseia_transport::SerialSettings;
use tokio_util::sync::CancellationToken;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "TaiSEIA SA socket server",
    after_help = "NOTE: no security measures are implemented. Anyone can remotely connect \
                  to this service over the network."
)]
struct Args {
    /// Serial port name
    #[arg(value_name = "SERIALPORT")]
    serial_port: String,

    /// Baud rate
    #[arg(value_name = "BAUDRATE", default_value_t = SerialSettings::DEFAULT_BAUD_RATE)]
    baud_rate: u32,

    /// Suppress non error messages
    #[arg(short, long)]
    quiet: bool,

    /// Parity, one of N E O S M (mark and space are rejected by the serial backend)
    #[arg(
        long,
        default_value = "N",
        value_parser = ["N", "E", "O", "S", "M"],
        ignore_case = true,
        help_heading = "Serial port"
    )]
    parity: String,

    /// Enable RTS/CTS flow control
    #[arg(long, help_heading = "Serial port")]
    rtscts: bool,

    /// Enable software flow control
    #[arg(long, help_heading = "Serial port")]
    xonxoff: bool,

    /// Initial RTS line state (0 or 1)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1), help_heading = "Serial port")]
    rts: Option<u8>,

    /// Initial DTR line state (0 or 1)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1), help_heading = "Serial port")]
    dtr: Option<u8>,

    /// Local TCP port
    #[arg(
        short = 'P',
        long = "localport",
        default_value_t = DEFAULT_LOCAL_PORT,
        help_heading = "Network settings"
    )]
    local_port: u16,
}

impl Args {
    fn to_config(&self) -> anyhow::Result<BridgeConfig> {
        let parity = SerialSettings::parse_parity(&self.parity)?;
        let serial = SerialSettings::new(self.serial_port.clone(), self.baud_rate)
            .with_parity(parity)
            .with_flow_control(SerialSettings::flow_control_from_flags(
                self.rtscts,
                self.xonxoff,
            ))
            .with_rts(self.rts.map(|level| level == 1))
            .with_dtr(self.dtr.map(|level| level == 1));
        Ok(BridgeConfig::new(serial).with_local_port(self.local_port))
    }
}

fn init_logger(quiet: bool) {
    let mut builder = env_logger::Builder::from_env(Env::default().filter_or("LOG_LEVEL", "debug"));
    if quiet {
        builder.filter_level(log::LevelFilter::Error);
    }
    builder.init();
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = args.to_config()?;
    log::info!(
        "--- TCP/IP to serial redirect on {} {},8,{:?},1 ---",
        config.serial.port_name,
        config.serial.baud_rate,
        config.serial.parity
    );
    log::info!("--- type Ctrl-C to quit");

    let (serial_read, serial_write) = open_serial(&config)
        .await
        .with_context(|| format!("Could not open serial port {}", config.serial.port_name))?;

    let token = CancellationToken::new();
    let bridge = Bridge::bind(config, token.clone())
        .await
        .context("Could not start command listener")?;

    let ctrl_c = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = ctrl_c.cancelled() => {}
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => log::info!("interrupted, shutting down"),
                    Err(e) => log::error!("Failed to listen for Ctrl-C: {}", e),
                }
                ctrl_c.cancel();
            }
        }
    });

    bridge.run(serial_read, serial_write).await;
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(args.quiet);

    if let Err(e) = run(args).await {
        log::error!("{:#}", e);
    }

    // exit status is 1 on every path
    log::warn!("--- exit ---");
    std::process::exit(1);
}
