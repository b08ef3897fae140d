use clap::{Args, Parser, Subcommand};
use rfm95_rs::constants::{DEFAULT_BEACON_INTERVAL_MS, DEFAULT_RX_POLL_INTERVAL_MS};
use rfm95_rs::radio::hal::{Hal, InboundPacket, SimulatedChip};
use rfm95_rs::radio::{Rfm95Driver, RxOutcome};
use rfm95_rs::{
    init_logger_with_default, log_error, log_info, log_warn, RadioConfig, Rfm95Error,
    TelemetryReading,
};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "rfm95-cli")]
#[command(about = "CLI tool for RFM95 LoRa telemetry radios")]
struct Cli {
    /// JSON radio configuration (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Talk to a simulated chip instead of hardware
    #[arg(long, global = true)]
    simulate: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialise the radio and show its settings
    Info,
    /// Send a single packet
    Transmit {
        message: String,
        /// Treat the message as hex-encoded bytes
        #[arg(long)]
        hex: bool,
    },
    /// Poll the receiver and print incoming packets
    Receive(ReceiveArgs),
    /// Transmit a telemetry reading periodically
    Beacon(BeaconArgs),
}

#[derive(Args)]
struct ReceiveArgs {
    /// Stop after this many packets
    #[arg(short = 'n', long)]
    count: Option<u64>,
    #[arg(long, default_value_t = DEFAULT_RX_POLL_INTERVAL_MS)]
    interval_ms: u64,
    /// Stop after this many receive probes
    #[arg(long)]
    max_polls: Option<u64>,
}

#[derive(Args)]
struct BeaconArgs {
    #[arg(long, allow_hyphen_values = true)]
    temperature: f32,
    #[arg(long, allow_hyphen_values = true)]
    pressure: i32,
    #[arg(long)]
    humidity: f32,
    #[arg(long, default_value_t = DEFAULT_BEACON_INTERVAL_MS)]
    interval_ms: u64,
    /// Stop after this many transmissions
    #[arg(short = 'n', long)]
    count: Option<u64>,
}

fn main() {
    init_logger_with_default("info");

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log_error(&format!("{e}"));
        eprintln!("rfm95-cli: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Rfm95Error> {
    let config = match &cli.config {
        Some(path) => RadioConfig::from_json_file(path)?,
        None => RadioConfig::default(),
    };

    if cli.simulate {
        let chip = SimulatedChip::new();
        if matches!(cli.command, Commands::Receive(_)) {
            let sample = TelemetryReading::new(24.5, 101, 61.0).to_payload()?;
            chip.queue_packet(InboundPacket::new(sample).with_signal(77, 0x28));
        }
        log_info("Using simulated RFM95");
        return execute(driver_for(chip, &config), &config, cli.command);
    }

    run_hardware(&config, cli.command)
}

#[cfg(feature = "raspberry-pi")]
fn run_hardware(config: &RadioConfig, command: Commands) -> Result<(), Rfm95Error> {
    use rfm95_rs::radio::hal::RaspberryPiHalBuilder;

    let hal = RaspberryPiHalBuilder::new()
        .spi_bus(config.spi_bus)
        .spi_speed(config.spi_speed_hz)
        .cs_pin(config.cs_pin)
        .reset_pin(config.reset_pin)
        .build()?;
    execute(driver_for(hal, config), config, command)
}

#[cfg(not(feature = "raspberry-pi"))]
fn run_hardware(_config: &RadioConfig, _command: Commands) -> Result<(), Rfm95Error> {
    Err(Rfm95Error::FeatureDisabled("raspberry-pi"))
}

fn driver_for<H: Hal>(hal: H, config: &RadioConfig) -> Rfm95Driver<H> {
    Rfm95Driver::new(hal)
        .with_frequency(config.frequency_hz)
        .with_tx_power(config.tx_power_dbm)
        .with_poll_policy(config.poll_policy())
}

fn execute<H: Hal>(
    mut driver: Rfm95Driver<H>,
    config: &RadioConfig,
    command: Commands,
) -> Result<(), Rfm95Error> {
    driver.initialize()?;
    log_info("RFM95 initialized successfully");

    match command {
        Commands::Info => {
            let version = driver.version()?;
            log_info(&format!("Chip version: 0x{version:02X}"));
            log_info(&format!("Frequency: {} Hz", driver.frequency_hz()));
            log_info(&format!(
                "TX power: {} dBm",
                driver.tx_power_dbm().unwrap_or(config.tx_power_dbm)
            ));
            match config.tx_timeout_polls {
                Some(max) => log_info(&format!(
                    "TX wait: {max} polls every {} ms",
                    config.poll_interval_ms
                )),
                None => log_info(&format!(
                    "TX wait: unbounded, polling every {} ms",
                    config.poll_interval_ms
                )),
            }
        }
        Commands::Transmit { message, hex } => {
            let payload = if hex {
                hex::decode(message.trim())?
            } else {
                message.into_bytes()
            };
            driver.transmit(&payload)?;
            log_info(&format!("Sent {} bytes: {}", payload.len(), hex::encode(&payload)));
        }
        Commands::Receive(args) => receive_loop(&mut driver, &args)?,
        Commands::Beacon(args) => beacon_loop(&mut driver, &args)?,
    }

    Ok(())
}

fn receive_loop<H: Hal>(driver: &mut Rfm95Driver<H>, args: &ReceiveArgs) -> Result<(), Rfm95Error> {
    let mut buf = [0u8; 255];
    let mut received = 0u64;
    let mut polls = 0u64;

    while args.count.map_or(true, |n| received < n) && args.max_polls.map_or(true, |p| polls < p) {
        polls += 1;
        match driver.receive_packet(&mut buf)? {
            RxOutcome::Received(len) => {
                received += 1;
                let quality = driver.signal_quality()?;
                let packet = &buf[..len];
                log_info(&format!(
                    "Packet {received}: {} bytes, RSSI {} dBm, SNR {:.2} dB: {}",
                    len,
                    quality.rssi_dbm,
                    quality.snr_db,
                    hex::encode(packet)
                ));
                if let Ok(reading) = TelemetryReading::from_payload(packet) {
                    log_info(&format!(
                        "  temperature {:.2} C, pressure {} kPa, humidity {:.2} %",
                        reading.temperature_c, reading.pressure_kpa, reading.humidity_pct
                    ));
                }
            }
            RxOutcome::CrcError => log_warn("Packet dropped: CRC error"),
            RxOutcome::NoPacket => thread::sleep(Duration::from_millis(args.interval_ms)),
        }
    }

    log_info(&format!("Received {received} packets in {polls} polls"));
    Ok(())
}

fn beacon_loop<H: Hal>(driver: &mut Rfm95Driver<H>, args: &BeaconArgs) -> Result<(), Rfm95Error> {
    let reading = TelemetryReading::new(args.temperature, args.pressure, args.humidity);
    let payload = reading.to_payload()?;
    let mut sent = 0u64;

    while args.count.map_or(true, |n| sent < n) {
        driver.transmit(&payload)?;
        sent += 1;
        log_info(&format!(
            "Beacon {sent}: {}",
            String::from_utf8_lossy(&payload).trim_end()
        ));
        if args.count.map_or(true, |n| sent < n) {
            thread::sleep(Duration::from_millis(args.interval_ms));
        }
    }

    Ok(())
}
