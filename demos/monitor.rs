use clap::Parser;
use linux_embedded_hal::sysfs_gpio::{self, Direction};
use linux_embedded_hal::{Delay, Serial, SysfsPin};
use pms_uart::{Config, Error, PinReset, PmSensor, DEFAULT_BAUD_RATE};
use serial_core::{BaudRate, SerialPort};
use std::path::PathBuf;
use std::time::Duration;

/// Prints readings of a Plantower sensor attached to a serial port
#[derive(Parser, Debug)]
struct Args {
    #[arg(short, long, default_value = "/dev/serial0")]
    device: PathBuf,

    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// sysfs GPIO number wired to the SET line
    #[arg(long, requires = "reset_pin")]
    set_pin: Option<u64>,

    /// sysfs GPIO number wired to the RESET line
    #[arg(long, requires = "set_pin")]
    reset_pin: Option<u64>,

    /// Consecutive timeouts before the sensor is power-cycled
    #[arg(long, default_value_t = 3)]
    timeouts_before_reset: u32,

    /// Seconds of silence before a read times out
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    #[arg(long)]
    checksum: bool,
}

fn output_pin(number: u64) -> Result<SysfsPin, sysfs_gpio::Error> {
    let pin = SysfsPin::new(number);
    pin.export()?;
    pin.set_direction(Direction::Out)?;
    Ok(pin)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    log::info!("Connecting to: {} at {} baud", args.device.display(), args.baud);

    let mut serial = Serial::open(&args.device)?;
    let baud = BaudRate::from_speed(args.baud as usize);
    serial.0.reconfigure(&|settings| settings.set_baud_rate(baud))?;

    let mut reset = match (args.set_pin, args.reset_pin) {
        (Some(set), Some(rst)) => Some(PinReset::new(output_pin(set)?, output_pin(rst)?, Delay)?),
        _ => None,
    };

    let config = Config::default()
        .with_read_timeout(Duration::from_secs(args.timeout))
        .with_checksum(args.checksum);
    let mut sensor = PmSensor::from_serial(serial, config);

    let mut timeouts = 0;
    loop {
        match sensor.read() {
            Ok(reading) => {
                timeouts = 0;
                println!("{}", reading);
            }
            Err(Error::ReadTimeout) => {
                timeouts += 1;
                log::warn!("no data for {}s ({} in a row)", args.timeout, timeouts);

                if timeouts >= args.timeouts_before_reset {
                    if let Some(reset) = reset.as_mut() {
                        sensor.reset_with(reset)?;
                        timeouts = 0;
                    }
                }
            }
            Err(e) if e.is_recoverable() => log::warn!("dropping frame: {}", e),
            Err(e) => return Err(e.into()),
        }
    }
}
