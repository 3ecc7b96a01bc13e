//! Integration tests for the GPIO control firmware.
//!
//! Run after flashing the firmware to exercise the control file over serial.

mod device;
mod protocol;

use std::time::Duration;

use clap::Parser;
use colored::Colorize;

use device::{resolve_port, DeviceClient};
use tests::{print_results, run_all_tests, TestOptions};

#[derive(Parser)]
#[command(name = "integration-tests")]
#[command(about = "Integration tests for GPIO control firmware")]
struct Args {
    /// Serial port for the device (use "auto" to auto-detect)
    #[arg(short, long, default_value = "auto")]
    port: String,

    /// Baud rate
    #[arg(short, long, default_value = "115200")]
    baud: u32,

    /// How long to wait for each status reply, in milliseconds
    #[arg(short, long, default_value = "2000")]
    timeout_ms: u64,

    /// Pause after each scenario step so the background tasks wake up
    /// (blink interval is 200 ms, scan interval 100 ms)
    #[arg(short, long, default_value = "300")]
    settle_ms: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Resolve port (auto-detect if "auto")
    let port = resolve_port(&args.port)?;

    println!("{}", "GPIO Control Integration Tests".bold());
    println!("Port: {}", port);
    println!("Baud: {}", args.baud);
    println!("Reply timeout: {} ms, settle: {} ms", args.timeout_ms, args.settle_ms);
    println!();

    println!("Connecting to device...");
    let mut device = DeviceClient::new(&port, args.baud)?;
    device.set_timeout(Duration::from_millis(args.timeout_ms));

    // Wait for bootloader output to finish, then clear buffer
    std::thread::sleep(Duration::from_secs(1));
    device.clear_buffer()?;
    println!("{}", "Connected!".green());

    println!("\nRunning tests...\n");

    let options = TestOptions {
        settle: Duration::from_millis(args.settle_ms),
    };
    let results = run_all_tests(&mut device, &options);
    print_results(&results);

    // Exit with error code if any tests failed
    let failed = results.iter().filter(|r| !r.passed).count();
    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_timing_defaults() {
        let args = Args::try_parse_from(["integration-tests"]).unwrap();
        assert_eq!(args.port, "auto");
        assert_eq!(args.timeout_ms, 2000);
        assert_eq!(args.settle_ms, 300);
    }

    #[test]
    fn test_timing_overrides() {
        let args =
            Args::try_parse_from(["integration-tests", "-t", "500", "--settle-ms", "450"]).unwrap();
        assert_eq!(args.timeout_ms, 500);
        assert_eq!(args.settle_ms, 450);
    }
}
