//! Control protocol definitions matching the firmware.

use anyhow::{bail, Result};

/// Commands understood by the control file.
pub const COMMANDS: [&str; 5] = ["start", "stop", "on", "off", "blink"];

/// Parsed status line: `SWITCH SCAN: {OFF|ON} | LED: {OFF|ON|BLINK}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub scan: String,
    pub led: String,
}

impl Status {
    pub fn new(scan: &str, led: &str) -> Self {
        Self {
            scan: scan.to_string(),
            led: led.to_string(),
        }
    }
}

/// Build a command line as sent over serial.
pub fn build_line(command: &str) -> Vec<u8> {
    let mut line = command.as_bytes().to_vec();
    line.push(b'\n');
    line
}

/// Parse a status line (with or without trailing newline).
pub fn parse_status(line: &str) -> Result<Status> {
    let line = line.trim_end_matches(['\r', '\n']);

    let Some((scan_part, led_part)) = line.split_once(" | ") else {
        bail!("Malformed status line: {:?}", line);
    };
    let Some(scan) = scan_part.strip_prefix("SWITCH SCAN: ") else {
        bail!("Missing scan field: {:?}", line);
    };
    let Some(led) = led_part.strip_prefix("LED: ") else {
        bail!("Missing LED field: {:?}", line);
    };

    if !matches!(scan, "OFF" | "ON") {
        bail!("Unknown scan state {:?}", scan);
    }
    if !matches!(led, "OFF" | "ON" | "BLINK") {
        bail!("Unknown LED state {:?}", led);
    }

    Ok(Status::new(scan, led))
}

/// Expected status after applying `command` to `current`.
pub fn expected_after(current: &Status, command: &str) -> Status {
    let mut next = current.clone();
    if command.starts_with("start") {
        next.scan = "ON".to_string();
    } else if command.starts_with("stop") {
        next.scan = "OFF".to_string();
    } else if command.starts_with("on") {
        next.led = "ON".to_string();
    } else if command.starts_with("off") {
        next.led = "OFF".to_string();
    } else if command.starts_with("blink") {
        next.led = "BLINK".to_string();
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        let status = parse_status("SWITCH SCAN: ON | LED: BLINK\n").unwrap();
        assert_eq!(status, Status::new("ON", "BLINK"));
    }

    #[test]
    fn test_parse_status_rejects_garbage() {
        assert!(parse_status("hello").is_err());
        assert!(parse_status("SWITCH SCAN: MAYBE | LED: ON").is_err());
    }

    #[test]
    fn test_expected_after() {
        let off = Status::new("OFF", "OFF");
        assert_eq!(expected_after(&off, "start"), Status::new("ON", "OFF"));
        assert_eq!(expected_after(&off, "blink"), Status::new("OFF", "BLINK"));
        assert_eq!(expected_after(&off, "START"), off);
    }
}
