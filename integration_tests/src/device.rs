//! Device communication client.

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use serialport::SerialPort;

use crate::protocol::{build_line, parse_status, Status};

/// Find available control ports by scanning ttyACM devices and probing with an
/// empty line (which only reads the status).
pub fn find_control_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports()?;
    let mut control_ports = Vec::new();

    for port_info in ports {
        // USB Serial JTAG enumerates as CDC-ACM
        if !port_info.port_name.contains("ttyACM") {
            continue;
        }

        if let Ok(mut client) = DeviceClient::new(&port_info.port_name, 115200) {
            client.set_timeout(Duration::from_millis(500));
            if client.status().is_ok() {
                control_ports.push(port_info.port_name.clone());
            }
        }
    }

    Ok(control_ports)
}

/// Resolve a port argument - returns the port path if not "auto", otherwise auto-detects.
pub fn resolve_port(port_arg: &str) -> Result<String> {
    if port_arg != "auto" {
        return Ok(port_arg.to_string());
    }
    match find_control_ports()?.into_iter().next() {
        Some(port) => Ok(port),
        None => anyhow::bail!("No control port found - ensure device is connected"),
    }
}

/// Client for the device's control file over serial.
pub struct DeviceClient {
    port: Box<dyn SerialPort>,
    timeout: Duration,
}

impl DeviceClient {
    /// Create a new device client.
    pub fn new(port_name: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_secs(2))
            .open()?;

        Ok(Self {
            port,
            timeout: Duration::from_secs(2),
        })
    }

    /// Set the response timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Clear any pending data in the serial buffer.
    pub fn clear_buffer(&mut self) -> Result<()> {
        self.port.clear(serialport::ClearBuffer::All)?;
        Ok(())
    }

    /// Write a command to the control file and return the status that follows.
    pub fn send_command(&mut self, command: &str) -> Result<Status> {
        self.port.write_all(&build_line(command))?;
        self.port.flush()?;

        let line = self.read_line()?;
        parse_status(&line)
    }

    /// Read the status without changing anything.
    pub fn status(&mut self) -> Result<Status> {
        self.send_command("")
    }

    /// Read bytes until newline.
    fn read_line(&mut self) -> Result<String> {
        let mut data = Vec::new();
        let mut buf = [0u8; 1];
        let start = Instant::now();

        while start.elapsed() < self.timeout {
            match self.port.read(&mut buf) {
                Ok(1) => {
                    if buf[0] == b'\n' {
                        return Ok(String::from_utf8_lossy(&data).into_owned());
                    }
                    data.push(buf[0]);
                }
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        anyhow::bail!(
            "Timeout waiting for status, got {} bytes: {:?}",
            data.len(),
            String::from_utf8_lossy(&data)
        );
    }
}
