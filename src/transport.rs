// src/transport.rs
//! Serial transport used by the gather cycle

use crate::error::{GpsError, Result};
use log::debug;
use std::{
    io::{BufRead, BufReader, ErrorKind},
    time::Duration,
};

/// Opens a port for one gather cycle.
pub trait Transport: Send + Sync {
    fn open(&self, name: &str, baud_rate: u32) -> Result<Box<dyn LineReader>>;
}

/// An open port. Dropping it closes the port.
pub trait LineReader: Send {
    /// Accumulate bytes until `delimiter`, returning them without the delimiter.
    fn read_line(&mut self, delimiter: u8) -> Result<String>;
}

/// Real serial port, opened synchronously with a read timeout so a silent
/// receiver eventually errors out of the cycle.
#[derive(Debug, Clone)]
pub struct SerialTransport {
    timeout: Duration,
}

impl SerialTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SerialTransport {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000))
    }
}

impl Transport for SerialTransport {
    fn open(&self, name: &str, baud_rate: u32) -> Result<Box<dyn LineReader>> {
        debug!("Opening {} at {} baud", name, baud_rate);

        let port = tokio_serial::new(name, baud_rate)
            .timeout(self.timeout)
            .open()
            .map_err(|e| GpsError::Transport(format!("Failed to open serial port {}: {}", name, e)))?;

        Ok(Box::new(DelimitedReader::new(port)))
    }
}

/// Splits any byte stream on a delimiter byte.
pub struct DelimitedReader<R> {
    inner: BufReader<R>,
}

impl<R: std::io::Read> DelimitedReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
        }
    }
}

impl<R: std::io::Read + Send> LineReader for DelimitedReader<R> {
    fn read_line(&mut self, delimiter: u8) -> Result<String> {
        let mut buf = Vec::new();
        loop {
            match self.inner.read_until(delimiter, &mut buf) {
                Ok(0) if buf.is_empty() => {
                    return Err(GpsError::Transport("port closed".to_string()))
                }
                Ok(_) => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::TimedOut => {
                    return Err(GpsError::Transport("read timed out".to_string()))
                }
                Err(e) => return Err(GpsError::Transport(e.to_string())),
            }
        }

        if buf.last() == Some(&delimiter) {
            buf.pop();
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// List available serial ports
pub fn list_serial_ports() -> Result<()> {
    let ports = tokio_serial::available_ports()
        .map_err(|e| GpsError::Transport(format!("Failed to list serial ports: {}", e)))?;

    if ports.is_empty() {
        println!("No serial ports found.");
    } else {
        println!("Available serial ports:");
        for port in ports {
            println!("  {} - {:?}", port.port_name, port.port_type);
        }
    }

    Ok(())
}
