// src/display/terminal.rs
//! Terminal-based status display

use crate::{
    error::{GpsError, Result},
    gps::FixStore,
};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType, DisableLineWrap, EnableLineWrap},
};
use std::{
    io::{self, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::sleep;

pub struct TerminalDisplay {
    refresh: Duration,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self {
            refresh: Duration::from_secs(1),
        }
    }

    /// Redraw the store once per refresh period until `running` clears.
    pub async fn run(&self, store: Arc<FixStore>, running: Arc<AtomicBool>) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Hide, DisableLineWrap)?;

        while running.load(Ordering::Relaxed) {
            execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
            render(&mut stdout, &store)?;
            stdout.flush().map_err(GpsError::Io)?;
            sleep(self.refresh).await;
        }

        execute!(stdout, Show, EnableLineWrap)?;
        println!("\nShutting down...");
        Ok(())
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

/// Write one frame of the status view.
pub fn render(out: &mut impl Write, store: &FixStore) -> Result<()> {
    let status_color = if store.status().is_empty() {
        Color::Green
    } else {
        Color::Red
    };

    queue!(
        out,
        SetForegroundColor(Color::Green),
        Print("=".repeat(48)),
        Print("\n"),
        Print("gps-timesync\n"),
        Print("=".repeat(48)),
        Print("\n"),
        ResetColor,
        Print("  Status:      "),
        SetForegroundColor(status_color),
        Print(store.format_status()),
        ResetColor,
        Print("\n\n"),
    )?;

    let rows = [
        ("Time", store.format_time()),
        ("Grid square", store.format_grid_square()),
        ("Latitude", store.format_latitude()),
        ("Longitude", store.format_longitude()),
        ("Fix quality", store.format_fix_quality()),
        ("Satellites", store.format_satellites()),
        ("HDOP", store.format_hdop()),
    ];
    for (label, value) in rows {
        queue!(out, Print(format!("  {:<12} {}\n", format!("{}:", label), value)))?;
    }

    queue!(
        out,
        Print("\n"),
        SetForegroundColor(Color::Green),
        Print("Press Ctrl+C to exit\n"),
        ResetColor
    )?;
    Ok(())
}
