// src/gather.rs
//! The gather cycle: read sentences until a full fix is captured, commit it
//! and discipline the clock

use crate::{
    clock::Clock,
    config::{GpsConfig, PartialFailurePolicy},
    error::{GpsError, Result},
    gate::ExclusiveGate,
    gps::{
        data::Fix,
        nmea::{
            gga::{parse_gga, GgaData},
            rmc::{parse_rmc, RmcData},
            Sentence, SentenceKind,
        },
        store::FixStore,
    },
    transport::Transport,
};
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Byte that starts every NMEA frame
pub const FRAME_DELIMITER: u8 = b'$';

/// Frames this short cannot hold an address plus data
const MIN_FRAME_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct GatherSettings {
    pub port: String,
    pub baud_rate: u32,
    pub max_hdop: f64,
    pub on_partial_failure: PartialFailurePolicy,
}

impl From<&GpsConfig> for GatherSettings {
    fn from(config: &GpsConfig) -> Self {
        Self {
            port: config.serial_port.clone(),
            baud_rate: config.serial_baudrate,
            max_hdop: config.max_hdop,
            on_partial_failure: config.on_partial_failure,
        }
    }
}

/// Runs gather cycles against a transport, one at a time.
pub struct Gatherer {
    store: Arc<FixStore>,
    gate: ExclusiveGate,
    transport: Box<dyn Transport>,
    clock: Box<dyn Clock>,
    settings: GatherSettings,
}

impl Gatherer {
    pub fn new(
        store: Arc<FixStore>,
        transport: Box<dyn Transport>,
        clock: Box<dyn Clock>,
        settings: GatherSettings,
    ) -> Self {
        Self {
            store,
            gate: ExclusiveGate::new(),
            transport,
            clock,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<FixStore> {
        &self.store
    }

    /// Whether a cycle is running right now
    pub fn is_busy(&self) -> bool {
        self.gate.is_held()
    }

    /// Run one gather cycle.
    ///
    /// Returns `false` straight away if another cycle holds the gate, and
    /// `false` if the transport failed. Returns `true` once a fix from a
    /// matching RMC/GGA pair has been committed, even if the clock was not
    /// set; that outcome is reported through the fix status.
    ///
    /// The clock is set before the fix is committed, so each cycle publishes
    /// exactly one fix, already carrying its final status.
    pub fn gather(&self) -> bool {
        let _guard = match self.gate.try_enter() {
            Some(guard) => guard,
            None => {
                debug!("Gather already in progress, skipping");
                return false;
            }
        };

        match self.collect() {
            Ok((rmc, gga)) => {
                self.set_clock_and_commit(&rmc, &gga);
                true
            }
            Err(e) => {
                error!("Gather cycle aborted: {}", e);
                self.record_failure(&e);
                false
            }
        }
    }

    /// Read until both sentence kinds have been captured.
    fn collect(&self) -> Result<(RmcData, GgaData)> {
        let mut port = self
            .transport
            .open(&self.settings.port, self.settings.baud_rate)?;

        let mut rmc: Option<RmcData> = None;
        let mut gga: Option<GgaData> = None;

        loop {
            let line = port.read_line(FRAME_DELIMITER)?;
            let line = line.trim_end();
            if line.len() < MIN_FRAME_LEN {
                continue;
            }

            match process_line(line) {
                Ok(Captured::Rmc(data)) => rmc = Some(data),
                Ok(Captured::Gga(data)) => gga = Some(data),
                Ok(Captured::Ignored) => {}
                Err(e) => warn!("Discarding {:?}: {}", line, e),
            }

            if let (Some(rmc), Some(gga)) = (&rmc, &gga) {
                return Ok((rmc.clone(), gga.clone()));
            }
        }
    }

    fn set_clock_and_commit(&self, rmc: &RmcData, gga: &GgaData) {
        info!(
            "Fix {} {} quality {:?} satellites {} hdop {}",
            rmc.grid_square,
            rmc.timestamp.to_rfc3339(),
            gga.fix_quality,
            gga.satellites,
            gga.hdop
        );

        let fix = Fix::from_sentences(rmc, gga);
        if gga.hdop >= self.settings.max_hdop {
            let status = format!(
                "hdop {} not below {}, system time not set",
                gga.hdop, self.settings.max_hdop
            );
            warn!("{}", status);
            self.store.commit(fix.with_status(status));
            return;
        }

        match self.clock.set_system_time(rmc.timestamp) {
            Ok(()) => self.store.commit(fix),
            Err(e) => {
                let status = format!("error setting time: {}", e);
                error!("{}", status);
                self.store.commit(fix.with_status(status));
            }
        }
    }

    fn record_failure(&self, err: &GpsError) {
        let status = err.to_string();
        let fix = match self.settings.on_partial_failure {
            PartialFailurePolicy::Discard => Fix::empty(status),
            PartialFailurePolicy::RetainPrevious => self.store.get().with_status(status),
        };
        self.store.commit(fix);
    }
}

enum Captured {
    Rmc(RmcData),
    Gga(GgaData),
    Ignored,
}

fn process_line(line: &str) -> Result<Captured> {
    let sentence = Sentence::decode(line)?;
    match sentence.kind() {
        SentenceKind::Rmc => parse_rmc(&sentence).map(Captured::Rmc),
        SentenceKind::Gga => parse_gga(&sentence).map(Captured::Gga),
        SentenceKind::Other(_) => Ok(Captured::Ignored),
    }
}
