/*!
    controller facade over one dmx universe.

    the [DmxController] is the public contract of the crate: it owns the
    universe buffer, opens and closes the line, and keeps a background task
    streaming the buffer at a fixed cadence while any number of callers set
    and read channels.

    one controller drives one universe on one port. several ports are simply
    several independent controller instances, each with its own buffer, lock
    and transmit loop.
*/

/// the transmit loop, the tricky part of the code
mod transmitter;

use std::{
    io,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, Ordering::*},
        },
    time::Duration,
    };
use thiserror::Error;

use crate::{
    frame::{Universe, CHANNELS},
    mutex::BusyMutex,
    transport::{DmxTransport, SerialTransport},
    };


/// error regarding dmx control
#[derive(Error, Debug)]
pub enum Error {
    /// problem with the serial line, only surfaced by open: while streaming,
    /// line faults are logged and retried instead
    #[error("problem with the serial line")]
    Transport(io::Error),
    /// channel outside the universe, nothing was read or written
    #[error("channel {0} is outside the universe range 1-512")]
    Channel(u16),
    /// single channel access while the controller is closed
    #[error("the controller is not open")]
    NotOpen,
}
impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Self::Transport(error)
    }
}


/**
    cadence settings for the transmit loop

    break and mark durations are the protocol floors coarsened to what host
    sleep granularity can deliver, see [crate::frame::BREAK_FLOOR] and
    [crate::frame::MARK_FLOOR]. achieved timing is platform dependent.
*/
#[derive(Copy, Clone, Debug)]
pub struct Timing {
    /// pause between two frames, 25 ms gives the usual 40 Hz refresh
    pub frame_interval: Duration,
    /// how long the break condition is held
    pub break_hold: Duration,
    /// how long the line idles between break and start code
    pub mark_after_break: Duration,
    /// pause after a failed transmission before the next attempt
    pub fault_backoff: Duration,
    /// how long [DmxController::close] waits for the loop to acknowledge
    /// termination before cancelling it
    pub close_timeout: Duration,
}
impl Default for Timing {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(25),
            break_hold: Duration::from_millis(1),
            mark_after_break: Duration::from_millis(1),
            fault_backoff: Duration::from_millis(1000),
            close_timeout: Duration::from_millis(1000),
        }
    }
}


/**
    facade driving one dmx universe over one serial transceiver

    all methods take `&self`: the controller is meant to be shared between
    tasks or threads, every caller mutating channels while the background
    loop keeps the line refreshed. a channel write completed before a frame
    copy is visible in that frame or any later one.
*/
pub struct DmxController {
    universe: Arc<Universe>,
    timing: Timing,
    faults: Arc<AtomicU32>,
    link: BusyMutex<Option<Link>>,
}

/// live transmission state, present while open
struct Link {
    stop: Arc<AtomicBool>,
    task: tokio::task::JoinHandle<()>,
}

impl DmxController {
    /// closed controller with every channel at zero
    pub fn new(timing: Timing) -> Self {
        Self {
            universe: Arc::new(Universe::new()),
            timing,
            faults: Arc::new(AtomicU32::new(0)),
            link: BusyMutex::new(None),
        }
    }

    /**
        open the serial port then start the background transmitter

        idempotent: opening an already open controller does nothing. on a
        port error the controller stays closed and the error is returned.

        must be called from within a tokio runtime, the transmitter is
        spawned on it.
    */
    pub async fn open(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        if self.is_open()
            {return Ok(())}
        self.open_with(SerialTransport::open(path)?).await
    }

    /// start transmitting over an already established transport
    ///
    /// same contract as [DmxController::open], for callers providing their
    /// own line driver
    pub async fn open_with<T: DmxTransport>(&self, transport: T) -> Result<(), Error> {
        let mut link = self.link.lock().await;
        if link.is_some()
            {return Ok(())}
        self.faults.store(0, Relaxed);
        let stop = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(transmitter::run(
            transport,
            self.universe.clone(),
            self.timing,
            stop.clone(),
            self.faults.clone(),
            ));
        *link = Some(Link {stop, task});
        log::debug!("dmx controller open");
        Ok(())
    }

    /**
        stop the transmitter and release the line

        idempotent. returns once the loop has observably stopped: either it
        acknowledged the stop flag within [Timing::close_timeout], or it was
        cancelled, which drops the transport and with it the port. no byte is
        written to the line after this returns.
    */
    pub async fn close(&self) {
        let link = self.link.lock().await.take();
        let Some(Link {stop, mut task}) = link
            else {return};
        stop.store(true, Release);
        if tokio::time::timeout(self.timing.close_timeout, &mut task).await.is_err() {
            // the loop is stuck in a line operation or a fault backoff,
            // cancel it at its next await point
            task.abort();
            let _ = task.await;
        }
        log::debug!("dmx controller closed");
    }

    /// set one channel, channels count from 1 to 512
    ///
    /// fails with [Error::NotOpen] while closed, with [Error::Channel] when
    /// the address is outside the universe
    pub fn set_channel(&self, channel: u16, value: u8) -> Result<(), Error> {
        self.ensure_open()?;
        self.universe.set(channel, value)
    }

    /// current value of one channel, same failure contract as
    /// [DmxController::set_channel]
    pub fn get_channel(&self, channel: u16) -> Result<u8, Error> {
        self.ensure_open()?;
        self.universe.get(channel)
    }

    /// copy of all channel values, start code excluded
    ///
    /// the buffer lives for the whole controller lifetime, so this is usable
    /// in any state
    pub fn get_all_channels(&self) -> [u8; CHANNELS] {
        self.universe.snapshot()
    }

    /// set every channel back to zero, usable in any state
    pub fn reset_all_channels(&self) {
        self.universe.reset()
    }

    /// whether the transmitter is currently streaming
    pub fn is_open(&self) -> bool {
        self.link.blocking_lock().is_some()
    }

    /// transmissions that failed since the controller was last opened
    pub fn faults(&self) -> u32 {
        self.faults.load(Relaxed)
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.link.blocking_lock().is_some()
            {Ok(())}
        else
            {Err(Error::NotOpen)}
    }
}

impl Drop for DmxController {
    fn drop(&mut self) {
        // the loop must not outlive the controller, cancellation also drops
        // the transport and closes the port
        if let Some(link) = self.link.blocking_lock().take() {
            link.task.abort();
        }
    }
}
