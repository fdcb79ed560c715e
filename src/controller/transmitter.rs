/*!
    the background transmit loop, this is the realtime part of the crate.
*/

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU32, Ordering::*},
    };

use crate::{
    frame::Universe,
    transport::DmxTransport,
    };
use super::Timing;


/**
    emit frames until the stop flag is raised

    the loop never gives up on its own: a faulty line is reported, counted
    and retried after a pause, so a transient glitch on the transceiver does
    not interrupt the output stream. the stop flag is checked at the top of
    every iteration and the loop owns the transport, so termination also
    releases the line.
*/
pub(super) async fn run<T: DmxTransport>(
    mut transport: T,
    universe: Arc<Universe>,
    timing: Timing,
    stop: Arc<AtomicBool>,
    faults: Arc<AtomicU32>,
) {
    while !stop.load(Acquire) {
        match cycle(&mut transport, &universe, &timing).await {
            Ok(()) => tokio::time::sleep(timing.frame_interval).await,
            Err(error) => {
                faults.fetch_add(1, Relaxed);
                log::warn!("dmx frame dropped: {}", error);
                tokio::time::sleep(timing.fault_backoff).await;
            }
        }
    }
    log::debug!("dmx transmitter stopped");
}

/// one wire frame: break, mark after break, then start code and all channels
/// in a single write
async fn cycle<T: DmxTransport>(
    transport: &mut T,
    universe: &Universe,
    timing: &Timing,
) -> std::io::Result<()> {
    transport.set_break(true).await?;
    tokio::time::sleep(timing.break_hold).await;
    transport.set_break(false).await?;
    tokio::time::sleep(timing.mark_after_break).await;
    // the frame copy happens under the buffer lock, the line write outside of
    // it, so channel writers never wait on serial latency
    let frame = universe.frame();
    transport.write_frame(&frame).await
}
