/*!
    dmx512 line format: protocol constants and the universe buffer.

    one universe is 512 one-byte channels, sent on the wire as a start code
    followed by every channel slot. the [Universe] struct is the single point
    of synchronization between channel writers and the transmit loop.
*/

use core::time::Duration;

use crate::{
    mutex::BusyMutex,
    controller::Error,
    };


/// number of channels in one universe
pub const CHANNELS: usize = 512;
/// bytes of one wire frame: start code followed by all channel slots
pub const FRAME_SIZE: usize = CHANNELS + 1;
/// start code of a standard lighting data frame
pub const START_CODE: u8 = 0x00;
/// dmx line rate: 250 kbaud, 8 data bits, no parity, 2 stop bits
pub const BAUD_RATE: u32 = 250_000;
/// minimum break duration the protocol requires before a frame
///
/// a floor, not a target: host schedulers cannot guarantee microsecond
/// sleeps, implementations coarsen this to whatever the platform delivers
pub const BREAK_FLOOR: Duration = Duration::from_micros(88);
/// minimum mark-after-break duration between the break and the start code
pub const MARK_FLOOR: Duration = Duration::from_micros(8);


/**
    shared buffer of one universe, start code included

    slot 0 is the start code and is never touched by channel operations,
    slots 1 to 512 map one to one on channel numbers. every access copies or
    mutates under the buffer lock, so readers never observe a half written
    frame.
*/
pub struct Universe {
    frame: BusyMutex<[u8; FRAME_SIZE]>,
}

impl Universe {
    /// fresh universe with every channel at zero
    pub fn new() -> Self {
        let mut frame = [0; FRAME_SIZE];
        frame[0] = START_CODE;
        Self {frame: BusyMutex::new(frame)}
    }

    /// slot of a channel in the frame, channels count from 1
    fn slot(channel: u16) -> Result<usize, Error> {
        if (1 ..= CHANNELS as u16).contains(&channel)
            {Ok(usize::from(channel))}
        else
            {Err(Error::Channel(channel))}
    }

    /// set one channel value
    pub fn set(&self, channel: u16, value: u8) -> Result<(), Error> {
        let slot = Self::slot(channel)?;
        self.frame.blocking_lock()[slot] = value;
        Ok(())
    }

    /// current value of one channel
    pub fn get(&self, channel: u16) -> Result<u8, Error> {
        let slot = Self::slot(channel)?;
        Ok(self.frame.blocking_lock()[slot])
    }

    /// copy of all channel values, start code excluded
    pub fn snapshot(&self) -> [u8; CHANNELS] {
        let mut channels = [0; CHANNELS];
        channels.copy_from_slice(&self.frame.blocking_lock()[1 ..]);
        channels
    }

    /// copy of the complete wire frame, start code included
    pub(crate) fn frame(&self) -> [u8; FRAME_SIZE] {
        *self.frame.blocking_lock()
    }

    /// set every channel back to zero, the start code is left untouched
    pub fn reset(&self) {
        self.frame.blocking_lock()[1 ..].fill(0);
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::new()
    }
}
