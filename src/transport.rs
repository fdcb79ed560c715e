/*!
    serial line access for the transmit loop.

    the loop only needs two things from the line: a break signal and a raw
    frame write. [DmxTransport] captures that seam so the line driver can be
    a physical uart transceiver as well as an in-memory double in tests.
*/

use std::{
    io,
    future::Future,
    path::{Path, PathBuf},
    };
use serial2_tokio::{SerialPort, Settings, CharSize, StopBits, Parity};

use crate::frame;


/// line driver interface consumed by the transmit loop
///
/// opening is the implementor's constructor and closing is its drop, so a
/// transport handed to the controller is always ready to emit
pub trait DmxTransport: Send + 'static {
    /// toggle the break condition on the line
    fn set_break(&mut self, enabled: bool) -> impl Future<Output = io::Result<()>> + Send;
    /// push one complete frame on the line as a single contiguous write
    fn write_frame(&mut self, frame: &[u8]) -> impl Future<Output = io::Result<()>> + Send;
}


/// dmx line parameters, fixed by the protocol
fn dmx_settings(mut settings: Settings) -> io::Result<Settings> {
    settings.set_raw();
    settings.set_baud_rate(frame::BAUD_RATE)?;
    settings.set_char_size(CharSize::Bits8);
    settings.set_stop_bits(StopBits::Two);
    settings.set_parity(Parity::None);
    Ok(settings)
}

/**
    parameters used while the break condition is asserted

    not every uart driver exposes a break ioctl, so the break is emulated by
    slowing the line down and sending one zero character: at 57600 baud with
    7 data bits the start bit plus data keep the line low for 139 us, above
    the 88 us floor. the following stop bit already provides a good part of
    the mark-after-break.
*/
fn break_settings(mut settings: Settings) -> io::Result<Settings> {
    settings.set_raw();
    settings.set_baud_rate(57_600)?;
    settings.set_char_size(CharSize::Bits7);
    settings.set_stop_bits(StopBits::One);
    settings.set_parity(Parity::None);
    Ok(settings)
}


/// transceiver reached through a uart serial port, enttec open dmx style
pub struct SerialTransport {
    port: SerialPort,
}

impl SerialTransport {
    /// open the port and configure it for dmx transmission
    ///
    /// the port is released when the transport is dropped
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let port = SerialPort::open(path.as_ref(), dmx_settings)?;
        log::debug!("opened dmx port {}", path.as_ref().display());
        Ok(Self {port})
    }

    /// serial ports currently present on the system
    pub fn available_ports() -> io::Result<Vec<PathBuf>> {
        SerialPort::available_ports()
    }
}

impl DmxTransport for SerialTransport {
    async fn set_break(&mut self, enabled: bool) -> io::Result<()> {
        if enabled {
            let settings = break_settings(self.port.get_configuration()?)?;
            self.port.set_configuration(&settings)?;
            // the zero character is the break, it holds the line low for its
            // whole duration
            self.port.write_all(&[0x00]).await
        }
        else {
            // back to dmx parameters, the idle line gives the mark
            let settings = dmx_settings(self.port.get_configuration()?)?;
            self.port.set_configuration(&settings)?;
            Ok(())
        }
    }

    async fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        self.port.write_all(frame).await
    }
}
