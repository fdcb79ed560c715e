/*!
    control of one dmx512 lighting universe through a uart transceiver.

    dmx512 is unidirectional and has no acknowledgment at all: receivers only
    stay lit while frames keep coming, so the line must be refreshed
    continuously no matter what the application is doing. this crate keeps a
    thread safe buffer of the 512 channel values and streams it from a
    background task at a fixed cadence, framed with the break and
    mark-after-break sequence the protocol requires. callers just mutate
    channels whenever they want, the next frame picks the values up.

    the central resource is the [controller::DmxController]:

    ```no_run
    # #[tokio::main(flavor = "current_thread")]
    # async fn main() -> Result<(), opendmx::Error> {
    let controller = opendmx::DmxController::new(Default::default());
    controller.open("/dev/ttyUSB0").await?;
    controller.set_channel(1, 255)?;
    // ... the transmitter keeps streaming in the background
    controller.close().await;
    # Ok(())
    # }
    ```

    the line itself is reached through the [transport::DmxTransport] trait,
    so anything able to assert a break and write raw bytes can carry a
    universe, see [transport::SerialTransport] for the usual uart case.
*/

mod mutex;

pub mod frame;
pub mod transport;
pub mod controller;

pub use frame::Universe;
pub use transport::{DmxTransport, SerialTransport};
pub use controller::{DmxController, Error, Timing};
