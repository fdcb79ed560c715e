//! interactive console driving one dmx universe, in the spirit of the small
//! utilities shipped with usb transceivers: pick a port, then poke channels
//! from a menu while the controller keeps the line refreshed.

use std::time::Duration;

use opendmx::{DmxController, SerialTransport, Timing};

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    println!("open dmx usb console");
    println!("====================");

    let ports = SerialTransport::available_ports().unwrap_or_default();
    if ports.is_empty() {
        println!("no serial port found, check that the transceiver is plugged in");
        return;
    }
    println!("available serial ports:");
    for (index, port) in ports.iter().enumerate() {
        println!("{}: {}", index + 1, port.display());
    }
    let port = loop {
        let input = prompt("port to use: ").await;
        match input.parse::<usize>() {
            Ok(choice) if (1 ..= ports.len()).contains(&choice) => break &ports[choice - 1],
            _ => println!("invalid choice"),
        }
    };

    let controller = DmxController::new(Timing::default());
    if let Err(error) = controller.open(port).await {
        println!("failed to open {}: {}", port.display(), error);
        return;
    }
    println!("connected to {}", port.display());

    loop {
        println!("\ncommands:");
        println!("1: set a channel value");
        println!("2: reset all channels");
        println!("3: run a chase pattern");
        println!("4: display current values");
        println!("0: quit");
        match prompt("choice: ").await.as_str() {
            "0" => break,
            "1" => set_channel(&controller).await,
            "2" => {
                controller.reset_all_channels();
                println!("all channels reset");
            }
            "3" => run_chase(&controller).await,
            "4" => display_values(&controller),
            _ => println!("invalid choice"),
        }
    }

    controller.close().await;
    println!("dmx controller closed");
}

async fn set_channel(controller: &DmxController) {
    let Some(channel) = ask_number("channel (1-512): ", 1, 512).await
        else {return};
    let Some(value) = ask_number("value (0-255): ", 0, 255).await
        else {return};
    match controller.set_channel(channel as u16, value as u8) {
        Ok(()) => println!("channel {} set to {}", channel, value),
        Err(error) => println!("{}", error),
    }
}

/// cyclically walk one lit channel across a span, until the operator stops it
async fn run_chase(controller: &DmxController) {
    let Some(start) = ask_number("start channel (1-512): ", 1, 512).await
        else {return};
    let Some(count) = ask_number("channel count: ", 1, 512 - start + 1).await
        else {return};
    let Some(value) = ask_number("value (0-255): ", 0, 255).await
        else {return};
    let Some(delay) = ask_number("step delay in milliseconds: ", 1, 60_000).await
        else {return};

    controller.reset_all_channels();
    println!("chase running, press enter to stop");

    let animation = async {
        let mut current = start;
        loop {
            if current > start {
                let _ = controller.set_channel((current - 1) as u16, 0);
            }
            else if count > 1 {
                let _ = controller.set_channel((start + count - 1) as u16, 0);
            }
            let _ = controller.set_channel(current as u16, value as u8);
            tokio::time::sleep(Duration::from_millis(delay as u64)).await;
            current += 1;
            if current > start + count - 1
                {current = start}
        }
    };
    tokio::select! {
        _ = animation => {}
        _ = prompt("") => {}
    }

    controller.reset_all_channels();
    println!("chase stopped");
}

fn display_values(controller: &DmxController) {
    let values = controller.get_all_channels();
    println!("current dmx values:");
    for (slot, value) in values.iter().enumerate() {
        if *value > 0 {
            println!("channel {}: {}", slot + 1, value);
        }
    }
    println!("channels at zero are not shown");
}

/// prompt until the operator gives a number in the accepted range
async fn ask_number(message: &str, min: usize, max: usize) -> Option<usize> {
    let input = prompt(message).await;
    match input.parse::<usize>() {
        Ok(number) if (min ..= max).contains(&number) => Some(number),
        _ => {
            println!("invalid input");
            None
        }
    }
}

/// read one trimmed line from the operator without stalling the runtime
async fn prompt(message: &str) -> String {
    use std::io::Write;
    print!("{}", message);
    std::io::stdout().flush().ok();
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).ok();
        line.trim().to_owned()
    }).await.unwrap_or_default()
}
