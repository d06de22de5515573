use std::thread::sleep;
use std::time::Duration;

use hand2uinput::config::DEFAULT_DEVICE_NAME;
use hand2uinput::inject::KeyInjector;
use hand2uinput::key::Key;
use hand2uinput::linux::UInputInjector;

fn main() -> anyhow::Result<()> {
    println!("Creating virtual keyboard...");
    let mut device = UInputInjector::new(DEFAULT_DEVICE_NAME)?;
    // udev needs a moment before applications see the new device.
    sleep(Duration::from_secs(1));
    println!("Virtual keyboard created successfully!");

    for key in Key::ALL {
        println!("Tapping {key}...");
        device.tap(key)?;
        sleep(Duration::from_millis(200));
    }

    println!("Holding d for one second...");
    device.press(Key::D)?;
    sleep(Duration::from_secs(1));
    device.release(Key::D)?;

    println!("All keys sent!");
    Ok(())
}
