use anyhow::{Context, Result};
use log::{debug, info};
use uinput::event::keyboard;

use crate::inject::KeyInjector;
use crate::key::Key;

/// Virtual keyboard backed by `/dev/uinput`.
pub struct UInputInjector {
    device: uinput::Device,
}

impl UInputInjector {
    pub fn new(device_name: &str) -> Result<Self> {
        let device = uinput::default()
            .context("cannot open /dev/uinput (is the uinput module loaded and writable?)")?
            .name(device_name)?
            .event(uinput::event::Keyboard::All)?
            .create()
            .context("cannot create virtual keyboard")?;
        info!("created virtual keyboard {device_name:?}");
        Ok(Self { device })
    }
}

impl KeyInjector for UInputInjector {
    fn press(&mut self, key: Key) -> Result<()> {
        debug!("uinput press {key}");
        self.device.press(&map_key(key))?;
        self.device.synchronize()?;
        Ok(())
    }

    fn release(&mut self, key: Key) -> Result<()> {
        debug!("uinput release {key}");
        self.device.release(&map_key(key))?;
        self.device.synchronize()?;
        Ok(())
    }

    fn tap(&mut self, key: Key) -> Result<()> {
        debug!("uinput tap {key}");
        self.device.click(&map_key(key))?;
        self.device.synchronize()?;
        Ok(())
    }
}

fn map_key(key: Key) -> keyboard::Key {
    match key {
        Key::D => keyboard::Key::D,
        Key::F => keyboard::Key::F,
        Key::J => keyboard::Key::J,
        Key::K => keyboard::Key::K,
        Key::Backtick => keyboard::Key::Grave,
        Key::Enter => keyboard::Key::Enter,
        Key::Up => keyboard::Key::Up,
        Key::Down => keyboard::Key::Down,
    }
}
