//! Key injection seam.

use crate::key::Key;
use crate::state::KeyCommand;
use anyhow::Result;
use log::info;

/// Something that can make the OS believe a key went down or up.
pub trait KeyInjector {
    fn press(&mut self, key: Key) -> Result<()>;
    fn release(&mut self, key: Key) -> Result<()>;

    /// Press and immediately release.
    fn tap(&mut self, key: Key) -> Result<()> {
        self.press(key)?;
        self.release(key)
    }
}

impl<T: KeyInjector + ?Sized> KeyInjector for Box<T> {
    fn press(&mut self, key: Key) -> Result<()> {
        (**self).press(key)
    }

    fn release(&mut self, key: Key) -> Result<()> {
        (**self).release(key)
    }

    fn tap(&mut self, key: Key) -> Result<()> {
        (**self).tap(key)
    }
}

impl KeyCommand {
    pub fn apply(&self, injector: &mut impl KeyInjector) -> Result<()> {
        match *self {
            KeyCommand::Press(key) => injector.press(key),
            KeyCommand::Release(key) => injector.release(key),
            KeyCommand::Tap(key) => injector.tap(key),
        }
    }
}

/// Dry-run injector: only logs what would be sent.
#[derive(Debug, Default)]
pub struct LogInjector;

impl KeyInjector for LogInjector {
    fn press(&mut self, key: Key) -> Result<()> {
        info!("press {key}");
        Ok(())
    }

    fn release(&mut self, key: Key) -> Result<()> {
        info!("release {key}");
        Ok(())
    }

    fn tap(&mut self, key: Key) -> Result<()> {
        info!("tap {key}");
        Ok(())
    }
}
