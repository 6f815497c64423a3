use crate::Result;
use tracing::debug;

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard, opened on first use so headless runs never touch it.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
    hold_until_replaced: bool,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// For short-lived processes: on X11 and Wayland the selection lives in the
    /// owning process, so `write_text` blocks until another program takes it over.
    pub fn until_replaced() -> Self {
        Self {
            inner: None,
            hold_until_replaced: true,
        }
    }

    pub fn holds_until_replaced(&self) -> bool {
        self.hold_until_replaced
    }
}

#[cfg(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
))]
fn set_text(clipboard: &mut arboard::Clipboard, text: &str, wait: bool) -> Result<()> {
    use arboard::SetExtLinux;

    if wait {
        clipboard.set().wait().text(text.to_string())?;
    } else {
        clipboard.set_text(text.to_string())?;
    }
    Ok(())
}

#[cfg(not(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
)))]
fn set_text(clipboard: &mut arboard::Clipboard, text: &str, _wait: bool) -> Result<()> {
    clipboard.set_text(text.to_string())?;
    Ok(())
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new()?,
        };
        let clipboard = self.inner.insert(clipboard);
        set_text(clipboard, text, self.hold_until_replaced)?;
        debug!("{} bytes copied to clipboard", text.len());
        Ok(())
    }
}
