//! Browser console plumbing: a `log` backend, the panic hook, and the
//! `Date.now()` clock.
//!
//! Everything that touches JS imports is gated on `wasm32`; on native
//! targets the logger drops records and the clock falls back to the system
//! clock, so the bridge stays testable with `cargo test`.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::Once;
use td_core::Clock;

/// Forwards `log` records to `console.debug/info/warn/error`.
pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;
static INIT: Once = Once::new();

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}: {}", record.level(), record.target(), record.args());
        write_console(record.level(), &line);
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Error => web_sys::console::error_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        Level::Info => web_sys::console::info_1(&value),
        Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_console(_level: Level, _line: &str) {}

/// Install the console logger and the panic hook once per page.
pub fn init(level: LevelFilter) {
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(level);
        }
        panic_hook_setup();
    });
}

/// Change the level after `init`. Unknown names leave it alone.
pub fn set_level(name: &str) -> bool {
    match name.parse::<LevelFilter>() {
        Ok(level) => {
            log::set_max_level(level);
            true
        }
        Err(_) => {
            log::warn!("unknown log level {name:?}");
            false
        }
    }
}

fn panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        std::panic::set_hook(Box::new(|info| {
            let msg = format!("TD WASM panic: {info}");
            web_sys::console::error_1(&msg.into());
        }));
    }
}

/// `Date.now()` in the browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsClock;

impl Clock for JsClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> u64 {
        td_core::SystemClock.now_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_level_parses_names() {
        assert!(set_level("debug"));
        assert_eq!(log::max_level(), LevelFilter::Debug);
        assert!(!set_level("loud"));
        assert_eq!(log::max_level(), LevelFilter::Debug);
    }

    #[test]
    fn native_clock_is_nonzero() {
        assert!(JsClock.now_ms() > 0);
    }
}
