//! Operations the software backend cannot express are logged and ignored.
//! Kept in its own binary because it installs a capturing logger.

mod common;

use std::sync::Mutex;

use common::{assert_pixel, render};
use dualgc::*;
use log::{Level, LevelFilter, Log, Metadata, Record};

struct CaptureLogger {
    warnings: Mutex<Vec<String>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata())
            && let Ok(mut warnings) = self.warnings.lock()
        {
            warnings.push(format!("{}: {}", record.target(), record.args()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    warnings: Mutex::new(Vec::new()),
};

fn warned(operation: &str) -> bool {
    let needle = format!("gc: unsupported operation '{operation}' on software context");
    LOGGER
        .warnings
        .lock()
        .map(|warnings| warnings.iter().any(|w| w.starts_with(&needle)))
        .unwrap_or(false)
}

#[test]
fn software_patterns_and_xor_are_logged_and_ignored() {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Warn);

    let gradient = Pattern::LinearGradient {
        x1: 0.0,
        y1: 0.0,
        x2: 4.0,
        y2: 0.0,
        from: Color::BLUE,
        to: Color::GREEN,
    };
    let surface = render(BackendKind::Software, 4, 4, Zoom::IDENTITY, |gc| {
        gc.set_background(Color::RED)?;
        gc.set_background_pattern(Some(&gradient))?;
        assert_eq!(gc.background_pattern()?, None);
        gc.set_foreground_pattern(Some(&gradient))?;
        assert_eq!(gc.foreground_pattern()?, None);
        gc.set_xor_mode(true)?;
        assert!(!gc.xor_mode()?);
        gc.fill_rectangle(0, 0, 4, 4)
    });

    assert!(warned("set_background_pattern"));
    assert!(warned("set_foreground_pattern"));
    assert!(warned("set_xor_mode"));
    assert_pixel(&surface, 0, 0, Color::RED);
    assert_pixel(&surface, 3, 3, Color::RED);
}
