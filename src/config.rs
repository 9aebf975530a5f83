//! Factory configuration.

use std::path::PathBuf;

use crate::api::BackendKind;

pub const BACKEND_ENV: &str = "DUALGC_BACKEND";
pub const DEVICE_ZOOM_ENV: &str = "DUALGC_DEVICE_ZOOM";

/// Fonts available to the software text engine.
#[derive(Clone, Debug, PartialEq)]
pub struct FontConfig {
    /// Whether to load system fonts (default: true).
    pub load_system_fonts: bool,
    /// Additional directories to scan for font files.
    pub font_dirs: Vec<PathBuf>,
    pub font_files: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            load_system_fonts: true,
            font_dirs: Vec::new(),
            font_files: Vec::new(),
        }
    }
}

impl FontConfig {
    pub fn to_fontdb(&self) -> fontdb::Database {
        let mut db = fontdb::Database::new();
        if self.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &self.font_dirs {
            db.load_fonts_dir(dir);
        }
        for file in &self.font_files {
            if let Err(err) = db.load_font_file(file) {
                log::warn!(target: "gc", "failed to load font {}: {}", file.display(), err);
            }
        }
        log::debug!(target: "gc", "font database holds {} faces", db.len());
        db
    }
}

/// Chosen once per factory and never re-read for live contexts.
#[derive(Clone, Debug, PartialEq)]
pub struct GcConfig {
    pub backend: BackendKind,
    /// Secondary text scale (e.g. a display's text-size override).
    pub device_zoom: f32,
    pub fonts: FontConfig,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            device_zoom: 1.0,
            fonts: FontConfig::default(),
        }
    }
}

impl GcConfig {
    pub fn native() -> Self {
        Self {
            backend: BackendKind::Native,
            ..Self::default()
        }
    }

    pub fn software() -> Self {
        Self {
            backend: BackendKind::Software,
            ..Self::default()
        }
    }

    /// Reads `DUALGC_BACKEND` (`native` | `software`) and `DUALGC_DEVICE_ZOOM`.
    /// Missing or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(value) = lookup(BACKEND_ENV) {
            match value.trim().to_ascii_lowercase().as_str() {
                "native" => config.backend = BackendKind::Native,
                "software" => config.backend = BackendKind::Software,
                other => {
                    log::warn!(target: "gc", "ignoring {}={:?}: expected native or software", BACKEND_ENV, other)
                }
            }
        }
        if let Some(value) = lookup(DEVICE_ZOOM_ENV) {
            match value.trim().parse::<f32>() {
                Ok(zoom) if zoom.is_finite() && zoom > 0.0 => config.device_zoom = zoom,
                _ => log::warn!(target: "gc", "ignoring {}={:?}", DEVICE_ZOOM_ENV, value),
            }
        }
        config
    }
}

fn default_backend() -> BackendKind {
    if cfg!(feature = "cairo") {
        BackendKind::Native
    } else {
        BackendKind::Software
    }
}
