use log::LevelFilter;

/// Lowers the global log level to `error` until dropped.
///
/// Wrap the catalogue parse in one of these: the GF+21 file carries unit
/// strings that are not FITS units, and the per-column warnings about them
/// are noise. The previous level is restored on every exit path.
#[must_use = "diagnostics are restored as soon as the guard is dropped"]
pub struct QuietDiagnostics {
    previous: LevelFilter,
}

impl QuietDiagnostics {
    pub fn enter() -> Self {
        let previous = log::max_level();
        if previous > LevelFilter::Error {
            log::set_max_level(LevelFilter::Error);
        }
        QuietDiagnostics { previous }
    }
}

impl Drop for QuietDiagnostics {
    fn drop(&mut self) {
        log::set_max_level(self.previous);
    }
}
