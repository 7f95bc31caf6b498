//! Installs a process-wide logger, so it lives in a test binary of its own.
use std::sync::Mutex;

use fitsio::tables::{ColumnDataType, ColumnDescription};
use fitsio::FitsFile;
use log::{Level, LevelFilter, Log, Metadata, Record};
use wd_candidates::load_file;

struct Capture {
    lines: Mutex<Vec<(Level, String)>>,
}

impl Log for Capture {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture {
    lines: Mutex::new(Vec::new()),
};

#[test]
fn only_unit_warnings_are_silenced() {
    log::set_logger(&CAPTURE).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wd.fits");
    {
        let columns = [
            ColumnDescription::new("Pwd")
                .with_type(ColumnDataType::Double)
                .create()
                .unwrap(),
            ColumnDescription::new("flux")
                .with_type(ColumnDataType::Double)
                .that_repeats(3)
                .create()
                .unwrap(),
            ColumnDescription::new("mass_H")
                .with_type(ColumnDataType::Double)
                .create()
                .unwrap(),
        ];
        let mut fptr = FitsFile::create(&path).open().unwrap();
        let hdu = fptr.create_table("WD".to_string(), &columns).unwrap();
        hdu.write_col(&mut fptr, "Pwd", &[0.9f64, 0.5]).unwrap();
        hdu.write_col(&mut fptr, "mass_H", &[0.6f64, 0.7]).unwrap();
        hdu.write_key(&mut fptr, "TUNIT3", "Msun").unwrap();
    }

    let table = load_file(&path).unwrap();
    assert_eq!(table.column_names(), vec!["Pwd", "mass_H"]);
    assert_eq!(log::max_level(), LevelFilter::Trace);

    let lines = CAPTURE.lines.lock().unwrap().clone();
    let logged = |level: Level, needle: &str| {
        lines
            .iter()
            .any(|(l, text)| *l == level && text.contains(needle))
    };

    assert!(logged(Level::Info, "Creating table from catalogue..."));
    assert!(logged(Level::Warn, "Skipping vector column 'flux'"));
    assert!(logged(Level::Info, "Table created (2 rows, 2 columns)."));
    assert!(logged(Level::Debug, "non-FITS unit"));
    assert!(!logged(Level::Warn, "did not parse as a FITS unit"));
}
