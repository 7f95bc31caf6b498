use super::model::Column;

// ---------------------------------------------------------------------------
// FITS unit vocabulary (FITS Standard 4.0, section 4.3)
// ---------------------------------------------------------------------------

/// Base units that accept SI prefixes (`km`, `mas`, `kpc`, `mJy`, ...).
const PREFIXABLE: &[&str] = &[
    "m", "g", "s", "rad", "sr", "K", "A", "mol", "cd", "Hz", "J", "W", "V", "N", "Pa", "C",
    "Ohm", "S", "F", "Wb", "T", "H", "lm", "lx", "yr", "a", "eV", "Jy", "mag", "pc", "erg",
    "Ry", "R", "G", "barn", "D", "bit", "byte",
];

/// Units that are only valid without a prefix.
const PLAIN: &[&str] = &[
    "deg", "arcmin", "arcsec", "mas", "min", "h", "d", "Angstrom", "AU", "solMass", "solRad",
    "solLum", "u", "dex", "pix", "pixel", "ct", "count", "ph", "photon", "adu", "beam",
    "chan", "bin", "voxel", "%",
];

/// Two-character prefix must be tried before the single-character ones.
const PREFIXES: &[&str] = &[
    "da", "y", "z", "a", "f", "p", "n", "u", "m", "c", "d", "k", "M", "G", "T", "P", "E",
    "Z", "Y",
];

fn is_base(token: &str) -> bool {
    if PLAIN.contains(&token) || PREFIXABLE.contains(&token) {
        return true;
    }
    PREFIXES.iter().any(|prefix| {
        token
            .strip_prefix(prefix)
            .is_some_and(|rest| PREFIXABLE.contains(&rest))
    })
}

/// Whether `unit` parses as a FITS unit string.
///
/// Handles products (`.`, space, `*`), quotients (`/`), powers (`**2`, `^2`,
/// `s-1`), and `log(...)` / `[...]` wrappers. An empty string is dimensionless.
pub fn is_standard(unit: &str) -> bool {
    let mut unit = unit.trim();
    if let Some(inner) = unit.strip_prefix("log(").and_then(|u| u.strip_suffix(')')) {
        unit = inner;
    } else if let Some(inner) = unit.strip_prefix('[').and_then(|u| u.strip_suffix(']')) {
        unit = inner;
    }

    unit.split([' ', '.', '/', '*', '(', ')'])
        .filter(|tok| !tok.is_empty())
        .all(|tok| {
            let base = tok.trim_end_matches(|c: char| c.is_ascii_digit() || "+-^".contains(c));
            base.is_empty() || is_base(base)
        })
}

/// Warn about every column whose unit string is not standard FITS.
/// Returns how many were found.
pub fn check_columns(columns: &[Column]) -> usize {
    let mut nonstandard = 0;
    for col in columns {
        if let Some(unit) = &col.unit {
            if !is_standard(unit) {
                log::warn!("Column '{}': '{unit}' did not parse as a FITS unit", col.name);
                nonstandard += 1;
            }
        }
    }
    nonstandard
}
