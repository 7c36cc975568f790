//! Font discovery.
//!
//! `TAPFLASH_FONT` points at a font file to use for every label. Without it the
//! system font database is scanned for a sans-serif regular and bold face.

use std::path::Path;

use ab_glyph::{FontArc, FontVec};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};

use crate::error::{Error, Result};

pub const FONT_ENV: &str = "TAPFLASH_FONT";

#[derive(Clone, Default)]
pub struct FontSet {
    pub regular: Option<FontArc>,
    pub bold: Option<FontArc>,
}

impl FontSet {
    pub fn is_empty(&self) -> bool {
        self.regular.is_none() && self.bold.is_none()
    }

    /// Resolves the label fonts. Never fails; missing faces are left empty.
    pub fn discover() -> Self {
        if let Some(path) = std::env::var_os(FONT_ENV) {
            match load_font_from_file(Path::new(&path)) {
                Ok(font) => {
                    tracing::info!(path = %Path::new(&path).display(), "using font override");
                    return Self {
                        regular: Some(font),
                        bold: None,
                    };
                }
                Err(e) => tracing::warn!("{FONT_ENV} ignored: {e}"),
            }
        }

        match Self::from_system() {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!("{e}");
                Self::default()
            }
        }
    }

    pub fn from_system() -> Result<Self> {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.faces().count(), "system fonts loaded");

        let regular = query_face(&db, Weight::NORMAL, false);
        let bold = query_face(&db, Weight::BOLD, true);
        if regular.is_none() && bold.is_none() {
            return Err(Error::NoSystemFont);
        }
        Ok(Self { regular, bold })
    }
}

pub fn load_font_from_file(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path).map_err(|source| Error::FontIo {
        path: path.to_path_buf(),
        source,
    })?;
    load_font_from_bytes(bytes, 0)
}

pub fn load_font_from_bytes(bytes: Vec<u8>, index: u32) -> Result<FontArc> {
    Ok(FontArc::new(FontVec::try_from_vec_and_index(bytes, index)?))
}

fn query_face(db: &Database, weight: Weight, require_bold: bool) -> Option<FontArc> {
    let id = db.query(&Query {
        families: &[Family::SansSerif],
        weight,
        stretch: Stretch::Normal,
        style: Style::Normal,
    })?;

    // fontdb falls back to the nearest weight; a regular face is no bold face.
    if require_bold && db.face(id).is_some_and(|face| face.weight.0 < 600) {
        return None;
    }

    db.with_face_data(id, |data, index| load_font_from_bytes(data.to_vec(), index))?
        .map_err(|e| tracing::warn!("skipping system face: {e}"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_file_reports_path() {
        let err = load_font_from_file(Path::new("/nonexistent/tapflash.ttf"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("/nonexistent/tapflash.ttf"));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(load_font_from_bytes(vec![0, 1, 2, 3], 0).is_err());
    }
}
