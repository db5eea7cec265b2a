//! Credit role synonym tables

pub const WRITER_SYNONYMS: &[&str] = &["writer", "plotter", "scripter", "script"];
pub const PENCILLER_SYNONYMS: &[&str] = &[
    "artist",
    "penciller",
    "penciler",
    "breakdowns",
    "pencils",
    "painting",
];
pub const INKER_SYNONYMS: &[&str] = &["inker", "artist", "finishes", "inks", "painting"];
pub const COLORIST_SYNONYMS: &[&str] = &[
    "colorist",
    "colourist",
    "colorer",
    "colourer",
    "colors",
    "painting",
];
pub const LETTERER_SYNONYMS: &[&str] = &["letterer", "letters"];
pub const COVER_SYNONYMS: &[&str] = &["cover", "covers", "coverartist", "cover artist"];
pub const EDITOR_SYNONYMS: &[&str] = &["editor", "edits", "editing"];
pub const TRANSLATOR_SYNONYMS: &[&str] = &["translator", "translation"];

/// Check a case-folded role against a synonym table
pub fn is_one_of(role: &str, synonyms: &[&str]) -> bool {
    synonyms.contains(&role)
}
