//! @acp:module "Metadata Utilities"
//! @acp:summary "Value normalisation and page list helpers"
//! @acp:domain metadata
//! @acp:layer utility

use std::cmp::Ordering;
use std::path::Path;

/// Image extensions counted as comic pages
pub const PAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "avif", "jxl", "bmp"];

/// Blank strings become `None`
pub fn xlate(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

/// Parse a trimmed integer, ignoring blanks and garbage
pub fn xlate_int(value: Option<&str>) -> Option<i32> {
    value.and_then(|v| v.trim().parse().ok())
}

/// Split on a delimiter, trimming items and dropping blanks
pub fn split(value: Option<&str>, delimiter: char) -> Vec<String> {
    value
        .map(|v| {
            v.split(delimiter)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Parse `YYYY[-MM[-DD]]` into `(day, month, year)`
pub fn parse_date_str(value: Option<&str>) -> (Option<i32>, Option<i32>, Option<i32>) {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return (None, None, None);
    };
    let mut parts = value.trim().split('-');
    let year = xlate_int(parts.next());
    let month = xlate_int(parts.next());
    let day = xlate_int(parts.next());
    (day, month, year)
}

/// Image entries of an archive in natural sort order, hidden files skipped
pub fn page_name_list(files: &[String]) -> Vec<String> {
    let mut pages: Vec<String> = files
        .iter()
        .filter(|name| is_page(name))
        .cloned()
        .collect();
    pages.sort_by(|a, b| natural_cmp(a, b));
    pages
}

fn is_page(name: &str) -> bool {
    let path = Path::new(name);
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(true);
    if hidden || name.contains("__MACOSX") {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| PAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Compare strings treating digit runs as numbers, case-insensitively
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ln = take_number(&mut left);
                let rn = take_number(&mut right);
                let ord = compare_digits(&ln, &rn);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                let ord = l.to_lowercase().cmp(r.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_number<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
