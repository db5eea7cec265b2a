//! @acp:module "ACBF Reader"
//! @acp:summary "Map an ACBF document onto generic metadata"
//! @acp:domain tags
//! @acp:layer service

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::SUPPORTED_NAMESPACES;
use crate::error::{AcbfError, Result};
use crate::metadata::utils::{parse_date_str, split, xlate, xlate_int};
use crate::metadata::{GenericMetadata, PageMetadata};
use crate::xml::Element;

/// Check the root is an ACBF element of a version we understand
pub fn check_version(root: &Element) -> Result<()> {
    if root.local_name() != "ACBF" {
        return Err(AcbfError::NotAcbf);
    }
    match root.namespace() {
        None => Ok(()),
        Some(ns) if SUPPORTED_NAMESPACES.contains(&ns) => Ok(()),
        Some(ns) => Err(AcbfError::UnknownVersion(ns.to_string())),
    }
}

/// Convert an ACBF document into metadata.
///
/// `page_names` is the archive's page name list, used to link page images to
/// their archive index.
pub fn xml_to_metadata(mut root: Element, page_names: &[String]) -> Result<GenericMetadata> {
    check_version(&root)?;
    root.strip_namespaces();

    let mut md = GenericMetadata::default();

    let Some(book_info) = root.find("meta-data/book-info") else {
        tracing::info!("No metadata found in ACBF file");
        return Ok(md);
    };

    if let Some(seq) = book_info.children_named("sequence").next() {
        md.series = seq.attr("title").map(str::to_string);
        md.volume = xlate_int(seq.attr("volume"));
        md.issue = seq.text().map(str::to_string);
    }

    md.title = xlate(text_with_lang(book_info, "book-title"));

    // A series title is always wanted
    if md.series.is_none() {
        md.series = md.title.take();
    }

    for genre in book_info.children_named("genre") {
        if let Some(text) = genre.text() {
            if text.to_lowercase() == "manga" {
                md.manga = Some("Yes".to_string());
            }
            md.genres.insert(text.replace('_', " ").to_lowercase());
        }
    }

    md.description = pick_by_lang(book_info.children_named("annotation"), annotation_to_string);

    if let Some(publisher) = root.find_descendant("publisher") {
        md.publisher = xlate(publisher.text());
        md.imprint = publisher.attr("imprint").map(str::to_string);
    }

    // `value` is ISO, the text is free-form
    if let Some(pub_date) = root.find_descendant("publish-date") {
        let (day, month, year) = parse_date_str(pub_date.attr("value"));
        md.day = day;
        md.month = month;
        md.year = year;

        if md.year.is_none() {
            md.year = pub_date.text().and_then(leading_year);
        }
    }

    md.language = book_info
        .find("languages")
        .and_then(|langs| langs.children.first())
        .and_then(|layer| layer.attr("lang"))
        .map(str::to_string);

    md.maturity_rating = xlate(root.find_descendant("content-rating").and_then(Element::text));
    md.tags = split(root.find_descendant("keywords").and_then(Element::text), ',')
        .into_iter()
        .collect();

    md.characters = names_under(book_info, "characters/name");
    md.teams = names_under(book_info, "teams/name");
    md.locations = names_under(book_info, "locations/name");

    for dbref in book_info.children_named("databaseref") {
        // IssueID/SeriesID refs cannot be attributed to a source reliably
        if dbref.attr("type").map(|t| t.eq_ignore_ascii_case("url")) != Some(true) {
            continue;
        }
        let Some(text) = dbref.text() else { continue };
        match Url::parse(text.trim()) {
            Ok(url) => md.web_links.push(url),
            Err(e) => tracing::warn!("Skipping invalid web link {:?}: {}", text, e),
        }
    }

    md.identifier = xlate(root.find_descendant("isbn").and_then(Element::text));
    md.rights = xlate(root.find_descendant("license").and_then(Element::text));

    read_credits(book_info, &mut md);

    if let Some(history) = root.find_descendant("history") {
        let lines: Vec<&str> = history.children.iter().filter_map(Element::text).collect();
        if !lines.is_empty() {
            md.notes = Some(lines.join("\n"));
        }
    }

    if let Some(source) = root.find_descendant("source") {
        for p in &source.children {
            if let Some(scan) = p.text().and_then(|t| t.strip_prefix("[Scan]")) {
                md.scan_info = Some(scan.to_string());
            }
        }
    }

    md.pages = read_pages(&root, book_info, page_names);
    md.is_empty = false;

    Ok(md)
}

fn read_credits(book_info: &Element, md: &mut GenericMetadata) {
    for author in book_info.children_named("author") {
        let Some(role) = author.attr("activity").filter(|r| !r.is_empty()) else {
            continue;
        };
        let role = if role.eq_ignore_ascii_case("coverartist") {
            "Cover"
        } else {
            role
        };

        let part = |name: &str| author.find(name).and_then(Element::text);
        let name = match (part("first-name"), part("middle-name"), part("last-name"), part("nickname")) {
            (Some(first), Some(middle), Some(last), _) => format!("{} {} {}", first, middle, last),
            (Some(first), None, Some(last), _) => format!("{} {}", first, last),
            (_, _, _, Some(nick)) => nick.to_string(),
            (Some(first), _, _, None) => first.to_string(),
            _ => continue,
        };

        md.add_credit(&name, role, false, author.attr("lang").unwrap_or(""));
    }
}

fn read_pages(root: &Element, book_info: &Element, page_names: &[String]) -> Vec<PageMetadata> {
    let index_of: HashMap<&str, usize> = page_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    // The cover lives in book-info, ahead of the body pages
    let cover = book_info.find("coverpage");
    let pages = cover.into_iter().chain(root.find_all("body/page"));

    pages
        .enumerate()
        .map(|(i, page)| {
            let filename = page
                .find("image")
                .and_then(|img| img.attr("href"))
                .unwrap_or("")
                .to_string();
            let bookmark = pick_by_lang(page.children_named("title"), |t| {
                t.text().map(str::to_string)
            })
            .unwrap_or_default();
            let archive_index = index_of.get(filename.as_str()).copied().unwrap_or(i);

            PageMetadata {
                archive_index,
                display_index: i,
                filename,
                bookmark,
                page_type: String::new(),
            }
        })
        .collect()
}

/// Text of the first `name` child with no `lang` or the given `lang`
fn text_with_lang<'a>(book_info: &'a Element, name: &'a str) -> Option<&'a str> {
    book_info
        .children_named(name)
        .find(|e| matches!(e.attr("lang"), None | Some("en")))
        .and_then(Element::text)
}

/// Pick a value by language: no `lang` wins, then `en`, then the first found
fn pick_by_lang<'a, I, F>(elements: I, value: F) -> Option<String>
where
    I: Iterator<Item = &'a Element>,
    F: Fn(&Element) -> Option<String>,
{
    let mut picked: Option<String> = None;
    for element in elements {
        let Some(v) = value(element) else { continue };
        match element.attr("lang").unwrap_or("") {
            "" => return Some(v),
            "en" => picked = Some(v),
            _ if picked.is_none() => picked = Some(v),
            _ => {}
        }
    }
    picked
}

/// Annotation paragraphs joined by blank lines, or the bare text
fn annotation_to_string(element: &Element) -> Option<String> {
    let parts: Vec<&str> = if element.children.is_empty() {
        element.text().into_iter().collect()
    } else {
        element.children.iter().filter_map(Element::text).collect()
    };
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

fn names_under(book_info: &Element, path: &str) -> std::collections::BTreeSet<String> {
    book_info
        .find_all(path)
        .into_iter()
        .filter_map(Element::text)
        .map(str::to_string)
        .collect()
}

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}").expect("Invalid year regex"));

fn leading_year(text: &str) -> Option<i32> {
    YEAR_PATTERN
        .find(text.trim_start())
        .and_then(|m| m.as_str().parse().ok())
}
