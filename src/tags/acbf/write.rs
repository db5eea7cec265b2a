//! @acp:module "ACBF Writer"
//! @acp:summary "Merge generic metadata into a new or existing ACBF document"
//! @acp:domain tags
//! @acp:layer service
//!
//! Writing never starts from scratch when a document exists: elements the
//! metadata model has no field for (text layers, frames, references, extra
//! languages) are carried over untouched.

use std::collections::{BTreeSet, HashMap};

use super::WRITE_NAMESPACE;
use crate::error::Result;
use crate::metadata::roles::{
    is_one_of, COLORIST_SYNONYMS, COVER_SYNONYMS, EDITOR_SYNONYMS, INKER_SYNONYMS,
    LETTERER_SYNONYMS, PENCILLER_SYNONYMS, TRANSLATOR_SYNONYMS, WRITER_SYNONYMS,
};
use crate::metadata::{GenericMetadata, PageMetadata};
use crate::xml::{self, Element};

const BOOK_INFO: &str = "meta-data/book-info";
const PUBLISH_INFO: &str = "meta-data/publish-info";

/// Genres defined by the ACBF schema
pub const ALLOWED_GENRES: &[&str] = &[
    "other",
    "adult",
    "adventure",
    "alternative",
    "artbook",
    "biography",
    "caricature",
    "children",
    "computer",
    "crime",
    "education",
    "fantasy",
    "history",
    "horror",
    "humor",
    "manga",
    "military",
    "mystery",
    "non-fiction",
    "politics",
    "real_life",
    "religion",
    "romance",
    "science_fiction",
    "sports",
    "superhero",
    "western",
];

const ISSUE_ID_TYPES: &[&str] = &["issueid", "issue_id", "issue-id"];
const SERIES_ID_TYPES: &[&str] = &["seriesid", "series_id", "series-id"];

/// Build the ACBF document for `md`, merging into `existing` when given
pub fn metadata_to_xml(md: &GenericMetadata, existing: Option<&[u8]>) -> Result<Element> {
    let mut root = match existing.filter(|bytes| !bytes.is_empty()) {
        Some(bytes) => {
            let mut root = xml::parse(bytes)?;
            root.strip_namespaces();
            root
        }
        None => Element::new("ACBF"),
    };
    root.attributes
        .insert(0, ("xmlns".to_string(), WRITE_NAMESPACE.to_string()));

    {
        let book_info = root.get_or_create(BOOK_INFO);
        write_authors(book_info, md);
        write_sequence(book_info, md);
        write_title(book_info, md);
        write_genres(book_info, md);
        write_annotation(book_info, md);
        write_web_links(book_info, md);
        write_subjects(book_info, md);
        write_ids(book_info, md);
    }

    write_publish_info(root.get_or_create(PUBLISH_INFO), md);
    write_document_info(&mut root, md);
    write_pages(&mut root, md);

    root.indent("  ");
    Ok(root)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// ACBF activity for a credit role, and whether the credit keeps its language
fn activity_for(role: &str) -> (&'static str, bool) {
    let role = role.to_lowercase();
    let role = role.as_str();
    if is_one_of(role, WRITER_SYNONYMS) {
        ("Writer", true)
    } else if role == "adapter" {
        ("Adapter", true)
    } else if role == "artist" {
        ("Artist", false)
    } else if is_one_of(role, PENCILLER_SYNONYMS) {
        ("Penciller", false)
    } else if is_one_of(role, INKER_SYNONYMS) {
        ("Inker", false)
    } else if is_one_of(role, COLORIST_SYNONYMS) {
        ("Colorist", false)
    } else if role == "photographer" || role == "photo" {
        ("Photographer", false)
    } else if is_one_of(role, LETTERER_SYNONYMS) {
        ("Letterer", true)
    } else if is_one_of(role, COVER_SYNONYMS) {
        ("CoverArtist", false)
    } else if is_one_of(role, EDITOR_SYNONYMS) {
        ("Editor", true)
    } else if role == "assistant editor" {
        ("Assistant Editor", true)
    } else if is_one_of(role, TRANSLATOR_SYNONYMS) {
        ("Translator", true)
    } else {
        ("Other", true)
    }
}

fn write_authors(book_info: &mut Element, md: &GenericMetadata) {
    // Every author is rebuilt from the credits
    book_info.children.retain(|c| c.name != "author");

    for credit in &md.credits {
        let (activity, keeps_language) = activity_for(&credit.role);
        let language = Some(credit.language.as_str()).filter(|l| keeps_language && !l.is_empty());
        if let Some(author) = author_element(&credit.person, activity, language) {
            book_info.push(author);
        }
    }
}

/// Person names are split on whitespace: first, optional middle, last.
/// A single word is a nickname.
fn author_element(person: &str, activity: &str, language: Option<&str>) -> Option<Element> {
    let words: Vec<&str> = person.split_whitespace().collect();
    let mut author = Element::new("author").with_attr("activity", activity);
    if let Some(lang) = language {
        author.set_attr("lang", lang);
    }

    match words.as_slice() {
        [] => return None,
        [nick] => {
            author.add_child("nickname", nick, &[]);
        }
        [first, last] => {
            author.add_child("first-name", first, &[]);
            author.add_child("last-name", last, &[]);
        }
        [first, middle, rest @ ..] => {
            author.add_child("first-name", first, &[]);
            author.add_child("middle-name", middle, &[]);
            author.add_child("last-name", &rest.join(" "), &[]);
        }
    }
    Some(author)
}

fn write_sequence(book_info: &mut Element, md: &GenericMetadata) {
    let Some(series) = non_empty(&md.series) else {
        return;
    };
    let issue = non_empty(&md.issue);

    // A lone sequence is replaced; with several, only the one for this issue is
    if book_info.children_named("sequence").count() == 1 {
        book_info.children.retain(|c| c.name != "sequence");
    } else {
        book_info
            .children
            .retain(|c| !(c.name == "sequence" && c.text() == issue));
    }

    let mut sequence = Element::new("sequence").with_attr("title", series);
    if let Some(issue) = issue {
        sequence.text = Some(issue.to_string());
    }
    if let Some(volume) = md.volume {
        sequence.set_attr("volume", volume.to_string());
    }
    book_info.push(sequence);
}

fn write_title(book_info: &mut Element, md: &GenericMetadata) {
    let Some(title) = non_empty(&md.title) else {
        return;
    };

    book_info.children.retain(|c| {
        !(c.name == "book-title" && matches!(c.attr("lang"), None | Some("en")))
    });

    let mut element = Element::new("book-title").with_text(title);
    if let Some(lang) = non_empty(&md.language) {
        element.set_attr("lang", lang);
    }
    book_info.push(element);
}

/// Normalise a genre name to its ACBF spelling, if it has one
fn acbf_genre(genre: &str) -> Option<String> {
    let genre = genre.to_lowercase().replace(' ', "_");
    let genre = if genre == "historical" {
        "history".to_string()
    } else {
        genre
    };
    ALLOWED_GENRES.contains(&genre.as_str()).then_some(genre)
}

fn write_genres(book_info: &mut Element, md: &GenericMetadata) {
    let current = book_info.take_children(|c| c.name == "genre");

    let mut genres: BTreeSet<String> = md.genres.iter().filter_map(|g| acbf_genre(g)).collect();
    if non_empty(&md.manga).is_some_and(|m| m.to_lowercase().starts_with("yes")) {
        genres.insert("manga".to_string());
    }

    for genre in genres {
        // Keep the match percentage of a genre that was already there
        let match_value = current
            .iter()
            .find(|c| c.text() == Some(genre.as_str()))
            .and_then(|c| c.attr("match"))
            .and_then(|m| m.trim().parse::<u32>().ok())
            .filter(|m| *m > 0);

        match match_value {
            Some(m) => {
                let m = m.to_string();
                book_info.add_child("genre", &genre, &[("match", m.as_str())]);
            }
            None => {
                book_info.add_child("genre", &genre, &[]);
            }
        }
    }
}

fn write_annotation(book_info: &mut Element, md: &GenericMetadata) {
    let Some(description) = non_empty(&md.description) else {
        return;
    };
    let paragraphs: Vec<&str> = description.split("\n\n").collect();

    let found = book_info.children_named("annotation").any(|anno| {
        if anno.children.is_empty() {
            // Improperly formatted, no paragraphs
            anno.text() == Some(description)
        } else {
            anno.children.len() == paragraphs.len()
                && anno
                    .children
                    .iter()
                    .zip(&paragraphs)
                    .all(|(p, text)| p.text().unwrap_or("") == *text)
        }
    });
    if found {
        return;
    }

    let mut annotation = Element::new("annotation");
    for paragraph in &paragraphs {
        annotation.add_child("p", paragraph, &[]);
    }
    if let Some(lang) = non_empty(&md.language) {
        book_info.remove_first(|a| a.name == "annotation" && a.attr("lang") == Some(lang));
        annotation.set_attr("lang", lang);
    }
    book_info.push(annotation);
}

fn is_ref_of_type(element: &Element, types: &[&str]) -> bool {
    element.name == "databaseref"
        && element
            .attr("type")
            .map(|t| types.contains(&t.to_lowercase().as_str()))
            .unwrap_or(false)
}

fn write_web_links(book_info: &mut Element, md: &GenericMetadata) {
    if md.web_links.is_empty() {
        return;
    }
    let dbname = md.data_origin_name().unwrap_or("Unknown");

    book_info.children.retain(|c| !is_ref_of_type(c, &["url"]));
    for link in &md.web_links {
        book_info.add_child("databaseref", link.as_str(), &[("type", "URL"), ("dbname", dbname)]);
    }
}

fn write_subjects(book_info: &mut Element, md: &GenericMetadata) {
    if let Some(rating) = non_empty(&md.maturity_rating) {
        let present = book_info
            .children_named("content-rating")
            .any(|r| r.text() == Some(rating));
        if !present {
            book_info.add_child("content-rating", rating, &[]);
        }
    }

    if !md.tags.is_empty() {
        let keywords = md.tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
        book_info.set_path_text("keywords", &keywords, &[], false);
    }

    for (container, names) in [
        ("characters", &md.characters),
        ("teams", &md.teams),
        ("locations", &md.locations),
    ] {
        if names.is_empty() {
            continue;
        }
        let element = book_info.get_or_create(container);
        element.clear();
        for name in names {
            element.add_child("name", name, &[]);
        }
    }
}

fn write_ids(book_info: &mut Element, md: &GenericMetadata) {
    let issue_id = non_empty(&md.issue_id);
    let series_id = non_empty(&md.series_id);
    if issue_id.is_none() && series_id.is_none() {
        return;
    }
    let dbname = md.data_origin_name().unwrap_or("Unknown");

    let present = |types: &[&str], id: &str| {
        book_info
            .children
            .iter()
            .any(|c| is_ref_of_type(c, types) && c.text() == Some(id))
    };
    let add_issue = issue_id.filter(|id| !present(ISSUE_ID_TYPES, *id));
    let add_series = series_id.filter(|id| !present(SERIES_ID_TYPES, *id));

    if let Some(id) = add_issue {
        book_info.add_child("databaseref", id, &[("type", "IssueID"), ("dbname", dbname)]);
    }
    if let Some(id) = add_series {
        book_info.add_child("databaseref", id, &[("type", "SeriesID"), ("dbname", dbname)]);
    }
}

/// Expand two-digit years: below 50 is 20xx, below 100 is 19xx
fn full_year(year: i32) -> i32 {
    if year < 50 {
        2000 + year
    } else if year < 100 {
        1900 + year
    } else {
        year
    }
}

fn write_publish_info(publish_info: &mut Element, md: &GenericMetadata) {
    if let Some(isbn) = non_empty(&md.identifier) {
        publish_info.set_path_text("isbn", isbn, &[], false);
    }

    match (non_empty(&md.publisher), non_empty(&md.imprint)) {
        (Some(publisher), Some(imprint)) => {
            publish_info.set_path_text("publisher", publisher, &[("imprint", imprint)], false)
        }
        (Some(publisher), None) => publish_info.set_path_text("publisher", publisher, &[], true),
        (None, _) => publish_info.remove_path("publisher"),
    }

    if let Some(year) = md.year.filter(|y| *y != 0) {
        let month = md.month.filter(|m| *m != 0).unwrap_or(1);
        let day = md.day.filter(|d| *d != 0).unwrap_or(1);
        let date = format!("{:04}-{:02}-{:02}", full_year(year), month, day);
        publish_info.set_path_text("publish-date", &date, &[("value", date.as_str())], false);
    }

    if let Some(rights) = non_empty(&md.rights) {
        publish_info.set_path_text("license", rights, &[], false);
    }
}

fn write_document_info(root: &mut Element, md: &GenericMetadata) {
    if let Some(notes) = non_empty(&md.notes) {
        let history = root.get_or_create("meta-data/document-info/history");
        history.clear();
        for line in notes.split('\n') {
            history.add_child("p", line, &[]);
        }
    }

    if let Some(scan) = non_empty(&md.scan_info) {
        let source = root.get_or_create("meta-data/document-info/source");
        source
            .children
            .retain(|p| !p.text().is_some_and(|t| t.starts_with("[Scan]")));
        source.add_child("p", &format!("[Scan]{}", scan), &[]);
    }
}

fn image_href(page: &Element) -> Option<String> {
    page.find("image")
        .and_then(|img| img.attr("href"))
        .map(str::to_string)
}

fn write_pages(root: &mut Element, md: &GenericMetadata) {
    if md.pages.is_empty() {
        // Nothing to reconcile; existing pages and their text layers stay
        root.get_or_create("body");
        return;
    }
    let mut existing: HashMap<String, Element> = HashMap::new();

    // The cover is kept in book-info; treat it like any other page while matching
    if let Some(mut cover) = root
        .get_or_create(BOOK_INFO)
        .remove_first(|c| c.name == "coverpage")
    {
        if let Some(href) = image_href(&cover) {
            cover.name = "page".to_string();
            existing.insert(href, cover);
        }
    }

    {
        let body = root.get_or_create("body");
        for page in body.take_children(|_| true) {
            if page.name != "page" {
                continue;
            }
            if let Some(href) = image_href(&page) {
                existing.insert(href, page);
            }
        }
        // Body attributes (background colour) are kept
        body.text = None;
    }

    let mut pages: Vec<&PageMetadata> = md.pages.iter().collect();
    pages.sort_by_key(|p| p.display_index);
    let language = non_empty(&md.language);

    let mut cover = None;
    let mut body_pages = Vec::with_capacity(pages.len());
    for (i, page) in pages.into_iter().enumerate() {
        let element = page_element(page, existing.remove(&page.filename), language);
        if i == 0 {
            cover = Some(Element {
                name: "coverpage".to_string(),
                ..element
            });
        } else {
            body_pages.push(element);
        }
    }

    root.get_or_create("body").children.extend(body_pages);
    if let Some(cover) = cover {
        root.get_or_create(BOOK_INFO).push(cover);
    }
}

fn page_element(page: &PageMetadata, existing: Option<Element>, language: Option<&str>) -> Element {
    let mut element = match existing {
        Some(mut element) => {
            if !page.bookmark.is_empty() {
                // No lang is presumed to be English; replace both
                element.children.retain(|t| {
                    !(t.name == "title" && matches!(t.attr("lang").unwrap_or(""), "" | "en"))
                });
            }
            element
        }
        None => {
            let mut element = Element::new("page");
            element.add_child("image", "", &[("href", page.filename.as_str())]);
            element
        }
    };

    if !page.bookmark.is_empty() {
        match language {
            Some(lang) => element.add_child("title", &page.bookmark, &[("lang", lang)]),
            None => element.add_child("title", &page.bookmark, &[]),
        };
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Credit, DataOrigin};
    use pretty_assertions::assert_eq;
    use url::Url;

    fn texts<'a>(root: &'a Element, path: &str) -> Vec<&'a str> {
        root.find_all(path).into_iter().filter_map(Element::text).collect()
    }

    #[test]
    fn test_activity_mapping() {
        assert_eq!(activity_for("Script"), ("Writer", true));
        assert_eq!(activity_for("artist"), ("Artist", false));
        assert_eq!(activity_for("Painting"), ("Penciller", false));
        assert_eq!(activity_for("Cover Artist"), ("CoverArtist", false));
        assert_eq!(activity_for("Assistant Editor"), ("Assistant Editor", true));
        assert_eq!(activity_for("Gaffer"), ("Other", true));
    }

    #[test]
    fn test_author_name_split() {
        let nick = author_element("Moebius", "Artist", None).unwrap();
        assert_eq!(nick.find("nickname").and_then(Element::text), Some("Moebius"));

        let long = author_element("Jean Henri Gaston Giraud", "Artist", Some("fr")).unwrap();
        assert_eq!(long.attr("lang"), Some("fr"));
        assert_eq!(long.find("middle-name").and_then(Element::text), Some("Henri"));
        assert_eq!(long.find("last-name").and_then(Element::text), Some("Gaston Giraud"));

        assert!(author_element("   ", "Writer", None).is_none());
    }

    #[test]
    fn test_full_year() {
        assert_eq!(full_year(12), 2012);
        assert_eq!(full_year(77), 1977);
        assert_eq!(full_year(1999), 1999);
    }

    #[test]
    fn test_fresh_document_layout() {
        let mut md = GenericMetadata::default();
        md.series = Some("Saga".into());
        md.issue = Some("1".into());
        md.volume = Some(2);
        md.publisher = Some("Image".into());
        md.year = Some(12);
        md.month = Some(3);
        md.credits.push(Credit {
            person: "Brian K. Vaughan".into(),
            role: "Writer".into(),
            primary: true,
            language: String::new(),
        });

        let root = metadata_to_xml(&md, None).unwrap();

        assert_eq!(root.attr("xmlns"), Some(WRITE_NAMESPACE));
        let seq = root.find("meta-data/book-info/sequence").unwrap();
        assert_eq!(seq.attr("title"), Some("Saga"));
        assert_eq!(seq.attr("volume"), Some("2"));
        assert_eq!(seq.text(), Some("1"));
        assert_eq!(texts(&root, "meta-data/publish-info/publisher"), vec!["Image"]);
        let date = root.find("meta-data/publish-info/publish-date").unwrap();
        assert_eq!(date.text(), Some("2012-03-01"));
        assert_eq!(date.attr("value"), Some("2012-03-01"));
        let author = root.find("meta-data/book-info/author").unwrap();
        assert!(author.attr("lang").is_none());
        assert_eq!(author.find("middle-name").and_then(Element::text), Some("K."));
    }

    #[test]
    fn test_genres_filtered_and_match_kept() {
        let existing = br#"<ACBF><meta-data><book-info>
            <genre match="70">science_fiction</genre>
            <genre>western</genre>
        </book-info></meta-data></ACBF>"#;
        let mut md = GenericMetadata::default();
        md.genres = ["Science Fiction", "Historical", "Cooking"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        md.manga = Some("YesAndRightToLeft".into());

        let root = metadata_to_xml(&md, Some(existing)).unwrap();
        let genres = root.find_all("meta-data/book-info/genre");
        let names: Vec<&str> = genres.iter().filter_map(|g| g.text()).collect();
        assert_eq!(names, vec!["history", "manga", "science_fiction"]);
        assert_eq!(genres[2].attr("match"), Some("70"));
    }

    #[test]
    fn test_single_sequence_replaced() {
        let existing = br#"<ACBF><meta-data><book-info>
            <sequence title="Old">3</sequence>
        </book-info></meta-data></ACBF>"#;
        let mut md = GenericMetadata::default();
        md.series = Some("New".into());
        md.issue = Some("4".into());

        let root = metadata_to_xml(&md, Some(existing)).unwrap();
        let seqs = root.find_all("meta-data/book-info/sequence");
        assert_eq!(seqs.len(), 1);
        assert_eq!(seqs[0].attr("title"), Some("New"));
    }

    #[test]
    fn test_multiple_sequences_keep_others() {
        let existing = br#"<ACBF><meta-data><book-info>
            <sequence title="Main">4</sequence>
            <sequence title="Arc">1</sequence>
        </book-info></meta-data></ACBF>"#;
        let mut md = GenericMetadata::default();
        md.series = Some("Main".into());
        md.issue = Some("4".into());

        let root = metadata_to_xml(&md, Some(existing)).unwrap();
        let titles: Vec<&str> = root
            .find_all("meta-data/book-info/sequence")
            .iter()
            .filter_map(|s| s.attr("title"))
            .collect();
        assert_eq!(titles, vec!["Arc", "Main"]);
    }

    #[test]
    fn test_annotation_not_duplicated() {
        let existing = br#"<ACBF><meta-data><book-info>
            <annotation><p>First.</p><p>Second.</p></annotation>
        </book-info></meta-data></ACBF>"#;
        let mut md = GenericMetadata::default();
        md.description = Some("First.\n\nSecond.".into());

        let root = metadata_to_xml(&md, Some(existing)).unwrap();
        assert_eq!(root.find_all("meta-data/book-info/annotation").len(), 1);
    }

    #[test]
    fn test_annotation_replaces_same_language() {
        let existing = br#"<ACBF><meta-data><book-info>
            <annotation lang="de"><p>Alt.</p></annotation>
            <annotation lang="fr"><p>Vieux.</p></annotation>
        </book-info></meta-data></ACBF>"#;
        let mut md = GenericMetadata::default();
        md.description = Some("Neu.".into());
        md.language = Some("de".into());

        let root = metadata_to_xml(&md, Some(existing)).unwrap();
        let annos = root.find_all("meta-data/book-info/annotation");
        let langs: Vec<Option<&str>> = annos.iter().map(|a| a.attr("lang")).collect();
        assert_eq!(langs, vec![Some("fr"), Some("de")]);
        assert_eq!(texts(annos[1], "p"), vec!["Neu."]);
    }

    #[test]
    fn test_ids_not_duplicated() {
        let existing = br#"<ACBF><meta-data><book-info>
            <databaseref type="IssueID" dbname="Comic Vine">140529</databaseref>
            <databaseref type="series_id" dbname="Comic Vine">18166</databaseref>
        </book-info></meta-data></ACBF>"#;
        let mut md = GenericMetadata::default();
        md.issue_id = Some("140529".into());
        md.series_id = Some("18166".into());

        let root = metadata_to_xml(&md, Some(existing)).unwrap();
        assert_eq!(root.find_all("meta-data/book-info/databaseref").len(), 2);
    }

    #[test]
    fn test_publisher_removed_without_metadata() {
        let existing = br#"<ACBF><meta-data><publish-info>
            <publisher imprint="Vertigo">DC</publisher>
        </publish-info></meta-data></ACBF>"#;
        let md = GenericMetadata::default();

        let root = metadata_to_xml(&md, Some(existing)).unwrap();
        assert!(root.find("meta-data/publish-info/publisher").is_none());
        assert!(root.find("meta-data/publish-info").is_some());
    }

    #[test]
    fn test_scan_info_replaced() {
        let existing = br#"<ACBF><meta-data><document-info><source>
            <p>Original print</p><p>[Scan]old group</p>
        </source></document-info></meta-data></ACBF>"#;
        let mut md = GenericMetadata::default();
        md.scan_info = Some("new group".into());
        md.notes = Some("line one\nline two".into());

        let root = metadata_to_xml(&md, Some(existing)).unwrap();
        assert_eq!(
            texts(&root, "meta-data/document-info/source/p"),
            vec!["Original print", "[Scan]new group"]
        );
        assert_eq!(
            texts(&root, "meta-data/document-info/history/p"),
            vec!["line one", "line two"]
        );
    }

    #[test]
    fn test_web_links_replace_url_refs() {
        let existing = br#"<ACBF><meta-data><book-info>
            <databaseref type="URL" dbname="Old">http://old.example/saga</databaseref>
            <databaseref type="IssueID" dbname="Comic Vine">140529</databaseref>
        </book-info></meta-data></ACBF>"#;
        let mut md = GenericMetadata::default();
        md.web_links = vec![
            Url::parse("https://comicvine.gamespot.com/saga-1/4000-140529/").unwrap(),
            Url::parse("https://imagecomics.com/comics/series/saga").unwrap(),
        ];
        md.data_origin = Some(DataOrigin {
            name: "Comic Vine".into(),
            id: "cv".into(),
        });

        let root = metadata_to_xml(&md, Some(existing)).unwrap();
        let refs = root.find_all("meta-data/book-info/databaseref");
        let urls: Vec<(&str, &str)> = refs
            .iter()
            .filter(|r| r.attr("type") == Some("URL"))
            .map(|r| (r.text().unwrap_or(""), r.attr("dbname").unwrap_or("")))
            .collect();
        assert_eq!(
            urls,
            vec![
                ("https://comicvine.gamespot.com/saga-1/4000-140529/", "Comic Vine"),
                ("https://imagecomics.com/comics/series/saga", "Comic Vine"),
            ]
        );
        assert_eq!(refs.iter().filter(|r| r.attr("type") == Some("IssueID")).count(), 1);

        md.data_origin = None;
        let root = metadata_to_xml(&md, None).unwrap();
        let dbnames: Vec<&str> = root
            .find_all("meta-data/book-info/databaseref")
            .iter()
            .filter_map(|r| r.attr("dbname"))
            .collect();
        assert_eq!(dbnames, vec!["Unknown", "Unknown"]);
    }

    #[test]
    fn test_content_rating_not_duplicated() {
        let existing = br#"<ACBF><meta-data><book-info>
            <content-rating type="Age">16+</content-rating>
        </book-info></meta-data></ACBF>"#;
        let mut md = GenericMetadata::default();
        md.maturity_rating = Some("16+".into());

        let root = metadata_to_xml(&md, Some(existing)).unwrap();
        assert_eq!(texts(&root, "meta-data/book-info/content-rating"), vec!["16+"]);

        md.maturity_rating = Some("Mature 17+".into());
        let root = metadata_to_xml(&md, Some(existing)).unwrap();
        assert_eq!(
            texts(&root, "meta-data/book-info/content-rating"),
            vec!["16+", "Mature 17+"]
        );
    }

    #[test]
    fn test_subject_containers_rebuilt() {
        let existing = br#"<ACBF><meta-data><book-info>
            <characters><name>Gwendolyn</name><name>The Will</name></characters>
            <teams><name>Landfall</name></teams>
        </book-info></meta-data></ACBF>"#;
        let mut md = GenericMetadata::default();
        md.characters = ["Alana", "Marko"].iter().map(|s| s.to_string()).collect();
        md.locations = ["Wreath"].iter().map(|s| s.to_string()).collect();

        let root = metadata_to_xml(&md, Some(existing)).unwrap();
        assert_eq!(
            texts(&root, "meta-data/book-info/characters/name"),
            vec!["Alana", "Marko"]
        );
        // Containers without metadata are left alone
        assert_eq!(texts(&root, "meta-data/book-info/teams/name"), vec!["Landfall"]);
        assert_eq!(texts(&root, "meta-data/book-info/locations/name"), vec!["Wreath"]);
    }

    #[test]
    fn test_bookmark_carries_language() {
        let existing = br#"<ACBF><body>
            <page><image href="01.jpg"/><title lang="en">Old</title><title lang="de">Alt</title></page>
        </body></ACBF>"#;
        let mut md = GenericMetadata::default();
        md.language = Some("fr".into());
        md.pages = vec![
            PageMetadata {
                filename: "00.jpg".into(),
                display_index: 0,
                ..Default::default()
            },
            PageMetadata {
                filename: "01.jpg".into(),
                display_index: 1,
                bookmark: "Chapitre 1".into(),
                ..Default::default()
            },
        ];

        let root = metadata_to_xml(&md, Some(existing)).unwrap();
        let titles: Vec<(Option<&str>, &str)> = root
            .find_all("body/page/title")
            .iter()
            .map(|t| (t.attr("lang"), t.text().unwrap_or("")))
            .collect();
        assert_eq!(titles, vec![(Some("de"), "Alt"), (Some("fr"), "Chapitre 1")]);

        md.language = None;
        let root = metadata_to_xml(&md, None).unwrap();
        let title = root.find("body/page/title").unwrap();
        assert_eq!(title.text(), Some("Chapitre 1"));
        assert!(title.attr("lang").is_none());
    }

    #[test]
    fn test_pages_untouched_without_page_metadata() {
        let existing = br#"<ACBF><body><page><image href="01.jpg"/></page></body></ACBF>"#;
        let root = metadata_to_xml(&GenericMetadata::default(), Some(existing)).unwrap();
        assert_eq!(root.find_all("body/page").len(), 1);
    }

    #[test]
    fn test_pages_reuse_existing_elements() {
        let existing = br##"<ACBF><meta-data><book-info>
            <coverpage><image href="00.jpg"/></coverpage>
        </book-info></meta-data>
        <body bgcolor="#FFFFFF">
            <page><image href="01.jpg"/><text-layer lang="en"><text-area points="0,0 1,1"><p>Hi</p></text-area></text-layer></page>
        </body></ACBF>"##;
        let mut md = GenericMetadata::default();
        md.pages = vec![
            PageMetadata {
                filename: "00.jpg".into(),
                display_index: 0,
                ..Default::default()
            },
            PageMetadata {
                filename: "01.jpg".into(),
                display_index: 1,
                bookmark: "Chapter 1".into(),
                ..Default::default()
            },
            PageMetadata {
                filename: "02.jpg".into(),
                display_index: 2,
                ..Default::default()
            },
        ];

        let root = metadata_to_xml(&md, Some(existing)).unwrap();

        let cover = root.find("meta-data/book-info/coverpage").unwrap();
        assert_eq!(image_href(cover).as_deref(), Some("00.jpg"));

        let body = root.find("body").unwrap();
        assert_eq!(body.attr("bgcolor"), Some("#FFFFFF"));
        let pages = root.find_all("body/page");
        assert_eq!(pages.len(), 2);
        assert!(pages[0].find("text-layer/text-area/p").is_some());
        assert_eq!(texts(pages[0], "title"), vec!["Chapter 1"]);
        assert_eq!(image_href(pages[1]).as_deref(), Some("02.jpg"));
    }
}
