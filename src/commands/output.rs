//! @acp:module "Output Formatting"
//! @acp:summary "Render metadata for the terminal, JSON or YAML"
//! @acp:domain cli
//! @acp:layer utility

use anyhow::Result;
use console::style;

use crate::metadata::GenericMetadata;

/// Output format for metadata documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            _ => Err(format!("Unknown format: {}. Use human, json or yaml", s)),
        }
    }
}

/// Render metadata in the requested format
pub fn render_metadata(md: &GenericMetadata, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(md)?,
        OutputFormat::Yaml => serde_yaml::to_string(md)?,
        OutputFormat::Human => render_human(md),
    })
}

fn field(out: &mut String, label: &str, value: impl std::fmt::Display) {
    out.push_str(&format!("  {:<14} {}\n", style(label).dim(), value));
}

fn opt_field(out: &mut String, label: &str, value: &Option<String>) {
    if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
        field(out, label, value);
    }
}

fn list_field<I, S>(out: &mut String, label: &str, values: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = values
        .into_iter()
        .map(|v| v.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if !joined.is_empty() {
        field(out, label, joined);
    }
}

fn render_human(md: &GenericMetadata) -> String {
    let mut out = String::new();
    if md.is_empty {
        out.push_str(&format!("{}\n", style("(no metadata)").dim()));
        return out;
    }

    opt_field(&mut out, "Series", &md.series);
    opt_field(&mut out, "Issue", &md.issue);
    opt_field(&mut out, "Title", &md.title);
    if let Some(volume) = md.volume {
        field(&mut out, "Volume", volume);
    }
    opt_field(&mut out, "Publisher", &md.publisher);
    opt_field(&mut out, "Imprint", &md.imprint);
    if let Some(year) = md.year {
        let date = match (md.month, md.day) {
            (Some(m), Some(d)) => format!("{}-{:02}-{:02}", year, m, d),
            (Some(m), None) => format!("{}-{:02}", year, m),
            _ => year.to_string(),
        };
        field(&mut out, "Published", date);
    }
    opt_field(&mut out, "Language", &md.language);
    opt_field(&mut out, "Manga", &md.manga);
    opt_field(&mut out, "Rating", &md.maturity_rating);
    list_field(&mut out, "Genres", &md.genres);
    list_field(&mut out, "Tags", &md.tags);
    list_field(&mut out, "Characters", &md.characters);
    list_field(&mut out, "Teams", &md.teams);
    list_field(&mut out, "Locations", &md.locations);
    list_field(&mut out, "Web", md.web_links.iter().map(|u| u.as_str()));
    opt_field(&mut out, "Identifier", &md.identifier);
    opt_field(&mut out, "Rights", &md.rights);
    opt_field(&mut out, "Scan info", &md.scan_info);
    if let Some(origin) = &md.data_origin {
        field(&mut out, "Source", &origin.name);
        opt_field(&mut out, "Issue ID", &md.issue_id);
        opt_field(&mut out, "Series ID", &md.series_id);
    }

    if !md.credits.is_empty() {
        out.push_str(&format!("  {}\n", style("Credits").dim()));
        for credit in &md.credits {
            let marker = if credit.primary { " *" } else { "" };
            out.push_str(&format!(
                "    {}: {}{}\n",
                style(&credit.role).cyan(),
                credit.person,
                marker
            ));
        }
    }
    if !md.pages.is_empty() {
        let bookmarks = md.pages.iter().filter(|p| !p.bookmark.is_empty()).count();
        field(
            &mut out,
            "Pages",
            format!("{} ({} bookmarked)", md.pages.len(), bookmarks),
        );
    }
    if let Some(description) = md.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("  {}\n", style("Description").dim()));
        for line in description.lines() {
            out.push_str(&format!("    {}\n", line));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_render_json_and_human() {
        let mut md = GenericMetadata {
            series: Some("Doctor Strange".to_string()),
            year: Some(1963),
            month: Some(7),
            is_empty: false,
            ..Default::default()
        };
        md.add_credit("Steve Ditko", "Artist", true, "");

        let json = render_metadata(&md, OutputFormat::Json).unwrap();
        assert!(json.contains("\"series\": \"Doctor Strange\""));

        let human = render_metadata(&md, OutputFormat::Human).unwrap();
        assert!(human.contains("Doctor Strange"));
        assert!(human.contains("1963-07"));
        assert!(human.contains("Steve Ditko"));
    }
}
