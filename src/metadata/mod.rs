//! @acp:module "Metadata"
//! @acp:summary "Host-side generic comic metadata model"
//! @acp:domain metadata
//! @acp:layer model
//!
//! The tagging host exchanges metadata with every tag plugin through
//! [`GenericMetadata`]. The ACBF tag maps its XML onto these fields and back.

pub mod roles;
pub mod utils;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use url::Url;

/// @acp:summary "A single contributor credit"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    pub person: String,
    pub role: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub language: String,
}

/// @acp:summary "One page of a comic archive"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMetadata {
    /// Position of the image in the archive's page name list
    pub archive_index: usize,
    /// Position in reading order
    pub display_index: usize,
    pub filename: String,
    pub bookmark: String,
    #[serde(rename = "type")]
    pub page_type: String,
}

/// Where the metadata was sourced from (e.g. an online database)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataOrigin {
    pub name: String,
    #[serde(default)]
    pub id: String,
}

/// @acp:summary "Generic comic metadata shared by all tag formats"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenericMetadata {
    pub is_empty: bool,

    pub data_origin: Option<DataOrigin>,
    pub issue_id: Option<String>,
    pub series_id: Option<String>,

    pub series: Option<String>,
    pub issue: Option<String>,
    pub title: Option<String>,
    pub volume: Option<i32>,
    pub publisher: Option<String>,
    pub imprint: Option<String>,
    pub day: Option<i32>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub language: Option<String>,
    pub manga: Option<String>,
    pub maturity_rating: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub scan_info: Option<String>,
    /// ISBN or other book identifier
    pub identifier: Option<String>,
    /// License text
    pub rights: Option<String>,

    pub genres: BTreeSet<String>,
    pub tags: BTreeSet<String>,
    pub characters: BTreeSet<String>,
    pub teams: BTreeSet<String>,
    pub locations: BTreeSet<String>,
    pub web_links: Vec<Url>,
    pub credits: Vec<Credit>,
    pub pages: Vec<PageMetadata>,
}

impl Default for GenericMetadata {
    fn default() -> Self {
        Self {
            is_empty: true,
            data_origin: None,
            issue_id: None,
            series_id: None,
            series: None,
            issue: None,
            title: None,
            volume: None,
            publisher: None,
            imprint: None,
            day: None,
            month: None,
            year: None,
            language: None,
            manga: None,
            maturity_rating: None,
            description: None,
            notes: None,
            scan_info: None,
            identifier: None,
            rights: None,
            genres: BTreeSet::new(),
            tags: BTreeSet::new(),
            characters: BTreeSet::new(),
            teams: BTreeSet::new(),
            locations: BTreeSet::new(),
            web_links: Vec::new(),
            credits: Vec::new(),
            pages: Vec::new(),
        }
    }
}

impl GenericMetadata {
    /// Add a credit unless the same person already holds the role.
    ///
    /// Duplicates only merge the `primary` flag.
    pub fn add_credit(&mut self, person: &str, role: &str, primary: bool, language: &str) {
        let person_key = person.to_lowercase();
        let role_key = role.to_lowercase();

        if let Some(existing) = self
            .credits
            .iter_mut()
            .find(|c| c.person.to_lowercase() == person_key && c.role.to_lowercase() == role_key)
        {
            existing.primary = existing.primary || primary;
            return;
        }

        self.credits.push(Credit {
            person: person.to_string(),
            role: role.to_string(),
            primary,
            language: language.to_string(),
        });
    }

    /// Name of the data origin, if any
    pub fn data_origin_name(&self) -> Option<&str> {
        self.data_origin.as_ref().map(|o| o.name.as_str())
    }
}
