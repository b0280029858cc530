//!
//! Content sections and their stored documents.
//!
//! A portfolio is made of sections. Most of them are translated: one stored
//! document holds the payload for every locale. Social links and icons are
//! plain collections with no locale dimension.
//!
mod document;
mod resolver;

pub use document::*;
pub use resolver::*;

use {
    crate::{Error, Result},
    std::{fmt, str::FromStr},
};

/// How a section's documents are read and served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// One document with locale-keyed payloads. Requires a `locale`.
    Translated,
    /// Every document of the collection, locale independent.
    Collection,
}

/// A content section served under `/api/{slug}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Intro,
    Section,
    About,
    Experience,
    Project,
    Writing,
    Footer,
    Social,
    Icon,
}

impl Section {
    pub const ALL: [Section; 9] = [
        Section::Intro,
        Section::Section,
        Section::About,
        Section::Experience,
        Section::Project,
        Section::Writing,
        Section::Footer,
        Section::Social,
        Section::Icon,
    ];

    /// Path segment and seed file stem.
    pub fn slug(&self) -> &'static str {
        match self {
            Section::Intro => "intro",
            Section::Section => "section",
            Section::About => "about",
            Section::Experience => "experience",
            Section::Project => "project",
            Section::Writing => "writing",
            Section::Footer => "footer",
            Section::Social => "social",
            Section::Icon => "icon",
        }
    }

    pub fn path(&self) -> String {
        format!("/api/{}", self.slug())
    }

    /// Name of the store collection holding this section's documents.
    pub fn collection(&self) -> &'static str {
        match self {
            Section::Intro => "intros",
            Section::Section => "sections",
            Section::About => "abouts",
            Section::Experience => "experiences",
            Section::Project => "projects",
            Section::Writing => "writings",
            Section::Footer => "footers",
            Section::Social => "socials",
            Section::Icon => "icons",
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            Section::Social | Section::Icon => ContentKind::Collection,
            _ => ContentKind::Translated,
        }
    }

    /// Array field every collection document must carry.
    pub fn items_key(&self) -> Option<&'static str> {
        match self {
            Section::Social => Some("socials"),
            Section::Icon => Some("icons"),
            _ => None,
        }
    }

    /// Human label used in response messages.
    pub fn label(&self) -> &'static str {
        match self {
            Section::Intro => "Intro",
            Section::Section => "Section",
            Section::About => "About",
            Section::Experience => "Experience",
            Section::Project => "Project",
            Section::Writing => "Writing",
            Section::Footer => "Footer",
            Section::Social => "Social",
            Section::Icon => "Icon",
        }
    }

    pub fn success_message(&self) -> String {
        format!("{} content retrieved successfully", self.label())
    }

    pub fn not_found_message(&self) -> String {
        format!("No {} content found", self.label())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Section {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Section::ALL
            .into_iter()
            .find(|section| section.slug() == s)
            .ok_or_else(|| Error::not_found(format!("Unknown content section '{s}'")))
    }
}
