//! Record extraction from PubMed EFetch XML.
//!
//! Walks a `PubmedArticleSet` document with a streaming `quick_xml::Reader`
//! and produces one [`PaperRecord`] per `PubmedArticle` node. Missing fields
//! are filled with sentinel values so every record is complete.

use crate::error::{PubmedError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, instrument, warn};

/// Placeholder for a missing identifier or title
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for a missing publication year or author name
pub const UNKNOWN: &str = "Unknown";

/// Substrings that mark an affiliation as academic
pub const ACADEMIC_KEYWORDS: &[&str] = &["university", "college", "institute", "school", "lab", "hospital"];

/// Email-like token. A raw match may end in a sentence dot; [`find_email`] strips it.
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+").expect("email pattern is valid"));

static YEAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(1[89]|20)\d{2}\b").expect("year pattern is valid"));

/// Which fields a run extracts and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordLayout {
    /// Identifier, title and year
    Basic,
    /// Basic fields plus the non-academic author heuristics
    #[default]
    Full,
}

/// One article as written to the console or CSV
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub pubmed_id: String,
    pub title: String,
    /// Four-digit year, or `"Unknown"`
    pub publication_year: String,
    pub non_academic_authors: Vec<String>,
    pub company_affiliations: Vec<String>,
    /// Empty when no affiliation contained an email
    pub corresponding_email: String,
}

/// Returns true when `affiliation` contains none of [`ACADEMIC_KEYWORDS`],
/// compared case-insensitively.
pub fn is_non_academic(affiliation: &str) -> bool {
    let lower = affiliation.to_lowercase();
    !ACADEMIC_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// First `[\w.-]+@[\w.-]+` match in `text`, with trailing dots removed
/// (`"a@b.com."` yields `"a@b.com"`).
pub fn find_email(text: &str) -> Option<String> {
    EMAIL_REGEX
        .find(text)
        .map(|m| m.as_str().trim_end_matches('.').to_string())
        .filter(|email| email.contains('@') && !email.ends_with('@'))
}

/// Parse every `PubmedArticle` in an EFetch response.
///
/// Empty input yields an empty list. Malformed XML is a [`PubmedError::Parse`].
#[instrument(skip(xml), fields(xml_size = xml.len()))]
pub fn parse_records(xml: &str, layout: RecordLayout) -> Result<Vec<PaperRecord>> {
    if xml.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = Reader::from_str(xml);
    reader.config_mut().expand_empty_elements = true;

    let mut records = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut saw_element = false;
    let mut article: Option<ArticleBuilder> = None;
    let mut author: Option<AuthorBuilder> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                saw_element = true;
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if name == "PubmedArticle" {
                    article = Some(ArticleBuilder::default());
                    stack.push(name);
                    continue;
                }

                let parent = stack.last().map(String::as_str);
                match (name.as_str(), article.as_mut()) {
                    ("PMID", Some(a)) if a.pubmed_id.is_none() => {
                        a.pubmed_id = Some(read_text_content(&mut reader)?);
                        continue;
                    }
                    ("ArticleTitle", Some(a)) if a.title.is_none() => {
                        a.title = Some(read_text_content(&mut reader)?);
                        continue;
                    }
                    ("Year", Some(a)) if parent == Some("PubDate") && a.year.is_none() => {
                        a.year = Some(read_text_content(&mut reader)?);
                        continue;
                    }
                    ("MedlineDate", Some(a)) if parent == Some("PubDate") && a.medline_date.is_none() => {
                        a.medline_date = Some(read_text_content(&mut reader)?);
                        continue;
                    }
                    ("Author", Some(_)) if layout == RecordLayout::Full => {
                        author = Some(AuthorBuilder::default());
                    }
                    ("LastName", Some(_)) if parent == Some("Author") => {
                        let text = read_text_content(&mut reader)?;
                        if let Some(au) = author.as_mut() {
                            au.last_name = Some(text);
                        }
                        continue;
                    }
                    ("CollectiveName", Some(_)) if parent == Some("Author") => {
                        let text = read_text_content(&mut reader)?;
                        if let Some(au) = author.as_mut() {
                            au.collective_name = Some(text);
                        }
                        continue;
                    }
                    ("Affiliation", Some(_)) if parent == Some("AffiliationInfo") => {
                        let text = read_text_content(&mut reader)?;
                        if let Some(au) = author.as_mut() {
                            au.affiliation.get_or_insert(text);
                        }
                        continue;
                    }
                    _ => {}
                }
                stack.push(name);
            }
            Event::End(_) => {
                let Some(name) = stack.pop() else {
                    return Err(PubmedError::Parse("unexpected closing tag".to_string()));
                };
                match name.as_str() {
                    "Author" => {
                        if let (Some(au), Some(a)) = (author.take(), article.as_mut()) {
                            a.add_author(au);
                        }
                    }
                    "PubmedArticle" => {
                        if let Some(a) = article.take() {
                            records.push(a.build());
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_element {
        return Err(PubmedError::Parse("document has no root element".to_string()));
    }
    if let Some(open) = stack.last() {
        return Err(PubmedError::Parse(format!("unexpected end of document inside <{}>", open)));
    }

    debug!(count = records.len(), "Extracted records");
    Ok(records)
}

/// Read all text inside the element whose start tag was just consumed,
/// stopping after its end tag. Child tags are dropped, their text kept.
fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut text = String::new();
    let mut depth: u32 = 1;

    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Text(e) => {
                let unescaped = e.unescape().map_err(|err| PubmedError::Parse(err.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::CData(e) => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Event::Eof => {
                return Err(PubmedError::Parse("unexpected end of document".to_string()));
            }
            _ => {}
        }
    }

    Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
}

#[derive(Default)]
struct AuthorBuilder {
    last_name: Option<String>,
    collective_name: Option<String>,
    affiliation: Option<String>,
}

#[derive(Default)]
struct ArticleBuilder {
    pubmed_id: Option<String>,
    title: Option<String>,
    year: Option<String>,
    medline_date: Option<String>,
    non_academic_authors: Vec<String>,
    company_affiliations: Vec<String>,
    corresponding_email: Option<String>,
}

impl ArticleBuilder {
    fn add_author(&mut self, author: AuthorBuilder) {
        // A missing affiliation is classified as empty text
        let affiliation = author.affiliation.unwrap_or_default();

        // Last email seen across the author list wins
        if let Some(email) = find_email(&affiliation) {
            self.corresponding_email = Some(email);
        }

        if is_non_academic(&affiliation) {
            let name = author
                .last_name
                .or(author.collective_name)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string());
            self.non_academic_authors.push(name);
            self.company_affiliations.push(affiliation);
        }
    }

    fn build(self) -> PaperRecord {
        let publication_year = self
            .year
            .filter(|y| !y.is_empty())
            .or_else(|| {
                self.medline_date
                    .as_deref()
                    .and_then(|d| YEAR_REGEX.find(d))
                    .map(|m| m.as_str().to_string())
            })
            .unwrap_or_else(|| UNKNOWN.to_string());

        let pubmed_id = non_empty_or(self.pubmed_id, NOT_AVAILABLE);
        if pubmed_id == NOT_AVAILABLE {
            warn!("Article without PMID");
        }

        PaperRecord {
            pubmed_id,
            title: non_empty_or(self.title, NOT_AVAILABLE),
            publication_year,
            non_academic_authors: self.non_academic_authors,
            company_affiliations: self.company_affiliations,
            corresponding_email: self.corresponding_email.unwrap_or_default(),
        }
    }
}

fn non_empty_or(value: Option<String>, sentinel: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| sentinel.to_string())
}
