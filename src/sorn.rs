//! A single System of Records Notice: its source and derived URLs, the
//! fetched document body, and the extracted fields.

use std::fmt;

use clap::ValueEnum;
use reqwest::Client;
use tracing::warn;

use crate::extract::{self, Extraction};

/// Federal Register full-text documents live under a fixed path marker.
const XML_PATH_MARKER: &str = "full_text/xml";

/// Document element holding the notice body; its first child is the title.
const TITLE_SECTION: &str = "PRIACT";

const SYSTEM_NAME_HEADING: &str = "SYSTEM NAME:";
const PII_HEADING: &str = "CATEGORIES OF RECORDS IN THE SYSTEM:";
const PURPOSE_HEADING: &str = "PURPOSE:";
const RETENTION_HEADING: &str = "RETENTION AND DISPOSAL:";
const ROUTINE_USES_HEADING: &str =
    "ROUTINE USES OF RECORDS MAINTAINED IN THE SYSTEM INCLUDING CATEGORIES OF USERS AND THE PURPOSES OF SUCH USES:";
const AUTHORITY_HEADINGS: [&str; 2] = [
    "AUTHORITIES FOR MAINTENANCE OF THE SYSTEM:",
    "AUTHORITY FOR MAINTENANCE OF THE SYSTEM:",
];

/// Extractable fields of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Field {
    SystemName,
    Pii,
    Purpose,
    Retention,
    RoutineUses,
    DocTitle,
    Authority,
}

/// The historically active subset: the summary CSV needs only these two.
pub const DEFAULT_FIELDS: &[Field] = &[Field::SystemName, Field::Authority];

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::SystemName => "system-name",
            Field::Pii => "pii",
            Field::Purpose => "purpose",
            Field::Retention => "retention",
            Field::RoutineUses => "routine-uses",
            Field::DocTitle => "doc-title",
            Field::Authority => "authority",
        })
    }
}

/// Extracted field values, each absent until an extraction succeeds.
#[derive(Debug, Clone, Default)]
pub struct SornFields {
    pub system_name: Option<String>,
    pub pii: Option<String>,
    pub purpose: Option<String>,
    pub retention: Option<String>,
    pub routine_uses: Option<String>,
    pub doc_title: Option<String>,
    pub authority: Option<String>,
}

/// One notice discovered on the listing page.
#[derive(Debug, Clone)]
pub struct Sorn {
    /// Human-readable notice URL, as found on the listing page.
    pub html_url: String,
    /// Machine-readable full-text XML URL, derived at construction.
    pub xml_url: String,
    /// Raw document body, populated by [`Sorn::fetch_document`].
    pub full_xml: Option<String>,
    /// Whether the last document fetch returned a success status.
    pub fetched_ok: bool,
    pub fields: SornFields,
}

impl Sorn {
    pub fn new(html_url: impl Into<String>) -> Self {
        let html_url = html_url.into();
        let xml_url = xml_url_for(&html_url);
        Self {
            html_url,
            xml_url,
            full_xml: None,
            fetched_ok: false,
            fields: SornFields::default(),
        }
    }

    /// GET the derived XML document. The body is stored even on a
    /// non-success status; failures are logged and never abort the caller.
    pub async fn fetch_document(&mut self, client: &Client) -> bool {
        match client.get(&self.xml_url).send().await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    warn!("document fetch returned {} for {}", status, self.xml_url);
                }
                match response.bytes().await {
                    Ok(body) => {
                        // Decode as UTF-8 no matter what the headers claim;
                        // some notices are served with a stale charset.
                        self.full_xml = Some(String::from_utf8_lossy(&body).into_owned());
                        self.fetched_ok = status.is_success();
                    }
                    Err(e) => {
                        warn!("document body unreadable for {}: {}", self.xml_url, e);
                        self.fetched_ok = false;
                    }
                }
            }
            Err(e) => {
                warn!("document fetch failed for {}: {}", self.xml_url, e);
                self.fetched_ok = false;
            }
        }
        self.fetched_ok
    }

    /// Fetch the document, then run the requested extractions in order.
    /// Returns whether the fetch itself succeeded.
    pub async fn extract_all(&mut self, client: &Client, fields: &[Field]) -> bool {
        let fetched = self.fetch_document(client).await;
        for &field in fields {
            self.extract(field);
        }
        fetched
    }

    /// Run one field extraction against the fetched document.
    pub fn extract(&mut self, field: Field) {
        match field {
            Field::SystemName => self.extract_after_heading(field, SYSTEM_NAME_HEADING),
            Field::Pii => self.extract_after_heading(field, PII_HEADING),
            Field::Purpose => self.extract_after_heading(field, PURPOSE_HEADING),
            Field::Retention => self.extract_after_heading(field, RETENTION_HEADING),
            Field::RoutineUses => self.extract_after_heading(field, ROUTINE_USES_HEADING),
            Field::DocTitle => self.extract_doc_title(),
            Field::Authority => {
                // Older notices use the singular heading; try the plural
                // first and fall back when it yields nothing.
                self.extract_after_heading(field, AUTHORITY_HEADINGS[0]);
                if self.fields.authority.as_deref().map_or(true, str::is_empty) {
                    self.extract_after_heading(field, AUTHORITY_HEADINGS[1]);
                }
            }
        }
    }

    /// Read access to a field slot, for printing.
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::SystemName => self.fields.system_name.as_deref(),
            Field::Pii => self.fields.pii.as_deref(),
            Field::Purpose => self.fields.purpose.as_deref(),
            Field::Retention => self.fields.retention.as_deref(),
            Field::RoutineUses => self.fields.routine_uses.as_deref(),
            Field::DocTitle => self.fields.doc_title.as_deref(),
            Field::Authority => self.fields.authority.as_deref(),
        }
    }

    fn extract_after_heading(&mut self, field: Field, heading: &str) {
        let Some(xml) = self.full_xml.as_deref() else {
            warn!("{} not found for {} (no document)", field, self.xml_url);
            return;
        };
        match extract::text_after_heading(xml, heading) {
            Extraction::Found(text) => *self.slot_mut(field) = Some(text),
            Extraction::NotFound => warn!("{} not found for {}", field, self.xml_url),
            Extraction::Malformed(reason) => {
                warn!("{} not extracted for {}: {}", field, self.xml_url, reason)
            }
        }
    }

    fn extract_doc_title(&mut self) {
        let Some(xml) = self.full_xml.as_deref() else {
            warn!("doc-title not found for {} (no document)", self.xml_url);
            return;
        };
        match extract::first_child_text(xml, TITLE_SECTION) {
            Extraction::Found(text) => self.fields.doc_title = Some(text),
            Extraction::NotFound => warn!("doc-title not found for {}", self.xml_url),
            Extraction::Malformed(reason) => {
                warn!("doc-title not extracted for {}: {}", self.xml_url, reason)
            }
        }
    }

    /// Typed slot lookup for a field identifier.
    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::SystemName => &mut self.fields.system_name,
            Field::Pii => &mut self.fields.pii,
            Field::Purpose => &mut self.fields.purpose,
            Field::Retention => &mut self.fields.retention,
            Field::RoutineUses => &mut self.fields.routine_uses,
            Field::DocTitle => &mut self.fields.doc_title,
            Field::Authority => &mut self.fields.authority,
        }
    }
}

/// Derive the machine-readable full-text XML URL from a notice's
/// human-readable URL:
///
/// `https://www.federalregister.gov/documents/2015/06/04/2015-13701/privacy-act-of-1974-...`
/// `https://www.federalregister.gov/documents/full_text/xml/2015/06/04/2015-13701.xml`
///
/// Purely positional: the first four slash-separated segments, the marker,
/// the next four segments, and the `.xml` extension. Inputs with too few
/// segments silently produce a malformed URL that the later fetch reports.
pub fn xml_url_for(html_url: &str) -> String {
    let segments: Vec<&str> = html_url.split('/').collect();
    let head = segments.iter().take(4).copied().collect::<Vec<_>>().join("/");
    let tail = segments
        .iter()
        .skip(4)
        .take(4)
        .copied()
        .collect::<Vec<_>>()
        .join("/");
    format!("{head}/{XML_PATH_MARKER}/{tail}.xml")
}

// ── Tests ──
