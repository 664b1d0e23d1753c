//! Discovery and sequential fetching of the GSA SORN collection.

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::info;

use crate::sorn::{Field, Sorn};

/// GSA's published index of System of Records Notices.
pub const LISTING_URL: &str = "https://www.gsa.gov/reference/gsa-privacy-program/systems-of-records-privacy-act/system-of-records-notices-sorns-privacy-act";

/// Notice links point into the Federal Register; everything else on the
/// page (navigation, related programs) is skipped.
static NOTICE_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https://www\.federalregister\.gov").unwrap());

/// Pause before each notice fetch, as a courtesy to the remote host.
const FETCH_DELAY: Duration = Duration::from_millis(100);

/// Outcome counts for a full fetch pass.
pub struct FetchStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

/// Fetch the listing page and build one record per qualifying link, in page
/// order. Listing retrieval is the one hard dependency of a run; failure
/// here is fatal.
pub async fn discover(client: &Client) -> Result<Vec<Sorn>> {
    info!("Fetching SORN listing: {}", LISTING_URL);
    let html = client
        .get(LISTING_URL)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .context("failed to fetch the SORN listing page")?
        .text()
        .await
        .context("failed to read the SORN listing page")?;

    let sorns: Vec<Sorn> = notice_links(&html).into_iter().map(Sorn::new).collect();
    info!("Discovered {} notice links", sorns.len());
    Ok(sorns)
}

/// Scan every anchor on the page and keep Federal Register links, in
/// document order.
pub fn notice_links(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let anchor = Selector::parse("a").unwrap();
    doc.select(&anchor)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| NOTICE_LINK_RE.is_match(href))
        .map(str::to_string)
        .collect()
}

/// Fetch and extract every record, strictly one at a time.
pub async fn fetch_all(client: &Client, sorns: &mut [Sorn], fields: &[Field]) -> FetchStats {
    let pb = ProgressBar::new(sorns.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
            .unwrap()
            .progress_chars("=> "),
    );

    let mut ok = 0usize;
    let mut errors = 0usize;
    for sorn in sorns.iter_mut() {
        tokio::time::sleep(FETCH_DELAY).await;
        if sorn.extract_all(client, fields).await {
            ok += 1;
        } else {
            errors += 1;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!("Fetched {} notices ({} ok, {} errors)", sorns.len(), ok, errors);
    FetchStats {
        total: sorns.len(),
        ok,
        errors,
    }
}

// ── Tests ──
