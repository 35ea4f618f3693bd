use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::keywords::TagExtractor;

pub(crate) use self::career_page::{CareerPage, CareerPageSource, ListingSelectors};

mod career_page;
pub(crate) mod companies;


/// One job listing as reported to the channel.
///
/// Every field may be empty. There is no identity key, so the same job can be
/// reported on consecutive days.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct JobRecord {
    pub(crate) company: String,
    pub(crate) title: String,
    pub(crate) location: String,
    pub(crate) link: String,
    pub(crate) keywords: Vec<String>,
    pub(crate) tech_skills: Vec<String>,
}


#[derive(Debug, Error)]
pub(crate) enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid career page URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Invalid selector {selector:?}: {reason}")]
    Selector {
        selector: String,
        reason: String
    },
}


/// State shared by every source during a scrape
pub(crate) struct ScrapeContext {
    pub(crate) client: reqwest::Client,
    pub(crate) tags: TagExtractor,
    pub(crate) keywords_per_job: usize,
    pub(crate) skills_per_job: usize,
}


impl ScrapeContext {
    /// Builds a record, deriving its tags from `description`.
    pub(crate) fn create_job_record(&self, company: &str, title: String, location: String, link: String, description: &str) -> JobRecord {
        JobRecord {
            company: company.to_string(),
            title,
            location,
            link,
            keywords: self.tags.keywords(description, self.keywords_per_job),
            tech_skills: self.tags.tech_skills(description, self.skills_per_job),
        }
    }
}


/// A provider of job listings, usually one company's career site.
#[async_trait]
pub(crate) trait JobSource: Send + Sync {
    /// Stable name used to enable or disable the source in the config
    fn name(&self) -> &str;

    /// Fetches the current listings.
    ///
    /// An empty list is a valid result, it is what client-side rendered pages produce.
    async fn fetch(&self) -> Result<Vec<JobRecord>, SourceError>;
}


/// Calls every source once, in order, and concatenates their listings.
///
/// A failing source is logged and contributes nothing.
pub(crate) async fn scrape_all(sources: &[Arc<dyn JobSource>]) -> Vec<JobRecord> {
    let mut all_jobs = Vec::new();
    for source in sources {
        match source.fetch().await {
            Ok(jobs) => {
                debug!(source = source.name(), count = jobs.len(), "Scraped job listings");
                all_jobs.extend(jobs);
            }
            Err(e) => warn!(source = source.name(), error = %e, "Failed to scrape source, skipping it"),
        }
    }
    all_jobs
}
