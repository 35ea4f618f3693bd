use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::{JobRecord, JobSource, ScrapeContext, SourceError};


/// CSS selectors locating job listings on a server-rendered career page.
///
/// `title`, `location` and `link` are evaluated inside each `item`. The whole
/// text of an item is used as the description that tags are derived from.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ListingSelectors {
    pub(crate) item: &'static str,
    pub(crate) title: &'static str,
    pub(crate) location: &'static str,
    pub(crate) link: &'static str,
}


/// Where and how to find one company's job listings
#[derive(Debug)]
pub(crate) struct CareerPage {
    pub(crate) name: &'static str,
    pub(crate) company: &'static str,
    /// Pages are fetched in this order and their listings concatenated
    pub(crate) urls: &'static [&'static str],
    pub(crate) selectors: ListingSelectors,
}


struct CompiledSelectors {
    item: Selector,
    title: Selector,
    location: Selector,
    link: Selector,
}


impl ListingSelectors {
    fn compile(&self) -> Result<CompiledSelectors, SourceError> {
        fn parse(css: &str) -> Result<Selector, SourceError> {
            Selector::parse(css).map_err(|e| SourceError::Selector {
                selector: css.to_string(),
                reason: format!("{e:?}")
            })
        }

        Ok(CompiledSelectors {
            item: parse(self.item)?,
            title: parse(self.title)?,
            location: parse(self.location)?,
            link: parse(self.link)?,
        })
    }
}


/// Collapses the text of an element into single spaced words
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}


impl CareerPage {
    /// Extracts every listing with a non-empty title from `html`, which was
    /// retrieved from `page_url`.
    pub(crate) fn parse_listings(&self, ctx: &ScrapeContext, page_url: &Url, html: &str) -> Result<Vec<JobRecord>, SourceError> {
        let selectors = self.selectors.compile()?;
        let document = Html::parse_document(html);

        let jobs = document
            .select(&selectors.item)
            .filter_map(|item| {
                let title = item.select(&selectors.title).next().map(element_text)?;
                if title.is_empty() {
                    return None;
                }
                let location = item
                    .select(&selectors.location)
                    .next()
                    .map(element_text)
                    .unwrap_or_default();
                let link = item
                    .select(&selectors.link)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .and_then(|href| page_url.join(href).ok())
                    .map(String::from)
                    .unwrap_or_default();
                let description = element_text(item);

                Some(ctx.create_job_record(self.company, title, location, link, &description))
            })
            .collect();

        Ok(jobs)
    }
}


/// A [`JobSource`] that scrapes a [`CareerPage`] over HTTP
pub(crate) struct CareerPageSource {
    pub(crate) page: &'static CareerPage,
    pub(crate) ctx: Arc<ScrapeContext>,
}


#[async_trait]
impl JobSource for CareerPageSource {
    fn name(&self) -> &str {
        self.page.name
    }

    async fn fetch(&self) -> Result<Vec<JobRecord>, SourceError> {
        let mut jobs = Vec::new();

        for url in self.page.urls {
            let url = Url::parse(url)?;
            let html = self.ctx.client
                .get(url.clone())
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;

            let page = self.page;
            let ctx = self.ctx.clone();
            let found = tokio_rayon::spawn(move || page.parse_listings(&ctx, &url, &html)).await?;
            debug!(source = page.name, count = found.len(), "Parsed career page");
            jobs.extend(found);
        }

        Ok(jobs)
    }
}
