//! The career pages scraped every day.
//!
//! Most of these sites render their job search client-side, in which case the
//! fetched HTML holds no listings and the company simply contributes nothing.

use std::sync::Arc;

use fxhash::FxHashSet;

use super::{CareerPage, CareerPageSource, JobSource, ListingSelectors, ScrapeContext};

const COMMON_LISTING: ListingSelectors = ListingSelectors {
    item: ".job-listing, .job-card, li.job",
    title: ".job-title, h2, h3",
    location: ".job-location, .location",
    link: "a[href]",
};

const CAREER_PAGES: [CareerPage; 9] = [
    CareerPage {
        name: "tcs",
        company: "TCS",
        urls: &["https://www.tcs.com/careers", "https://www.tcs.com/careers/careers-home/jobs"],
        selectors: COMMON_LISTING,
    },
    CareerPage {
        name: "infosys",
        company: "Infosys",
        urls: &["https://www.infosys.com/careers.html"],
        selectors: COMMON_LISTING,
    },
    CareerPage {
        name: "wipro",
        company: "Wipro",
        urls: &["https://careers.wipro.com/"],
        selectors: ListingSelectors {
            item: "tr.data-row",
            title: "a.jobTitle-link",
            location: "span.jobLocation",
            link: "a.jobTitle-link",
        },
    },
    CareerPage {
        name: "hcl",
        company: "HCL",
        urls: &["https://www.hcltech.com/careers"],
        selectors: COMMON_LISTING,
    },
    CareerPage {
        name: "techmahindra",
        company: "Tech Mahindra",
        urls: &["https://careers.techmahindra.com/"],
        selectors: COMMON_LISTING,
    },
    CareerPage {
        name: "lti",
        company: "LTI",
        urls: &["https://careers.lntinfotech.com/job-search-results"],
        selectors: ListingSelectors {
            item: ".job-search-results .job-tile, .job-listing",
            title: ".job-tile-title, .job-title",
            location: ".job-tile-location, .location",
            link: "a[href]",
        },
    },
    CareerPage {
        name: "mindtree",
        company: "Mindtree",
        urls: &["https://www.mindtree.com/careers"],
        selectors: COMMON_LISTING,
    },
    CareerPage {
        name: "persistent",
        company: "Persistent Systems",
        urls: &["https://www.persistent.com/careers/"],
        selectors: COMMON_LISTING,
    },
    CareerPage {
        name: "hexaware",
        company: "Hexaware",
        urls: &["https://hexaware.com/careers/"],
        selectors: COMMON_LISTING,
    },
];

/// Scraper names in the order they run
pub(crate) const DEFAULT_SCRAPERS: [&str; 9] = [
    CAREER_PAGES[0].name,
    CAREER_PAGES[1].name,
    CAREER_PAGES[2].name,
    CAREER_PAGES[3].name,
    CAREER_PAGES[4].name,
    CAREER_PAGES[5].name,
    CAREER_PAGES[6].name,
    CAREER_PAGES[7].name,
    CAREER_PAGES[8].name,
];


/// Builds the enabled sources in their fixed order.
pub(crate) fn registry(ctx: Arc<ScrapeContext>, enabled_scrapers: &FxHashSet<String>) -> Vec<Arc<dyn JobSource>> {
    static PAGES: [CareerPage; 9] = CAREER_PAGES;

    PAGES
        .iter()
        .filter(|page| enabled_scrapers.contains(page.name))
        .map(|page| Arc::new(CareerPageSource { page, ctx: ctx.clone() }) as Arc<dyn JobSource>)
        .collect()
}
