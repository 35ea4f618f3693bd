use std::sync::Arc;

use tracing::info;

use crate::{
    delivery::{dispatch, DeliveryChannel, DeliveryError},
    page_scrapers::{scrape_all, JobSource},
    report::compose_message,
};


/// Scrape, format and send, end to end.
pub(crate) struct Pipeline {
    pub(crate) sources: Vec<Arc<dyn JobSource>>,
    pub(crate) channel: Arc<dyn DeliveryChannel>,
    pub(crate) chat_id: String,
    pub(crate) parse_mode: String,
    pub(crate) max_segment_len: usize,
}


impl Pipeline {
    /// Runs once and returns how many jobs were reported.
    ///
    /// Sources that fail are skipped. A message that cannot be delivered fails the run.
    pub(crate) async fn run(&self) -> Result<usize, DeliveryError> {
        info!(sources = self.sources.len(), "Scraping jobs from company career pages");
        let jobs = scrape_all(&self.sources).await;
        if jobs.is_empty() {
            info!("No jobs found");
        }

        let message = compose_message(&jobs);
        dispatch(self.channel.as_ref(), &self.chat_id, &message, self.max_segment_len, &self.parse_mode).await?;
        info!(jobs = jobs.len(), "Jobs sent to the channel");
        Ok(jobs.len())
    }
}
