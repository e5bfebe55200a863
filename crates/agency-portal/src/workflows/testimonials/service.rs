use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use super::domain::{publishable, TestimonialItem};
use super::selector::TestimonialSelector;
use crate::records::{FindQuery, Record, RecordGateway, RecordGatewayError, RATINGS_TABLE};

/// Payload of the testimonial endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TestimonialFeed {
    #[serde(rename = "testimonios")]
    pub testimonials: Vec<TestimonialItem>,
    pub total: usize,
    #[serde(rename = "mensaje")]
    pub message: String,
}

impl TestimonialFeed {
    pub fn new(testimonials: Vec<TestimonialItem>) -> Self {
        let total = testimonials.len();
        let message = if total == 0 {
            "Sin testimonios disponibles".to_string()
        } else {
            format!("Mostrando {total} opiniones")
        };
        Self {
            testimonials,
            total,
            message,
        }
    }
}

pub struct TestimonialService {
    gateway: Arc<dyn RecordGateway>,
    selector: TestimonialSelector,
}

impl TestimonialService {
    pub fn new(gateway: Arc<dyn RecordGateway>) -> Self {
        Self::with_selector(gateway, TestimonialSelector::default())
    }

    pub fn with_selector(gateway: Arc<dyn RecordGateway>, selector: TestimonialSelector) -> Self {
        Self { gateway, selector }
    }

    /// Fetches every publishable rating and samples the carousel from them.
    pub async fn feed(&self) -> Result<TestimonialFeed, RecordGatewayError> {
        let records = self
            .gateway
            .find(RATINGS_TABLE, FindQuery::matching(publishable()))
            .await?;
        debug!(candidates = records.len(), "publishable ratings fetched");

        Ok(self.curate_now(&records))
    }

    fn curate_now(&self, records: &[Record]) -> TestimonialFeed {
        self.curate(records, Utc::now(), &mut rand::thread_rng())
    }

    /// Projects rows at `now` and runs the selector with the given randomness.
    pub fn curate<R: Rng + ?Sized>(
        &self,
        records: &[Record],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> TestimonialFeed {
        let items = records
            .iter()
            .map(|record| TestimonialItem::from_record(record, now))
            .collect();
        TestimonialFeed::new(self.selector.select(items, rng))
    }
}
