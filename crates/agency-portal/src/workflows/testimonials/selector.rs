use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use super::domain::{AgeBucket, TestimonialItem};

/// How many testimonials to show and how they split between good and other ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionQuota {
    pub total: usize,
    pub good: usize,
    pub other: usize,
    /// Minimum stars for a rating to count as good.
    pub good_threshold: u8,
}

impl Default for SelectionQuota {
    fn default() -> Self {
        Self {
            total: 10,
            good: 7,
            other: 3,
            good_threshold: 3,
        }
    }
}

#[derive(Debug, Default)]
struct Pools {
    recent_good: Vec<TestimonialItem>,
    old_good: Vec<TestimonialItem>,
    recent_other: Vec<TestimonialItem>,
    old_other: Vec<TestimonialItem>,
}

impl Pools {
    fn partition(items: Vec<TestimonialItem>, threshold: u8) -> Self {
        let mut seen = HashSet::new();
        let mut pools = Self::default();
        for item in items {
            if !seen.insert(item.id.clone()) {
                continue;
            }
            let pool = match (item.stars >= threshold, item.bucket) {
                (true, AgeBucket::Recent) => &mut pools.recent_good,
                (true, AgeBucket::Old) => &mut pools.old_good,
                (false, AgeBucket::Recent) => &mut pools.recent_other,
                (false, AgeBucket::Old) => &mut pools.old_other,
            };
            pool.push(item);
        }
        pools
    }

    fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.recent_good.shuffle(rng);
        self.old_good.shuffle(rng);
        self.recent_other.shuffle(rng);
        self.old_other.shuffle(rng);
    }

    fn into_leftovers(self) -> Vec<TestimonialItem> {
        let mut leftovers = self.recent_good;
        leftovers.extend(self.old_good);
        leftovers.extend(self.recent_other);
        leftovers.extend(self.old_other);
        leftovers
    }
}

/// Fills `wanted` slots from the preferred pool first, then the fallback pool.
fn fill(
    selection: &mut Vec<TestimonialItem>,
    wanted: usize,
    preferred: &mut Vec<TestimonialItem>,
    fallback: &mut Vec<TestimonialItem>,
) {
    let from_preferred = wanted.min(preferred.len());
    selection.extend(preferred.drain(..from_preferred));
    let from_fallback = (wanted - from_preferred).min(fallback.len());
    selection.extend(fallback.drain(..from_fallback));
}

/// Quota-filling sampler for the public testimonial carousel.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestimonialSelector {
    quota: SelectionQuota,
}

impl TestimonialSelector {
    pub fn new(quota: SelectionQuota) -> Self {
        Self { quota }
    }

    pub fn quota(&self) -> SelectionQuota {
        self.quota
    }

    /// Returns up to `quota.total` distinct items. Other ratings are placed first from
    /// recent then old rows, good ratings likewise, and any shortfall is filled from
    /// whatever is left.
    pub fn select<R: Rng + ?Sized>(
        &self,
        items: Vec<TestimonialItem>,
        rng: &mut R,
    ) -> Vec<TestimonialItem> {
        let mut pools = Pools::partition(items, self.quota.good_threshold);
        pools.shuffle(rng);

        let mut selection = Vec::with_capacity(self.quota.total);
        fill(
            &mut selection,
            self.quota.other,
            &mut pools.recent_other,
            &mut pools.old_other,
        );
        fill(
            &mut selection,
            self.quota.good,
            &mut pools.recent_good,
            &mut pools.old_good,
        );
        selection.truncate(self.quota.total);

        let missing = self.quota.total.saturating_sub(selection.len());
        if missing > 0 {
            let mut leftovers = pools.into_leftovers();
            leftovers.shuffle(rng);
            selection.extend(leftovers.into_iter().take(missing));
        }

        selection.shuffle(rng);
        selection
    }
}
