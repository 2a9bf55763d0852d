//! Filter & Sort Pipeline (spec §4.F): success-only filtering, fee/delivery-
//! time/custom predicates, then a stable multi-criterion sort. `Vec::sort_by`
//! is used throughout because Rust's slice sort is already stable, which is
//! exactly what spec §4.F and the testable properties in spec §8 require —
//! no custom merge sort is needed to get that guarantee.

use std::cmp::Ordering;

use quote_model::{Quote, QuoteRequestOptions, SortBy};

/// Runs the full pipeline: filter stages in spec order, then the selected
/// stable sort.
pub fn filter_and_sort(all_providers: &[Quote], options: &QuoteRequestOptions) -> Vec<Quote> {
    let mut quotes: Vec<Quote> = all_providers
        .iter()
        .filter(|q| q.success)
        .filter(|q| match options.max_fee {
            Some(max_fee) => q.fee <= max_fee,
            None => true,
        })
        .filter(|q| match options.max_delivery_time_minutes {
            Some(limit) => q.delivery_time_minutes.is_some_and(|m| m <= limit),
            None => true,
        })
        .filter(|q| match &options.custom_predicate {
            Some(predicate) => (predicate.0)(q),
            None => true,
        })
        .cloned()
        .collect();

    quotes.sort_by(|a, b| compare(a, b, options.sort_by));
    quotes
}

fn compare(a: &Quote, b: &Quote, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::BestRate => rate_desc(a, b)
            .then_with(|| fee_asc(a, b))
            .then_with(|| delivery_asc(a, b))
            .then_with(|| provider_id_asc(a, b)),
        SortBy::LowestFee => fee_asc(a, b)
            .then_with(|| rate_desc(a, b))
            .then_with(|| delivery_asc(a, b))
            .then_with(|| provider_id_asc(a, b)),
        SortBy::FastestTime => delivery_asc(a, b)
            .then_with(|| fee_asc(a, b))
            .then_with(|| rate_desc(a, b))
            .then_with(|| provider_id_asc(a, b)),
        SortBy::BestValue => value_desc(a, b)
            .then_with(|| fee_asc(a, b))
            .then_with(|| provider_id_asc(a, b)),
    }
}

fn rate_desc(a: &Quote, b: &Quote) -> Ordering {
    b.exchange_rate.unwrap_or_default().cmp(&a.exchange_rate.unwrap_or_default())
}

fn fee_asc(a: &Quote, b: &Quote) -> Ordering {
    a.fee.cmp(&b.fee)
}

/// `None` sorts after every concrete value, matching the "nulls last"
/// requirement for `fastest_time` (spec §4.F); `best_rate`'s delivery-time
/// tie-break reuses the same rule for consistency.
fn delivery_asc(a: &Quote, b: &Quote) -> Ordering {
    match (a.delivery_time_minutes, b.delivery_time_minutes) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn value_desc(a: &Quote, b: &Quote) -> Ordering {
    b.effective_value().cmp(&a.effective_value())
}

fn provider_id_asc(a: &Quote, b: &Quote) -> Ordering {
    a.provider_id.cmp(&b.provider_id)
}
