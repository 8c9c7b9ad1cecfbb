//! Quote ordering and the "Recommended" / "Lowest Price" tags.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};

use super::entities::{Quote, QuoteId};

/// Sorting options for the quote list of one auction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteSort {
    #[default]
    Recommended,
    PriceLow,
    PriceHigh,
    Fastest,
    Rating,
}

impl QuoteSort {
    pub const ALL: [QuoteSort; 5] = [
        QuoteSort::Recommended,
        QuoteSort::PriceLow,
        QuoteSort::PriceHigh,
        QuoteSort::Fastest,
        QuoteSort::Rating,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Recommended => "Recommended",
            Self::PriceLow => "Price: Low to High",
            Self::PriceHigh => "Price: High to Low",
            Self::Fastest => "Fastest Delivery",
            Self::Rating => "Highest Rated",
        }
    }
}

/// Sort quotes in place. `sort_by` is stable, so ties keep their input order.
pub fn sort_quotes(quotes: &mut [Quote], sort: QuoteSort) {
    quotes.sort_by(|a, b| match sort {
        QuoteSort::PriceLow => compare_f64(a.quote_amount, b.quote_amount),
        QuoteSort::PriceHigh => compare_f64(b.quote_amount, a.quote_amount),
        QuoteSort::Fastest => compare_delivery(
            a.estimated_delivery_date.as_deref(),
            b.estimated_delivery_date.as_deref(),
        ),
        QuoteSort::Rating => compare_f64(
            b.user.rating.unwrap_or(0.0),
            a.user.rating.unwrap_or(0.0),
        ),
        QuoteSort::Recommended => compare_f64(b.score.unwrap_or(0.0), a.score.unwrap_or(0.0)),
    });
}

fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

// Unparseable or missing dates go after every valid date.
fn compare_delivery(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a.and_then(parse_calendar_date), b.and_then(parse_calendar_date)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Parses `YYYY-MM-DD` or an RFC 3339 timestamp down to its calendar date.
pub fn parse_calendar_date(raw: &str) -> Option<Date> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(timestamp) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(timestamp.date());
    }
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    Date::parse(date_part, format_description!("[year]-[month]-[day]")).ok()
}

/// Minimum amount across the quotes; `None` for an empty list.
pub fn lowest_amount(quotes: &[Quote]) -> Option<f64> {
    quotes
        .iter()
        .map(|quote| quote.quote_amount)
        .filter(|amount| amount.is_finite())
        .min_by(|a, b| compare_f64(*a, *b))
}

/// The quote that heads the list under [`QuoteSort::Recommended`].
pub fn recommended_quote(quotes: &[Quote]) -> Option<QuoteId> {
    let mut ordered = quotes.to_vec();
    sort_quotes(&mut ordered, QuoteSort::Recommended);
    ordered.first().map(|quote| quote.id)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeltaDirection {
    Up,
    Down,
    Flat,
}

/// Relative distance of a quote from the lowest price, in whole percent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceDelta {
    pub percent: i64,
}

impl PriceDelta {
    pub fn direction(&self) -> DeltaDirection {
        match self.percent.cmp(&0) {
            Ordering::Greater => DeltaDirection::Up,
            Ordering::Less => DeltaDirection::Down,
            Ordering::Equal => DeltaDirection::Flat,
        }
    }
}

/// `round((amount - lowest) / lowest * 100)`, rounding halves upwards.
/// Returns `None` when there is no positive lowest price to compare against.
pub fn price_delta(amount: f64, lowest: f64) -> Option<PriceDelta> {
    if !(lowest.is_finite() && lowest > 0.0 && amount.is_finite()) {
        return None;
    }
    let ratio = ((amount - lowest) / lowest) * 100.0;
    Some(PriceDelta {
        percent: (ratio + 0.5).floor() as i64,
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct RankedQuote {
    pub quote: Quote,
    pub recommended: bool,
    pub lowest_price: bool,
    /// Present only for quotes above the lowest price.
    pub delta: Option<PriceDelta>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuoteRanking {
    pub entries: Vec<RankedQuote>,
    pub lowest_amount: Option<f64>,
    pub recommended_id: Option<QuoteId>,
}

/// Orders the quotes of one auction for display and attaches the tags.
pub fn rank_quotes(quotes: &[Quote], sort: QuoteSort) -> QuoteRanking {
    let lowest = lowest_amount(quotes);
    let recommended_id = recommended_quote(quotes);

    let mut ordered = quotes.to_vec();
    sort_quotes(&mut ordered, sort);

    let entries = ordered
        .into_iter()
        .map(|quote| {
            let lowest_price = lowest
                .map(|min| quote.quote_amount == min)
                .unwrap_or(false);
            let delta = match lowest {
                Some(min) if !lowest_price => price_delta(quote.quote_amount, min),
                _ => None,
            };
            RankedQuote {
                recommended: recommended_id == Some(quote.id),
                lowest_price,
                delta,
                quote,
            }
        })
        .collect();

    QuoteRanking {
        entries,
        lowest_amount: lowest,
        recommended_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::QuoteUser;

    impl QuoteRanking {
        fn lowest_price_ids(&self) -> Vec<QuoteId> {
            self.entries
                .iter()
                .filter(|entry| entry.lowest_price)
                .map(|entry| entry.quote.id)
                .collect()
        }

        fn ids(&self) -> Vec<QuoteId> {
            self.entries.iter().map(|entry| entry.quote.id).collect()
        }
    }

    fn quote(id: QuoteId, amount: f64) -> Quote {
        Quote {
            id,
            auction_id: 7,
            quote_amount: amount,
            ..Quote::default()
        }
    }

    fn sample() -> Vec<Quote> {
        vec![quote(1, 1000.0), quote(2, 1200.0), quote(3, 1000.0)]
    }

    #[test]
    fn price_low_keeps_tied_quotes_in_input_order() {
        let ranking = rank_quotes(&sample(), QuoteSort::PriceLow);
        assert_eq!(ranking.ids(), vec![1, 3, 2]);
    }

    #[test]
    fn all_minimal_quotes_are_tagged_lowest() {
        let ranking = rank_quotes(&sample(), QuoteSort::PriceLow);
        assert_eq!(ranking.lowest_price_ids(), vec![1, 3]);
        assert_eq!(ranking.lowest_amount, Some(1000.0));
        for entry in ranking.entries.iter().filter(|entry| entry.lowest_price) {
            assert_eq!(entry.quote.quote_amount, 1000.0);
            assert!(entry.delta.is_none());
        }
    }

    #[test]
    fn delta_is_rounded_percentage_over_lowest() {
        let ranking = rank_quotes(&sample(), QuoteSort::PriceLow);
        let pricier = ranking
            .entries
            .iter()
            .find(|entry| entry.quote.id == 2)
            .expect("quote 2 ranked");
        let delta = pricier.delta.expect("delta for non-lowest quote");
        assert_eq!(delta.percent, 20);
        assert_eq!(delta.direction(), DeltaDirection::Up);
    }

    #[test]
    fn delta_rounds_halves_up() {
        assert_eq!(price_delta(1005.0, 1000.0).map(|d| d.percent), Some(1));
        assert_eq!(price_delta(1004.9, 1000.0).map(|d| d.percent), Some(0));
        assert_eq!(price_delta(500.0, 0.0), None);
    }

    #[test]
    fn price_high_is_reverse_of_price_low_without_ties() {
        let quotes = vec![
            quote(1, 1500.0),
            quote(2, 900.0),
            quote(3, 1200.0),
            quote(4, 2100.0),
        ];
        let low = rank_quotes(&quotes, QuoteSort::PriceLow).ids();
        let mut high = rank_quotes(&quotes, QuoteSort::PriceHigh).ids();
        high.reverse();
        assert_eq!(low, high);
    }

    #[test]
    fn recommended_tag_follows_score_whatever_the_display_order() {
        let mut quotes = sample();
        quotes[1].score = Some(9.5);
        quotes[2].score = Some(4.0);

        for sort in QuoteSort::ALL {
            let ranking = rank_quotes(&quotes, sort);
            let tagged: Vec<_> = ranking
                .entries
                .iter()
                .filter(|entry| entry.recommended)
                .map(|entry| entry.quote.id)
                .collect();
            assert_eq!(tagged, vec![2], "sort {sort:?}");
        }
        assert_eq!(rank_quotes(&quotes, QuoteSort::Recommended).ids()[0], 2);
    }

    #[test]
    fn missing_scores_default_to_zero() {
        let mut quotes = sample();
        quotes[2].score = Some(-1.0);
        let ranking = rank_quotes(&quotes, QuoteSort::Recommended);
        assert_eq!(ranking.ids(), vec![1, 2, 3]);
        assert_eq!(ranking.recommended_id, Some(1));
    }

    #[test]
    fn rating_sorts_descending_with_missing_as_zero() {
        let mut quotes = sample();
        quotes[0].user = QuoteUser {
            rating: None,
            ..QuoteUser::default()
        };
        quotes[1].user.rating = Some(4.5);
        quotes[2].user.rating = Some(3.0);
        assert_eq!(rank_quotes(&quotes, QuoteSort::Rating).ids(), vec![2, 3, 1]);
    }

    #[test]
    fn fastest_puts_unparseable_dates_last() {
        let mut quotes = vec![quote(1, 1.0), quote(2, 1.0), quote(3, 1.0), quote(4, 1.0)];
        quotes[0].estimated_delivery_date = Some("not a date".to_string());
        quotes[1].estimated_delivery_date = Some("2024-06-03".to_string());
        quotes[2].estimated_delivery_date = None;
        quotes[3].estimated_delivery_date = Some("2024-06-01T08:30:00Z".to_string());
        assert_eq!(rank_quotes(&quotes, QuoteSort::Fastest).ids(), vec![4, 2, 1, 3]);
    }

    #[test]
    fn calendar_date_accepts_datetime_without_offset() {
        let parsed = parse_calendar_date("2024-02-29T10:00:00").expect("date prefix parses");
        assert_eq!(parsed.to_string(), "2024-02-29");
        assert!(parse_calendar_date("2024-13-01").is_none());
    }

    #[test]
    fn empty_list_has_no_tags() {
        let ranking = rank_quotes(&[], QuoteSort::PriceLow);
        assert!(ranking.entries.is_empty());
        assert_eq!(ranking.lowest_amount, None);
        assert_eq!(ranking.recommended_id, None);
    }
}
