use std::{
    collections::{BTreeMap, HashMap},
    time::{Duration, SystemTime},
};

use serde::{Deserialize, Serialize};

use super::entities::{Auction, AuctionId, CurrentUser, Quote};
use super::ranking::QuoteSort;

#[derive(Clone, Debug, Default)]
pub struct AppState {
    /// `None` until the user fills in their identity on the settings page.
    pub current_user: Option<CurrentUser>,
    /// Last sort strategy picked in the quote review panel.
    pub quote_sort: QuoteSort,
    /// Quotes received by the current org across its auctions.
    pub received_quotes: Vec<Quote>,
    pub received_total: u64,
    /// Open auctions shown on the active bids screen.
    pub active_auctions: Vec<Auction>,
    /// Quotes the current transporter has submitted.
    pub my_quotes: Vec<Quote>,
    pub my_quotes_total: u64,
    pub fetches: FetchTimestamps,
}

impl AppState {
    pub fn apply_persisted(&mut self, persisted: PersistedSession) {
        self.current_user = persisted.current_user;
        self.quote_sort = persisted.quote_sort;
    }

    pub fn to_persisted(&self) -> PersistedSession {
        PersistedSession {
            current_user: self.current_user.clone(),
            quote_sort: self.quote_sort,
        }
    }

    /// Received quotes grouped per auction, newest auction id first.
    pub fn quotes_by_auction(&self) -> Vec<AuctionQuotes> {
        let mut grouped: BTreeMap<AuctionId, AuctionQuotes> = BTreeMap::new();
        for quote in &self.received_quotes {
            let entry = grouped
                .entry(quote.auction_id)
                .or_insert_with(|| AuctionQuotes {
                    auction_id: quote.auction_id,
                    auction: None,
                    quotes: Vec::new(),
                });
            if entry.auction.is_none() {
                entry.auction = quote.auction.clone();
            }
            entry.quotes.push(quote.clone());
        }
        grouped.into_values().rev().collect()
    }
}

/// All quotes of one auction together with its details, when known.
#[derive(Clone, Debug, PartialEq)]
pub struct AuctionQuotes {
    pub auction_id: AuctionId,
    pub auction: Option<Auction>,
    pub quotes: Vec<Quote>,
}

impl AuctionQuotes {
    pub fn title(&self) -> String {
        self.auction
            .as_ref()
            .map(|auction| format!("#{} · {}", auction.id, auction.material))
            .unwrap_or_else(|| format!("Auction #{}", self.auction_id))
    }

    /// Builds the group for `auction_id` out of an unfiltered quote list,
    /// taking auction details from the first quote that embeds them.
    pub fn from_quotes(
        auction_id: AuctionId,
        auction: Option<Auction>,
        quotes: impl IntoIterator<Item = Quote>,
    ) -> Self {
        let quotes: Vec<Quote> = quotes
            .into_iter()
            .filter(|quote| quote.auction_id == auction_id)
            .collect();
        let auction = auction.or_else(|| quotes.iter().find_map(|quote| quote.auction.clone()));
        Self {
            auction_id,
            auction,
            quotes,
        }
    }

    /// True when any quote is approved or the auction names an approved vendor.
    pub fn has_approval(&self) -> bool {
        self.quotes.iter().any(Quote::is_approved)
            || self.auction.as_ref().is_some_and(Auction::is_approved)
    }
}

#[derive(Clone, Debug, Default)]
pub struct FetchTimestamps {
    entries: HashMap<Resource, SystemTime>,
}

impl FetchTimestamps {
    pub fn record_fetch(&mut self, resource: Resource, fetched_at: SystemTime) {
        self.entries.insert(resource, fetched_at);
    }

    pub fn fetched_at(&self, resource: Resource) -> Option<SystemTime> {
        self.entries.get(&resource).copied()
    }

    /// Human readable age of the last fetch, e.g. `"42s ago"`.
    pub fn age_label(&self, resource: Resource) -> String {
        let Some(fetched_at) = self.fetched_at(resource) else {
            return "never".to_string();
        };
        let secs = fetched_at
            .elapsed()
            .unwrap_or(Duration::from_secs(0))
            .as_secs();
        if secs < 60 {
            format!("{secs}s ago")
        } else if secs < 3600 {
            format!("{}m ago", secs / 60)
        } else {
            format!("{}h ago", secs / 3600)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    ReceivedQuotes,
    ActiveAuctions,
    MyQuotes,
}

impl Resource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ReceivedQuotes => "Received quotes",
            Self::ActiveAuctions => "Active auctions",
            Self::MyQuotes => "My quotes",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(default)]
    pub current_user: Option<CurrentUser>,
    #[serde(default)]
    pub quote_sort: QuoteSort,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(id: i64, auction_id: AuctionId) -> Quote {
        Quote {
            id,
            auction_id,
            quote_amount: 100.0 * id as f64,
            ..Quote::default()
        }
    }

    #[test]
    fn groups_quotes_per_auction_newest_first() {
        let mut with_details = quote(2, 10);
        with_details.auction = Some(Auction {
            id: 10,
            material: "Steel coils".to_string(),
            ..Auction::default()
        });
        let state = AppState {
            received_quotes: vec![quote(1, 10), with_details, quote(3, 11)],
            ..AppState::default()
        };

        let groups = state.quotes_by_auction();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].auction_id, 11);
        assert_eq!(groups[1].quotes.len(), 2);
        assert_eq!(groups[1].title(), "#10 · Steel coils");
        assert_eq!(groups[0].title(), "Auction #11");
    }

    #[test]
    fn approved_vendor_marks_group_approved_without_approved_quote() {
        let mut group = AuctionQuotes::from_quotes(40, None, vec![quote(1, 40)]);
        assert!(!group.has_approval());
        group.auction = Some(Auction {
            id: 40,
            approved_vendor: Some("Swift Haulers".to_string()),
            ..Auction::default()
        });
        assert!(group.has_approval());
    }

    #[test]
    fn from_quotes_keeps_only_the_auctions_rows() {
        let mut embedded = quote(4, 40);
        embedded.auction = Some(Auction {
            id: 40,
            material: "Cement".to_string(),
            ..Auction::default()
        });
        let group = AuctionQuotes::from_quotes(
            40,
            None,
            vec![quote(1, 40), quote(2, 41), quote(3, 40), embedded],
        );
        let ids: Vec<_> = group.quotes.iter().map(|quote| quote.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert_eq!(group.title(), "#40 · Cement");
    }

    #[test]
    fn persisted_session_round_trips_user_and_sort() {
        let mut state = AppState::default();
        state.current_user = Some(CurrentUser {
            user_id: 1,
            user_name: "anita".to_string(),
            org_id: 4,
            ..CurrentUser::default()
        });
        state.quote_sort = QuoteSort::Fastest;

        let json = serde_json::to_string(&state.to_persisted()).expect("serialize session");
        let restored: PersistedSession = serde_json::from_str(&json).expect("parse session");
        let mut fresh = AppState::default();
        fresh.apply_persisted(restored);
        assert_eq!(fresh.current_user, state.current_user);
        assert_eq!(fresh.quote_sort, QuoteSort::Fastest);
    }

    #[test]
    fn never_fetched_resource_has_placeholder_age() {
        let timestamps = FetchTimestamps::default();
        assert_eq!(timestamps.age_label(Resource::MyQuotes), "never");
    }
}
