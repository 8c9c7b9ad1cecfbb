use serde::{Deserialize, Serialize};

/// Identifier of an auction (shipment request) on the brokerage backend.
pub type AuctionId = i64;

/// Identifier of a single quote submitted against an auction.
pub type QuoteId = i64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AuctionStatus {
    #[default]
    Open,
    Quoted,
    Expired,
}

impl AuctionStatus {
    /// Maps the backend's free-form status string. Unknown values count as open.
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("quoted") => Self::Quoted,
            Some(value) if value.eq_ignore_ascii_case("expired") => Self::Expired,
            Some(value) if value.eq_ignore_ascii_case("closed") => Self::Expired,
            _ => Self::Open,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Quoted => "Quoted",
            Self::Expired => "Expired",
        }
    }
}

/// A shipment request open for competitive quotes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Auction {
    pub id: AuctionId,
    pub material: String,
    pub loading_address: String,
    pub unloading_address: String,
    pub vehicle_type: Option<String>,
    pub vehicle_count: Option<u32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub status: AuctionStatus,
    /// Organization whose quote was approved, once an approval happened.
    pub approved_vendor: Option<String>,
    pub end_date: Option<String>,
}

impl Auction {
    pub fn lane(&self) -> String {
        format!("{} → {}", self.loading_address, self.unloading_address)
    }

    pub fn is_approved(&self) -> bool {
        self.approved_vendor.is_some()
    }

    /// `Quoted` only means bids have arrived; revising a bid stays possible
    /// until the auction expires or a vendor is approved.
    pub fn accepts_bids(&self) -> bool {
        self.status != AuctionStatus::Expired && !self.is_approved()
    }

    /// Returns true when `amount` lies inside the known price band.
    /// Missing bounds are treated as open-ended.
    pub fn within_band(&self, amount: f64) -> bool {
        let above_min = self.min_price.map(|min| amount >= min).unwrap_or(true);
        let below_max = self.max_price.map(|max| amount <= max).unwrap_or(true);
        above_min && below_max
    }

    pub fn price_band_label(&self) -> String {
        match (self.min_price, self.max_price) {
            (Some(min), Some(max)) => format!("{min:.0} – {max:.0}"),
            (Some(min), None) => format!("from {min:.0}"),
            (None, Some(max)) => format!("up to {max:.0}"),
            (None, None) => "open".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum QuoteStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl QuoteStatus {
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("approved") => Self::Approved,
            Some(value) if value.eq_ignore_ascii_case("rejected") => Self::Rejected,
            _ => Self::Pending,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

/// The transporter organization behind a quote.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuoteUser {
    pub user_id: Option<i64>,
    pub organization_name: String,
    pub rating: Option<f64>,
}

/// One vendor's priced bid against an auction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Quote {
    pub id: QuoteId,
    pub auction_id: AuctionId,
    pub quote_amount: f64,
    pub estimated_delivery_date: Option<String>,
    pub created_date: Option<String>,
    pub user: QuoteUser,
    /// Ranking score computed by the backend; never derived client-side.
    pub score: Option<f64>,
    pub status: QuoteStatus,
    pub approved_by: Option<String>,
    pub approved_on: Option<String>,
    /// Auction details when the listing endpoint embeds them.
    pub auction: Option<Auction>,
}

impl Quote {
    pub fn is_approved(&self) -> bool {
        self.status == QuoteStatus::Approved
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[default]
    Shipper,
    Transporter,
}

impl UserRole {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Shipper => "Shipper",
            Self::Transporter => "Transporter",
        }
    }
}

/// The signed-in back-office user. Passed explicitly to every operation that
/// needs an org or user identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user_id: i64,
    pub user_name: String,
    pub org_id: i64,
    #[serde(default)]
    pub organization_name: String,
    #[serde(default)]
    pub role: UserRole,
}

/// Paging parameters shared by every list endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub count: u32,
    /// One-based page index, as the backend expects.
    pub page: u32,
    pub search: String,
    pub org_id: i64,
}

impl PageRequest {
    pub fn first(org_id: i64, count: u32) -> Self {
        Self {
            count,
            page: 1,
            search: String::new(),
            org_id,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total_count: u64,
}

/// Number of pages needed for `total_count` rows; never less than one.
pub fn page_count(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 || total_count == 0 {
        return 1;
    }
    let pages = total_count.div_ceil(page_size as u64);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_map_case_insensitively() {
        assert_eq!(QuoteStatus::from_wire(Some("APPROVED")), QuoteStatus::Approved);
        assert_eq!(QuoteStatus::from_wire(Some(" rejected ")), QuoteStatus::Rejected);
        assert_eq!(QuoteStatus::from_wire(None), QuoteStatus::Pending);
        assert_eq!(AuctionStatus::from_wire(Some("Quoted")), AuctionStatus::Quoted);
        assert_eq!(AuctionStatus::from_wire(Some("whatever")), AuctionStatus::Open);
    }

    #[test]
    fn price_band_is_open_ended_when_bounds_missing() {
        let auction = Auction {
            min_price: Some(1000.0),
            ..Auction::default()
        };
        assert!(auction.within_band(1000.0));
        assert!(auction.within_band(1_000_000.0));
        assert!(!auction.within_band(999.0));
        assert_eq!(auction.price_band_label(), "from 1000");
    }

    #[test]
    fn quoted_auction_accepts_bids_until_approved() {
        let mut auction = Auction::default();
        assert!(auction.accepts_bids());
        auction.status = AuctionStatus::Quoted;
        assert!(auction.accepts_bids());
        auction.approved_vendor = Some("Swift Haulers".to_string());
        assert!(!auction.accepts_bids());
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(21, 10), 3);
        assert_eq!(page_count(20, 10), 2);
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(5, 0), 1);
    }
}
