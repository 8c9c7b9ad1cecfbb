use dioxus::prelude::*;

use crate::domain::{AuctionStatus, QuoteStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BadgeTone {
    Info,
    Success,
    Warning,
    Danger,
    Muted,
}

impl BadgeTone {
    fn class(&self) -> &'static str {
        match self {
            Self::Info => "badge badge-info",
            Self::Success => "badge badge-success",
            Self::Warning => "badge badge-warning",
            Self::Danger => "badge badge-danger",
            Self::Muted => "badge badge-muted",
        }
    }
}

pub fn quote_status_tone(status: QuoteStatus) -> BadgeTone {
    match status {
        QuoteStatus::Pending => BadgeTone::Warning,
        QuoteStatus::Approved => BadgeTone::Success,
        QuoteStatus::Rejected => BadgeTone::Danger,
    }
}

pub fn auction_status_tone(status: AuctionStatus) -> BadgeTone {
    match status {
        AuctionStatus::Open => BadgeTone::Info,
        AuctionStatus::Quoted => BadgeTone::Warning,
        AuctionStatus::Expired => BadgeTone::Muted,
    }
}

#[component]
pub fn StatusBadge(label: String, tone: BadgeTone) -> Element {
    rsx! {
        span { class: "{tone.class()}", "{label}" }
    }
}
