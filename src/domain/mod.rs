//! Domain logic for auction quotes lives here.

pub mod app_state;
pub mod approval;
pub mod entities;
pub mod ranking;
pub mod submission;

pub use app_state::{AppState, AuctionQuotes, PersistedSession, Resource};
pub use approval::{
    confirm_selection, failure_message, ApprovalFlow, ApprovalObserver, ApprovalRequest,
    FailureDetail, Notice, NoticeKind, QuoteApprover,
};
pub use entities::{
    page_count, Auction, AuctionId, AuctionStatus, CurrentUser, Page, PageRequest, Quote,
    QuoteId, QuoteStatus, QuoteUser, UserRole,
};
pub use ranking::{rank_quotes, DeltaDirection, PriceDelta, QuoteSort, RankedQuote};
pub use submission::{validate_quote, QuoteDraft, QuoteField, QuoteSubmission, ValidationErrors};
