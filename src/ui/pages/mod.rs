pub mod active_bids;
pub mod auctions;
pub mod my_quotes;
pub mod quote_review;
pub mod settings;

pub use active_bids::ActiveBidsPage;
pub use auctions::AuctionsPage;
pub use my_quotes::MyQuotesPage;
pub use settings::SettingsPage;
