pub mod brokerage;
pub mod envelope;
pub mod poller;
