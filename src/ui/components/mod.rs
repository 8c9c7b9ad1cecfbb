pub mod confirm_dialog;
pub mod kpi_card;
pub mod pagination;
pub mod quote_card;
pub mod sort_selector;
pub mod status_badge;
pub mod toast;
