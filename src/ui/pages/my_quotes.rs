use dioxus::prelude::*;

use crate::{
    app::{fetch_my_quotes, page_request, ReloadSignal},
    domain::{page_count, AppState, Quote, QuoteStatus, Resource},
    ui::components::{
        kpi_card::KpiCard,
        pagination::Pager,
        status_badge::{quote_status_tone, StatusBadge},
        toast::ToastMessage,
    },
    util::{config, format_amount},
};

#[component]
pub fn MyQuotesPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let reload = use_context::<ReloadSignal>();

    let mut page = use_signal(|| 1_u32);

    let _quotes = use_resource(move || async move {
        let generation = reload.generation();
        let page = page();
        let user = state.peek().current_user.clone()?;
        tracing::debug!(generation, page, "loading submitted quotes");
        fetch_my_quotes(state, toasts, user.user_id, page_request(&user, page, "")).await
    });

    let quotes = state.with(|st| st.my_quotes.clone());
    let total = state.with(|st| st.my_quotes_total);
    let fetched = state.with(|st| st.fetches.age_label(Resource::MyQuotes));
    let pages = page_count(total, config::current().page_size);
    let (approved, pending) = status_counts(&quotes);

    rsx! {
        div { class: "page",
            div { class: "page-header",
                div {
                    h2 { class: "page-title", "My Quotes" }
                    p { class: "page-hint", "Bids you have submitted. Updated {fetched}." }
                }
            }

            div { class: "kpi-grid",
                KpiCard { title: "Submitted".to_string(), value: total.to_string(), description: None }
                KpiCard {
                    title: "Approved".to_string(),
                    value: approved.to_string(),
                    description: Some("On this page".to_string()),
                }
                KpiCard {
                    title: "Pending".to_string(),
                    value: pending.to_string(),
                    description: Some("On this page".to_string()),
                }
            }

            if quotes.is_empty() {
                p { class: "empty-state", "You have not submitted any quotes yet." }
            } else {
                table { class: "data-table panel",
                    thead {
                        tr {
                            th { "Auction" }
                            th { "Lane" }
                            th { "Amount" }
                            th { "Delivery" }
                            th { "Submitted" }
                            th { "Status" }
                        }
                    }
                    tbody {
                        for quote in quotes {
                            QuoteLine { key: "{quote.id}", quote: quote.clone() }
                        }
                    }
                }
            }

            Pager { page: page(), page_count: pages, total: total, on_change: move |next: u32| page.set(next) }
        }
    }
}

#[component]
fn QuoteLine(quote: Quote) -> Element {
    let auction_label = quote
        .auction
        .as_ref()
        .map(|auction| format!("#{} · {}", auction.id, auction.material))
        .unwrap_or_else(|| format!("#{}", quote.auction_id));
    let lane = quote
        .auction
        .as_ref()
        .map(|auction| auction.lane())
        .unwrap_or_else(|| "—".to_string());
    let delivery = quote
        .estimated_delivery_date
        .clone()
        .unwrap_or_else(|| "—".to_string());
    let submitted = quote.created_date.clone().unwrap_or_else(|| "—".to_string());

    rsx! {
        tr {
            td { "{auction_label}" }
            td { "{lane}" }
            td { "{format_amount(quote.quote_amount)}" }
            td { "{delivery}" }
            td { "{submitted}" }
            td { StatusBadge { label: quote.status.label().to_string(), tone: quote_status_tone(quote.status) } }
        }
    }
}

fn status_counts(quotes: &[Quote]) -> (usize, usize) {
    quotes.iter().fold((0, 0), |(approved, pending), quote| match quote.status {
        QuoteStatus::Approved => (approved + 1, pending),
        QuoteStatus::Pending => (approved, pending + 1),
        QuoteStatus::Rejected => (approved, pending),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_ignore_rejected_quotes() {
        let quotes = [QuoteStatus::Approved, QuoteStatus::Pending, QuoteStatus::Pending, QuoteStatus::Rejected]
            .into_iter()
            .map(|status| Quote {
                status,
                ..Quote::default()
            })
            .collect::<Vec<_>>();
        assert_eq!(status_counts(&quotes), (1, 2));
    }
}
