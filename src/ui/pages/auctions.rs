use dioxus::prelude::*;

use crate::{
    app::{fetch_received_quotes, page_request, ReloadSignal},
    domain::{page_count, ranking::lowest_amount, AppState, AuctionId, AuctionQuotes, Resource},
    ui::{
        components::{
            kpi_card::KpiCard,
            pagination::Pager,
            status_badge::{BadgeTone, StatusBadge},
            toast::ToastMessage,
        },
        pages::quote_review::QuoteReview,
    },
    util::{config, format_amount},
};

#[component]
pub fn AuctionsPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let reload = use_context::<ReloadSignal>();

    let mut page = use_signal(|| 1_u32);
    let mut search_input = use_signal(String::new);
    let mut search = use_signal(String::new);
    let mut selected = use_signal(|| None::<AuctionId>);

    let quotes = use_resource(move || async move {
        let generation = reload.generation();
        let page = page();
        let search = search();
        let user = state.peek().current_user.clone()?;
        tracing::debug!(generation, page, "loading received quotes");
        fetch_received_quotes(state, toasts, page_request(&user, page, &search)).await
    });

    let groups = state.with(|st| st.quotes_by_auction());
    let total = state.with(|st| st.received_total);
    let fetched = state.with(|st| st.fetches.age_label(Resource::ReceivedQuotes));
    let pages = page_count(total, config::current().page_size);
    let awaiting = groups.iter().filter(|group| !group.has_approval()).count();
    let loading = quotes.read().is_none();
    let group_count = groups.len();

    let detail = selected().and_then(|id| groups.iter().find(|group| group.auction_id == id).cloned());

    let on_search = move |evt: FormEvent| {
        evt.prevent_default();
        search.set(search_input());
        page.set(1);
    };

    rsx! {
        div { class: "page",
            div { class: "page-header",
                div {
                    h2 { class: "page-title", "Auctions" }
                    p { class: "page-hint", "Quotes received for your shipments. Updated {fetched}." }
                }
                form {
                    class: "nav",
                    onsubmit: on_search,
                    input {
                        class: "field-input",
                        placeholder: "Search material or lane",
                        value: search_input(),
                        oninput: move |evt| search_input.set(evt.value()),
                    }
                    button { class: "btn", r#type: "submit", "Search" }
                }
            }

            div { class: "kpi-grid",
                KpiCard { title: "Quotes received".to_string(), value: total.to_string(), description: None }
                KpiCard { title: "Auctions on this page".to_string(), value: group_count.to_string(), description: None }
                KpiCard {
                    title: "Awaiting approval".to_string(),
                    value: awaiting.to_string(),
                    description: Some("Auctions without an approved quote".to_string()),
                }
            }

            if let Some(group) = detail {
                QuoteReview { key: "{group.auction_id}", group: group.clone(), selected: selected }
            }

            if loading && group_count == 0 {
                p { class: "empty-state", "Loading quotes…" }
            } else if group_count == 0 {
                p { class: "empty-state", "No quotes received yet." }
            } else {
                div { class: "auction-list",
                    for group in groups {
                        AuctionRow {
                            key: "{group.auction_id}",
                            group: group.clone(),
                            active: selected() == Some(group.auction_id),
                            on_open: move |id: AuctionId| selected.set(Some(id)),
                        }
                    }
                }
            }

            Pager { page: page(), page_count: pages, total: total, on_change: move |next: u32| page.set(next) }
        }
    }
}

#[component]
fn AuctionRow(group: AuctionQuotes, active: bool, on_open: EventHandler<AuctionId>) -> Element {
    let auction_id = group.auction_id;
    let lane = group
        .auction
        .as_ref()
        .map(|auction| auction.lane())
        .unwrap_or_default();
    let lowest = lowest_amount(&group.quotes)
        .map(format_amount)
        .unwrap_or_else(|| "—".to_string());
    let (status, tone) = if group.has_approval() {
        ("Approved", BadgeTone::Success)
    } else {
        ("Awaiting approval", BadgeTone::Warning)
    };

    rsx! {
        div {
            class: if active { "panel auction-card drawer" } else { "panel auction-card" },
            div {
                p { class: "quote-vendor", "{group.title()}" }
                p { class: "auction-meta", "{lane}" }
                p { class: "auction-meta", "{group.quotes.len()} quotes · lowest {lowest}" }
            }
            div { class: "nav",
                StatusBadge { label: status.to_string(), tone: tone }
                button {
                    class: "btn btn-small",
                    onclick: move |_| on_open.call(auction_id),
                    "Review quotes"
                }
            }
        }
    }
}
