use dioxus::prelude::*;

use crate::{
    app::{brokerage_client, page_request, persist_session, ReloadSignal},
    domain::{
        approval::ApprovalState, confirm_selection, rank_quotes, ApprovalFlow, ApprovalObserver,
        AppState, AuctionId, AuctionQuotes, Notice, QuoteId, QuoteSort,
    },
    ui::components::{
        confirm_dialog::ConfirmDialog,
        quote_card::QuoteCard,
        sort_selector::SortSelector,
        toast::{push_notice, push_toast, ToastKind, ToastMessage},
    },
    util::format_amount,
};

/// Routes approval side effects into toasts, the shared reload signal and
/// the auction selection of the surrounding page.
struct UiApprovalObserver {
    toasts: Signal<Vec<ToastMessage>>,
    reload: ReloadSignal,
    selected: Signal<Option<AuctionId>>,
}

impl ApprovalObserver for UiApprovalObserver {
    fn notify(&mut self, notice: Notice) {
        push_notice(self.toasts, notice);
    }

    fn refresh(&mut self) {
        self.reload.bump();
    }

    fn close_detail(&mut self) {
        self.selected.set(None);
    }
}

#[component]
pub fn QuoteReview(group: AuctionQuotes, selected: Signal<Option<AuctionId>>) -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let reload = use_context::<ReloadSignal>();
    let mut selected = selected;

    let auction_id = group.auction_id;
    let mut flow = use_signal({
        let group = group.clone();
        move || ApprovalFlow::for_auction(auction_id, group.auction.as_ref(), &group.quotes)
    });

    // The page list only holds some of this auction's quotes; ranking and
    // approval wait for the complete set.
    let mut complete = use_resource({
        let known_auction = group.auction.clone();
        move || {
            let known_auction = known_auction.clone();
            async move {
                let user = state.peek().current_user.clone()?;
                let client = brokerage_client(toasts)?;
                match client.all_received_quotes(&page_request(&user, 1, "")).await {
                    Ok(quotes) => {
                        let full = AuctionQuotes::from_quotes(auction_id, known_auction, quotes);
                        tracing::debug!(auction_id, quotes = full.quotes.len(), "full quote set loaded");
                        flow.with_mut(|flow| flow.observe(full.auction.as_ref(), &full.quotes));
                        Some(full)
                    }
                    Err(err) => {
                        tracing::warn!(auction_id, error = %err, "failed to load full quote set");
                        push_toast(
                            toasts,
                            ToastKind::Error,
                            err.user_message("Failed to load all quotes for this auction."),
                        );
                        None
                    }
                }
            }
        }
    });

    let fetched = complete.read().clone();
    let load_failed = matches!(fetched, Some(None));
    let loaded = fetched.flatten();
    let is_complete = loaded.is_some();
    let group = loaded.unwrap_or(group);

    let sort = state.with(|st| st.quote_sort);
    let ranking = rank_quotes(&group.quotes, sort);
    let current = flow();
    let locked = !is_complete || current.is_locked() || current.is_submitting();
    let pending = current.pending().and_then(|id| {
        group
            .quotes
            .iter()
            .find(|quote| quote.id == id)
            .cloned()
    });
    let lowest = ranking
        .lowest_amount
        .map(format_amount)
        .unwrap_or_else(|| "—".to_string());
    let recommended = ranking
        .recommended_id
        .and_then(|id| group.quotes.iter().find(|quote| quote.id == id))
        .map(|quote| quote.user.organization_name.clone());
    let lane = group
        .auction
        .as_ref()
        .map(|auction| auction.lane())
        .unwrap_or_default();

    let on_sort = {
        let mut state = state.clone();
        move |sort: QuoteSort| {
            state.with_mut(|st| st.quote_sort = sort);
            persist_session(&state);
        }
    };

    let on_approve = move |quote_id: QuoteId| {
        if let Err(err) = flow.with_mut(|flow| flow.select(quote_id)) {
            push_toast(toasts, ToastKind::Warning, err.to_string());
        }
    };

    let on_cancel = move |_: ()| flow.with_mut(|flow| flow.cancel());

    let on_confirm = move |_: ()| {
        let Some(user) = state.with(|st| st.current_user.clone()) else {
            push_toast(toasts, ToastKind::Error, "Sign in from Settings before approving quotes.");
            return;
        };
        let Some(client) = brokerage_client(toasts) else {
            return;
        };

        let mut working = flow();
        let mut in_flight = working.clone();
        if let Err(err) = in_flight.begin_confirm(&user) {
            push_toast(toasts, ToastKind::Warning, err.to_string());
            return;
        }
        flow.set(in_flight);

        spawn(async move {
            let mut observer = UiApprovalObserver {
                toasts,
                reload,
                selected,
            };
            if let Err(err) = confirm_selection(&mut working, &client, &user, &mut observer).await {
                tracing::warn!(auction_id = working.auction_id(), error = %err, "approval could not start");
                push_toast(toasts, ToastKind::Warning, err.to_string());
            }
            flow.set(working);
        });
    };

    rsx! {
        section {
            class: "drawer",
            div {
                class: "page-header",
                div {
                    h2 { class: "page-title", "{group.title()}" }
                    p { class: "page-hint", "{lane}" }
                    p { class: "auction-meta", "{group.quotes.len()} quotes · lowest {lowest}" }
                    if let Some(vendor) = recommended {
                        p { class: "auction-meta", "Recommended: {vendor}" }
                    }
                }
                button {
                    class: "btn btn-small",
                    onclick: move |_| selected.set(None),
                    "Close"
                }
            }
            if load_failed {
                div { class: "notice warning",
                    "Could not load every quote for this auction, so approval is disabled. "
                    button { class: "btn btn-small", onclick: move |_| complete.restart(), "Retry" }
                }
            } else if !is_complete {
                p { class: "notice warning", "Loading every quote for this auction. Approval unlocks once the full list is in." }
            } else if current.state() == ApprovalState::Locked {
                p { class: "notice warning", "This auction already has an approved quote." }
            }
            SortSelector { current: sort, on_change: on_sort }
            if ranking.entries.is_empty() {
                p { class: "empty-state", "No quotes received for this auction yet." }
            } else {
                div {
                    class: "quote-list",
                    for entry in ranking.entries {
                        QuoteCard {
                            key: "{entry.quote.id}",
                            entry: entry.clone(),
                            locked: locked,
                            on_approve: on_approve,
                        }
                    }
                }
            }
            if let Some(quote) = pending {
                ConfirmDialog {
                    title: "Approve quote".to_string(),
                    confirm_label: "Approve".to_string(),
                    busy: current.is_submitting(),
                    on_confirm: on_confirm,
                    on_cancel: on_cancel,
                    p {
                        "Approve the quote from "
                        strong { "{quote.user.organization_name}" }
                        " for {format_amount(quote.quote_amount)}? Other quotes for this auction can no longer be approved."
                    }
                }
            }
        }
    }
}
