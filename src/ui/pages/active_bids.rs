use std::rc::Rc;

use dioxus::prelude::*;
use tokio::sync::watch;

use crate::{
    app::{brokerage_client, fetch_active_auctions, fetch_my_quotes, page_request, ReloadSignal},
    domain::{
        validate_quote, AppState, Auction, PageRequest, QuoteDraft, QuoteField, Resource,
        ValidationErrors,
    },
    infra::poller::run_polling,
    ui::components::{
        status_badge::{auction_status_tone, StatusBadge},
        toast::{push_toast, ToastKind, ToastMessage},
    },
    util::config,
};

/// Page size used to look up the user's existing bids when updating one.
const OWN_QUOTES_LOOKUP: u32 = 100;

#[component]
pub fn ActiveBidsPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let reload = use_context::<ReloadSignal>();

    let interval = config::current().poll_interval;
    let shutdown = use_hook(|| Rc::new(watch::channel(false).0));
    let mut paused = use_signal(|| false);

    let mut bid_target = use_signal(|| None::<Auction>);
    let mut amount_input = use_signal(String::new);
    let mut date_input = use_signal(String::new);
    let mut errors = use_signal(ValidationErrors::default);
    let mut saving = use_signal(|| false);

    // Lives as long as this page; unmounting drops the task and the sender.
    let mut poller = use_future({
        let shutdown = shutdown.clone();
        move || {
            let receiver = shutdown.subscribe();
            async move {
                run_polling(interval, receiver, move |tick| async move {
                    refresh_active(state, toasts, tick).await;
                })
                .await;
            }
        }
    });

    let _own_quotes = use_resource(move || async move {
        let generation = reload.generation();
        let user = state.peek().current_user.clone()?;
        tracing::debug!(generation, "loading own quotes for bid updates");
        let request = PageRequest {
            count: OWN_QUOTES_LOOKUP,
            ..page_request(&user, 1, "")
        };
        fetch_my_quotes(state, toasts, user.user_id, request).await
    });

    let auctions = state.with(|st| st.active_auctions.clone());
    let fetched = state.with(|st| st.fetches.age_label(Resource::ActiveAuctions));
    let is_paused = paused();
    let poll_secs = interval.as_secs();

    let on_toggle_polling = {
        let shutdown = shutdown.clone();
        move |_| {
            if paused() {
                shutdown.send_replace(false);
                paused.set(false);
                poller.restart();
                tracing::info!("live updates resumed");
            } else {
                shutdown.send_replace(true);
                paused.set(true);
                tracing::info!("live updates paused");
            }
        }
    };

    let on_refresh_now = move |_| {
        spawn(async move {
            refresh_active(state, toasts, 0).await;
        });
    };

    let mut open_bid_form = move |auction: Auction| {
        let existing = existing_quote_amount(&state, &auction);
        amount_input.set(existing.unwrap_or_default());
        date_input.set(String::new());
        errors.set(ValidationErrors::default());
        bid_target.set(Some(auction));
    };

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let Some(auction) = bid_target() else {
            return;
        };
        let Some(user) = state.with(|st| st.current_user.clone()) else {
            push_toast(toasts, ToastKind::Error, "Sign in from Settings before bidding.");
            return;
        };
        let draft = QuoteDraft {
            amount: amount_input(),
            estimated_delivery_date: date_input(),
        };
        let existing = state.with(|st| {
            st.my_quotes
                .iter()
                .find(|quote| quote.auction_id == auction.id)
                .map(|quote| quote.id)
        });

        let submission = match validate_quote(&draft, &auction, &user, existing) {
            Ok(submission) => submission,
            Err(found) => {
                tracing::debug!(auction_id = auction.id, errors = %found, "bid rejected by validation");
                errors.set(found);
                return;
            }
        };
        errors.set(ValidationErrors::default());
        let Some(client) = brokerage_client(toasts) else {
            return;
        };

        saving.set(true);
        spawn(async move {
            match client.save_quote(&submission).await {
                Ok(ack) => {
                    let text = ack
                        .message
                        .filter(|message| !message.trim().is_empty())
                        .unwrap_or_else(|| "Quote submitted.".to_string());
                    push_toast(toasts, ToastKind::Success, text);
                    bid_target.set(None);
                    amount_input.set(String::new());
                    date_input.set(String::new());
                    reload.bump();
                    refresh_active(state, toasts, 0).await;
                }
                Err(err) => {
                    tracing::warn!(auction_id = submission.auction_id, error = %err, "saving quote failed");
                    push_toast(toasts, ToastKind::Error, err.user_message("Failed to submit quote."));
                }
            }
            saving.set(false);
        });
    };

    let current_errors = errors();
    let amount_error = current_errors.message_for(QuoteField::Amount).map(str::to_string);
    let date_error = current_errors
        .message_for(QuoteField::DeliveryDate)
        .map(str::to_string);
    let auction_error = current_errors.message_for(QuoteField::Auction).map(str::to_string);

    rsx! {
        div { class: "page",
            div { class: "page-header",
                div {
                    h2 { class: "page-title", "Active Bids" }
                    p {
                        class: "page-hint",
                        if is_paused {
                            "Live updates paused. Updated {fetched}."
                        } else {
                            "Refreshing every {poll_secs}s. Updated {fetched}."
                        }
                    }
                }
                div { class: "nav",
                    button { class: "btn", onclick: on_refresh_now, "Refresh now" }
                    button {
                        class: "btn",
                        onclick: on_toggle_polling,
                        if is_paused { "Resume live updates" } else { "Pause live updates" }
                    }
                }
            }

            if let Some(auction) = bid_target() {
                form {
                    class: "drawer",
                    onsubmit: on_submit,
                    h3 { class: "panel-title", "Bid on #{auction.id} · {auction.material}" }
                    p { class: "auction-meta", "{auction.lane()} · price band {auction.price_band_label()}" }
                    if let Some(message) = auction_error {
                        p { class: "notice warning", "{message}" }
                    }
                    div { class: "form-grid",
                        div {
                            label { class: "field-label", "Quote amount" }
                            input {
                                class: "field-input",
                                value: amount_input(),
                                oninput: move |evt| amount_input.set(evt.value()),
                            }
                            if let Some(message) = amount_error {
                                p { class: "field-error", "{message}" }
                            }
                        }
                        div {
                            label { class: "field-label", "Estimated delivery (YYYY-MM-DD)" }
                            input {
                                class: "field-input",
                                r#type: "date",
                                value: date_input(),
                                oninput: move |evt| date_input.set(evt.value()),
                            }
                            if let Some(message) = date_error {
                                p { class: "field-error", "{message}" }
                            }
                        }
                    }
                    div { class: "modal-actions",
                        button {
                            class: "btn",
                            r#type: "button",
                            disabled: saving(),
                            onclick: move |_| bid_target.set(None),
                            "Cancel"
                        }
                        button {
                            class: "btn btn-primary",
                            r#type: "submit",
                            disabled: saving(),
                            if saving() { "Submitting…" } else { "Submit quote" }
                        }
                    }
                }
            }

            if auctions.is_empty() {
                p { class: "empty-state", "No open auctions right now." }
            } else {
                table { class: "data-table panel",
                    thead {
                        tr {
                            th { "Auction" }
                            th { "Lane" }
                            th { "Vehicle" }
                            th { "Price band" }
                            th { "Ends" }
                            th { "Status" }
                            th {}
                        }
                    }
                    tbody {
                        for auction in auctions {
                            tr { key: "{auction.id}",
                                td { "#{auction.id} · {auction.material}" }
                                td { "{auction.lane()}" }
                                td { "{vehicle_label(&auction)}" }
                                td { "{auction.price_band_label()}" }
                                td { {auction.end_date.clone().unwrap_or_else(|| "—".to_string())} }
                                td { StatusBadge { label: auction.status.label().to_string(), tone: auction_status_tone(auction.status) } }
                                td {
                                    button {
                                        class: "btn btn-small",
                                        disabled: !auction.accepts_bids(),
                                        onclick: {
                                            let auction = auction.clone();
                                            move |_| open_bid_form(auction.clone())
                                        },
                                        "Bid"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// One polling tick: reloads the first page of open auctions.
async fn refresh_active(state: Signal<AppState>, toasts: Signal<Vec<ToastMessage>>, tick: u64) {
    let Some(user) = state.peek().current_user.clone() else {
        return;
    };
    tracing::debug!(tick, org_id = user.org_id, "refreshing active auctions");
    fetch_active_auctions(state, toasts, page_request(&user, 1, "")).await;
}

fn existing_quote_amount(state: &Signal<AppState>, auction: &Auction) -> Option<String> {
    state.with(|st| {
        st.my_quotes
            .iter()
            .find(|quote| quote.auction_id == auction.id)
            .filter(|quote| quote.quote_amount.is_finite())
            .map(|quote| format!("{:.0}", quote.quote_amount))
    })
}

fn vehicle_label(auction: &Auction) -> String {
    match (&auction.vehicle_type, auction.vehicle_count) {
        (Some(kind), Some(count)) => format!("{count} × {kind}"),
        (Some(kind), None) => kind.clone(),
        (None, Some(count)) => format!("{count} vehicles"),
        (None, None) => "—".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_label_combines_count_and_type() {
        let mut auction = Auction {
            vehicle_type: Some("Flatbed".to_string()),
            vehicle_count: Some(2),
            ..Auction::default()
        };
        assert_eq!(vehicle_label(&auction), "2 × Flatbed");
        auction.vehicle_type = None;
        assert_eq!(vehicle_label(&auction), "2 vehicles");
        auction.vehicle_count = None;
        assert_eq!(vehicle_label(&auction), "—");
    }
}
