use dioxus::prelude::*;

use crate::domain::{DeltaDirection, PriceDelta, QuoteId, RankedQuote};
use crate::ui::components::status_badge::{quote_status_tone, BadgeTone, StatusBadge};
use crate::util::format_amount;

/// One row of the quote review list. `locked` hides the approve action once
/// the auction has an approved quote or a confirmation is in flight.
#[component]
pub fn QuoteCard(entry: RankedQuote, locked: bool, on_approve: EventHandler<QuoteId>) -> Element {
    let quote = entry.quote.clone();
    let quote_id = quote.id;
    let vendor = if quote.user.organization_name.is_empty() {
        format!("Vendor #{}", quote.user.user_id.unwrap_or_default())
    } else {
        quote.user.organization_name.clone()
    };
    let amount = format_amount(quote.quote_amount);
    let delivery = quote
        .estimated_delivery_date
        .clone()
        .unwrap_or_else(|| "—".to_string());
    let rating = quote
        .user
        .rating
        .map(|rating| format!("★ {rating:.1}"))
        .unwrap_or_else(|| "Unrated".to_string());
    let delta = entry.delta.map(delta_label);

    let mut row_class = String::from("quote-row");
    if quote.is_approved() {
        row_class.push_str(" approved");
    } else if entry.recommended {
        row_class.push_str(" recommended");
    }

    rsx! {
        div {
            class: "{row_class}",
            div {
                p { class: "quote-vendor", "{vendor}" }
                div {
                    class: "quote-tags",
                    if entry.recommended {
                        StatusBadge { label: "Recommended".to_string(), tone: BadgeTone::Info }
                    }
                    if entry.lowest_price {
                        StatusBadge { label: "Lowest Price".to_string(), tone: BadgeTone::Success }
                    }
                    StatusBadge { label: quote.status.label().to_string(), tone: quote_status_tone(quote.status) }
                }
            }
            div {
                class: "quote-amount",
                p { "{amount}" }
                if let Some((class, text)) = delta {
                    span { class: "{class}", "{text}" }
                }
            }
            div {
                p { class: "auction-meta", "Delivery" }
                p { "{delivery}" }
            }
            div {
                p { class: "auction-meta", "Rating" }
                p { "{rating}" }
            }
            div {
                if !locked && !quote.is_approved() {
                    button {
                        class: "btn btn-primary btn-small",
                        onclick: move |_| on_approve.call(quote_id),
                        "Approve"
                    }
                }
            }
        }
    }
}

fn delta_label(delta: PriceDelta) -> (&'static str, String) {
    match delta.direction() {
        DeltaDirection::Up => ("delta-up", format!("▲ {}%", delta.percent)),
        DeltaDirection::Down => ("delta-down", format!("▼ {}%", delta.percent.abs())),
        DeltaDirection::Flat => ("auction-meta", "0%".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_labels_follow_direction() {
        assert_eq!(delta_label(PriceDelta { percent: 12 }), ("delta-up", "▲ 12%".to_string()));
        assert_eq!(delta_label(PriceDelta { percent: -3 }), ("delta-down", "▼ 3%".to_string()));
        assert_eq!(delta_label(PriceDelta { percent: 0 }).1, "0%");
    }
}
