//! Client-side checks for a transporter's bid before it is sent.

use std::fmt;

use time::Date;

use super::entities::{Auction, AuctionId, CurrentUser, QuoteId};
use super::ranking::parse_calendar_date;

/// Raw form input as typed by the user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuoteDraft {
    pub amount: String,
    pub estimated_delivery_date: String,
}

/// A validated bid, ready for `createUpdateQuote`.
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteSubmission {
    /// Set when updating an existing quote.
    pub quote_id: Option<QuoteId>,
    pub auction_id: AuctionId,
    pub quote_amount: f64,
    pub estimated_delivery_date: Date,
    pub user_id: i64,
    pub org_id: i64,
    pub created_by: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuoteField {
    Amount,
    DeliveryDate,
    Auction,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<(QuoteField, String)>,
}

impl ValidationErrors {
    fn push(&mut self, field: QuoteField, message: impl Into<String>) {
        self.fields.push((field, message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First message recorded for `field`, for inline display.
    pub fn message_for(&self, field: QuoteField) -> Option<&str> {
        self.fields
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, message)| message.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<_> = self.fields.iter().map(|(_, message)| message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub fn validate_quote(
    draft: &QuoteDraft,
    auction: &Auction,
    user: &CurrentUser,
    existing: Option<QuoteId>,
) -> Result<QuoteSubmission, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if !auction.accepts_bids() {
        errors.push(QuoteField::Auction, "This auction is no longer accepting quotes");
    }

    let amount = match draft.amount.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => {
            if !auction.within_band(value) {
                errors.push(
                    QuoteField::Amount,
                    format!("Amount must be within {}", auction.price_band_label()),
                );
            }
            Some(value)
        }
        Ok(_) => {
            errors.push(QuoteField::Amount, "Amount must be greater than zero");
            None
        }
        Err(_) => {
            errors.push(QuoteField::Amount, "Amount must be a number");
            None
        }
    };

    let delivery = parse_calendar_date(&draft.estimated_delivery_date);
    if delivery.is_none() {
        errors.push(
            QuoteField::DeliveryDate,
            "Estimated delivery date must be in YYYY-MM-DD format",
        );
    }

    match (amount, delivery) {
        (Some(quote_amount), Some(estimated_delivery_date)) if errors.is_empty() => {
            Ok(QuoteSubmission {
                quote_id: existing,
                auction_id: auction.id,
                quote_amount,
                estimated_delivery_date,
                user_id: user.user_id,
                org_id: user.org_id,
                created_by: user.user_name.clone(),
            })
        }
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AuctionStatus;

    fn auction() -> Auction {
        Auction {
            id: 12,
            min_price: Some(5000.0),
            max_price: Some(9000.0),
            ..Auction::default()
        }
    }

    fn transporter() -> CurrentUser {
        CurrentUser {
            user_id: 77,
            user_name: "ravi.t".to_string(),
            org_id: 8,
            ..CurrentUser::default()
        }
    }

    fn draft(amount: &str, date: &str) -> QuoteDraft {
        QuoteDraft {
            amount: amount.to_string(),
            estimated_delivery_date: date.to_string(),
        }
    }

    #[test]
    fn valid_draft_becomes_submission() {
        let submission = validate_quote(&draft(" 7500 ", "2024-07-01"), &auction(), &transporter(), None)
            .expect("valid draft");
        assert_eq!(submission.quote_amount, 7500.0);
        assert_eq!(submission.auction_id, 12);
        assert_eq!(submission.created_by, "ravi.t");
        assert_eq!(submission.estimated_delivery_date.to_string(), "2024-07-01");
    }

    #[test]
    fn amount_outside_band_is_flagged() {
        let errors = validate_quote(&draft("12000", "2024-07-01"), &auction(), &transporter(), None)
            .expect_err("above max");
        assert_eq!(
            errors.message_for(QuoteField::Amount),
            Some("Amount must be within 5000 – 9000")
        );
        assert_eq!(errors.message_for(QuoteField::DeliveryDate), None);
    }

    #[test]
    fn every_bad_field_is_reported() {
        let mut closed = auction();
        closed.status = AuctionStatus::Expired;
        let errors = validate_quote(&draft("abc", "next week"), &closed, &transporter(), Some(3))
            .expect_err("invalid draft");
        assert!(errors.message_for(QuoteField::Auction).is_some());
        assert_eq!(errors.message_for(QuoteField::Amount), Some("Amount must be a number"));
        assert!(errors.message_for(QuoteField::DeliveryDate).is_some());
    }

    #[test]
    fn quoted_auction_still_takes_bid_updates() {
        let mut quoted = auction();
        quoted.status = AuctionStatus::Quoted;
        let submission = validate_quote(&draft("8000", "2024-07-03"), &quoted, &transporter(), Some(31))
            .expect("update accepted");
        assert_eq!(submission.quote_id, Some(31));
        assert_eq!(submission.quote_amount, 8000.0);
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let errors = validate_quote(&draft("0", "2024-07-01"), &auction(), &transporter(), None)
            .expect_err("zero amount");
        assert_eq!(
            errors.message_for(QuoteField::Amount),
            Some("Amount must be greater than zero")
        );
    }
}
