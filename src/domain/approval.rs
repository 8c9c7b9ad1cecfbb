//! Two-step (select → confirm) approval of a single quote per auction.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use super::entities::{Auction, AuctionId, CurrentUser, Quote, QuoteId};

const GENERIC_FAILURE: &str = "Failed to approve quote. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApprovalAction {
    Approved,
}

impl ApprovalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "Approved",
        }
    }
}

/// Payload of the approval call: `{action, actionBy, auctionId, quotesId}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApprovalRequest {
    pub action: ApprovalAction,
    pub action_by: String,
    pub auction_id: AuctionId,
    pub quote_id: QuoteId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApprovalState {
    Open,
    ConfirmPending(QuoteId),
    Submitting(QuoteId),
    Approved(QuoteId),
    /// The auction reports an approved vendor but the approved quote is not
    /// among the quotes seen so far.
    Locked,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApprovalError {
    #[error("auction {auction_id} already has quote {quote_id} approved")]
    AlreadyApproved {
        auction_id: AuctionId,
        quote_id: QuoteId,
    },
    #[error("auction {0} already has an approved quote")]
    AuctionLocked(AuctionId),
    #[error("no quote selected for approval")]
    NothingSelected,
    #[error("approval of quote {0} is already in flight")]
    InFlight(QuoteId),
}

/// Details a failed approval call can expose to the user.
pub trait FailureDetail: fmt::Display {
    /// The server's `message` field, if the response carried one.
    fn server_message(&self) -> Option<&str>;
    /// The server's `error` field, if the response carried one.
    fn server_error(&self) -> Option<&str>;
}

/// Picks the most specific text: server `message`, server `error`,
/// the error's own description, then `fallback`.
pub fn failure_message<E: FailureDetail + ?Sized>(error: &E, fallback: &str) -> String {
    if let Some(message) = error.server_message().filter(|m| !is_blank(m)) {
        return message.to_string();
    }
    if let Some(message) = error.server_error().filter(|m| !is_blank(m)) {
        return message.to_string();
    }
    let described = error.to_string();
    if !is_blank(&described) {
        described
    } else {
        fallback.to_string()
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// The backend collaborator that records an approval.
#[async_trait]
pub trait QuoteApprover: Send + Sync {
    type Error: FailureDetail + Send;

    async fn submit_approval(&self, request: &ApprovalRequest) -> Result<(), Self::Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

/// Side effects the surrounding view performs when an approval settles.
pub trait ApprovalObserver {
    fn notify(&mut self, notice: Notice);
    fn refresh(&mut self);
    fn close_detail(&mut self);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApprovalOutcome {
    Approved { quote_id: QuoteId },
    Failed { quote_id: QuoteId, message: String },
}

/// Approval state of one auction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApprovalFlow {
    auction_id: AuctionId,
    state: ApprovalState,
}

impl ApprovalFlow {
    pub fn new(auction_id: AuctionId) -> Self {
        Self {
            auction_id,
            state: ApprovalState::Open,
        }
    }

    /// Starts in `Approved` when one of the quotes already carries approval,
    /// or in `Locked` when only the auction itself reports one.
    pub fn for_auction(
        auction_id: AuctionId,
        auction: Option<&Auction>,
        quotes: &[Quote],
    ) -> Self {
        let mut flow = Self::new(auction_id);
        flow.observe(auction, quotes);
        flow
    }

    /// Folds newly loaded auction data into the flow. Any approval found
    /// closes a pending confirmation; an in-flight submission is left alone.
    pub fn observe(&mut self, auction: Option<&Auction>, quotes: &[Quote]) {
        if matches!(
            self.state,
            ApprovalState::Submitting(_) | ApprovalState::Approved(_)
        ) {
            return;
        }
        let auction_id = self.auction_id;
        if let Some(quote) = quotes
            .iter()
            .find(|quote| quote.auction_id == auction_id && quote.is_approved())
        {
            self.state = ApprovalState::Approved(quote.id);
        } else if auction.is_some_and(Auction::is_approved) {
            self.state = ApprovalState::Locked;
        }
    }

    pub fn auction_id(&self) -> AuctionId {
        self.auction_id
    }

    pub fn state(&self) -> ApprovalState {
        self.state
    }

    /// Quote awaiting confirmation or in flight.
    pub fn pending(&self) -> Option<QuoteId> {
        match self.state {
            ApprovalState::ConfirmPending(id) | ApprovalState::Submitting(id) => Some(id),
            _ => None,
        }
    }

    pub fn approved_quote(&self) -> Option<QuoteId> {
        match self.state {
            ApprovalState::Approved(id) => Some(id),
            _ => None,
        }
    }

    /// True once no further quote of this auction may be approved.
    pub fn is_locked(&self) -> bool {
        matches!(self.state, ApprovalState::Approved(_) | ApprovalState::Locked)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, ApprovalState::Submitting(_))
    }

    /// Opens the confirmation for `quote_id`, replacing any pending target.
    pub fn select(&mut self, quote_id: QuoteId) -> Result<(), ApprovalError> {
        match self.state {
            ApprovalState::Approved(approved) => Err(ApprovalError::AlreadyApproved {
                auction_id: self.auction_id,
                quote_id: approved,
            }),
            ApprovalState::Locked => Err(ApprovalError::AuctionLocked(self.auction_id)),
            ApprovalState::Submitting(current) => Err(ApprovalError::InFlight(current)),
            ApprovalState::Open | ApprovalState::ConfirmPending(_) => {
                self.state = ApprovalState::ConfirmPending(quote_id);
                Ok(())
            }
        }
    }

    pub fn cancel(&mut self) {
        if let ApprovalState::ConfirmPending(_) = self.state {
            self.state = ApprovalState::Open;
        }
    }

    /// Moves the pending quote in flight and builds the request to send.
    pub fn begin_confirm(&mut self, user: &CurrentUser) -> Result<ApprovalRequest, ApprovalError> {
        match self.state {
            ApprovalState::ConfirmPending(quote_id) => {
                self.state = ApprovalState::Submitting(quote_id);
                Ok(ApprovalRequest {
                    action: ApprovalAction::Approved,
                    action_by: user.user_name.clone(),
                    auction_id: self.auction_id,
                    quote_id,
                })
            }
            ApprovalState::Submitting(quote_id) => Err(ApprovalError::InFlight(quote_id)),
            ApprovalState::Approved(quote_id) => Err(ApprovalError::AlreadyApproved {
                auction_id: self.auction_id,
                quote_id,
            }),
            ApprovalState::Locked => Err(ApprovalError::AuctionLocked(self.auction_id)),
            ApprovalState::Open => Err(ApprovalError::NothingSelected),
        }
    }

    /// Settles an in-flight approval. On failure the confirmation stays open
    /// on the same quote so the user can confirm again or cancel.
    pub fn complete<E: FailureDetail>(
        &mut self,
        result: Result<(), E>,
    ) -> Result<ApprovalOutcome, ApprovalError> {
        let ApprovalState::Submitting(quote_id) = self.state else {
            return Err(ApprovalError::NothingSelected);
        };
        match result {
            Ok(()) => {
                self.state = ApprovalState::Approved(quote_id);
                tracing::info!(auction_id = self.auction_id, quote_id, "quote approved");
                Ok(ApprovalOutcome::Approved { quote_id })
            }
            Err(error) => {
                self.state = ApprovalState::ConfirmPending(quote_id);
                let message = failure_message(&error, GENERIC_FAILURE);
                tracing::warn!(
                    auction_id = self.auction_id,
                    quote_id,
                    error = %error,
                    "quote approval failed"
                );
                Ok(ApprovalOutcome::Failed { quote_id, message })
            }
        }
    }
}

/// Performs the view-side effects of a settled approval.
pub fn apply_outcome<O: ApprovalObserver>(outcome: &ApprovalOutcome, observer: &mut O) {
    match outcome {
        ApprovalOutcome::Approved { .. } => {
            observer.notify(Notice {
                kind: NoticeKind::Success,
                text: "Quote approved successfully.".to_string(),
            });
            observer.refresh();
            observer.close_detail();
        }
        ApprovalOutcome::Failed { message, .. } => {
            observer.notify(Notice {
                kind: NoticeKind::Error,
                text: message.clone(),
            });
        }
    }
}

/// Confirms the pending selection: one network call, then the view effects.
pub async fn confirm_selection<A, O>(
    flow: &mut ApprovalFlow,
    approver: &A,
    user: &CurrentUser,
    observer: &mut O,
) -> Result<ApprovalOutcome, ApprovalError>
where
    A: QuoteApprover + ?Sized,
    O: ApprovalObserver,
{
    let request = flow.begin_confirm(user)?;
    let result = approver.submit_approval(&request).await;
    let outcome = flow.complete(result)?;
    apply_outcome(&outcome, observer);
    Ok(outcome)
}
