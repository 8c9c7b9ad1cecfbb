use std::time::SystemTime;

use dioxus::{prelude::*, signals::Signal};

use crate::{
    domain::{AppState, CurrentUser, PageRequest, Resource},
    infra::brokerage::BrokerageClient,
    ui::{
        components::toast::{push_toast, Toast, ToastKind, ToastMessage},
        pages::{ActiveBidsPage, AuctionsPage, MyQuotesPage, SettingsPage},
        shell::Shell,
    },
    util::{
        assets, config,
        persistence::{load_session, save_session},
    },
};

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[route("/")]
    Auctions {},
    #[route("/active-bids")]
    ActiveBids {},
    #[route("/my-quotes")]
    MyQuotes {},
    #[route("/settings")]
    Settings {},
}

/// Bumped after every mutation; list resources read it to refetch.
#[derive(Clone, Copy, PartialEq)]
pub struct ReloadSignal(Signal<u64>);

impl ReloadSignal {
    pub fn bump(self) {
        let mut generation = self.0;
        generation.with_mut(|value| *value += 1);
    }

    /// Reads the generation and subscribes the caller to changes.
    pub fn generation(&self) -> u64 {
        (self.0)()
    }
}

#[component]
pub fn App() -> Element {
    let state = use_signal(AppState::default);
    use_hook({
        let mut state = state.clone();
        move || {
            if let Some(saved) = load_session() {
                state.with_mut(|st| st.apply_persisted(saved));
            }
        }
    });
    use_context_provider(|| state.clone());

    let toasts = use_signal(Vec::<ToastMessage>::new);
    use_context_provider(|| toasts.clone());

    let reload = use_signal(|| 0_u64);
    use_context_provider(|| ReloadSignal(reload));

    rsx! {
        document::Link { rel: "icon", href: assets::favicon_data_uri() }
        document::Style { "{assets::main_css()}" }
        Router::<Route> {}
        Toast {}
    }
}

pub fn persist_session(state: &Signal<AppState>) {
    let snapshot = state.with(|st| st.to_persisted());
    if let Err(err) = save_session(&snapshot) {
        tracing::warn!(error = %err, "failed to persist session");
    }
}

/// Builds a client for the configured backend, reporting failures as a toast.
pub fn brokerage_client(toasts: Signal<Vec<ToastMessage>>) -> Option<BrokerageClient> {
    match BrokerageClient::from_config(config::current()) {
        Ok(client) => Some(client),
        Err(err) => {
            tracing::error!(error = %err, "failed to initialise brokerage client");
            push_toast(
                toasts,
                ToastKind::Error,
                "Failed to initialise the brokerage client. Check the API URL in settings.",
            );
            None
        }
    }
}

pub fn page_request(user: &CurrentUser, page: u32, search: &str) -> PageRequest {
    PageRequest::first(user.org_id, config::current().page_size)
        .with_page(page)
        .with_search(search.trim())
}

/// Loads quotes received by the user's org into the shared state.
pub async fn fetch_received_quotes(
    mut state: Signal<AppState>,
    toasts: Signal<Vec<ToastMessage>>,
    request: PageRequest,
) -> Option<u64> {
    let client = brokerage_client(toasts)?;
    match client.received_quotes(&request).await {
        Ok(page) => {
            let total = page.total_count;
            state.with_mut(|st| {
                st.received_quotes = page.data;
                st.received_total = total;
                st.fetches
                    .record_fetch(Resource::ReceivedQuotes, SystemTime::now());
            });
            Some(total)
        }
        Err(err) => {
            tracing::warn!(error = %err, page = request.page, "failed to load received quotes");
            push_toast(
                toasts,
                ToastKind::Error,
                format!(
                    "Failed to load quotes: {}",
                    err.user_message("unexpected server response")
                ),
            );
            None
        }
    }
}

/// Loads open auctions for the active bids screen.
pub async fn fetch_active_auctions(
    mut state: Signal<AppState>,
    toasts: Signal<Vec<ToastMessage>>,
    request: PageRequest,
) -> Option<usize> {
    let client = brokerage_client(toasts)?;
    match client.active_auctions(&request).await {
        Ok(page) => {
            let count = page.data.len();
            state.with_mut(|st| {
                st.active_auctions = page.data;
                st.fetches
                    .record_fetch(Resource::ActiveAuctions, SystemTime::now());
            });
            Some(count)
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to load active auctions");
            push_toast(
                toasts,
                ToastKind::Error,
                format!(
                    "Failed to load active auctions: {}",
                    err.user_message("unexpected server response")
                ),
            );
            None
        }
    }
}

/// Loads the quotes the current transporter has submitted.
pub async fn fetch_my_quotes(
    mut state: Signal<AppState>,
    toasts: Signal<Vec<ToastMessage>>,
    user_id: i64,
    request: PageRequest,
) -> Option<u64> {
    let client = brokerage_client(toasts)?;
    match client.quotes_by_user(user_id, &request).await {
        Ok(page) => {
            let total = page.total_count;
            state.with_mut(|st| {
                st.my_quotes = page.data;
                st.my_quotes_total = total;
                st.fetches.record_fetch(Resource::MyQuotes, SystemTime::now());
            });
            Some(total)
        }
        Err(err) => {
            tracing::warn!(error = %err, user_id, "failed to load submitted quotes");
            push_toast(
                toasts,
                ToastKind::Error,
                format!(
                    "Failed to load your quotes: {}",
                    err.user_message("unexpected server response")
                ),
            );
            None
        }
    }
}

#[component]
pub fn Auctions() -> Element {
    rsx! { Shell { AuctionsPage {} } }
}

#[component]
pub fn ActiveBids() -> Element {
    rsx! { Shell { ActiveBidsPage {} } }
}

#[component]
pub fn MyQuotes() -> Element {
    rsx! { Shell { MyQuotesPage {} } }
}

#[component]
pub fn Settings() -> Element {
    rsx! { Shell { SettingsPage {} } }
}
