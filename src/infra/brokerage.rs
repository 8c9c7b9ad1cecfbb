//! Thin asynchronous client for the brokerage REST backend.
//!
//! - Typed accessors for received quotes, a transporter's own quotes and
//!   active auctions, all paginated with `{count, page, search, orgId}`.
//! - Approval and quote submission mutations.
//! - No caching: callers refetch after every mutation.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use time::macros::format_description;

use crate::domain::{
    ApprovalRequest, Auction, AuctionStatus, FailureDetail, Page, PageRequest, Quote,
    QuoteApprover, QuoteStatus, QuoteSubmission, QuoteUser,
};
use crate::infra::envelope::{decode_error_body, decode_list, decode_mutation, FlexNumber, MutationAck};
use crate::util::config::AppConfig;
use crate::util::version::user_agent;

const RECEIVED_QUOTES_PATH: &str = "api/transaction/getUserAuctionsQuoteByOrgId";
const QUOTES_BY_USER_PATH: &str = "api/transaction/getQuoteByUserId";
const ACTIVE_AUCTIONS_PATH: &str = "api/transaction/getAllAuctionsByOrgId";
const APPROVAL_PATH: &str = "api/transaction/createApprovalQuote";
const SAVE_QUOTE_PATH: &str = "api/transaction/createUpdateQuote";

const QUOTE_LIST_KEY: &str = "quoteVO";
const AUCTION_LIST_KEY: &str = "auctionsVO";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Rows requested per page when walking a whole list.
const FULL_LIST_PAGE_SIZE: u32 = 100;
/// Pages walked before a list is reported as truncated.
const MAX_LIST_PAGES: u32 = 50;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded with status {status}")]
    Status {
        status: u16,
        message: Option<String>,
        error: Option<String>,
    },
    #[error("request was rejected by the server")]
    Rejected {
        message: Option<String>,
        error: Option<String>,
    },
    #[error("list stopped after {pages} pages with {seen} of {total} rows")]
    Truncated { pages: u32, seen: usize, total: u64 },
    #[error("response missing {0}")]
    MissingPayload(&'static str),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FailureDetail for ApiError {
    fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } | Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    fn server_error(&self) -> Option<&str> {
        match self {
            Self::Status { error, .. } | Self::Rejected { error, .. } => error.as_deref(),
            _ => None,
        }
    }
}

impl ApiError {
    /// Text suitable for a toast.
    pub fn user_message(&self, fallback: &str) -> String {
        crate::domain::failure_message(self, fallback)
    }
}

#[derive(Clone)]
pub struct BrokerageClient {
    http: Client,
    base_url: Url,
}

impl BrokerageClient {
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::with_base_url(&config.api_base_url)
    }

    pub fn with_base_url(base: &str) -> Result<Self, ApiError> {
        let base_url = normalize_base(base)?;
        let http = Client::builder()
            .user_agent(user_agent())
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, base_url })
    }

    /// Quotes received by the requesting org across its auctions.
    pub async fn received_quotes(&self, request: &PageRequest) -> Result<Page<Quote>, ApiError> {
        let url = self.list_url(RECEIVED_QUOTES_PATH, request)?;
        let body = self.fetch_json(self.http.get(url)).await?;
        let page = decode_list::<QuoteDto>(body, QUOTE_LIST_KEY)?;
        tracing::debug!(count = page.data.len(), total = page.total_count, "received quotes loaded");
        Ok(map_page(page, Quote::from))
    }

    /// Every quote received by the org, walking all pages of the list.
    pub async fn all_received_quotes(&self, request: &PageRequest) -> Result<Vec<Quote>, ApiError> {
        let first = PageRequest {
            count: request.count.max(FULL_LIST_PAGE_SIZE),
            page: 1,
            ..request.clone()
        };
        collect_pages(first, move |page| async move { self.received_quotes(&page).await }).await
    }

    /// Quotes submitted by one transporter user.
    pub async fn quotes_by_user(
        &self,
        user_id: i64,
        request: &PageRequest,
    ) -> Result<Page<Quote>, ApiError> {
        let mut url = self.list_url(QUOTES_BY_USER_PATH, request)?;
        url.query_pairs_mut()
            .append_pair("userId", &user_id.to_string());
        let body = self.fetch_json(self.http.get(url)).await?;
        let page = decode_list::<QuoteDto>(body, QUOTE_LIST_KEY)?;
        Ok(map_page(page, Quote::from))
    }

    /// Auctions currently visible to the requesting org.
    pub async fn active_auctions(&self, request: &PageRequest) -> Result<Page<Auction>, ApiError> {
        let url = self.list_url(ACTIVE_AUCTIONS_PATH, request)?;
        let body = self.fetch_json(self.http.get(url)).await?;
        let page = decode_list::<AuctionDto>(body, AUCTION_LIST_KEY)?;
        Ok(map_page(page, Auction::from))
    }

    /// Approves a quote. Parameters travel in the query string.
    pub async fn approve_quote(&self, request: &ApprovalRequest) -> Result<MutationAck, ApiError> {
        let url = self.approval_url(request)?;
        tracing::info!(
            auction_id = request.auction_id,
            quote_id = request.quote_id,
            action = request.action.as_str(),
            "submitting quote approval"
        );
        let body = self.send_for_text(self.http.put(url)).await?;
        decode_mutation(&body)
    }

    /// Creates a quote, or updates it when `quote_id` is set.
    pub async fn save_quote(&self, submission: &QuoteSubmission) -> Result<MutationAck, ApiError> {
        let url = self.url(SAVE_QUOTE_PATH)?;
        let payload = QuotePayload::from(submission);
        tracing::info!(
            auction_id = submission.auction_id,
            update = submission.quote_id.is_some(),
            "saving quote"
        );
        let body = self.send_for_text(self.http.put(url).json(&payload)).await?;
        decode_mutation(&body)
    }

    pub(crate) fn approval_url(&self, request: &ApprovalRequest) -> Result<Url, ApiError> {
        let mut url = self.url(APPROVAL_PATH)?;
        url.query_pairs_mut()
            .append_pair("action", request.action.as_str())
            .append_pair("actionBy", &request.action_by)
            .append_pair("auctionId", &request.auction_id.to_string())
            .append_pair("quotesId", &request.quote_id.to_string());
        Ok(url)
    }

    pub(crate) fn list_url(&self, path: &str, request: &PageRequest) -> Result<Url, ApiError> {
        let mut url = self.url(path)?;
        url.query_pairs_mut()
            .append_pair("count", &request.count.to_string())
            .append_pair("page", &request.page.to_string())
            .append_pair("search", &request.search)
            .append_pair("orgId", &request.org_id.to_string());
        Ok(url)
    }

    async fn fetch_json(&self, builder: RequestBuilder) -> Result<Value, ApiError> {
        let body = self.send_for_text(builder).await?;
        if body.trim().is_empty() {
            return Err(ApiError::MissingPayload("response body"));
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_for_text(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "backend returned error status");
            return Err(decode_error_body(status.as_u16(), &body));
        }
        Ok(body)
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }
}

#[async_trait]
impl QuoteApprover for BrokerageClient {
    type Error = ApiError;

    async fn submit_approval(&self, request: &ApprovalRequest) -> Result<(), ApiError> {
        self.approve_quote(request).await.map(|_| ())
    }
}

/// Fetches consecutive pages starting at `first` until `total_count` rows
/// have arrived or a page comes back empty.
pub async fn collect_pages<T, F, Fut>(first: PageRequest, mut fetch: F) -> Result<Vec<T>, ApiError>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>, ApiError>>,
{
    let mut rows = Vec::new();
    let mut request = first;
    let mut total = 0;
    for _ in 0..MAX_LIST_PAGES {
        let next = request.page + 1;
        let page = fetch(request.clone()).await?;
        total = page.total_count;
        let received = page.data.len();
        rows.extend(page.data);
        if received == 0 || rows.len() as u64 >= total {
            tracing::debug!(rows = rows.len(), total, "list fully loaded");
            return Ok(rows);
        }
        request = request.with_page(next);
    }
    Err(ApiError::Truncated {
        pages: MAX_LIST_PAGES,
        seen: rows.len(),
        total,
    })
}

// `Url::join` drops the last segment unless the base ends with a slash.
fn normalize_base(base: &str) -> Result<Url, url::ParseError> {
    let trimmed = base.trim();
    if trimmed.ends_with('/') {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("{trimmed}/"))
    }
}

fn map_page<D, T>(page: Page<D>, convert: impl Fn(D) -> T) -> Page<T> {
    Page {
        data: page.data.into_iter().map(convert).collect(),
        total_count: page.total_count,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuotePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    auctions_id: i64,
    quote_amount: f64,
    estimated_delivery_date: String,
    user_id: i64,
    org_id: i64,
    created_by: String,
}

impl From<&QuoteSubmission> for QuotePayload {
    fn from(submission: &QuoteSubmission) -> Self {
        let estimated_delivery_date = submission
            .estimated_delivery_date
            .format(format_description!("[year]-[month]-[day]"))
            .unwrap_or_else(|_| submission.estimated_delivery_date.to_string());
        Self {
            id: submission.quote_id,
            auctions_id: submission.auction_id,
            quote_amount: submission.quote_amount,
            estimated_delivery_date,
            user_id: submission.user_id,
            org_id: submission.org_id,
            created_by: submission.created_by.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteDto {
    #[serde(deserialize_with = "id_from_json")]
    id: i64,
    #[serde(default, alias = "auctionId")]
    auctions_id: Option<FlexNumber>,
    #[serde(default)]
    quote_amount: Option<FlexNumber>,
    #[serde(default)]
    estimated_delivery_date: Option<String>,
    #[serde(default, alias = "createdOn")]
    created_date: Option<String>,
    #[serde(default, alias = "userVO")]
    user: Option<QuoteUserDto>,
    #[serde(default)]
    score: Option<FlexNumber>,
    #[serde(default, alias = "approvalStatus")]
    status: Option<String>,
    #[serde(default)]
    approved_by: Option<String>,
    #[serde(default)]
    approved_on: Option<String>,
    #[serde(default, rename = "auctionsVO", alias = "auction")]
    auctions_vo: Option<AuctionDto>,
}

impl From<QuoteDto> for Quote {
    fn from(dto: QuoteDto) -> Self {
        let auction = dto.auctions_vo.map(Auction::from);
        let auction_id = dto
            .auctions_id
            .as_ref()
            .and_then(FlexNumber::as_i64)
            .or_else(|| auction.as_ref().map(|auction| auction.id))
            .unwrap_or_default();
        Self {
            id: dto.id,
            auction_id,
            quote_amount: dto
                .quote_amount
                .as_ref()
                .and_then(FlexNumber::as_f64)
                .unwrap_or(f64::NAN),
            estimated_delivery_date: dto.estimated_delivery_date,
            created_date: dto.created_date,
            user: dto.user.map(QuoteUser::from).unwrap_or_default(),
            score: dto.score.as_ref().and_then(FlexNumber::as_f64),
            status: QuoteStatus::from_wire(dto.status.as_deref()),
            approved_by: dto.approved_by,
            approved_on: dto.approved_on,
            auction,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteUserDto {
    #[serde(default)]
    id: Option<FlexNumber>,
    #[serde(default)]
    organization_name: Option<String>,
    #[serde(default)]
    rating: Option<FlexNumber>,
}

impl From<QuoteUserDto> for QuoteUser {
    fn from(dto: QuoteUserDto) -> Self {
        Self {
            user_id: dto.id.as_ref().and_then(FlexNumber::as_i64),
            organization_name: dto
                .organization_name
                .unwrap_or_else(|| "Unknown vendor".to_string()),
            rating: dto.rating.as_ref().and_then(FlexNumber::as_f64),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuctionDto {
    #[serde(deserialize_with = "id_from_json")]
    id: i64,
    #[serde(default, alias = "materialType")]
    material: Option<String>,
    #[serde(default, alias = "loadingPoint")]
    loading_address: Option<String>,
    #[serde(default, alias = "unloadingPoint")]
    unloading_address: Option<String>,
    #[serde(default)]
    vehicle_type: Option<String>,
    #[serde(default, alias = "noOfVehicles")]
    vehicle_count: Option<FlexNumber>,
    #[serde(default)]
    min_price: Option<FlexNumber>,
    #[serde(default)]
    max_price: Option<FlexNumber>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, alias = "approvedVendorName")]
    approved_vendor: Option<String>,
    #[serde(default, alias = "auctionEndDate")]
    end_date: Option<String>,
}

impl From<AuctionDto> for Auction {
    fn from(dto: AuctionDto) -> Self {
        Self {
            id: dto.id,
            material: dto.material.unwrap_or_else(|| "Unspecified".to_string()),
            loading_address: dto.loading_address.unwrap_or_default(),
            unloading_address: dto.unloading_address.unwrap_or_default(),
            vehicle_type: dto.vehicle_type,
            vehicle_count: dto
                .vehicle_count
                .as_ref()
                .and_then(FlexNumber::as_i64)
                .and_then(|count| u32::try_from(count).ok()),
            min_price: dto.min_price.as_ref().and_then(FlexNumber::as_f64),
            max_price: dto.max_price.as_ref().and_then(FlexNumber::as_f64),
            status: AuctionStatus::from_wire(dto.status.as_deref()),
            approved_vendor: dto.approved_vendor.filter(|name| !name.trim().is_empty()),
            end_date: dto.end_date,
        }
    }
}

fn id_from_json<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct NumberOrString;

    impl<'de> serde::de::Visitor<'de> for NumberOrString {
        type Value = i64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("an integer id or a numeric string")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            i64::try_from(value).map_err(|_| E::custom("id out of range"))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            value
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid id `{value}`")))
        }
    }

    deserializer.deserialize_any(NumberOrString)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{approval::ApprovalAction, rank_quotes, AuctionQuotes, QuoteSort};

    fn client() -> BrokerageClient {
        BrokerageClient::with_base_url("https://backoffice.example.com/freight").expect("client")
    }

    #[test]
    fn approval_parameters_travel_in_query() {
        let request = ApprovalRequest {
            action: ApprovalAction::Approved,
            action_by: "priya ops".to_string(),
            auction_id: 40,
            quote_id: 5,
        };
        let url = client().approval_url(&request).expect("url");
        assert_eq!(url.path(), "/freight/api/transaction/createApprovalQuote");
        assert_eq!(
            url.query(),
            Some("action=Approved&actionBy=priya+ops&auctionId=40&quotesId=5")
        );
    }

    #[test]
    fn list_url_carries_paging_fields() {
        let request = PageRequest::first(3, 10).with_page(2).with_search("steel");
        let url = client().list_url(RECEIVED_QUOTES_PATH, &request).expect("url");
        assert_eq!(url.query(), Some("count=10&page=2&search=steel&orgId=3"));
    }

    fn paged(quotes: &[Quote], request: &PageRequest) -> Page<Quote> {
        let size = request.count as usize;
        let start = (request.page as usize - 1) * size;
        Page {
            data: quotes.iter().skip(start).take(size).cloned().collect(),
            total_count: quotes.len() as u64,
        }
    }

    #[tokio::test]
    async fn collect_pages_walks_until_total_count() {
        let rows: Vec<Quote> = (1..=5)
            .map(|id| Quote {
                id,
                ..Quote::default()
            })
            .collect();
        let mut seen_pages = Vec::new();
        let collected = collect_pages(PageRequest::first(3, 2), |request| {
            seen_pages.push(request.page);
            let page = paged(&rows, &request);
            async move { Ok::<_, ApiError>(page) }
        })
        .await
        .expect("collects");

        assert_eq!(seen_pages, vec![1, 2, 3]);
        assert_eq!(collected.len(), 5);
    }

    #[tokio::test]
    async fn collect_pages_reports_a_list_that_never_ends() {
        let result = collect_pages(PageRequest::first(3, 1), |_| async {
            Ok::<_, ApiError>(Page {
                data: vec![Quote::default()],
                total_count: 1_000,
            })
        })
        .await;
        assert!(matches!(
            result,
            Err(ApiError::Truncated { pages: MAX_LIST_PAGES, seen: 50, total: 1_000 })
        ));
    }

    #[tokio::test]
    async fn review_ranks_every_quote_of_the_auction_across_pages() {
        // Auction 40's cheapest bid only shows up on the last page.
        let amounts = [
            (1, 40, 9000.0),
            (2, 41, 500.0),
            (3, 40, 8000.0),
            (4, 41, 700.0),
            (5, 40, 6500.0),
        ];
        let rows: Vec<Quote> = amounts
            .iter()
            .map(|&(id, auction_id, quote_amount)| Quote {
                id,
                auction_id,
                quote_amount,
                ..Quote::default()
            })
            .collect();

        let first_page = paged(&rows, &PageRequest::first(3, 2));
        let partial = AuctionQuotes::from_quotes(40, None, first_page.data);
        assert_eq!(partial.quotes.len(), 1);

        let all = collect_pages(PageRequest::first(3, 2), |request| {
            let page = paged(&rows, &request);
            async move { Ok::<_, ApiError>(page) }
        })
        .await
        .expect("collects");
        let group = AuctionQuotes::from_quotes(40, None, all);
        let ranking = rank_quotes(&group.quotes, QuoteSort::default());

        let mut ranked: Vec<_> = ranking.entries.iter().map(|entry| entry.quote.id).collect();
        ranked.sort_unstable();
        assert_eq!(ranked, vec![1, 3, 5]);
        assert_eq!(ranking.lowest_amount, Some(6500.0));
    }

    #[test]
    fn quote_dto_maps_loose_wire_shapes() {
        let body = json!({
            "paramObjectsMap": {
                "quoteVO": {
                    "data": [{
                        "id": "31",
                        "quoteAmount": "18500",
                        "estimatedDeliveryDate": "2024-06-02",
                        "user": { "organizationName": "Swift Haulers", "rating": 4.2 },
                        "status": "APPROVED",
                        "auctionsVO": { "id": 9, "material": "Cement", "minPrice": "15000" }
                    }],
                    "totalCount": 1
                }
            }
        });
        let page = decode_list::<QuoteDto>(body, QUOTE_LIST_KEY).expect("decodes");
        let quote = Quote::from(page.data.into_iter().next().expect("one quote"));
        assert_eq!(quote.id, 31);
        assert_eq!(quote.auction_id, 9);
        assert_eq!(quote.quote_amount, 18500.0);
        assert_eq!(quote.user.organization_name, "Swift Haulers");
        assert_eq!(quote.user.rating, Some(4.2));
        assert!(quote.is_approved());
        let auction = quote.auction.expect("embedded auction");
        assert_eq!(auction.material, "Cement");
        assert_eq!(auction.min_price, Some(15000.0));
    }

    #[test]
    fn api_error_exposes_server_fields_for_notifications() {
        let err = ApiError::Status {
            status: 422,
            message: Some("Quote amount exceeds max price".to_string()),
            error: None,
        };
        assert_eq!(err.user_message("fallback"), "Quote amount exceeds max price");

        let missing = ApiError::MissingPayload("paramObjectsMap");
        assert_eq!(missing.user_message("fallback"), "response missing paramObjectsMap");
    }

    #[test]
    fn quote_payload_uses_backend_field_names() {
        let submission = QuoteSubmission {
            quote_id: None,
            auction_id: 12,
            quote_amount: 7300.0,
            estimated_delivery_date: time::macros::date!(2024 - 07 - 01),
            user_id: 77,
            org_id: 8,
            created_by: "ravi.t".to_string(),
        };
        let value = serde_json::to_value(QuotePayload::from(&submission)).expect("serialize");
        assert_eq!(
            value,
            json!({
                "auctionsId": 12,
                "quoteAmount": 7300.0,
                "estimatedDeliveryDate": "2024-07-01",
                "userId": 77,
                "orgId": 8,
                "createdBy": "ravi.t"
            })
        );
    }
}
