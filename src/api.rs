// API client module: a small blocking HTTP client for the Monarch API.
// Login goes through a REST endpoint; everything else is a named GraphQL
// operation posted to a single endpoint with a `Token` authorization header.

use reqwest::blocking::{Client, Response};
use reqwest::header::AUTHORIZATION;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Credentials;
use crate::error::ApiError;
use crate::models::{
    BulkUpdateOutcome, BulkUpdates, Category, Merchant, SearchFilters, SortOrder, Tag,
    Transaction, TransactionUpdates,
};
use crate::queries;

/// Default page size for transaction searches.
pub const SEARCH_LIMIT: usize = 1000;
/// How many merchants `find_merchants` returns.
pub const MERCHANT_LIMIT: usize = 8;

/// Typed operations the review loop needs from the remote service.
///
/// `ApiClient` is the real implementation; tests substitute an in-memory one.
pub trait Remote {
    fn search_transactions(
        &self,
        filters: &SearchFilters,
        order: SortOrder,
        limit: usize,
    ) -> Result<Vec<Transaction>, ApiError>;

    fn get_transaction(&self, id: &str) -> Result<Transaction, ApiError>;

    fn update_transaction(
        &self,
        transaction: &Transaction,
        updates: &TransactionUpdates,
    ) -> Result<Transaction, ApiError>;

    /// Replace the whole tag set, then return a fresh copy of the transaction.
    fn set_transaction_tags(
        &self,
        transaction: &Transaction,
        tag_ids: &[String],
    ) -> Result<Transaction, ApiError>;

    fn bulk_update_transactions(
        &self,
        transaction_ids: &[String],
        updates: &BulkUpdates,
    ) -> Result<BulkUpdateOutcome, ApiError>;

    fn find_merchants(&self, query: &str) -> Result<Vec<Merchant>, ApiError>;

    fn categories(&self) -> Result<Vec<Category>, ApiError>;

    fn tags(&self) -> Result<Vec<Tag>, ApiError>;
}

/// On-disk credential cache holding `{ "token": "..." }`.
pub struct TokenCache {
    path: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct CachedToken {
    token: String,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenCache { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached token, or `None` when the file is absent, unreadable
    /// or holds no token.
    pub fn load(&self) -> Option<String> {
        let data = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<CachedToken>(&data) {
            Ok(cached) if !cached.token.is_empty() => Some(cached.token),
            Ok(_) => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring malformed token cache");
                None
            }
        }
    }

    pub fn save(&self, token: &str) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string(&CachedToken {
            token: token.to_string(),
        })?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        // Owner read/write only, from the moment the file exists.
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // `mode` only applies on creation; tighten a pre-existing file too.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Blocking client holding the reqwest client, the API base URL and the
/// session token once authenticated.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    trusted_device: bool,
    supports_mfa: bool,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRequest<'a> {
    operation_name: &'a str,
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct PayloadError {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetTransactionData {
    get_transaction: Option<Transaction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchData {
    all_transactions: TransactionPage,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionPage {
    #[serde(default)]
    total_count: u64,
    results: Vec<Transaction>,
}

#[derive(Deserialize)]
struct CategoriesData {
    categories: Vec<Category>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TagsData {
    household_transaction_tags: Vec<Tag>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateData {
    update_transaction: UpdatePayload,
}

#[derive(Deserialize)]
struct UpdatePayload {
    transaction: Option<Transaction>,
    errors: Option<PayloadError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetTagsData {
    set_transaction_tags: SetTagsPayload,
}

#[derive(Deserialize)]
struct SetTagsPayload {
    errors: Option<PayloadError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkUpdateData {
    bulk_update_transactions: BulkUpdatePayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkUpdatePayload {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    affected_count: u64,
    errors: Option<PayloadError>,
}

#[derive(Deserialize)]
struct MerchantsData {
    merchants: Vec<Merchant>,
}

fn payload_error(errors: Option<PayloadError>, fallback: &str) -> ApiError {
    let message = errors
        .and_then(|e| e.message)
        .unwrap_or_else(|| fallback.to_string());
    ApiError::GraphQl(message)
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Use a preconfigured reqwest client (timeouts, proxies, ...).
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        ApiClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Use the cached token when there is one, otherwise log in with the
    /// `MONARCH_USERNAME`/`MONARCH_PASSWORD` credentials and cache the result.
    pub fn authenticate(&mut self, cache: &TokenCache) -> Result<(), ApiError> {
        self.authenticate_with(cache, Credentials::from_env)
    }

    pub fn authenticate_with<F>(&mut self, cache: &TokenCache, credentials: F) -> Result<(), ApiError>
    where
        F: FnOnce() -> Result<Credentials, &'static str>,
    {
        if let Some(token) = cache.load() {
            info!(path = %cache.path().display(), "Using cached token");
            self.token = Some(token);
            return Ok(());
        }

        info!("No cached token found. Logging in.");
        let credentials = credentials().map_err(ApiError::MissingCredentials)?;
        let token = self.login(&credentials)?;
        cache.save(&token)?;
        self.token = Some(token);
        Ok(())
    }

    fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let url = format!("{}/auth/login/", self.base_url);
        let res = self
            .client
            .post(&url)
            .json(&LoginRequest {
                username: &credentials.username,
                password: credentials.password.expose_secret(),
                trusted_device: true,
                supports_mfa: true,
            })
            .send()?;
        let resp: LoginResponse = Self::ensure_success(res)?.json()?;
        Ok(resp.token)
    }

    /// Turn any non-2xx response into `ApiError::Transport` with its body.
    fn ensure_success(res: Response) -> Result<Response, ApiError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().unwrap_or_default();
        Err(ApiError::Transport { status, body })
    }

    /// Post a named GraphQL operation and parse its `data` member.
    fn graphql<T: DeserializeOwned>(
        &self,
        operation_name: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::NotAuthenticated)?;
        debug!(operation = operation_name, %variables, "Running GraphQL operation");

        let url = format!("{}/graphql", self.base_url);
        let res = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Token {token}"))
            .json(&GraphQlRequest {
                operation_name,
                query,
                variables,
            })
            .send()?;
        let envelope: GraphQlResponse<T> = Self::ensure_success(res)?.json()?;
        match envelope.data {
            Some(data) => Ok(data),
            None => {
                let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
                Err(ApiError::GraphQl(if messages.is_empty() {
                    format!("{operation_name} returned no data")
                } else {
                    messages.join("; ")
                }))
            }
        }
    }
}

impl Remote for ApiClient {
    fn search_transactions(
        &self,
        filters: &SearchFilters,
        order: SortOrder,
        limit: usize,
    ) -> Result<Vec<Transaction>, ApiError> {
        let variables = json!({
            "orderBy": order,
            "limit": limit,
            "filters": filters,
        });
        let data: SearchData = self.graphql(
            queries::SEARCH_TRANSACTIONS_OP,
            queries::SEARCH_TRANSACTIONS,
            variables,
        )?;
        debug!(
            total = data.all_transactions.total_count,
            returned = data.all_transactions.results.len(),
            "Search complete"
        );
        Ok(data.all_transactions.results)
    }

    fn get_transaction(&self, id: &str) -> Result<Transaction, ApiError> {
        let variables = json!({ "id": id, "redirectPosted": true });
        let data: GetTransactionData =
            self.graphql(queries::GET_TRANSACTION_OP, queries::GET_TRANSACTION, variables)?;
        data.get_transaction
            .ok_or_else(|| ApiError::GraphQl(format!("Transaction {id} not found")))
    }

    fn update_transaction(
        &self,
        transaction: &Transaction,
        updates: &TransactionUpdates,
    ) -> Result<Transaction, ApiError> {
        let mut input = serde_json::to_value(updates)?;
        if let Value::Object(map) = &mut input {
            map.insert("id".into(), Value::String(transaction.id.clone()));
        }
        let data: UpdateData = self.graphql(
            queries::UPDATE_TRANSACTION_OP,
            queries::UPDATE_TRANSACTION,
            json!({ "input": input }),
        )?;
        let payload = data.update_transaction;
        payload
            .transaction
            .ok_or_else(|| payload_error(payload.errors, "Update returned no transaction"))
    }

    fn set_transaction_tags(
        &self,
        transaction: &Transaction,
        tag_ids: &[String],
    ) -> Result<Transaction, ApiError> {
        let variables = json!({
            "input": {
                "transactionId": transaction.id,
                "tagIds": tag_ids,
            }
        });
        let data: SetTagsData = self.graphql(
            queries::SET_TRANSACTION_TAGS_OP,
            queries::SET_TRANSACTION_TAGS,
            variables,
        )?;
        if let Some(errors) = data.set_transaction_tags.errors {
            return Err(payload_error(Some(errors), "Setting tags failed"));
        }
        self.get_transaction(&transaction.id)
    }

    fn bulk_update_transactions(
        &self,
        transaction_ids: &[String],
        updates: &BulkUpdates,
    ) -> Result<BulkUpdateOutcome, ApiError> {
        let variables = json!({
            "selectedTransactionIds": transaction_ids,
            "updates": updates,
            "excludedTransactionIds": [],
            "allSelected": false,
            "expectedAffectedTransactionCount": transaction_ids.len(),
            "filters": SearchFilters::default(),
        });
        let data: BulkUpdateData = self.graphql(
            queries::BULK_UPDATE_TRANSACTIONS_OP,
            queries::BULK_UPDATE_TRANSACTIONS,
            variables,
        )?;
        let payload = data.bulk_update_transactions;
        if !payload.success {
            return Err(payload_error(payload.errors, "Bulk update was rejected"));
        }
        Ok(BulkUpdateOutcome {
            success: payload.success,
            affected_count: payload.affected_count,
        })
    }

    fn find_merchants(&self, query: &str) -> Result<Vec<Merchant>, ApiError> {
        let variables = json!({
            "offset": 0,
            "limit": MERCHANT_LIMIT,
            "orderBy": "TRANSACTION_COUNT",
            "search": query,
        });
        let data: MerchantsData =
            self.graphql(queries::FIND_MERCHANTS_OP, queries::FIND_MERCHANTS, variables)?;
        Ok(data.merchants)
    }

    fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let data: CategoriesData =
            self.graphql(queries::GET_CATEGORIES_OP, queries::GET_CATEGORIES, json!({}))?;
        Ok(data.categories)
    }

    fn tags(&self) -> Result<Vec<Tag>, ApiError> {
        let data: TagsData = self.graphql(
            queries::GET_TAGS_OP,
            queries::GET_TAGS,
            json!({ "includeTransactionCount": false }),
        )?;
        Ok(data.household_transaction_tags)
    }
}
