//! Blocking CRM REST client.
//!
//! Authenticates with the OAuth2 username-password grant, then runs a
//! single SOQL query over the content object, following `nextRecordsUrl`
//! pagination until the full record set is in memory. The pipeline is a
//! one-shot synchronous batch, so there is no retry and no timeout
//! recovery — any failure here aborts the run.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use fieldpress_shared::{CrmConfig, FieldpressError, RawRecord, Result, source_fields};

/// User-Agent string for CRM requests.
const USER_AGENT: &str = concat!("fieldpress/", env!("CARGO_PKG_VERSION"));

/// CRM flag selecting records that should appear on the site.
const VISIBILITY_FIELD: &str = "on_website__c";

/// Authenticated CRM session.
pub struct CrmClient {
    http: reqwest::blocking::Client,
    instance_url: String,
    access_token: String,
    api_version: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    instance_url: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    records: Vec<serde_json::Map<String, serde_json::Value>>,
    #[serde(rename = "nextRecordsUrl")]
    next_records_url: Option<String>,
    done: bool,
}

impl CrmClient {
    /// Authenticate against the CRM login server. Credentials are read
    /// from the env vars named in the config; the security token is
    /// appended to the password as the token grant requires.
    #[instrument(skip(config), fields(login_url = %config.login_url))]
    pub fn login(config: &CrmConfig) -> Result<Self> {
        let login_url = Url::parse(&config.login_url).map_err(|e| {
            FieldpressError::config(format!("invalid login_url '{}': {e}", config.login_url))
        })?;

        let client_id = env_credential(&config.client_id_env)?;
        let client_secret = env_credential(&config.client_secret_env)?;
        let username = env_credential(&config.username_env)?;
        let password = env_credential(&config.password_env)?;
        let token = env_credential(&config.token_env)?;

        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FieldpressError::Network(format!("failed to build HTTP client: {e}")))?;

        let token_url = login_url
            .join("/services/oauth2/token")
            .map_err(|e| FieldpressError::config(format!("invalid login_url: {e}")))?;

        // The token grant wants the security token appended to the password
        let full_password = format!("{password}{token}");
        let params = [
            ("grant_type", "password"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("username", username.as_str()),
            ("password", full_password.as_str()),
        ];

        let response = http
            .post(token_url)
            .form(&params)
            .send()
            .map_err(|e| FieldpressError::Network(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(FieldpressError::Auth(format!(
                "token request rejected with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .map_err(|e| FieldpressError::Auth(format!("malformed token response: {e}")))?;

        debug!(instance_url = %token.instance_url, "authenticated with CRM");

        Ok(Self {
            http,
            instance_url: token.instance_url,
            access_token: token.access_token,
            api_version: config.api_version.clone(),
        })
    }

    /// Query every visible record of the content object, following
    /// pagination until the server reports the result set complete.
    #[instrument(skip(self))]
    pub fn fetch_visible_records(&self, object: &str) -> Result<Vec<RawRecord>> {
        let fields: Vec<&str> = source_fields().collect();
        let soql = format!(
            "SELECT {} FROM {object} WHERE {VISIBILITY_FIELD} = true",
            fields.join(",")
        );

        let mut records = Vec::new();
        let first_page = format!(
            "{}/services/data/{}/query",
            self.instance_url, self.api_version
        );

        let mut response: QueryResponse = self.get_json(
            self.http
                .get(&first_page)
                .query(&[("q", soql.as_str())]),
        )?;

        loop {
            records.extend(response.records.drain(..).map(into_raw_record));

            if response.done {
                break;
            }
            let Some(next) = response.next_records_url.take() else {
                break;
            };

            debug!(fetched = records.len(), "following query pagination");
            let next_page = format!("{}{next}", self.instance_url);
            response = self.get_json(self.http.get(&next_page))?;
        }

        Ok(records)
    }

    fn get_json(&self, request: reqwest::blocking::RequestBuilder) -> Result<QueryResponse> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .map_err(|e| FieldpressError::Network(format!("query request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(FieldpressError::Network(format!(
                "query rejected with status {}",
                response.status()
            )));
        }

        response
            .json()
            .map_err(|e| FieldpressError::validation(format!("malformed query response: {e}")))
    }
}

/// Read one credential from the environment.
fn env_credential(var_name: &str) -> Result<String> {
    std::env::var(var_name).map_err(|_| {
        FieldpressError::config(format!("credential env var {var_name} is not set"))
    })
}

/// Convert a query result row into a raw record, dropping the CRM's
/// per-row `attributes` envelope.
fn into_raw_record(row: serde_json::Map<String, serde_json::Value>) -> RawRecord {
    row.into_iter()
        .filter(|(key, _)| key != "attributes")
        .collect()
}
