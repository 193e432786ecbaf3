//! OAuth2 authorization and token persistence.
//!
//! The first run prints a consent URL and reads the authorization code from
//! stdin. The resulting token is persisted through a [`TokenStore`] and
//! reused (and refreshed when it expires) on later runs.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use oauth2::{
    basic::BasicClient, AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret as OAuthSecret,
    CsrfToken, EndpointNotSet, EndpointSet, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl,
    RefreshToken, Scope, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::RwLock;

use crate::error::{Error, Result};

/// Read-only access to the whole drive.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_REDIRECT_URI: &str = "http://localhost";

/// Tokens are refreshed this long before they actually expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

type GoogleOAuthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// OAuth client credentials downloaded from the Google Cloud console.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

/// The console wraps the credentials in an `installed` or `web` object.
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ClientSecret {
    /// Load client credentials from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::Credentials {
            path: path.to_path_buf(),
            message: format!("unable to read client secret file: {}", e),
        })?;
        Self::parse(path, &content)
    }

    /// Parse client credentials; `path` is only used for error messages.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let file: ClientSecretFile =
            serde_json::from_str(content).map_err(|e| Error::Credentials {
                path: path.to_path_buf(),
                message: format!("unable to parse client secret file: {}", e),
            })?;

        let secret = file
            .installed
            .or(file.web)
            .ok_or_else(|| Error::Credentials {
                path: path.to_path_buf(),
                message: "expected an \"installed\" or \"web\" client".to_string(),
            })?;

        if secret.client_id.is_empty() {
            return Err(Error::Credentials {
                path: path.to_path_buf(),
                message: "client_id is empty".to_string(),
            });
        }

        Ok(secret)
    }

    /// Redirect URI registered for the client.
    pub fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_REDIRECT_URI)
    }
}

/// A persisted OAuth token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expiry: DateTime<Utc>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Token {
    /// Returns true if the access token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expiry
    }

    /// Returns true if the access token will expire within the given duration.
    pub fn expires_within(&self, duration: Duration) -> bool {
        Utc::now() + duration >= self.expiry
    }

    fn needs_refresh(&self) -> bool {
        self.expires_within(Duration::seconds(EXPIRY_MARGIN_SECS))
    }
}

/// Persistence for the OAuth token between runs.
pub trait TokenStore: Send + Sync {
    /// Load the saved token, `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<Token>>;

    fn save(&self, token: &Token) -> Result<()>;
}

/// Stores the token as JSON in a file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<Token>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn save(&self, token: &Token) -> Result<()> {
        tracing::info!("Saving credential file to: {}", self.path.display());
        let content = serde_json::to_string_pretty(token)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Authorization-code flow against the Google OAuth endpoints.
pub struct AuthorizationFlow {
    client: GoogleOAuthClient,
    http: reqwest::Client,
    scopes: Vec<String>,
}

impl AuthorizationFlow {
    /// Create a flow requesting read-only drive access.
    pub fn new(secret: &ClientSecret) -> Result<Self> {
        let client = BasicClient::new(ClientId::new(secret.client_id.clone()))
            .set_client_secret(OAuthSecret::new(secret.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(secret.auth_uri.clone())?)
            .set_token_uri(TokenUrl::new(secret.token_uri.clone())?)
            .set_redirect_uri(RedirectUrl::new(secret.redirect_uri().to_string())?)
            .set_auth_type(AuthType::RequestBody);

        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            http,
            scopes: vec![DRIVE_READONLY_SCOPE.to_string()],
        })
    }

    /// Build the consent URL. The verifier must be kept for [`Self::exchange_code`].
    pub fn authorize_url(&self) -> (String, PkceCodeVerifier) {
        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();

        let mut request = self.client.authorize_url(CsrfToken::new_random);
        for scope in &self.scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }

        let (url, _csrf) = request
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .set_pkce_challenge(challenge)
            .url();

        (url.to_string(), verifier)
    }

    /// Exchange an authorization code for a token.
    pub async fn exchange_code(&self, code: String, verifier: PkceCodeVerifier) -> Result<Token> {
        tracing::info!("Exchanging authorization code for token");

        let response = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(verifier)
            .request_async(&self.http)
            .await
            .map_err(|e| {
                Error::Authentication(format!("Unable to retrieve token from web: {}", e))
            })?;

        Ok(Token {
            access_token: response.access_token().secret().to_string(),
            token_type: default_token_type(),
            refresh_token: response.refresh_token().map(|t| t.secret().to_string()),
            expiry: expiry_from(response.expires_in()),
        })
    }

    /// Obtain a fresh access token. The old refresh token is kept when the
    /// server does not rotate it.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Token> {
        tracing::info!("Refreshing access token");

        let response = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| Error::Authentication(format!("Unable to refresh token: {}", e)))?;

        Ok(Token {
            access_token: response.access_token().secret().to_string(),
            token_type: default_token_type(),
            refresh_token: response
                .refresh_token()
                .map(|t| t.secret().to_string())
                .or_else(|| Some(refresh_token.to_string())),
            expiry: expiry_from(response.expires_in()),
        })
    }

    /// Prompt the user to authorize in a browser and paste the code back.
    pub async fn interactive(&self) -> Result<Token> {
        let (url, verifier) = self.authorize_url();

        println!(
            "Go to the following link in your browser then type the authorization code \
             (or paste the address you were redirected to):\n{}",
            url
        );

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|e| Error::Authentication(format!("Unable to read authorization code: {}", e)))?;

        let code = extract_code(&line)
            .ok_or_else(|| Error::Aborted("no authorization code entered".to_string()))?;

        self.exchange_code(code, verifier).await
    }
}

fn expiry_from(expires_in: Option<std::time::Duration>) -> DateTime<Utc> {
    let secs = expires_in.map(|d| d.as_secs() as i64).unwrap_or(3600);
    Utc::now() + Duration::seconds(secs)
}

/// Accept either the bare code or the full redirect URL carrying `?code=`.
pub fn extract_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(url) = url::Url::parse(input) {
        if url.scheme() == "http" || url.scheme() == "https" {
            return url
                .query_pairs()
                .find(|(key, _)| key == "code")
                .map(|(_, value)| value.into_owned());
        }
    }

    Some(input.to_string())
}

/// Reuse the stored token, refreshing it or running the interactive flow
/// as needed. Any new token is saved back to the store.
pub async fn load_or_authorize(flow: &AuthorizationFlow, store: &dyn TokenStore) -> Result<Token> {
    let stored = match store.load() {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!("Ignoring unreadable token file: {}", e);
            None
        }
    };

    if let Some(token) = stored {
        if !token.needs_refresh() {
            tracing::debug!("Using stored access token");
            return Ok(token);
        }

        if let Some(refresh_token) = token.refresh_token.as_deref() {
            match flow.refresh(refresh_token).await {
                Ok(token) => {
                    store.save(&token)?;
                    return Ok(token);
                }
                Err(e) => tracing::warn!("Stored token could not be refreshed: {}", e),
            }
        }
    }

    let token = flow.interactive().await?;
    store.save(&token)?;
    Ok(token)
}

/// Supplies the bearer token for each API request.
#[async_trait]
pub trait AccessToken: Send + Sync {
    async fn bearer(&self) -> Result<String>;
}

/// A fixed bearer token.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl AccessToken for StaticToken {
    async fn bearer(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// A token that is refreshed (and re-saved) shortly before it expires.
pub struct RefreshingToken {
    flow: AuthorizationFlow,
    store: Box<dyn TokenStore>,
    current: RwLock<Token>,
}

impl RefreshingToken {
    pub fn new(flow: AuthorizationFlow, store: Box<dyn TokenStore>, token: Token) -> Self {
        Self {
            flow,
            store,
            current: RwLock::new(token),
        }
    }
}

#[async_trait]
impl AccessToken for RefreshingToken {
    async fn bearer(&self) -> Result<String> {
        {
            let token = self.current.read().await;
            if !token.needs_refresh() {
                return Ok(token.access_token.clone());
            }
        }

        let mut token = self.current.write().await;
        if token.needs_refresh() {
            let refresh_token = token.refresh_token.clone().ok_or_else(|| {
                Error::Authentication("access token expired and no refresh token is stored".into())
            })?;
            let refreshed = self.flow.refresh(&refresh_token).await?;
            if let Err(e) = self.store.save(&refreshed) {
                tracing::warn!("Unable to persist refreshed token: {}", e);
            }
            *token = refreshed;
        }

        Ok(token.access_token.clone())
    }
}
