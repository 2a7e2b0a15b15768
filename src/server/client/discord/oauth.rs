//! Discord OAuth2 flow used to activate a Discord account.
//!
//! The user authorizes Bifrost with the `identify` & `guilds.join` scopes; the authorization
//! code is exchanged for a user access token which is then used to identify the user and add
//! them to the guild.

use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, RedirectUrl, Scope, TokenResponse, TokenUrl,
};

use crate::server::{
    config::DiscordConfig,
    error::{config::ConfigError, lifecycle::LifecycleError, Error},
};

const DISCORD_AUTHORIZE_URL: &str = "https://discord.com/oauth2/authorize";
const DISCORD_SCOPES: [&str; 2] = ["identify", "guilds.join"];

type DiscordOAuthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Discord OAuth2 client.
#[derive(Clone)]
pub struct DiscordOAuth {
    client: DiscordOAuthClient,
    http: reqwest::Client,
}

impl DiscordOAuth {
    /// Creates the OAuth2 client from the Discord application credentials.
    ///
    /// # Arguments
    /// - `http` - HTTP client, must not follow redirects
    /// - `config` - Discord configuration holding the application ID, secret & callback URL
    pub fn new(http: reqwest::Client, config: &DiscordConfig) -> Result<Self, Error> {
        let token_url = format!("{}/oauth2/token", config.api_url.trim_end_matches('/'));

        let client = BasicClient::new(ClientId::new(config.app_id.clone()))
            .set_client_secret(ClientSecret::new(config.app_secret.clone()))
            .set_auth_uri(AuthUrl::new(DISCORD_AUTHORIZE_URL.to_string()).map_err(|e| {
                ConfigError::InvalidEnvValue {
                    var: "DISCORD_AUTHORIZE_URL".to_string(),
                    reason: e.to_string(),
                }
            })?)
            .set_token_uri(TokenUrl::new(token_url).map_err(|e| {
                ConfigError::InvalidEnvValue {
                    var: "DISCORD_API_URL".to_string(),
                    reason: e.to_string(),
                }
            })?)
            .set_redirect_uri(RedirectUrl::new(config.callback_url.clone()).map_err(|e| {
                ConfigError::InvalidEnvValue {
                    var: "DISCORD_CALLBACK_URL".to_string(),
                    reason: e.to_string(),
                }
            })?);

        Ok(Self { client, http })
    }

    /// Builds the URL the user is redirected to in order to authorize Bifrost.
    ///
    /// # Returns
    /// - `(String, CsrfToken)` - Authorization URL and the CSRF state to verify on callback
    pub fn authorize_url(&self) -> (String, CsrfToken) {
        let (url, state) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(DISCORD_SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .url();

        (url.to_string(), state)
    }

    /// Exchanges an authorization code for the user's access token.
    pub async fn exchange_code(&self, code: String) -> Result<String, Error> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .request_async(&self.http)
            .await
            .map_err(|e| LifecycleError::OAuthExchange(e.to_string()))?;

        Ok(token.access_token().secret().clone())
    }
}
