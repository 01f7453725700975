use crate::config::{ConfigManager, TenantConfig, TokenCache};
use crate::error::{Result, Rpt365Error};
use oauth2::{
    AuthUrl, ClientId, ClientSecret, DeviceAuthorizationUrl, EmptyExtraDeviceAuthorizationFields,
    Scope, TokenResponse, TokenUrl, basic::BasicClient, reqwest::async_http_client,
};
use std::time::Duration;

const MICROSOFT_AUTHORITY: &str = "https://login.microsoftonline.com";
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Graph permissions the app registration needs (read-only reporting)
pub const REQUIRED_SCOPES: &[&str] = &[
    "DeviceManagementManagedDevices.Read.All",
    "DeviceManagementConfiguration.Read.All",
];

pub struct GraphAuth {
    config_manager: ConfigManager,
}

impl GraphAuth {
    pub fn new(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    fn oauth_client(tenant_config: &TenantConfig, with_secret: bool) -> Result<BasicClient> {
        let tenant_id = &tenant_config.tenant_id;

        let auth_url = AuthUrl::new(format!(
            "{}/{}/oauth2/v2.0/authorize",
            MICROSOFT_AUTHORITY, tenant_id
        ))
        .map_err(|e| Rpt365Error::AuthError(format!("Invalid auth URL: {}", e)))?;

        let token_url = TokenUrl::new(format!(
            "{}/{}/oauth2/v2.0/token",
            MICROSOFT_AUTHORITY, tenant_id
        ))
        .map_err(|e| Rpt365Error::AuthError(format!("Invalid token URL: {}", e)))?;

        let client_secret = if with_secret {
            let secret = tenant_config.client_secret.as_ref().ok_or_else(|| {
                Rpt365Error::AuthError("Client secret required for client credentials flow".into())
            })?;
            Some(ClientSecret::new(secret.clone()))
        } else {
            None
        };

        Ok(BasicClient::new(
            ClientId::new(tenant_config.client_id.clone()),
            client_secret,
            auth_url,
            Some(token_url),
        ))
    }

    /// Authenticate using device code flow (interactive)
    pub async fn login_device_code(&self, tenant_config: &TenantConfig) -> Result<TokenCache> {
        println!(
            "Starting device code authentication for tenant '{}'...",
            tenant_config.name
        );

        let device_auth_url = DeviceAuthorizationUrl::new(format!(
            "{}/{}/oauth2/v2.0/devicecode",
            MICROSOFT_AUTHORITY, tenant_config.tenant_id
        ))
        .map_err(|e| Rpt365Error::AuthError(format!("Invalid device auth URL: {}", e)))?;

        let client =
            Self::oauth_client(tenant_config, false)?.set_device_authorization_url(device_auth_url);

        let details: oauth2::DeviceAuthorizationResponse<EmptyExtraDeviceAuthorizationFields> =
            client
                .exchange_device_code()
                .map_err(|e| Rpt365Error::AuthError(format!("Device code exchange failed: {}", e)))?
                .add_scope(Scope::new(GRAPH_SCOPE.to_string()))
                .request_async(async_http_client)
                .await
                .map_err(|e| {
                    Rpt365Error::AuthError(format!("Device authorization request failed: {}", e))
                })?;

        println!("\nPlease visit: {}", details.verification_uri().as_str());
        println!("Enter code: {}\n", details.user_code().secret());

        // Poll for token
        let token = client
            .exchange_device_access_token(&details)
            .request_async(async_http_client, tokio::time::sleep, None)
            .await
            .map_err(|e| Rpt365Error::AuthError(format!("Token exchange failed: {}", e)))?;

        let token_cache = Self::cache_from_token(
            token.access_token().secret().clone(),
            token.refresh_token().map(|t| t.secret().clone()),
            token.expires_in(),
            &tenant_config.tenant_id,
        );

        self.config_manager
            .save_token(&tenant_config.name, &token_cache)?;

        println!("Authentication successful.");

        Ok(token_cache)
    }

    /// Authenticate using client credentials flow (non-interactive)
    pub async fn login_client_credentials(
        &self,
        tenant_config: &TenantConfig,
    ) -> Result<TokenCache> {
        println!(
            "Authenticating with client credentials for tenant '{}'...",
            tenant_config.name
        );

        let client = Self::oauth_client(tenant_config, true)?;

        let token = client
            .exchange_client_credentials()
            .add_scope(Scope::new(GRAPH_SCOPE.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| {
                Rpt365Error::AuthError(format!("Client credentials exchange failed: {}", e))
            })?;

        // Client credentials don't use refresh tokens
        let token_cache = Self::cache_from_token(
            token.access_token().secret().clone(),
            None,
            token.expires_in(),
            &tenant_config.tenant_id,
        );

        self.config_manager
            .save_token(&tenant_config.name, &token_cache)?;

        println!("Authentication successful.");

        Ok(token_cache)
    }

    fn cache_from_token(
        access_token: String,
        refresh_token: Option<String>,
        expires_in: Option<Duration>,
        tenant_id: &str,
    ) -> TokenCache {
        let expires_at = chrono::Utc::now()
            + chrono::Duration::from_std(expires_in.unwrap_or(Duration::from_secs(3600)))
                .unwrap_or_else(|_| chrono::Duration::seconds(3600));

        TokenCache {
            access_token,
            refresh_token,
            expires_at,
            tenant_id: tenant_id.to_string(),
        }
    }

    /// Get valid access token from the cache
    pub async fn get_access_token(&self, tenant_name: &str) -> Result<String> {
        match self.config_manager.load_token(tenant_name) {
            Ok(token) => Ok(token.access_token),
            // Expired tokens need a fresh login
            Err(Rpt365Error::AuthError(_)) => Err(Rpt365Error::TokenNotFound),
            Err(e) => Err(e),
        }
    }

    /// Logout (delete token cache)
    pub fn logout(&self, tenant_name: &str) -> Result<()> {
        self.config_manager.delete_token(tenant_name)?;
        println!("Logged out from tenant '{}'", tenant_name);
        Ok(())
    }
}
