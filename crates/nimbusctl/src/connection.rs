//! Connection management: resolve a profile to an authenticated client

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{CliError, Result as CliResult};
use crate::remote::ServiceClient;

/// User agent string for nimbusctl HTTP requests
const NIMBUSCTL_USER_AGENT: &str = concat!("nimbusctl/", env!("CARGO_PKG_VERSION"));

/// Creates authenticated clients from profiles and environment variables
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<std::path::PathBuf>,
}

impl ConnectionManager {
    pub fn with_config_path(config: Config, config_path: Option<std::path::PathBuf>) -> Self {
        ConnectionManager {
            config,
            config_path,
        }
    }

    pub fn save_config(&self) -> CliResult<()> {
        match &self.config_path {
            Some(path) => self.config.save_to_path(path)?,
            None => self.config.save()?,
        }
        Ok(())
    }

    /// Create a client for the named (or default) profile.
    ///
    /// When `--config-file` is explicitly specified, environment variables
    /// are ignored so the run is fully isolated. Otherwise `NIMBUS_ENDPOINT`,
    /// `NIMBUS_SUBSCRIPTION_ID` and `NIMBUS_TOKEN` either form a complete
    /// ad-hoc profile or override individual profile values.
    pub fn create_client(&self, profile_name: Option<&str>) -> CliResult<ServiceClient> {
        let use_env_vars = self.config_path.is_none();
        if !use_env_vars {
            info!("--config-file specified explicitly, ignoring environment variables");
        }

        let env = |name: &str| -> Option<String> {
            if use_env_vars {
                std::env::var(name).ok().filter(|v| !v.is_empty())
            } else {
                None
            }
        };
        let env_endpoint = env("NIMBUS_ENDPOINT");
        let env_subscription = env("NIMBUS_SUBSCRIPTION_ID");
        let env_token = env("NIMBUS_TOKEN");

        let (endpoint, subscription_id, token) = if let (
            Some(endpoint),
            Some(subscription),
            Some(token),
        ) =
            (&env_endpoint, &env_subscription, &env_token)
        {
            info!("Using Nimbus credentials from environment variables");
            (endpoint.clone(), subscription.clone(), token.clone())
        } else {
            let (name, profile) =
                self.config
                    .resolve_profile(profile_name)
                    .map_err(|e| match e {
                        crate::config::ConfigError::NoDefaultProfile => {
                            CliError::NoProfileConfigured
                        }
                        crate::config::ConfigError::ProfileNotFound { name } => {
                            CliError::ProfileNotFound { name }
                        }
                        other => CliError::Config(other),
                    })?;
            info!("Using Nimbus profile: {name}");

            // Partial environment overrides on top of the profile.
            (
                env_endpoint.unwrap_or_else(|| profile.endpoint.clone()),
                env_subscription.unwrap_or_else(|| profile.subscription_id.clone()),
                env_token.unwrap_or_else(|| profile.token.clone()),
            )
        };

        debug!(endpoint, subscription_id, "building management client");
        let client = ServiceClient::builder()
            .base_url(&endpoint)
            .subscription_id(&subscription_id)
            .token(&token)
            .user_agent(NIMBUSCTL_USER_AGENT)
            .build()
            .map_err(|e| CliError::InvalidInput {
                message: format!("Failed to create management client: {e}"),
            })?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;

    // Environment mutation is process-global, so every layering direction
    // runs inside this single test.
    #[test]
    fn test_env_layering_and_config_file_isolation() {
        unsafe {
            std::env::set_var("NIMBUS_ENDPOINT", "https://env.nimbus.cloud/v1");
            std::env::set_var("NIMBUS_SUBSCRIPTION_ID", "sub-env");
            std::env::set_var("NIMBUS_TOKEN", "env-token");
        }

        // The complete trio forms an ad-hoc profile with no config at all.
        let conn = ConnectionManager::with_config_path(Config::default(), None);
        let client = conn.create_client(None).expect("env trio builds a client");
        assert_eq!(client.base_url(), "https://env.nimbus.cloud/v1");
        assert_eq!(client.token(), "env-token");

        // An explicit --config-file ignores those same variables entirely.
        let isolated = ConnectionManager::with_config_path(
            Config::default(),
            Some(std::path::PathBuf::from("/nonexistent/config.toml")),
        );
        let err = isolated.create_client(None).unwrap_err();
        assert!(matches!(err, CliError::NoProfileConfigured));

        // A partial set overrides individual profile values.
        unsafe {
            std::env::remove_var("NIMBUS_ENDPOINT");
        }
        let mut config = Config::default();
        config.set_profile(
            "prod",
            Profile {
                endpoint: "https://profile.nimbus.cloud/v1".into(),
                subscription_id: "sub-profile".into(),
                token: "profile-token".into(),
            },
        );
        let conn = ConnectionManager::with_config_path(config, None);
        let client = conn.create_client(Some("prod")).unwrap();
        assert_eq!(client.base_url(), "https://profile.nimbus.cloud/v1");
        assert_eq!(client.token(), "env-token");

        unsafe {
            std::env::remove_var("NIMBUS_SUBSCRIPTION_ID");
            std::env::remove_var("NIMBUS_TOKEN");
        }
    }
}
