//! Registry of the remote service adapters enabled in this build & configuration.

use std::{collections::BTreeMap, sync::Arc};

use dioxus_logger::tracing;
use fred::prelude::Pool;

use crate::server::{
    config::Config,
    error::{worker::WorkerError, Error},
    model::service::ServiceKind,
    service::{adapter::ServiceAdapter, role_mapper::RoleMapper},
};

#[derive(Clone, Default)]
pub struct ServiceRegistry {
    adapters: BTreeMap<ServiceKind, Arc<dyn ServiceAdapter>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry from configuration
    ///
    /// A service is registered when its cargo feature is compiled in and its configuration
    /// section is present. Every adapter acquires outbound budget from a Valkey-backed gate
    /// shared by all worker processes.
    pub fn from_config(
        config: &Config,
        http: reqwest::Client,
        redis_pool: &Pool,
        mapper: RoleMapper,
    ) -> Result<Self, Error> {
        let mut registry = Self::new();

        #[cfg(feature = "discord")]
        if let Some(discord) = &config.discord {
            use crate::server::{
                client::discord::DiscordClient,
                service::{discord::DiscordAdapter, rate_limit::RedisRateLimitGate},
            };

            let gate = Arc::new(RedisRateLimitGate::new(
                redis_pool.clone(),
                ServiceKind::Discord,
                discord.rate_limit,
            ));
            let client = DiscordClient::new(http.clone(), discord, gate);
            registry.register(Arc::new(DiscordAdapter::new(
                client,
                mapper.clone(),
                discord.sync_names,
            )));
        }

        #[cfg(feature = "teamspeak3")]
        if let Some(teamspeak3) = &config.teamspeak3 {
            use crate::server::{
                client::teamspeak3::Teamspeak3Client,
                service::{rate_limit::RedisRateLimitGate, teamspeak3::Teamspeak3Adapter},
            };

            let gate = Arc::new(RedisRateLimitGate::new(
                redis_pool.clone(),
                ServiceKind::Teamspeak3,
                teamspeak3.rate_limit,
            ));
            let client = Teamspeak3Client::new(http.clone(), teamspeak3, gate);
            registry.register(Arc::new(Teamspeak3Adapter::new(client, mapper.clone())));
        }

        #[cfg(not(feature = "discord"))]
        if config.discord.is_some() {
            tracing::warn!("Discord is configured but this build does not include the discord feature");
        }

        #[cfg(not(feature = "teamspeak3"))]
        if config.teamspeak3.is_some() {
            tracing::warn!(
                "TeamSpeak 3 is configured but this build does not include the teamspeak3 feature"
            );
        }

        // Silence unused warnings in builds without any service feature
        let _ = (&http, redis_pool, &mapper);

        if registry.is_empty() {
            tracing::warn!("No remote service is enabled, reconciliation jobs will fail");
        }

        Ok(registry)
    }

    /// Registers an adapter, replacing any adapter of the same kind
    pub fn register(&mut self, adapter: Arc<dyn ServiceAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn ServiceAdapter>) -> Self {
        self.register(adapter);
        self
    }

    /// Gets the adapter of a service
    ///
    /// # Returns
    /// - `Err(WorkerError::ServiceUnavailable)` - The service is not enabled
    pub fn get(&self, service: ServiceKind) -> Result<Arc<dyn ServiceAdapter>, Error> {
        self.adapters
            .get(&service)
            .cloned()
            .ok_or_else(|| WorkerError::ServiceUnavailable(service.to_string()).into())
    }

    /// Services with a registered adapter
    pub fn enabled(&self) -> Vec<ServiceKind> {
        self.adapters.keys().copied().collect()
    }

    pub fn is_enabled(&self, service: ServiceKind) -> bool {
        self.adapters.contains_key(&service)
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
