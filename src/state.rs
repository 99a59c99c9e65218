use std::sync::Arc;

use crate::clients::firebase::FirebaseIdentityClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    IdentityProvider, ReferralService, SeaOrmReferralService, SeaOrmUserService, UserService,
};

/// Explicitly wired dependencies shared by every request handler.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub identity: Arc<dyn IdentityProvider>,

    pub user_service: Arc<dyn UserService>,

    pub referral_service: Arc<dyn ReferralService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let identity = Arc::new(FirebaseIdentityClient::new(&config.identity));
        Self::with_identity(config, identity).await
    }

    /// Builds the state around a caller-supplied identity provider.
    pub async fn with_identity(
        config: Config,
        identity: Arc<dyn IdentityProvider>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::from_parts(config, store, identity))
    }

    #[must_use]
    pub fn from_parts(config: Config, store: Store, identity: Arc<dyn IdentityProvider>) -> Self {
        let user_service: Arc<dyn UserService> =
            Arc::new(SeaOrmUserService::new(store.clone(), identity.clone()));
        let referral_service: Arc<dyn ReferralService> =
            Arc::new(SeaOrmReferralService::new(store.clone()));

        Self {
            config: Arc::new(config),
            store,
            identity,
            user_service,
            referral_service,
        }
    }
}
