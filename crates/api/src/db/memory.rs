//! In-memory repositories for unit tests.

use std::sync::Arc;

use chrono::Utc;
use secrecy::SecretString;
use shopify_app_core::{ShopDomain, ShopId};
use tokio::sync::Mutex;

use super::{RepositoryError, Session, SessionRepository, Shop, ShopRepository};

/// Shares its session store so `install` can revoke online sessions.
#[derive(Clone, Default)]
pub struct MemoryShopRepository {
    shops: Arc<Mutex<Vec<Shop>>>,
    sessions: MemorySessionRepository,
}

impl MemoryShopRepository {
    pub fn with_sessions(sessions: MemorySessionRepository) -> Self {
        Self {
            shops: Arc::default(),
            sessions,
        }
    }

    pub async fn all(&self) -> Vec<Shop> {
        self.shops.lock().await.clone()
    }
}

impl ShopRepository for MemoryShopRepository {
    async fn find_by_domain(&self, domain: &ShopDomain) -> Result<Option<Shop>, RepositoryError> {
        let shops = self.shops.lock().await;
        Ok(shops.iter().find(|s| &s.domain == domain).cloned())
    }

    async fn install(
        &self,
        domain: &ShopDomain,
        access_token: &SecretString,
    ) -> Result<Shop, RepositoryError> {
        // Both locks are held across the two writes.
        let mut shops = self.shops.lock().await;
        let mut sessions = self.sessions.sessions.lock().await;

        let now = Utc::now();
        let shop = if let Some(shop) = shops.iter_mut().find(|s| &s.domain == domain) {
            shop.access_token = access_token.clone();
            shop.updated_at = now;
            shop.clone()
        } else {
            let next_id = i32::try_from(shops.len() + 1)
                .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
            let shop = Shop {
                id: ShopId::new(next_id),
                domain: domain.clone(),
                access_token: access_token.clone(),
                created_at: now,
                updated_at: now,
            };
            shops.push(shop.clone());
            shop
        };

        sessions.retain(|s| !(&s.shop == domain && s.is_online));
        Ok(shop)
    }
}

#[derive(Clone, Default)]
pub struct MemorySessionRepository {
    sessions: Arc<Mutex<Vec<Session>>>,
}

impl MemorySessionRepository {
    pub async fn all(&self) -> Vec<Session> {
        self.sessions.lock().await.clone()
    }
}

impl SessionRepository for MemorySessionRepository {
    async fn store(&self, session: &Session) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|s| s.id != session.id);
        sessions.push(session.clone());
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<Session>, RepositoryError> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        Ok(sessions.len() < before)
    }

    async fn delete_many(&self, ids: &[String]) -> Result<u64, RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|s| !ids.contains(&s.id));
        Ok((before - sessions.len()) as u64)
    }

    async fn find_by_shop(&self, shop: &ShopDomain) -> Result<Vec<Session>, RepositoryError> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.iter().filter(|s| &s.shop == shop).cloned().collect())
    }

    async fn delete_by_shop(
        &self,
        shop: &ShopDomain,
        is_online: bool,
    ) -> Result<u64, RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|s| !(&s.shop == shop && s.is_online == is_online));
        Ok((before - sessions.len()) as u64)
    }
}
