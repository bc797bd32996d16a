//! Chat subscription management.

use std::sync::Arc;

use crate::service::error::ServiceError;
use crate::store::SubscriberStore;

#[derive(Debug, PartialEq, Eq)]
pub enum SubscribeResult {
    Success,
    AlreadySubscribed,
}

pub struct SubscriptionService {
    store: Arc<SubscriberStore>,
}

impl SubscriptionService {
    pub fn new(store: Arc<SubscriberStore>) -> Self {
        Self { store }
    }

    pub async fn subscribe(&self, chat_id: i64) -> Result<SubscribeResult, ServiceError> {
        if self.store.add(chat_id).await? {
            Ok(SubscribeResult::Success)
        } else {
            Ok(SubscribeResult::AlreadySubscribed)
        }
    }

    pub async fn subscribers(&self) -> Result<Vec<i64>, ServiceError> {
        Ok(self.store.all().await?)
    }
}
