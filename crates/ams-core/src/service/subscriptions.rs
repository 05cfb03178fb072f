use ams_types::models::{SubscriptionKind, SubscriptionLinkList};
use ams_types::{Result, Subscription, SubscriptionError};
use tracing::info;

use super::AmsService;
use crate::state::Outcome;

impl AmsService {
    pub async fn create_subscription(&self, body: serde_json::Value) -> Result<Subscription> {
        let mut subscription = Subscription::from_json(body)?;
        subscription.validate_and_normalize()?;

        let mut state = self.inner.state.lock().await;
        let id = state.subscriptions.allocate_id();
        subscription.set_self_link(self.inner.config.resource_url(&format!("subscriptions/{id}")));
        state.subscriptions.insert(id, subscription.clone());

        let mut outcome = Outcome::default();
        outcome.put(self.inner.keys.subscription(&id.to_string()), &subscription);
        info!(subscription_id = id, kind = subscription.kind().as_str(), "Subscription created");
        self.finish(state, outcome).await;
        Ok(subscription)
    }

    /// Replaces a subscription. The self link must name the path id, and
    /// neither the type nor the filtered application may change.
    pub async fn replace_subscription(
        &self,
        subscription_id: &str,
        body: serde_json::Value,
    ) -> Result<Subscription> {
        let mut subscription = Subscription::from_json(body)?;
        if subscription.callback_reference().is_empty() {
            return Err(SubscriptionError::MissingCallback.into());
        }
        let body_id = subscription.self_id().ok_or(SubscriptionError::MissingLink)?;
        if body_id != subscription_id {
            return Err(SubscriptionError::IdMismatch {
                path_id: subscription_id.to_string(),
                body_id: body_id.to_string(),
            }
            .into());
        }
        subscription.validate_and_normalize()?;

        let mut state = self.inner.state.lock().await;
        let Some(existing) = state.subscriptions.get(subscription_id) else {
            return Err(SubscriptionError::NotFound { id: subscription_id.to_string() }.into());
        };
        if existing.kind() != subscription.kind() {
            return Err(SubscriptionError::TypeChanged { id: subscription_id.to_string() }.into());
        }
        let original = existing.filter_app_instance_id().unwrap_or_default();
        let requested = subscription.filter_app_instance_id().unwrap_or_default();
        if original != requested {
            return Err(SubscriptionError::FilterChanged {
                original: original.to_string(),
                requested: requested.to_string(),
            }
            .into());
        }
        if let Some(links) = existing.links() {
            subscription.set_self_link(links.self_link.href.clone());
        }

        let id = subscription_id.parse::<u64>().map_err(|_| SubscriptionError::NotFound {
            id: subscription_id.to_string(),
        })?;
        state.subscriptions.insert(id, subscription.clone());

        let mut outcome = Outcome::default();
        outcome.put(self.inner.keys.subscription(subscription_id), &subscription);
        info!(subscription_id = id, "Subscription replaced");
        self.finish(state, outcome).await;
        Ok(subscription)
    }

    pub async fn delete_subscription(&self, subscription_id: &str) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        if state.subscriptions.remove(subscription_id).is_none() {
            return Err(SubscriptionError::NotFound { id: subscription_id.to_string() }.into());
        }

        let mut outcome = Outcome::default();
        outcome.delete(self.inner.keys.subscription(subscription_id));
        info!(subscription_id = %subscription_id, "Subscription deleted");
        self.finish(state, outcome).await;
        Ok(())
    }

    pub async fn get_subscription(&self, subscription_id: &str) -> Result<Subscription> {
        self.inner
            .state
            .lock()
            .await
            .subscriptions
            .get(subscription_id)
            .cloned()
            .ok_or_else(|| SubscriptionError::NotFound { id: subscription_id.to_string() }.into())
    }

    pub async fn list_subscriptions(&self, kind: Option<SubscriptionKind>) -> SubscriptionLinkList {
        let href = self.inner.config.resource_url("subscriptions");
        self.inner.state.lock().await.subscriptions.link_list(href, kind)
    }
}
