//! Subscription sources and event filtering.

use futures::StreamExt;
use futures::future;
use futures::stream::BoxStream;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Long-lived stream of subscription payloads
pub type EventStream = BoxStream<'static, Value>;

type FilterFn = dyn Fn(&Value, &Value) -> bool + Send + Sync;

/// Predicate deciding whether a published event reaches a subscriber.
///
/// Receives the event payload and the variables the subscriber supplied.
#[derive(Clone)]
pub struct SubscriptionFilter {
    predicate: Arc<FilterFn>,
}

impl SubscriptionFilter {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    pub fn matches(&self, payload: &Value, variables: &Value) -> bool {
        (self.predicate)(payload, variables)
    }
}

impl fmt::Debug for SubscriptionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionFilter").finish_non_exhaustive()
    }
}

impl PartialEq for SubscriptionFilter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.predicate, &other.predicate)
    }
}

impl Eq for SubscriptionFilter {}

/// Wrap `source` so only events accepted by `filter` are delivered
pub fn with_filter(source: EventStream, filter: SubscriptionFilter, variables: Value) -> EventStream {
    source
        .filter(move |payload| {
            let accepted = filter.matches(payload, &variables);
            if !accepted {
                trace!("Subscription event filtered out");
            }
            future::ready(accepted)
        })
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use serde_json::json;

    #[tokio::test]
    async fn test_filter_drops_rejected_events() {
        let source = stream::iter(vec![
            json!({"room": "a", "text": "one"}),
            json!({"room": "b", "text": "two"}),
            json!({"room": "a", "text": "three"}),
        ])
        .boxed();

        let filter = SubscriptionFilter::new(|payload, variables| payload["room"] == variables["room"]);
        let events: Vec<Value> = with_filter(source, filter, json!({"room": "a"})).collect().await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["text"], "one");
        assert_eq!(events[1]["text"], "three");
    }

    #[tokio::test]
    async fn test_filter_accepting_everything() {
        let source = stream::iter(vec![json!(1), json!(2)]).boxed();
        let filter = SubscriptionFilter::new(|_, _| true);
        let events: Vec<Value> = with_filter(source, filter, Value::Null).collect().await;
        assert_eq!(events, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_filter_identity() {
        let filter = SubscriptionFilter::new(|_, _| false);
        assert_eq!(filter, filter.clone());
        assert_ne!(filter, SubscriptionFilter::new(|_, _| false));
        assert!(!filter.matches(&Value::Null, &Value::Null));
    }
}
