//! Sliding-window admission control per principal.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use solder_core::Context;

use crate::error::DispatchError;
use crate::middleware::{Middleware, Next};

/// Admits at most `max_requests` events per `window` for each user id.
///
/// Buckets hold the admission timestamps still inside the window; eviction
/// happens on the next event from the same principal. The outer map lock is
/// held only to fetch a bucket handle, so principals do not contend with
/// each other.
///
/// Events without a sender (channel posts, polls) bypass the limiter.
pub struct RateLimitMiddleware {
    max_requests: usize,
    window: Duration,
    buckets: RwLock<HashMap<i64, Arc<Mutex<Vec<Instant>>>>>,
}

impl RateLimitMiddleware {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            buckets: RwLock::new(HashMap::new()),
        }
    }

    fn bucket(&self, user_id: i64) -> Arc<Mutex<Vec<Instant>>> {
        if let Some(bucket) = self.buckets.read().get(&user_id) {
            return bucket.clone();
        }
        self.buckets.write().entry(user_id).or_default().clone()
    }
}

#[async_trait]
impl Middleware for RateLimitMiddleware {
    fn name(&self) -> &str {
        "rate_limit"
    }

    async fn process(&self, ctx: Arc<Context>, next: Next) -> Result<(), DispatchError> {
        let Some(user_id) = ctx.user_id() else {
            return next.run(ctx).await;
        };

        let bucket = self.bucket(user_id);
        {
            let mut admitted = bucket.lock();
            let now = Instant::now();
            admitted.retain(|stamp| now.duration_since(*stamp) < self.window);

            if admitted.len() >= self.max_requests {
                return Err(DispatchError::RateLimited {
                    user_id,
                    max_requests: self.max_requests,
                    window: self.window,
                });
            }
            admitted.push(now);
        }

        next.run(ctx).await
    }
}
