//! Accept/reject issuance flow.
//!
//! Each session holds at most one offered code, tracked in an
//! in-process slot map keyed by session id. The offer itself is the
//! only in-memory state; every pool mutation goes through
//! [`CodeService`] immediately, so a daemon restart loses offers but
//! never codes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lunarlink_core::ServiceError;
use tokio::sync::Mutex;

use super::CodeService;
use crate::model::SpeedTier;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_SLOT_TTL: Duration = Duration::from_secs(600);

/// Where one issuance interaction landed.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueOutcome {
    /// A code is on offer; the session may accept or reject it.
    CodeShown {
        value: String,
        tier: SpeedTier,
        retries_left: u32,
    },
    /// The offered code was archived for this user.
    Accepted { value: String, tier: SpeedTier },
    /// The tier's unused pool is empty.
    NoCodes,
    /// The session burned through its reject allowance.
    RetryLimitReached,
}

#[derive(Debug, Clone)]
struct Slot {
    value: String,
    tier: SpeedTier,
    retry_count: u32,
    touched_at: Instant,
}

/// Drives offers to a terminal outcome, one slot per session.
pub struct IssueEngine {
    service: Arc<CodeService>,
    slots: Mutex<HashMap<String, Slot>>,
    max_retries: u32,
    slot_ttl: Duration,
}

impl IssueEngine {
    pub fn new(service: Arc<CodeService>, max_retries: u32, slot_ttl: Duration) -> Self {
        Self {
            service,
            slots: Mutex::new(HashMap::new()),
            max_retries,
            slot_ttl,
        }
    }

    fn prune_locked(&self, slots: &mut HashMap<String, Slot>) {
        slots.retain(|_, slot| slot.touched_at.elapsed() < self.slot_ttl);
    }

    /// Draw a random unused code for the tier and put it on offer.
    /// An empty pool is `NoCodes`, not an error, and consumes no
    /// retries. Any previous offer for the session is replaced.
    pub async fn request(&self, sid: &str, tier: SpeedTier) -> Result<IssueOutcome, ServiceError> {
        match self.service.random_unused(tier).await? {
            None => {
                let mut slots = self.slots.lock().await;
                self.prune_locked(&mut slots);
                slots.remove(sid);
                Ok(IssueOutcome::NoCodes)
            }
            Some(code) => {
                let mut slots = self.slots.lock().await;
                self.prune_locked(&mut slots);
                slots.insert(
                    sid.to_string(),
                    Slot {
                        value: code.value.clone(),
                        tier,
                        retry_count: 0,
                        touched_at: Instant::now(),
                    },
                );
                Ok(IssueOutcome::CodeShown {
                    value: code.value,
                    tier,
                    retries_left: self.max_retries,
                })
            }
        }
    }

    /// Archive the offered code. A storage fault keeps the offer so
    /// accept can be retried; a code that vanished under us clears the
    /// offer and reports a conflict, and the session must request anew.
    pub async fn accept(&self, sid: &str) -> Result<IssueOutcome, ServiceError> {
        let slot = {
            let mut slots = self.slots.lock().await;
            self.prune_locked(&mut slots);
            slots.get(sid).cloned()
        };
        let Some(slot) = slot else {
            return Err(ServiceError::Validation("no code on offer for this session".into()));
        };

        let archived = self.service.archive_code(&slot.value, slot.tier).await?;

        self.slots.lock().await.remove(sid);
        if archived {
            Ok(IssueOutcome::Accepted {
                value: slot.value,
                tier: slot.tier,
            })
        } else {
            Err(ServiceError::Conflict(format!(
                "code '{}' was already used",
                slot.value
            )))
        }
    }

    /// Burn the offered code and either show a replacement or land on
    /// a terminal outcome. The cap wins over the pool: hitting it is
    /// `RetryLimitReached` even when codes remain.
    pub async fn reject(&self, sid: &str) -> Result<IssueOutcome, ServiceError> {
        let slot = {
            let mut slots = self.slots.lock().await;
            self.prune_locked(&mut slots);
            slots.remove(sid)
        };
        let Some(slot) = slot else {
            return Err(ServiceError::Validation("no code on offer for this session".into()));
        };

        self.service.delete_code(&slot.value, slot.tier).await;

        let retry_count = slot.retry_count + 1;
        if retry_count >= self.max_retries {
            return Ok(IssueOutcome::RetryLimitReached);
        }

        match self.service.random_unused(slot.tier).await? {
            None => Ok(IssueOutcome::NoCodes),
            Some(code) => {
                let mut slots = self.slots.lock().await;
                slots.insert(
                    sid.to_string(),
                    Slot {
                        value: code.value.clone(),
                        tier: slot.tier,
                        retry_count,
                        touched_at: Instant::now(),
                    },
                );
                Ok(IssueOutcome::CodeShown {
                    value: code.value,
                    tier: slot.tier,
                    retries_left: self.max_retries - retry_count,
                })
            }
        }
    }

    /// Drop the session's offer without touching the pool. The code
    /// stays unused and can be offered again later.
    pub async fn close(&self, sid: &str) {
        self.slots.lock().await.remove(sid);
    }
}
