use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;

/// Wall-clock source used for signature timestamps.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of replay-uniqueness tokens. Not security material.
pub trait NonceSource: Send + Sync + fmt::Debug {
    fn next_u64(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Thread-local RNG backed nonces.
pub struct RandomNonce;

impl NonceSource for RandomNonce {
    fn next_u64(&self) -> u64 {
        rand::thread_rng().r#gen()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedNonce(pub u64);

impl NonceSource for FixedNonce {
    fn next_u64(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
/// Clock and nonce dependencies shared by every signing transformer.
pub struct SignContext {
    clock: Arc<dyn Clock>,
    nonce: Arc<dyn NonceSource>,
}

impl Default for SignContext {
    fn default() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            nonce: Arc::new(RandomNonce),
        }
    }
}

impl SignContext {
    pub fn new(clock: Arc<dyn Clock>, nonce: Arc<dyn NonceSource>) -> Self {
        Self { clock, nonce }
    }

    /// Deterministic context for reproducible signatures.
    pub fn fixed(at: DateTime<Utc>, nonce: u64) -> Self {
        Self::new(Arc::new(FixedClock(at)), Arc::new(FixedNonce(nonce)))
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn nonce(&self) -> u64 {
        self.nonce.next_u64()
    }

    /// Random 64-bit nonce as lowercase hex.
    pub fn nonce_hex(&self) -> String {
        format!("{:016x}", self.nonce())
    }
}
