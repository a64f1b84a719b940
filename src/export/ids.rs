//! Identifier and clock sources
//!
//! Every lineage tag, logical id and timestamp in an export comes from one of
//! these sources, so a fixed source gives byte-identical packages.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::{Builder, Uuid};

/// Source of unique identifiers
pub trait IdGenerator: Send + Sync {
    /// Next identifier, formatted as a hyphenated UUID
    fn next_id(&self) -> String;
}

/// Random version-4 UUIDs
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic version-4-shaped UUIDs
///
/// The seed fills the first six bytes and a counter the last six, so two
/// generators with the same seed produce the same sequence and ids never
/// repeat within a sequence.
///
/// # Example
///
/// ```rust
/// use phantom_pbi_export::export::{IdGenerator, SequentialIdGenerator};
///
/// let ids = SequentialIdGenerator::new(7);
/// let first = ids.next_id();
/// assert_ne!(first, ids.next_id());
/// assert_eq!(first, SequentialIdGenerator::new(7).next_id());
/// ```
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    seed: u64,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let mut bytes = [0u8; 16];
        bytes[0..6].copy_from_slice(&self.seed.to_be_bytes()[2..8]);
        bytes[10..16].copy_from_slice(&n.to_be_bytes()[2..8]);
        Builder::from_random_bytes(bytes).into_uuid().to_string()
    }
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock stopped at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Midnight UTC of a calendar day; falls back to the Unix epoch for an
    /// invalid date
    pub fn on_date(year: i32, month: u32, day: u32) -> Self {
        let instant = Utc
            .with_ymd_and_hms(year, month, day, 0, 0, 0)
            .single()
            .unwrap_or_default();
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Report object name: the last 20 hex digits of an id
pub fn object_name(id: &str) -> String {
    let hex: Vec<char> = id.chars().filter(|c| c.is_ascii_hexdigit()).collect();
    hex[hex.len().saturating_sub(20)..].iter().collect()
}
