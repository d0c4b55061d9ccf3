pub mod analytics;
pub mod catalog;
pub mod ledger;
pub mod selector;

use serde::{Deserialize, Serialize};

pub use analytics::{AnalyticsLedger, CommandKind};
pub use catalog::Catalog;
pub use ledger::UsageLedger;

/// A subject for a channel post.
pub type Topic = String;

/// A track recommended under every channel post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub link: String,
}
