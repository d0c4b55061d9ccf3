//! Usage ledger: the set of topics already published in the current rotation.
//!
//! A single task owns the `used_topics` record. Selection and commits both
//! run inside that task, so two cycles can never interleave a
//! read-modify-write of the set. Selection never writes: the exhaustion
//! reset is stored only when the cycle that drew it commits.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::{mpsc, oneshot};

use super::selector::{select_topic, Selection};
use super::Topic;
use crate::db::{self, keys, KvStore};
use crate::error::SelectError;

enum UsageCommand {
    Select {
        topics: Vec<Topic>,
        reply: oneshot::Sender<Result<Selection, SelectError>>,
    },
    MarkUsed {
        topic: Topic,
        reply: oneshot::Sender<anyhow::Result<()>>,
    },
    StartRotation {
        topic: Topic,
        reply: oneshot::Sender<anyhow::Result<()>>,
    },
    Used {
        reply: oneshot::Sender<anyhow::Result<BTreeSet<Topic>>>,
    },
}

/// Handle to the usage ledger task. Cheap to clone.
#[derive(Clone)]
pub struct UsageLedger {
    tx: mpsc::Sender<UsageCommand>,
}

impl UsageLedger {
    pub fn spawn(store: Arc<dyn KvStore>) -> Self {
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(run(store, rx));
        Self { tx }
    }

    /// Pick an unused topic from `topics`. When all are used the pick comes
    /// from a fresh rotation, but the stored set is left as is until `commit`.
    pub async fn select(&self, topics: &[Topic]) -> Result<Selection, SelectError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(UsageCommand::Select {
                topics: topics.to_vec(),
                reply,
            })
            .await
            .map_err(|_| SelectError::Ledger(stopped()))?;
        rx.await.map_err(|_| SelectError::Ledger(stopped()))?
    }

    /// Record `topic` as published. Marking a used topic again is a no-op.
    pub async fn mark_used(&self, topic: Topic) -> anyhow::Result<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(UsageCommand::MarkUsed { topic, reply })
            .await
            .map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())?
    }

    /// Record a published selection. A selection drawn after a reset
    /// replaces the stored set with just its topic.
    pub async fn commit(&self, selection: Selection) -> anyhow::Result<()> {
        if !selection.reset {
            return self.mark_used(selection.topic).await;
        }
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(UsageCommand::StartRotation {
                topic: selection.topic,
                reply,
            })
            .await
            .map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())?
    }

    pub async fn used(&self) -> anyhow::Result<BTreeSet<Topic>> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(UsageCommand::Used { reply })
            .await
            .map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())?
    }
}

fn stopped() -> anyhow::Error {
    anyhow!("usage ledger task stopped")
}

async fn run(store: Arc<dyn KvStore>, mut rx: mpsc::Receiver<UsageCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            UsageCommand::Select { topics, reply } => {
                let _ = reply.send(select(store.as_ref(), &topics).await);
            }
            UsageCommand::MarkUsed { topic, reply } => {
                let _ = reply.send(mark_used(store.as_ref(), topic).await);
            }
            UsageCommand::StartRotation { topic, reply } => {
                let _ = reply.send(start_rotation(store.as_ref(), topic).await);
            }
            UsageCommand::Used { reply } => {
                let _ = reply.send(read_used(store.as_ref()).await);
            }
        }
    }
    tracing::debug!("Usage ledger stopped");
}

async fn read_used(store: &dyn KvStore) -> anyhow::Result<BTreeSet<Topic>> {
    Ok(db::load(store, keys::USED_TOPICS).await?.unwrap_or_default())
}

async fn select(store: &dyn KvStore, topics: &[Topic]) -> Result<Selection, SelectError> {
    let mut used = read_used(store).await.map_err(SelectError::Ledger)?;
    let selection = {
        let mut rng = rand::thread_rng();
        select_topic(topics, &mut used, &mut rng)?
    };

    if selection.reset {
        tracing::info!("All {} topics used, drawing from a new rotation", topics.len());
    }

    Ok(selection)
}

async fn start_rotation(store: &dyn KvStore, topic: Topic) -> anyhow::Result<()> {
    let used = BTreeSet::from([topic]);
    db::save(store, keys::USED_TOPICS, &used).await
}

async fn mark_used(store: &dyn KvStore, topic: Topic) -> anyhow::Result<()> {
    let mut used = read_used(store).await?;
    if used.insert(topic) {
        db::save(store, keys::USED_TOPICS, &used).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    fn topics(names: &[&str]) -> Vec<Topic> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn never_written_ledger_is_empty() {
        let ledger = UsageLedger::spawn(Arc::new(MemoryStore::new()));
        assert!(ledger.used().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mark_used_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let ledger = UsageLedger::spawn(store.clone());

        ledger.mark_used("beef".into()).await.unwrap();
        let once = ledger.used().await.unwrap();
        ledger.mark_used("beef".into()).await.unwrap();
        let twice = ledger.used().await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
        // The repeated mark does not even touch the store.
        assert_eq!(store.writes(), vec![keys::USED_TOPICS.to_string()]);
    }

    #[tokio::test]
    async fn selects_the_only_unused_topic() {
        let ledger = UsageLedger::spawn(Arc::new(MemoryStore::new()));
        ledger.mark_used("beef".into()).await.unwrap();

        let sel = ledger.select(&topics(&["beef", "freestyle"])).await.unwrap();
        assert_eq!(sel.topic, "freestyle");
        assert!(!sel.reset);
    }

    #[tokio::test]
    async fn reset_selection_does_not_touch_the_store() {
        let store = Arc::new(MemoryStore::new());
        let ledger = UsageLedger::spawn(store.clone());
        ledger.mark_used("beef".into()).await.unwrap();
        ledger.mark_used("freestyle".into()).await.unwrap();
        let writes_before = store.writes().len();

        let sel = ledger.select(&topics(&["beef", "freestyle"])).await.unwrap();
        assert!(sel.reset);
        assert!(sel.topic == "beef" || sel.topic == "freestyle");

        assert_eq!(store.writes().len(), writes_before);
        assert_eq!(ledger.used().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn committing_a_reset_selection_starts_a_new_rotation() {
        let store = Arc::new(MemoryStore::new());
        let ledger = UsageLedger::spawn(store.clone());
        ledger.mark_used("beef".into()).await.unwrap();
        ledger.mark_used("freestyle".into()).await.unwrap();

        let sel = ledger.select(&topics(&["beef", "freestyle"])).await.unwrap();
        let topic = sel.topic.clone();
        ledger.commit(sel).await.unwrap();

        let stored: BTreeSet<Topic> = db::load(&*store, keys::USED_TOPICS)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, BTreeSet::from([topic]));
    }

    #[tokio::test]
    async fn committing_a_plain_selection_adds_to_the_set() {
        let ledger = UsageLedger::spawn(Arc::new(MemoryStore::new()));
        ledger.mark_used("beef".into()).await.unwrap();

        let sel = ledger.select(&topics(&["beef", "freestyle"])).await.unwrap();
        ledger.commit(sel).await.unwrap();

        let used = ledger.used().await.unwrap();
        assert_eq!(used, BTreeSet::from(["beef".to_string(), "freestyle".to_string()]));
    }

    #[tokio::test]
    async fn ledger_survives_a_new_handle_over_the_same_store() {
        let store = Arc::new(MemoryStore::new());
        UsageLedger::spawn(store.clone())
            .mark_used("battles".into())
            .await
            .unwrap();

        let restarted = UsageLedger::spawn(store);
        assert!(restarted.used().await.unwrap().contains("battles"));
    }

    #[tokio::test]
    async fn empty_topic_store_is_reported() {
        let ledger = UsageLedger::spawn(Arc::new(MemoryStore::new()));
        assert!(matches!(
            ledger.select(&[]).await,
            Err(SelectError::EmptyTopicStore)
        ));
    }

    #[tokio::test]
    async fn concurrent_marks_are_not_lost() {
        let ledger = UsageLedger::spawn(Arc::new(MemoryStore::yielding()));
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let ledger = ledger.clone();
                tokio::spawn(async move { ledger.mark_used(format!("topic-{i}")).await })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert_eq!(ledger.used().await.unwrap().len(), 16);
    }
}
