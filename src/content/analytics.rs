//! Command usage counters and the set of chats that used them.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::db::{self, keys, KvStore};

/// Commands that are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Advice,
    Lyrics,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Advice => "advice",
            Self::Lyrics => "lyrics",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsState {
    #[serde(default)]
    pub users: BTreeSet<i64>,
    #[serde(default)]
    pub commands_used: BTreeMap<String, u64>,
}

impl Default for AnalyticsState {
    fn default() -> Self {
        Self {
            users: BTreeSet::new(),
            commands_used: [CommandKind::Advice, CommandKind::Lyrics]
                .iter()
                .map(|c| (c.as_str().to_string(), 0))
                .collect(),
        }
    }
}

impl AnalyticsState {
    pub fn record(&mut self, command: CommandKind, user_id: i64) {
        self.users.insert(user_id);
        *self
            .commands_used
            .entry(command.as_str().to_string())
            .or_insert(0) += 1;
    }

    pub fn count(&self, command: CommandKind) -> u64 {
        self.commands_used
            .get(command.as_str())
            .copied()
            .unwrap_or(0)
    }
}

enum AnalyticsCommand {
    Record {
        command: CommandKind,
        user_id: i64,
        reply: oneshot::Sender<anyhow::Result<()>>,
    },
    Snapshot {
        reply: oneshot::Sender<anyhow::Result<AnalyticsState>>,
    },
}

/// Handle to the task that owns the `analytics` record.
#[derive(Clone)]
pub struct AnalyticsLedger {
    tx: mpsc::Sender<AnalyticsCommand>,
}

impl AnalyticsLedger {
    pub fn spawn(store: Arc<dyn KvStore>) -> Self {
        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(run(store, rx));
        Self { tx }
    }

    /// Count one use of `command` by `user_id` and persist the result.
    pub async fn record(&self, command: CommandKind, user_id: i64) -> anyhow::Result<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(AnalyticsCommand::Record {
                command,
                user_id,
                reply,
            })
            .await
            .map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())?
    }

    pub async fn snapshot(&self) -> anyhow::Result<AnalyticsState> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(AnalyticsCommand::Snapshot { reply })
            .await
            .map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())?
    }
}

fn stopped() -> anyhow::Error {
    anyhow!("analytics ledger task stopped")
}

async fn run(store: Arc<dyn KvStore>, mut rx: mpsc::Receiver<AnalyticsCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            AnalyticsCommand::Record {
                command,
                user_id,
                reply,
            } => {
                let result = async {
                    let mut state = read(store.as_ref()).await?;
                    state.record(command, user_id);
                    db::save(store.as_ref(), keys::ANALYTICS, &state).await
                }
                .await;
                let _ = reply.send(result);
            }
            AnalyticsCommand::Snapshot { reply } => {
                let _ = reply.send(read(store.as_ref()).await);
            }
        }
    }
    tracing::debug!("Analytics ledger stopped");
}

async fn read(store: &dyn KvStore) -> anyhow::Result<AnalyticsState> {
    Ok(db::load(store, keys::ANALYTICS).await?.unwrap_or_default())
}
