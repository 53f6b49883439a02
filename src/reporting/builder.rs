use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use tokio::sync::Mutex;
use tracing::info;

use crate::{
    error::Error,
    model::Transaction,
    reporting::{TransactionsIncrementPublisher, TransactionsSnapshotRepository},
};

#[derive(Debug, Default)]
struct ReportState {
    snapshot: Option<HashSet<Transaction>>,
    snapshot_modified_at: Option<DateTime<Utc>>,
    increment: HashSet<Transaction>,
    increment_saved: bool,
    snapshot_saved: bool,
}

/// Deduplicating report of one run.
///
/// The snapshot is loaded once, transactions are added while exporters
/// run, then the increment is published and the snapshot saved, each
/// exactly once and in that order.
pub struct TransactionsReportBuilder {
    repository: Arc<TransactionsSnapshotRepository>,
    publishers: Vec<Arc<dyn TransactionsIncrementPublisher>>,
    state: Mutex<ReportState>,
}

impl TransactionsReportBuilder {
    pub fn new(
        repository: Arc<TransactionsSnapshotRepository>,
        publishers: Vec<Arc<dyn TransactionsIncrementPublisher>>,
    ) -> TransactionsReportBuilder {
        TransactionsReportBuilder {
            repository,
            publishers,
            state: Mutex::new(ReportState::default()),
        }
    }

    pub async fn load_snapshot(&self) -> Result<(), Error> {
        let mut state = self.state.lock().await;

        if state.snapshot.is_some() {
            return Err(Error::ReportSequence(String::from(
                "Report snapshot has been loaded already",
            )));
        }

        let (snapshot, modified_at) = self.repository.load().await?;
        state.snapshot = Some(snapshot);
        state.snapshot_modified_at = modified_at;

        Ok(())
    }

    /// Returns whether the transaction was not seen before. Transactions
    /// with empty required fields are dropped.
    pub async fn add_transaction(&self, tx: Transaction) -> Result<bool, Error> {
        let mut state = self.state.lock().await;
        let ReportState {
            snapshot,
            increment,
            increment_saved,
            ..
        } = &mut *state;

        let snapshot = snapshot.as_mut().ok_or_else(|| {
            Error::ReportSequence(String::from(
                "Report snapshot has not been loaded yet",
            ))
        })?;

        if *increment_saved {
            return Err(Error::ReportSequence(String::from(
                "Report increment has been saved already",
            )));
        }

        if !tx.is_valid() {
            return Ok(false);
        }

        if snapshot.insert(tx.clone()) {
            increment.insert(tx);
            return Ok(true);
        }

        Ok(false)
    }

    /// Publishes the increment for `[snapshot modified time, now]` to every
    /// publisher concurrently.
    pub async fn save_increment(&self) -> Result<usize, Error> {
        let mut state = self.state.lock().await;

        if state.snapshot.is_none() {
            return Err(Error::ReportSequence(String::from(
                "Report snapshot has not been loaded yet",
            )));
        }

        if state.increment_saved {
            return Err(Error::ReportSequence(String::from(
                "Report increment has been saved already",
            )));
        }

        state.increment_saved = true;

        let now = Utc::now();
        let from = state.snapshot_modified_at.unwrap_or(now);
        let increment = &state.increment;

        info!(
            "Publishing transactions increment with {} transactions to {} publishers",
            increment.len(),
            self.publishers.len()
        );

        try_join_all(
            self.publishers
                .iter()
                .map(|publisher| publisher.publish(increment, from, now)),
        )
        .await?;

        Ok(increment.len())
    }

    pub async fn save_snapshot(&self) -> Result<usize, Error> {
        let mut state = self.state.lock().await;

        if !state.increment_saved {
            return Err(match state.snapshot {
                None => Error::ReportSequence(String::from(
                    "Report snapshot has not been loaded yet",
                )),
                Some(_) => Error::ReportSequence(String::from(
                    "Report increment has been not saved yet",
                )),
            });
        }

        if state.snapshot_saved {
            return Err(Error::ReportSequence(String::from(
                "Report snapshot has been saved already",
            )));
        }

        let snapshot = state.snapshot.as_ref().ok_or_else(|| {
            Error::ReportSequence(String::from(
                "Report snapshot has not been loaded yet",
            ))
        })?;

        self.repository.save(snapshot).await?;
        let count = snapshot.len();
        state.snapshot_saved = true;

        Ok(count)
    }

    #[cfg(test)]
    pub(crate) async fn increment_len(&self) -> usize {
        self.state.lock().await.increment.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::{
        model::TransactionType,
        normalization::AddressNormalizer,
        reporting::{
            snapshot::tests::MemorySnapshotStore, TransactionsReportReader,
        },
    };

    #[derive(Default)]
    struct RecordingPublisher {
        published: StdMutex<Vec<(HashSet<Transaction>, DateTime<Utc>, DateTime<Utc>)>>,
    }

    #[async_trait]
    impl TransactionsIncrementPublisher for RecordingPublisher {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn publish(
            &self,
            increment: &HashSet<Transaction>,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> Result<(), Error> {
            self.published
                .lock()
                .unwrap()
                .push((increment.clone(), from, to));
            Ok(())
        }
    }

    fn builder(
        store: &MemorySnapshotStore,
        publisher: &Arc<RecordingPublisher>,
    ) -> TransactionsReportBuilder {
        let repository = TransactionsSnapshotRepository::new(
            Box::new(store.clone()),
            TransactionsReportReader::new(Arc::new(AddressNormalizer::default())),
        );
        let publisher: Arc<dyn TransactionsIncrementPublisher> = publisher.clone();

        TransactionsReportBuilder::new(Arc::new(repository), vec![publisher])
    }

    fn deposit(hash: &str, user: Uuid) -> Transaction {
        Transaction::new(
            "XRP",
            hash,
            user,
            "rLKKAHHiVoiFGcmaRkxXoD93J84ZUvDh4e",
            TransactionType::Deposit,
        )
    }

    fn sequence_message(error: Error) -> String {
        match error {
            Error::ReportSequence(message) => message,
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn add_before_load_is_rejected() {
        let builder = builder(
            &MemorySnapshotStore::default(),
            &Arc::new(RecordingPublisher::default()),
        );
        let error = builder
            .add_transaction(deposit("H", Uuid::new_v4()))
            .await
            .unwrap_err();

        assert!(error.is_fatal());
        assert_eq!(
            sequence_message(error),
            "Report snapshot has not been loaded yet"
        );
    }

    #[tokio::test]
    async fn load_twice_is_rejected() {
        let builder = builder(
            &MemorySnapshotStore::default(),
            &Arc::new(RecordingPublisher::default()),
        );
        builder.load_snapshot().await.unwrap();

        assert_eq!(
            sequence_message(builder.load_snapshot().await.unwrap_err()),
            "Report snapshot has been loaded already"
        );
    }

    #[tokio::test]
    async fn sequencing_after_increment() {
        let builder = builder(
            &MemorySnapshotStore::default(),
            &Arc::new(RecordingPublisher::default()),
        );
        builder.load_snapshot().await.unwrap();

        assert_eq!(
            sequence_message(builder.save_snapshot().await.unwrap_err()),
            "Report increment has been not saved yet"
        );

        builder.save_increment().await.unwrap();

        assert_eq!(
            sequence_message(
                builder
                    .add_transaction(deposit("H", Uuid::new_v4()))
                    .await
                    .unwrap_err()
            ),
            "Report increment has been saved already"
        );
        assert_eq!(
            sequence_message(builder.save_increment().await.unwrap_err()),
            "Report increment has been saved already"
        );

        builder.save_snapshot().await.unwrap();
        assert!(builder.save_snapshot().await.is_err());
    }

    #[tokio::test]
    async fn duplicates_and_invalid_are_not_counted() {
        let builder = builder(
            &MemorySnapshotStore::default(),
            &Arc::new(RecordingPublisher::default()),
        );
        let user = Uuid::new_v4();
        builder.load_snapshot().await.unwrap();

        assert!(builder.add_transaction(deposit("H", user)).await.unwrap());
        assert!(!builder.add_transaction(deposit("H", user)).await.unwrap());
        assert!(!builder.add_transaction(deposit("", user)).await.unwrap());
        assert!(!builder
            .add_transaction(deposit("H2", Uuid::nil()))
            .await
            .unwrap());

        assert_eq!(builder.increment_len().await, 1);
    }

    #[tokio::test]
    async fn rerun_produces_empty_increment() {
        let store = MemorySnapshotStore::default();
        let publisher = Arc::new(RecordingPublisher::default());
        let user = Uuid::new_v4();

        for _ in 0..2 {
            let builder = builder(&store, &publisher);
            builder.load_snapshot().await.unwrap();
            builder.add_transaction(deposit("H1", user)).await.unwrap();
            builder.add_transaction(deposit("H2", user)).await.unwrap();
            builder.save_increment().await.unwrap();
            assert_eq!(builder.save_snapshot().await.unwrap(), 2);
        }

        let published = publisher.published.lock().unwrap();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].0.len(), 2);
        assert!(published[1].0.is_empty());

        assert_eq!(published[0].1, published[0].2);
        assert!(published[1].1 <= published[1].2);
        assert!(published[1].1 >= published[0].2);
    }

    #[tokio::test]
    async fn concurrent_adds_are_deduplicated() {
        let builder = Arc::new(builder(
            &MemorySnapshotStore::default(),
            &Arc::new(RecordingPublisher::default()),
        ));
        let user = Uuid::new_v4();
        builder.load_snapshot().await.unwrap();

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let builder = builder.clone();
            tasks.spawn(async move {
                for i in 0..50 {
                    builder
                        .add_transaction(deposit(&format!("H{}", i), user))
                        .await
                        .unwrap();
                }
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap();
        }

        assert_eq!(builder.increment_len().await, 50);
    }
}
