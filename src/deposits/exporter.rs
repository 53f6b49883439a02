use std::{collections::HashSet, sync::Arc, time::Duration};

use tokio::{sync::Semaphore, task::JoinSet, time};
use tracing::{error, info};

use crate::{
    deposits::{DepositWalletsProvider, DepositsHistoryProvider},
    error::Error,
    model::DepositWallet,
    normalization::AddressNormalizer,
    reporting::{DepositWalletsReport, TransactionsReportBuilder},
    retry::RetryPolicy,
};

const MAX_PENDING_TASKS: usize = 500;

#[derive(Debug, Clone)]
pub struct DepositsExporterSettings {
    pub concurrency: usize,
    pub retry: RetryPolicy,
    pub wallet_timeout: Option<Duration>,
    /// Abort the run on the first failed wallet.
    pub strict: bool,
}

impl Default for DepositsExporterSettings {
    fn default() -> Self {
        DepositsExporterSettings {
            concurrency: 8,
            retry: RetryPolicy::default(),
            wallet_timeout: None,
            strict: false,
        }
    }
}

/// Discovers deposit wallets and feeds their deposit history into the
/// report.
#[derive(Clone)]
pub struct DepositsExporter {
    normalizer: Arc<AddressNormalizer>,
    wallets_providers: Arc<Vec<Arc<dyn DepositWalletsProvider>>>,
    history_providers: Arc<Vec<Arc<dyn DepositsHistoryProvider>>>,
    settings: DepositsExporterSettings,
    wallets_report: Option<Arc<DepositWalletsReport>>,
}

impl DepositsExporter {
    pub fn new(
        normalizer: Arc<AddressNormalizer>,
        wallets_providers: Vec<Arc<dyn DepositWalletsProvider>>,
        history_providers: Vec<Arc<dyn DepositsHistoryProvider>>,
        settings: DepositsExporterSettings,
        wallets_report: Option<DepositWalletsReport>,
    ) -> DepositsExporter {
        DepositsExporter {
            normalizer,
            wallets_providers: Arc::new(wallets_providers),
            history_providers: Arc::new(history_providers),
            settings,
            wallets_report: wallets_report.map(Arc::new),
        }
    }

    /// Returns the number of deposits new to the report.
    pub async fn export(
        &self,
        builder: Arc<TransactionsReportBuilder>,
    ) -> Result<usize, Error> {
        let wallets = self.load_wallets().await?;

        if let Some(report) = &self.wallets_report {
            report.save(&wallets).await?;
        }

        let wallets: HashSet<DepositWallet> = wallets
            .iter()
            .filter_map(|wallet| self.normalizer.normalize_wallet(wallet))
            .collect();
        let total = wallets.len();

        info!("Exporting deposits of {} deposit wallets...", total);

        let semaphore = Arc::new(Semaphore::new(self.settings.concurrency));
        let mut tasks = JoinSet::new();
        let mut progress = WalletsProgress::new(total);

        for wallet in wallets {
            if tasks.len() >= MAX_PENDING_TASKS {
                if let Some(result) = tasks.join_next().await {
                    self.handle_result(result?, &mut progress, &mut tasks)?;
                }
            }

            let permit = semaphore.clone().acquire_owned().await?;
            let exporter = self.clone();
            let builder = builder.clone();

            tasks.spawn(async move {
                let _permit = permit;
                exporter.process_wallet(&wallet, &builder).await
            });
        }

        while let Some(result) = tasks.join_next().await {
            self.handle_result(result?, &mut progress, &mut tasks)?;
        }

        info!(
            "Deposits export done. {} deposit wallets processed, {} failed, {} new deposits",
            progress.processed, progress.failed, progress.deposits
        );

        Ok(progress.deposits)
    }

    fn handle_result(
        &self,
        result: Result<usize, Error>,
        progress: &mut WalletsProgress,
        tasks: &mut JoinSet<Result<usize, Error>>,
    ) -> Result<(), Error> {
        match result {
            Ok(deposits) => progress.deposits += deposits,
            Err(e) if self.settings.strict || e.is_fatal() => {
                tasks.abort_all();
                return Err(e);
            },
            Err(e) => {
                error!("{}", e);
                progress.failed += 1;
            },
        }

        progress.wallet_done();

        Ok(())
    }

    async fn load_wallets(&self) -> Result<HashSet<DepositWallet>, Error> {
        info!(
            "Loading deposit wallets from {} providers...",
            self.wallets_providers.len()
        );

        let mut tasks = JoinSet::new();

        for provider in self.wallets_providers.iter() {
            let provider = provider.clone();
            let retry = self.settings.retry;

            tasks.spawn(async move { load_provider_wallets(provider, retry).await });
        }

        let mut wallets = HashSet::new();

        while let Some(result) = tasks.join_next().await {
            wallets.extend(result??);
        }

        info!("{} unique deposit wallets loaded", wallets.len());

        Ok(wallets)
    }

    async fn process_wallet(
        &self,
        wallet: &DepositWallet,
        builder: &TransactionsReportBuilder,
    ) -> Result<usize, Error> {
        let result = match self.settings.wallet_timeout {
            Some(timeout) => {
                match time::timeout(timeout, self.export_wallet(wallet, builder)).await
                {
                    Ok(result) => result,
                    Err(e) => Err(Error::from(e)),
                }
            },
            None => self.export_wallet(wallet, builder).await,
        };

        result.map_err(|e| Error::WalletProcessing {
            wallet: wallet.to_string(),
            source: Box::new(e),
        })
    }

    async fn export_wallet(
        &self,
        wallet: &DepositWallet,
        builder: &TransactionsReportBuilder,
    ) -> Result<usize, Error> {
        let mut transactions = 0;
        let mut deposits = 0;

        for provider in self
            .history_providers
            .iter()
            .filter(|provider| provider.can_provide_history_for(wallet))
        {
            let provider = provider.as_ref();
            let context = format!("Deposits history {} of {}", provider.name(), wallet);
            let mut continuation: Option<String> = None;

            loop {
                let token = continuation.as_deref();
                let page = self
                    .settings
                    .retry
                    .run(&context, move || provider.get_history(wallet, token))
                    .await?;

                for tx in page.items {
                    transactions += 1;

                    if transactions % 100 == 0 {
                        info!(
                            "{} transactions of deposit wallet {} processed",
                            transactions, wallet
                        );
                    }

                    if let Some(tx) = self.normalizer.normalize_transaction(&tx) {
                        if builder.add_transaction(tx).await? {
                            deposits += 1;
                        }
                    }
                }

                match page.continuation {
                    Some(next) => continuation = Some(next),
                    None => break,
                }
            }
        }

        Ok(deposits)
    }
}

async fn load_provider_wallets(
    provider: Arc<dyn DepositWalletsProvider>,
    retry: RetryPolicy,
) -> Result<Vec<DepositWallet>, Error> {
    let provider = provider.as_ref();
    let context = format!("Deposit wallets of {}", provider.name());
    let mut continuation: Option<String> = None;
    let mut wallets = Vec::new();

    loop {
        let token = continuation.as_deref();
        let page = retry
            .run(&context, move || provider.get_wallets(token))
            .await?;
        let before = wallets.len();

        wallets.extend(page.items);

        if wallets.len() / 1000 > before / 1000 {
            info!(
                "{} deposit wallets loaded from {}",
                wallets.len(),
                provider.name()
            );
        }

        match page.continuation {
            Some(next) => continuation = Some(next),
            None => break,
        }
    }

    info!(
        "Deposit wallets loading from {} done. {} deposit wallets loaded",
        provider.name(),
        wallets.len()
    );

    Ok(wallets)
}

#[derive(Debug)]
struct WalletsProgress {
    total: usize,
    processed: usize,
    failed: usize,
    deposits: usize,
}

impl WalletsProgress {
    fn new(total: usize) -> WalletsProgress {
        WalletsProgress {
            total,
            processed: 0,
            failed: 0,
            deposits: 0,
        }
    }

    fn wallet_done(&mut self) {
        self.processed += 1;

        if self.processed % 100 == 0 {
            info!(
                "{} of {} deposit wallets processed ({:.1}%)",
                self.processed,
                self.total,
                self.processed as f64 / self.total as f64 * 100.0
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::{
        model::{PaginatedList, Transaction, TransactionType},
        reporting::{
            snapshot::tests::MemorySnapshotStore, TransactionsReportReader,
            TransactionsSnapshotRepository,
        },
    };

    const ACCOUNT: &str = "rLKKAHHiVoiFGcmaRkxXoD93J84ZUvDh4e";

    struct PagedWallets {
        pages: Vec<Vec<DepositWallet>>,
    }

    #[async_trait]
    impl DepositWalletsProvider for PagedWallets {
        fn name(&self) -> &'static str {
            "paged-wallets"
        }

        async fn get_wallets(
            &self,
            continuation: Option<&str>,
        ) -> Result<PaginatedList<DepositWallet>, Error> {
            let index: usize = continuation.map(str::parse::<usize>).transpose()?.unwrap_or(0);
            let next = (index + 1 < self.pages.len()).then(|| (index + 1).to_string());

            Ok(PaginatedList::new(
                next,
                self.pages.get(index).cloned().unwrap_or_default(),
            ))
        }
    }

    /// Two pages of one deposit each per wallet.
    #[derive(Default)]
    struct PagedHistory {
        failing_address: Option<String>,
        transient_failures: AtomicU32,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DepositsHistoryProvider for PagedHistory {
        fn name(&self) -> &'static str {
            "paged-history"
        }

        fn can_provide_history_for(&self, wallet: &DepositWallet) -> bool {
            wallet.crypto_currency == "XRP"
        }

        async fn get_history(
            &self,
            wallet: &DepositWallet,
            continuation: Option<&str>,
        ) -> Result<PaginatedList<Transaction>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.failing_address.as_deref() == Some(wallet.address.as_str()) {
                return Err(Error::ContinuationNotSupported(String::from(
                    "paged-history",
                )));
            }

            if self
                .transient_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                    left.checked_sub(1)
                })
                .is_ok()
            {
                return Err(Error::UpstreamError(String::from("rate limited")));
            }

            let index: usize = continuation.map(str::parse::<usize>).transpose()?.unwrap_or(0);
            let next = (index == 0).then(|| String::from("1"));

            Ok(PaginatedList::new(
                next,
                vec![Transaction::new(
                    wallet.crypto_currency.to_owned(),
                    format!("{}-{}", wallet.address, index),
                    wallet.user_id,
                    wallet.address.to_owned(),
                    TransactionType::Deposit,
                )],
            ))
        }
    }

    struct SingleDeposit;

    #[async_trait]
    impl DepositsHistoryProvider for SingleDeposit {
        fn name(&self) -> &'static str {
            "single-deposit"
        }

        fn can_provide_history_for(&self, wallet: &DepositWallet) -> bool {
            wallet.crypto_currency == "XRP"
        }

        async fn get_history(
            &self,
            wallet: &DepositWallet,
            _continuation: Option<&str>,
        ) -> Result<PaginatedList<Transaction>, Error> {
            Ok(PaginatedList::terminal(vec![Transaction::new(
                "XRP",
                "H",
                wallet.user_id,
                wallet.address.to_owned(),
                TransactionType::Deposit,
            )]))
        }
    }

    fn settings(strict: bool) -> DepositsExporterSettings {
        DepositsExporterSettings {
            concurrency: 4,
            retry: RetryPolicy::new(Duration::from_millis(1), Duration::from_millis(2)),
            wallet_timeout: None,
            strict,
        }
    }

    async fn builder(store: &MemorySnapshotStore) -> Arc<TransactionsReportBuilder> {
        let repository = TransactionsSnapshotRepository::new(
            Box::new(store.clone()),
            TransactionsReportReader::new(Arc::new(AddressNormalizer::default())),
        );
        let builder = TransactionsReportBuilder::new(Arc::new(repository), vec![]);
        builder.load_snapshot().await.unwrap();

        Arc::new(builder)
    }

    fn tagged_wallets(count: usize) -> Vec<DepositWallet> {
        (0..count)
            .map(|tag| {
                DepositWallet::new(Uuid::new_v4(), format!("{}+{}", ACCOUNT, tag + 1), "XRP")
            })
            .collect()
    }

    fn exporter(
        pages: Vec<Vec<DepositWallet>>,
        history: Arc<dyn DepositsHistoryProvider>,
        strict: bool,
    ) -> DepositsExporter {
        DepositsExporter::new(
            Arc::new(AddressNormalizer::default()),
            vec![Arc::new(PagedWallets { pages })],
            vec![history],
            settings(strict),
            None,
        )
    }

    #[tokio::test]
    async fn single_xrp_deposit_reaches_snapshot() {
        let store = MemorySnapshotStore::default();
        let builder = builder(&store).await;
        let user = Uuid::parse_str("8c4b3b1e-3f0c-4a51-9b8e-0d1c2e3f4a5b").unwrap();
        let exporter = exporter(
            vec![vec![DepositWallet::new(user, ACCOUNT, "XRP")]],
            Arc::new(SingleDeposit),
            false,
        );

        assert_eq!(exporter.export(builder.clone()).await.unwrap(), 1);

        builder.save_increment().await.unwrap();
        builder.save_snapshot().await.unwrap();

        let data = store.data.lock().unwrap().as_ref().unwrap().0.clone();
        let text = String::from_utf8(data).unwrap();

        assert_eq!(
            text.lines().nth(1),
            Some("8c4b3b1e-3f0c-4a51-9b8e-0d1c2e3f4a5b,XRP,received,H,rLKKAHHiVoiFGcmaRkxXoD93J84ZUvDh4e")
        );
    }

    #[tokio::test]
    async fn every_page_of_every_wallet_is_exported() {
        let wallets = tagged_wallets(7);
        let pages = wallets.chunks(3).map(|chunk| chunk.to_vec()).collect();
        let history = Arc::new(PagedHistory {
            transient_failures: AtomicU32::new(3),
            ..PagedHistory::default()
        });
        let builder = builder(&MemorySnapshotStore::default()).await;

        let deposits = exporter(pages, history.clone(), false)
            .export(builder.clone())
            .await
            .unwrap();

        assert_eq!(deposits, 14);
        assert_eq!(builder.increment_len().await, 14);
        assert_eq!(history.calls.load(Ordering::SeqCst), 14 + 3);
    }

    #[tokio::test]
    async fn duplicate_and_invalid_wallets_are_dropped() {
        let user = Uuid::new_v4();
        let wallet = DepositWallet::new(user, ACCOUNT, "XRP");
        let pages = vec![
            vec![wallet.clone(), DepositWallet::new(Uuid::nil(), ACCOUNT, "XRP")],
            vec![wallet, DepositWallet::new(user, "not-an-address", "XRP")],
        ];
        let history = Arc::new(PagedHistory::default());
        let builder = builder(&MemorySnapshotStore::default()).await;

        let deposits = exporter(pages, history.clone(), false)
            .export(builder)
            .await
            .unwrap();

        assert_eq!(deposits, 2);
        assert_eq!(history.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_wallet_does_not_stop_others() {
        let wallets = tagged_wallets(3);
        let history = Arc::new(PagedHistory {
            failing_address: Some(wallets[1].address.to_owned()),
            ..PagedHistory::default()
        });
        let builder = builder(&MemorySnapshotStore::default()).await;

        let deposits = exporter(vec![wallets], history, false)
            .export(builder)
            .await
            .unwrap();

        assert_eq!(deposits, 4);
    }

    #[tokio::test]
    async fn strict_mode_aborts_on_failed_wallet() {
        let wallets = tagged_wallets(3);
        let failing = wallets[1].to_string();
        let history = Arc::new(PagedHistory {
            failing_address: Some(wallets[1].address.to_owned()),
            ..PagedHistory::default()
        });
        let builder = builder(&MemorySnapshotStore::default()).await;

        let error = exporter(vec![wallets], history, true)
            .export(builder)
            .await
            .unwrap_err();

        match error {
            Error::WalletProcessing { wallet, source } => {
                assert_eq!(wallet, failing);
                assert!(matches!(*source, Error::ContinuationNotSupported(_)));
            },
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn wallets_report_lists_discovered_wallets() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("deposit-wallets.csv");
        let exporter = DepositsExporter::new(
            Arc::new(AddressNormalizer::default()),
            vec![Arc::new(PagedWallets {
                pages: vec![tagged_wallets(2), tagged_wallets(1)],
            })],
            vec![],
            settings(false),
            Some(DepositWalletsReport::new(path.clone())),
        );

        exporter
            .export(builder(&MemorySnapshotStore::default()).await)
            .await
            .unwrap();

        let report = std::fs::read_to_string(path).unwrap();
        assert_eq!(report.lines().count(), 3);
    }
}
