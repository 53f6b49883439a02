use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use tracing::{info, warn};

use crate::{
    blockchains::BlockchainsProvider,
    configuration::{AppState, Config, State},
    deposits::{
        BcnCredentialsWalletsProvider, BlockchainWalletsProvider,
        CsvFileWalletsProvider, DepositWalletsProvider, DepositsExporter,
        DepositsExporterSettings, DepositsHistoryProvider,
        InsightDepositsHistoryProvider, RippleDepositsHistoryProvider,
        SamuraiDepositsHistoryProvider, WalletCredentialsWalletsProvider,
    },
    error::Error,
    provider::{InsightApi, RippleRpc, SamuraiClient},
    reporting::{
        DepositWalletsReport, EmailIncrementPublisher, FileIncrementPublisher,
        FileSnapshotStore, SlackIncrementPublisher, TransactionsIncrementPublisher,
        TransactionsReportBuilder, TransactionsReportReader,
        TransactionsSnapshotRepository,
    },
    withdrawals::{
        BilCashoutsWithdrawalsHistoryProvider,
        CashOperationsWithdrawalsHistoryProvider,
        CashoutsBatchWithdrawalsHistoryProvider, WithdrawalsExporter,
        WithdrawalsHistoryProvider,
    },
};

static RUNNING: AtomicBool = AtomicBool::new(false);

struct RunningGuard;

impl RunningGuard {
    fn acquire() -> Option<RunningGuard> {
        RUNNING
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| RunningGuard)
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        RUNNING.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub withdrawals: usize,
    pub deposits: usize,
    pub increment: usize,
    pub snapshot: usize,
}

/// One full run: withdrawals and deposits into a fresh report builder,
/// then the increment and the snapshot.
pub struct Exporter {
    blockchains: Arc<BlockchainsProvider>,
    repository: Arc<TransactionsSnapshotRepository>,
    publishers: Vec<Arc<dyn TransactionsIncrementPublisher>>,
    withdrawals: WithdrawalsExporter,
    deposits: DepositsExporter,
}

impl Exporter {
    pub fn new(state: AppState<State>) -> Result<Exporter, Error> {
        let config = &state.config;
        let settings = DepositsExporterSettings {
            concurrency: config.deposits_concurrency,
            retry: config.retry_policy(),
            wallet_timeout: config.wallet_timeout(),
            strict: config.strict_wallet_failures,
        };
        let deposits = DepositsExporter::new(
            state.normalizer.clone(),
            deposit_wallets_providers(&state)?,
            deposits_history_providers(&state)?,
            settings,
            config
                .deposit_wallets_report_path()
                .map(DepositWalletsReport::new),
        );
        let withdrawals = WithdrawalsExporter::new(
            state.normalizer.clone(),
            withdrawals_history_providers(&state)?,
            config.retry_policy(),
        );

        Ok(Exporter {
            blockchains: state.blockchains.clone(),
            repository: Arc::new(snapshot_repository(&state)),
            publishers: increment_publishers(&state)?,
            withdrawals,
            deposits,
        })
    }

    #[cfg(test)]
    pub(crate) fn is_running() -> bool {
        RUNNING.load(Ordering::SeqCst)
    }

    /// Returns `None` when another run is still in progress.
    pub async fn export(&self) -> Result<Option<ExportSummary>, Error> {
        let _guard = match RunningGuard::acquire() {
            Some(guard) => guard,
            None => {
                warn!("Transactions export is already running, skipping");
                return Ok(None);
            },
        };

        self.run().await.map(Some)
    }

    async fn run(&self) -> Result<ExportSummary, Error> {
        let started = Instant::now();

        info!("Exporting transactions history...");

        self.blockchains.load_assets().await?;

        let builder = Arc::new(TransactionsReportBuilder::new(
            self.repository.clone(),
            self.publishers.clone(),
        ));

        builder.load_snapshot().await?;

        let withdrawals = self.withdrawals.export(builder.clone()).await?;
        let deposits = self.deposits.export(builder.clone()).await?;
        let increment = builder.save_increment().await?;
        let snapshot = builder.save_snapshot().await?;

        info!(
            "Transactions history export done in {:.1} s. {} withdrawals exported, {} new deposits, {} transactions in the increment, {} in the snapshot",
            started.elapsed().as_secs_f64(),
            withdrawals,
            deposits,
            increment,
            snapshot
        );

        Ok(ExportSummary {
            withdrawals,
            deposits,
            increment,
            snapshot,
        })
    }
}

pub fn snapshot_repository(state: &AppState<State>) -> TransactionsSnapshotRepository {
    TransactionsSnapshotRepository::new(
        Box::new(FileSnapshotStore::new(state.config.snapshot_path())),
        TransactionsReportReader::new(state.normalizer.clone()),
    )
}

pub fn deposit_wallets_providers(
    state: &AppState<State>,
) -> Result<Vec<Arc<dyn DepositWalletsProvider>>, Error> {
    let config = &state.config;
    let mut providers: Vec<Arc<dyn DepositWalletsProvider>> = Vec::new();

    for name in &config.deposit_wallets_providers {
        let provider: Arc<dyn DepositWalletsProvider> = match name.as_str() {
            "blockchain-wallets" => {
                Arc::new(BlockchainWalletsProvider::new(state.clone()))
            },
            "bcn-credentials" => {
                Arc::new(BcnCredentialsWalletsProvider::new(state.clone()))
            },
            "wallet-credentials" => {
                Arc::new(WalletCredentialsWalletsProvider::new(state.clone())?)
            },
            "csv-file" => Arc::new(CsvFileWalletsProvider::new(
                PathBuf::from(Config::require(
                    &config.deposit_wallets_csv,
                    "DEPOSIT_WALLETS_CSV",
                )?),
                config.page_size,
            )),
            _ => return Err(Error::UnknownProvider(name.to_owned())),
        };

        providers.push(provider);
    }

    Ok(providers)
}

pub fn deposits_history_providers(
    state: &AppState<State>,
) -> Result<Vec<Arc<dyn DepositsHistoryProvider>>, Error> {
    let config = &state.config;
    let mut providers: Vec<Arc<dyn DepositsHistoryProvider>> = Vec::new();

    for name in &config.deposits_history_providers {
        let provider: Arc<dyn DepositsHistoryProvider> = match name.as_str() {
            "btc-insight" => insight(
                state,
                "btc-insight",
                "BTC",
                &config.btc_insight_api_url,
                "BTC_INSIGHT_API_URL",
            )?,
            "ltc-insight" => insight(
                state,
                "ltc-insight",
                "LTC",
                &config.ltc_insight_api_url,
                "LTC_INSIGHT_API_URL",
            )?,
            "bch-insight" => insight(
                state,
                "bch-insight",
                "BCH",
                &config.bch_insight_api_url,
                "BCH_INSIGHT_API_URL",
            )?,
            "eth-samurai" => Arc::new(SamuraiDepositsHistoryProvider::new(
                state.blockchains.currency("ETH")?,
                SamuraiClient::new(
                    state.http.clone(),
                    Config::require(&config.samurai_url, "SAMURAI_URL")?,
                )?,
                state.normalizer.clone(),
            )),
            "xrp-rpc" => Arc::new(RippleDepositsHistoryProvider::new(
                state.blockchains.currency("XRP")?,
                RippleRpc::new(
                    state.http.clone(),
                    Config::require(&config.xrp_rpc_url, "XRP_RPC_URL")?,
                    config.xrp_rpc_username.clone(),
                    config.xrp_rpc_password.clone(),
                )?,
                Duration::from_secs(config.xrp_cache_expiration_seconds),
            )),
            _ => return Err(Error::UnknownProvider(name.to_owned())),
        };

        providers.push(provider);
    }

    Ok(providers)
}

fn insight(
    state: &AppState<State>,
    name: &'static str,
    crypto_currency: &str,
    url: &Option<String>,
    key: &str,
) -> Result<Arc<dyn DepositsHistoryProvider>, Error> {
    Ok(Arc::new(InsightDepositsHistoryProvider::new(
        name,
        state.blockchains.currency(crypto_currency)?,
        InsightApi::new(state.http.clone(), Config::require(url, key)?)?,
        state.normalizer.clone(),
    )))
}

pub fn withdrawals_history_providers(
    state: &AppState<State>,
) -> Result<Vec<Arc<dyn WithdrawalsHistoryProvider>>, Error> {
    let mut providers: Vec<Arc<dyn WithdrawalsHistoryProvider>> = Vec::new();

    for name in &state.config.withdrawals_history_providers {
        let provider: Arc<dyn WithdrawalsHistoryProvider> = match name.as_str() {
            "cash-operations" => {
                Arc::new(CashOperationsWithdrawalsHistoryProvider::new(state.clone()))
            },
            "bil-cashouts" => {
                Arc::new(BilCashoutsWithdrawalsHistoryProvider::new(state.clone()))
            },
            "cashouts-batch" => {
                Arc::new(CashoutsBatchWithdrawalsHistoryProvider::new(state.clone()))
            },
            _ => return Err(Error::UnknownProvider(name.to_owned())),
        };

        providers.push(provider);
    }

    Ok(providers)
}

pub fn increment_publishers(
    state: &AppState<State>,
) -> Result<Vec<Arc<dyn TransactionsIncrementPublisher>>, Error> {
    let config = &state.config;
    let mut publishers: Vec<Arc<dyn TransactionsIncrementPublisher>> = Vec::new();

    for name in &config.increment_publishers {
        let publisher: Arc<dyn TransactionsIncrementPublisher> = match name.as_str() {
            "file" => Arc::new(FileIncrementPublisher::new(
                config.report_directory.clone(),
            )),
            "email" => Arc::new(EmailIncrementPublisher::new(
                state.http.clone(),
                Config::require(&config.email_sender_url, "EMAIL_SENDER_URL")?,
                Config::require(&config.email_to, "EMAIL_TO")?.to_owned(),
                config.email_bcc.clone(),
            )?),
            "slack" => Arc::new(SlackIncrementPublisher::new(
                state.http.clone(),
                Config::require(&config.slack_auth_token, "SLACK_AUTH_TOKEN")?
                    .to_owned(),
                Config::require(&config.slack_channel, "SLACK_CHANNEL")?.to_owned(),
            )),
            _ => return Err(Error::UnknownProvider(name.to_owned())),
        };

        publishers.push(publisher);
    }

    Ok(publishers)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{io::Write, path::Path};

    use reqwest::Client;

    use super::*;
    use crate::{
        blockchains::tests::registry, normalization::Network, provider::HTTP,
    };

    pub(crate) fn config(report_directory: &Path) -> Config {
        Config {
            blockchains: registry(),
            btc_network: Network::Mainnet,
            ltc_network: Network::Mainnet,
            bch_network: Network::Mainnet,
            deposit_wallets_providers: vec![],
            deposits_history_providers: vec![],
            withdrawals_history_providers: vec![],
            increment_publishers: vec![],
            database_url: None,
            page_size: 100,
            timeout: 10,
            deposits_concurrency: 2,
            retry_backoff_step_ms: 1,
            retry_backoff_cap_seconds: 1,
            wallet_timeout_seconds: 0,
            strict_wallet_failures: false,
            report_directory: report_directory.to_path_buf(),
            snapshot_file: String::from("full-report.csv"),
            deposit_wallets_report_file: None,
            deposit_wallets_csv: None,
            btc_insight_api_url: None,
            ltc_insight_api_url: None,
            bch_insight_api_url: None,
            samurai_url: None,
            xrp_rpc_url: None,
            xrp_rpc_username: None,
            xrp_rpc_password: None,
            xrp_cache_expiration_seconds: 300,
            assets_service_url: None,
            email_sender_url: None,
            email_to: None,
            email_bcc: vec![],
            slack_auth_token: None,
            slack_channel: None,
            export_interval_in_hours: 24,
        }
    }

    pub(crate) async fn state(config: Config) -> AppState<State> {
        let http = HTTP {
            http: Client::new(),
        };

        AppState::new(State::new(config, None, http).await.unwrap())
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| String::from(*value)).collect()
    }

    #[tokio::test]
    async fn providers_are_built_by_name() {
        let directory = tempfile::tempdir().unwrap();
        let mut config = config(directory.path());
        config.deposit_wallets_providers =
            names(&["blockchain-wallets", "bcn-credentials", "wallet-credentials"]);
        config.deposits_history_providers = names(&["btc-insight", "xrp-rpc"]);
        config.withdrawals_history_providers =
            names(&["cash-operations", "bil-cashouts", "cashouts-batch"]);
        config.increment_publishers = names(&["file", "slack"]);
        config.btc_insight_api_url = Some(String::from("http://insight.local/api"));
        config.xrp_rpc_url = Some(String::from("http://rippled.local:5005"));
        config.slack_auth_token = Some(String::from("xoxb-token"));
        config.slack_channel = Some(String::from("reports"));

        let state = state(config).await;

        assert_eq!(deposit_wallets_providers(&state).unwrap().len(), 3);
        assert_eq!(
            deposits_history_providers(&state)
                .unwrap()
                .iter()
                .map(|provider| provider.name())
                .collect::<Vec<&str>>(),
            vec!["btc-insight", "xrp-rpc"]
        );
        assert_eq!(withdrawals_history_providers(&state).unwrap().len(), 3);
        assert_eq!(increment_publishers(&state).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_and_misconfigured_providers() {
        let directory = tempfile::tempdir().unwrap();

        let mut unknown = config(directory.path());
        unknown.deposits_history_providers = names(&["doge-explorer"]);
        assert!(matches!(
            deposits_history_providers(&state(unknown).await),
            Err(Error::UnknownProvider(name)) if name == "doge-explorer"
        ));

        let mut missing_url = config(directory.path());
        missing_url.deposits_history_providers = names(&["eth-samurai"]);
        assert!(matches!(
            deposits_history_providers(&state(missing_url).await),
            Err(Error::ConfigurationError(_))
        ));

        let mut missing_currency = config(directory.path());
        missing_currency.blockchains.retain(|b| b.crypto_currency != "XRP");
        missing_currency.deposits_history_providers = names(&["xrp-rpc"]);
        missing_currency.xrp_rpc_url = Some(String::from("http://rippled.local:5005"));
        assert!(matches!(
            deposits_history_providers(&state(missing_currency).await),
            Err(Error::NotSupportedCurrency(_))
        ));
    }

    #[tokio::test]
    async fn export_writes_increment_and_snapshot() {
        let directory = tempfile::tempdir().unwrap();
        let wallets = directory.path().join("wallets.csv");
        let mut file = std::fs::File::create(&wallets).unwrap();
        writeln!(
            file,
            "8c4b3b1e-3f0c-4a51-9b8e-0d1c2e3f4a5b,XRP,rLKKAHHiVoiFGcmaRkxXoD93J84ZUvDh4e"
        )
        .unwrap();

        let mut config = config(directory.path());
        config.deposit_wallets_providers = names(&["csv-file"]);
        config.deposit_wallets_csv = Some(wallets.to_string_lossy().into_owned());
        config.deposit_wallets_report_file = Some(String::from("deposit-wallets.csv"));
        config.increment_publishers = names(&["file"]);

        let exporter = Exporter::new(state(config).await).unwrap();
        let summary = exporter.export().await.unwrap().unwrap();

        assert_eq!(summary.increment, 0);
        assert_eq!(summary.snapshot, 0);
        assert!(!Exporter::is_running());
        assert!(directory.path().join("full-report.csv").exists());
        assert!(directory.path().join("deposit-wallets.csv").exists());

        let increments = std::fs::read_dir(directory.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with("increment-from-")
            })
            .count();
        assert_eq!(increments, 1);
    }
}
