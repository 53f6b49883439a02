use std::{
    env, fs,
    ops::Deref,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use tracing::info;

use crate::{
    blockchains::BlockchainsProvider,
    error::Error,
    helpers::{parse_list, parse_tuple_string},
    model::Blockchain,
    normalization::{AddressNormalizer, Network},
    provider::{AssetsClient, DatabasePool, HTTP},
    retry::RetryPolicy,
};

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

pub struct State {
    pub config: Config,
    pub database: Option<DatabasePool>,
    pub http: HTTP,
    pub blockchains: Arc<BlockchainsProvider>,
    pub normalizer: Arc<AddressNormalizer>,
}

impl State {
    pub async fn new(
        config: Config,
        database: Option<DatabasePool>,
        http: HTTP,
    ) -> Result<State, Error> {
        let assets = config
            .assets_service_url
            .as_ref()
            .map(|url| AssetsClient::new(http.clone(), url))
            .transpose()?;
        let blockchains = Arc::new(BlockchainsProvider::new(
            config.blockchains.clone(),
            assets,
        ));
        let normalizer = Arc::new(AddressNormalizer::from_config(&config));

        Ok(Self {
            config,
            database,
            http,
            blockchains,
            normalizer,
        })
    }

    pub fn database(&self) -> Result<&DatabasePool, Error> {
        self.database.as_ref().ok_or_else(|| {
            Error::ConfigurationError(String::from(
                "DATABASE_URL is required by the configured providers",
            ))
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub blockchains: Vec<Blockchain>,
    pub btc_network: Network,
    pub ltc_network: Network,
    pub bch_network: Network,
    pub deposit_wallets_providers: Vec<String>,
    pub deposits_history_providers: Vec<String>,
    pub withdrawals_history_providers: Vec<String>,
    pub increment_publishers: Vec<String>,
    pub database_url: Option<String>,
    pub page_size: i64,
    pub timeout: u64,
    pub deposits_concurrency: usize,
    pub retry_backoff_step_ms: u64,
    pub retry_backoff_cap_seconds: u64,
    pub wallet_timeout_seconds: u64,
    pub strict_wallet_failures: bool,
    pub report_directory: PathBuf,
    pub snapshot_file: String,
    pub deposit_wallets_report_file: Option<String>,
    pub deposit_wallets_csv: Option<String>,
    pub btc_insight_api_url: Option<String>,
    pub ltc_insight_api_url: Option<String>,
    pub bch_insight_api_url: Option<String>,
    pub samurai_url: Option<String>,
    pub xrp_rpc_url: Option<String>,
    pub xrp_rpc_username: Option<String>,
    pub xrp_rpc_password: Option<String>,
    pub xrp_cache_expiration_seconds: u64,
    pub assets_service_url: Option<String>,
    pub email_sender_url: Option<String>,
    pub email_to: Option<String>,
    pub email_bcc: Vec<String>,
    pub slack_auth_token: Option<String>,
    pub slack_channel: Option<String>,
    pub export_interval_in_hours: u64,
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        if self.page_size <= 0 {
            return Err(Error::ConfigurationError(String::from(
                "PAGE_SIZE must be positive",
            )));
        }

        if self.deposits_concurrency == 0 {
            return Err(Error::ConfigurationError(String::from(
                "DEPOSITS_CONCURRENCY must be positive",
            )));
        }

        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_millis(self.retry_backoff_step_ms),
            Duration::from_secs(self.retry_backoff_cap_seconds),
        )
    }

    pub fn wallet_timeout(&self) -> Option<Duration> {
        if self.wallet_timeout_seconds == 0 {
            return None;
        }

        Some(Duration::from_secs(self.wallet_timeout_seconds))
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.report_directory.join(&self.snapshot_file)
    }

    pub fn deposit_wallets_report_path(&self) -> Option<PathBuf> {
        self.deposit_wallets_report_file
            .as_ref()
            .map(|file| self.report_directory.join(file))
    }

    /// Value of an optional setting that a configured component needs.
    pub fn require<'a>(
        value: &'a Option<String>,
        key: &str,
    ) -> Result<&'a str, Error> {
        value.as_deref().ok_or_else(|| {
            Error::ConfigurationError(format!("{} is not set", key))
        })
    }
}

pub fn get_configuration() -> Result<Config, Error> {
    let blockchains = get_blockchains()?;
    let btc_network = env_or("BTC_NETWORK", "mainnet").parse()?;
    let ltc_network = env_or("LTC_NETWORK", "mainnet").parse()?;
    let bch_network = env_or("BCH_NETWORK", "mainnet").parse()?;

    let deposit_wallets_providers =
        parse_list(&env::var("DEPOSIT_WALLETS_PROVIDERS")?);
    let deposits_history_providers =
        parse_list(&env::var("DEPOSITS_HISTORY_PROVIDERS")?);
    let withdrawals_history_providers =
        parse_list(&env::var("WITHDRAWALS_HISTORY_PROVIDERS")?);
    let increment_publishers = parse_list(&env::var("INCREMENT_PUBLISHERS")?);

    let database_url = optional_env("DATABASE_URL");
    let page_size = env_or("PAGE_SIZE", "1000").parse()?;
    let timeout = env::var("TIMEOUT")?.parse()?;
    let deposits_concurrency = env_or("DEPOSITS_CONCURRENCY", "8").parse()?;
    let retry_backoff_step_ms =
        env_or("RETRY_BACKOFF_STEP_MS", "1000").parse()?;
    let retry_backoff_cap_seconds =
        env_or("RETRY_BACKOFF_CAP_SECONDS", "5").parse()?;
    let wallet_timeout_seconds =
        env_or("WALLET_TIMEOUT_SECONDS", "0").parse()?;
    let strict_wallet_failures =
        env_or("STRICT_WALLET_FAILURES", "false").parse()?;

    let report_directory =
        manifest_relative(&env::var("REPORT_DIRECTORY")?);
    let snapshot_file = env_or("SNAPSHOT_FILE", "full-report.csv");
    let deposit_wallets_report_file =
        optional_env("DEPOSIT_WALLETS_REPORT_FILE");
    let deposit_wallets_csv = optional_env("DEPOSIT_WALLETS_CSV")
        .map(|path| manifest_relative(&path).to_string_lossy().into_owned());

    let xrp_cache_expiration_seconds =
        env_or("XRP_CACHE_EXPIRATION_SECONDS", "300").parse()?;
    let email_bcc = parse_list(&env_or("EMAIL_BCC", ""));
    let export_interval_in_hours =
        env_or("EXPORT_INTERVAL_IN_HOURS", "24").parse()?;

    let config = Config {
        blockchains,
        btc_network,
        ltc_network,
        bch_network,
        deposit_wallets_providers,
        deposits_history_providers,
        withdrawals_history_providers,
        increment_publishers,
        database_url,
        page_size,
        timeout,
        deposits_concurrency,
        retry_backoff_step_ms,
        retry_backoff_cap_seconds,
        wallet_timeout_seconds,
        strict_wallet_failures,
        report_directory,
        snapshot_file,
        deposit_wallets_report_file,
        deposit_wallets_csv,
        btc_insight_api_url: optional_env("BTC_INSIGHT_API_URL"),
        ltc_insight_api_url: optional_env("LTC_INSIGHT_API_URL"),
        bch_insight_api_url: optional_env("BCH_INSIGHT_API_URL"),
        samurai_url: optional_env("SAMURAI_URL"),
        xrp_rpc_url: optional_env("XRP_RPC_URL"),
        xrp_rpc_username: optional_env("XRP_RPC_USERNAME"),
        xrp_rpc_password: optional_env("XRP_RPC_PASSWORD"),
        xrp_cache_expiration_seconds,
        assets_service_url: optional_env("ASSETS_SERVICE_URL"),
        email_sender_url: optional_env("EMAIL_SENDER_URL"),
        email_to: optional_env("EMAIL_TO"),
        email_bcc,
        slack_auth_token: optional_env("SLACK_AUTH_TOKEN"),
        slack_channel: optional_env("SLACK_CHANNEL"),
        export_interval_in_hours,
    };
    config.validate()?;

    Ok(config)
}

pub fn set_configuration() -> Result<(), Error> {
    let config_file: &str = ".env";
    let exporter_config_file: &str = "exporter.conf";

    let directory = env!("CARGO_MANIFEST_DIR");
    let path = format!("{}/{}", directory, config_file);
    let exporter_config_path = format!("{}/{}", directory, exporter_config_file);

    let exporter_config_string = fs::read_to_string(exporter_config_path)?;
    parse_config_string(exporter_config_string);

    if Path::new(&path).exists() {
        let config_string = fs::read_to_string(path)?;
        parse_config_string(config_string);
        info!("Local .env overrides applied");
    }

    Ok(())
}

fn parse_config_string(config: String) {
    let params: Vec<(&str, &str)> = config
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, _)| !key.is_empty())
        .collect();

    for (key, value) in params {
        env::set_var(key, value);
    }
}

fn get_blockchains() -> Result<Vec<Blockchain>, Error> {
    let blockchains = parse_tuple_string(&env::var("BLOCKCHAINS")?)
        .iter()
        .map(|item| item.parse())
        .collect::<Result<Vec<Blockchain>, Error>>()?;

    if blockchains.is_empty() {
        return Err(Error::ConfigurationError(String::from(
            "BLOCKCHAINS is empty",
        )));
    }

    Ok(blockchains)
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_owned())
}

fn manifest_relative(path: &str) -> PathBuf {
    let path = Path::new(path);

    if path.is_absolute() {
        return path.to_path_buf();
    }

    Path::new(env!("CARGO_MANIFEST_DIR")).join(path)
}
