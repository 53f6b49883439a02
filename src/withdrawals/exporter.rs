use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use tokio::task::JoinSet;
use tracing::info;

use crate::{
    error::Error,
    normalization::AddressNormalizer,
    reporting::TransactionsReportBuilder,
    retry::RetryPolicy,
    withdrawals::WithdrawalsHistoryProvider,
};

/// Pages every withdrawals provider to the end, one task per provider.
pub struct WithdrawalsExporter {
    normalizer: Arc<AddressNormalizer>,
    providers: Vec<Arc<dyn WithdrawalsHistoryProvider>>,
    retry: RetryPolicy,
}

impl WithdrawalsExporter {
    pub fn new(
        normalizer: Arc<AddressNormalizer>,
        providers: Vec<Arc<dyn WithdrawalsHistoryProvider>>,
        retry: RetryPolicy,
    ) -> WithdrawalsExporter {
        WithdrawalsExporter {
            normalizer,
            providers,
            retry,
        }
    }

    /// Returns the number of exported withdrawals, repeated ones included.
    pub async fn export(
        &self,
        builder: Arc<TransactionsReportBuilder>,
    ) -> Result<usize, Error> {
        let names: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        info!("Exporting withdrawals from [{}]...", names.join(", "));

        let exported = Arc::new(AtomicUsize::new(0));
        let mut tasks = JoinSet::new();

        for provider in &self.providers {
            let provider = provider.clone();
            let normalizer = self.normalizer.clone();
            let builder = builder.clone();
            let exported = exported.clone();
            let retry = self.retry;

            tasks.spawn(async move {
                export_provider(provider.as_ref(), &normalizer, &builder, retry, &exported)
                    .await
                    .map_err(|e| Error::ProviderProcessing {
                        provider: String::from(provider.name()),
                        source: Box::new(e),
                    })
            });
        }

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result? {
                tasks.abort_all();
                return Err(e);
            }
        }

        let exported = exported.load(Ordering::SeqCst);
        info!("Withdrawals exporting done. {} withdrawals exported", exported);

        Ok(exported)
    }
}

async fn export_provider(
    provider: &dyn WithdrawalsHistoryProvider,
    normalizer: &AddressNormalizer,
    builder: &TransactionsReportBuilder,
    retry: RetryPolicy,
    exported: &AtomicUsize,
) -> Result<(), Error> {
    let context = format!("Withdrawals history of {}", provider.name());
    let mut continuation: Option<String> = None;

    loop {
        let token = continuation.as_deref();
        let page = retry
            .run(&context, move || provider.get_history(token))
            .await?;

        for tx in page.items {
            let tx = match normalizer.normalize_transaction(&tx) {
                Some(tx) => tx,
                None => continue,
            };

            builder.add_transaction(tx).await?;

            let count = exported.fetch_add(1, Ordering::SeqCst) + 1;

            if count % 1000 == 0 {
                info!("{} withdrawals exported so far", count);
            }
        }

        match page.continuation {
            Some(next) => continuation = Some(next),
            None => break,
        }
    }

    Ok(())
}
