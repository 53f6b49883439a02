//! Transactions report: CSV format, snapshot storage, increment publishing
//! and the per-run builder tying them together.

pub use self::{
    builder::TransactionsReportBuilder,
    publishers::{
        EmailIncrementPublisher, FileIncrementPublisher, SlackIncrementPublisher,
        TransactionsIncrementPublisher,
    },
    report::{TransactionsReportReader, TransactionsReportWriter, REPORT_HEADER},
    snapshot::{FileSnapshotStore, SnapshotStore, TransactionsSnapshotRepository},
    wallets_report::DepositWalletsReport,
};

mod builder;
mod publishers;
mod report;
pub(crate) mod snapshot;
mod wallets_report;
