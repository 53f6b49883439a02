pub use self::{
    insight::InsightDepositsHistoryProvider,
    ripple::RippleDepositsHistoryProvider,
    samurai::SamuraiDepositsHistoryProvider,
};

mod insight;
mod ripple;
mod samurai;
