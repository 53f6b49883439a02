pub use self::{
    assets::AssetsClient,
    database::DatabasePool,
    http::{endpoint, HTTP},
    insight::InsightApi,
    ripple::RippleRpc,
    samurai::SamuraiClient,
};

mod assets;
mod database;
mod http;
mod insight;
mod ripple;
mod samurai;
