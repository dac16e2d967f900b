//! lob-quoters: the market-making layer built on top of `lob-core`'s
//! order book, router, and fair-value pipeline.
//!
//! Three pieces fit together:
//! - [`quoter`]: the `Quoter` variants (§4.5) that own live-order
//!   reconciliation for one side of one instrument.
//! - [`market_maker`]: `QuotingEngine` (the §4.4 requote computation, plus
//!   fill/cooldown bookkeeping) and `MarketMaker`, which wires an engine to
//!   its two quoters.
//! - [`instance_manager`]: `QuotingInstanceManager` (§4.7), which deploys,
//!   retunes, and retires one `MarketMaker` per instrument as configuration
//!   and exchange connectivity change.
//!
//! [`factory`] supplies a reference `MarketMakerFactory` that dispatches on
//! `QuotingParameters`'s quoter-type fields, for callers that don't need a
//! custom one.

pub mod factory;
pub mod instance_manager;
pub mod market_maker;
pub mod quote;
pub mod quoter;

pub use factory::StandardMarketMakerFactory;
pub use instance_manager::{MarketMakerFactory, QuotingInstance, QuotingInstanceManager};
pub use market_maker::{EngineFillObserver, MarketMaker, QuotePair, QuotingEngine};
pub use quote::Quote;
pub use quoter::{
    GroupedSingleQuoter, LayeredQuoter, LogQuoter, Quoter as QuoterTrait, QuoterContext, ShadowMakerQuoter, ShadowQuoter,
    SingleQuoter,
};
