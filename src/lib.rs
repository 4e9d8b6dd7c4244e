pub mod attribution;
pub mod cli;
pub mod collect;
pub mod error;
pub mod gitlab;
pub mod model;
pub mod normalize;
pub mod output;
pub mod reconcile;
pub mod report;
pub mod store;
pub mod sync;
pub mod util;
