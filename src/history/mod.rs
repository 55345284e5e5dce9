pub mod reconciler;

pub use reconciler::{reconcile, HistoryPoint, Window};
