pub mod settings;

pub use settings::{AppConfig, StoreKind};
