//! Deployment configuration loaded from `zerovault.toml`.

mod settings;

pub use settings::Settings;
