pub mod settings;
pub mod translations;

pub use settings::AppConfig;
