pub mod config;
pub mod run;

pub use run::RunArgs;
