pub mod args;
pub mod browse;
