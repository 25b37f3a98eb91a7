pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod markup;
pub mod output;
pub mod refresher;
pub mod response;
pub mod transport;
pub mod view;

#[cfg(test)]
mod tests;
