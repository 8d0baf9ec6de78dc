//! Core robot components, independent of the board
pub mod api;
pub mod assets;
pub mod distance;
pub mod drive;
pub mod hardware;
pub mod http;
pub mod pan;
pub mod radar;
pub mod report;
pub mod router;
pub mod synthetic;

#[cfg(test)]
mod fakes;
