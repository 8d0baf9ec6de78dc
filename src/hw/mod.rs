//! Board support: pin allocation and embassy-rp implementations of the
//! hardware seams
pub mod echo;
pub mod resources;
pub mod servo;
