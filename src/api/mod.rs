//! HTTP surfaces: the normalizing gateway and the simple KHQR checker

pub mod bakong;
pub mod khqr;
