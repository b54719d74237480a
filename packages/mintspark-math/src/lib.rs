//! Common mathematical formulas and models implemented for [`mintspark`](https://crates.io/crates/mintspark).

pub mod angle;
pub mod pid;
pub mod wheel;
