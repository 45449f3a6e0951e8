//! Translation of ITC2021 sports timetabling instances into Zimpl integer programs.
//!
//! ```no_run
//! let xml = std::fs::read_to_string("ITC2021_Test1.xml").unwrap();
//! let instance = itc2zimpl::Instance::parse(&xml).unwrap();
//! let model = itc2zimpl::compile(&instance, &itc2zimpl::Options::default()).unwrap();
//! print!("{}", model);
//! ```

mod base;
mod compiler;
pub mod constraints;
pub mod error;
mod families;
pub mod input;
pub mod instance;
pub mod model;
mod objective;
pub mod options;
mod render;
#[cfg(test)]
mod test_utils;

pub use compiler::compile;
pub use error::{Error, Result};
pub use instance::Instance;
pub use model::Model;
pub use options::{Cutoff, Ga1MinPenalty, OddSets, Options};
