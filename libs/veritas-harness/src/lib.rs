//! Veritas harness: runs a candidate solution against literal test cases in
//! an isolated child process and reports per-case verdicts.
//!
//! ```no_run
//! # async fn demo() {
//! use veritas_common::types::TestCase;
//!
//! let code = "def twoSum(nums, target):\n    ...";
//! let cases = [TestCase::new("nums = [2,7,11,15], target = 9", "[0,1]")];
//! let report = veritas_harness::verify(code, &cases).await;
//! println!("{}", report.passed);
//! # }
//! ```

pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod engine;
pub mod evaluator;
pub mod executor;
pub mod script;


pub use config::{Backend, HarnessSettings, RuntimeConfigManager};
pub use executor::{verify, Harness};
