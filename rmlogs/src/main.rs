//! Main binary entry point for the `rmlogs` log sweeper.
//!
//! This binary simply delegates to the shared `entry_point::run_with_args()` function
//! so the binary and the integration tests behave the same way.

use anyhow::Result;

fn main() -> Result<()> {
    let code = rmlogs::entry_point::run_with_args(std::env::args().skip(1).collect())?;
    std::process::exit(code);
}
