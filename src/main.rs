//! solarlog main entrypoint.

use solarlog::run;
use solarlog::ui::console;

fn main() {
    if let Err(e) = run() {
        console::error(format!("Error: {e}"));
        std::process::exit(1);
    }
}
