mod flate;

pub use flate::FlateEngine;

use blockflate_core::DeflateEngine;

/// The engine used when the caller has no reason to pick one explicitly.
pub fn default_engine() -> Box<dyn DeflateEngine> {
    Box::new(FlateEngine)
}
