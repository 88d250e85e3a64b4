//! Serde helper for durations written as integer milliseconds.
//!
//! ```
//! use std::time::Duration;
//!
//! #[derive(serde::Deserialize)]
//! struct Timing {
//!     #[serde(with = "tabula_lib::millis")]
//!     delay: Duration,
//! }
//!
//! let t: Timing = serde_json::from_str(r#"{"delay": 250}"#).unwrap();
//! assert_eq!(t.delay, Duration::from_millis(250));
//! ```

use std::time::Duration;

use serde::Deserialize;
use serde::Deserializer;

pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    u64::deserialize(d).map(Duration::from_millis)
}
