//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements | Connects to        |
//! |------------|------------|--------------------|
//! | `log_sink` | ReportSink | `log` facade       |
//! | `halt`     | FaultSink  | `log` facade       |

pub mod halt;
pub mod log_sink;
