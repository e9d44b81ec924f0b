pub mod sla_monitor;

pub use sla_monitor::{start_sla_monitor, SlaMonitorConfig};
