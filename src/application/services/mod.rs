pub mod report;

pub use report::{ChannelRequest, ReportError, build_report, channel_report};
