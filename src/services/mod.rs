pub mod dashboard;
pub mod hierarchy;
pub mod latest;
pub mod rate_limit;
pub mod widget_data;
pub mod widgets;
