pub mod completion_notifier;
pub mod quota_tracker;
