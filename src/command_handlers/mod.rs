pub mod dispatch;
pub mod versions;
