pub mod billing;
pub mod cow;
pub mod member;
pub mod ranch;
