pub mod candidate;
pub mod resume;
pub mod screening;
