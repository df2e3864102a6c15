pub mod backends;
pub mod serve;
