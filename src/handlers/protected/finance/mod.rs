// handlers/protected/finance/mod.rs - Owner-facing financial submission

pub mod submit; // POST /finance/submit

pub use submit::submit_post;
