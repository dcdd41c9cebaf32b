// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and account creation. Everything here must validate its
// own input; there is no trusted user context.
pub mod auth;
