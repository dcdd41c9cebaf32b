// handlers/public/auth/mod.rs - Public authentication handlers
//
// Account creation and token acquisition. Neither requires a bearer token.

pub mod login; // POST /auth/login - verify credentials and issue a JWT
pub mod register; // POST /auth/register - create a `user` account

pub use login::login_post;
pub use register::register_post;
