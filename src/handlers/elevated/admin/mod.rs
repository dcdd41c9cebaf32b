// handlers/elevated/admin/mod.rs - Administrative user and record management
//
// Every handler here runs after `authenticate` and `require_admin`; the
// acting administrator is available as `Extension<AdminUser>`.

pub mod finance; // /admin/finance/financial-inputs[/:id]
pub mod users; // /admin/users[/:id[/role]]

pub use finance::{financial_inputs_delete, financial_inputs_get, financial_inputs_put};
pub use users::{user_delete, user_put, user_role_put, users_get};
