// handlers/elevated/mod.rs - Administrative handlers
//
// Route prefix: /admin/*
// Middleware: authenticate, then require_admin (AdminUser in request extensions)
pub mod admin;
