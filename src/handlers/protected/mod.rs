// handlers/protected/mod.rs - Handlers behind the authentication gate
//
// Route prefix: /finance/*
// Middleware: authenticate (AuthUser in request extensions)
pub mod finance;
