pub mod auth;
pub mod cookie;
pub mod form;
pub mod page;
pub mod web;
