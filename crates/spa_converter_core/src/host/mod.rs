//! Host adapter glue: parameters in, container views out.

pub mod converter;
pub mod view;
