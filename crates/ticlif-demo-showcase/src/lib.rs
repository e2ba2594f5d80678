#![forbid(unsafe_code)]

//! ticlif demo showcase: two roots exercising layout, dispatch, dynamic
//! content, and root switching.

pub mod app;
pub mod cli;
