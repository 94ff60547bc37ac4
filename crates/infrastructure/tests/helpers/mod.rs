#![allow(dead_code)]
#![allow(unused_imports)]

mod client;
mod dns_server_mock;

pub use client::*;
pub use dns_server_mock::*;
