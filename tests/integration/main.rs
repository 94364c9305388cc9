//! End-to-end scenarios against the scripted transport

mod common;
mod library_flow;
mod session_flow;
