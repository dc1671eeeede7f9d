//! Request and response bodies

pub mod fragments;
