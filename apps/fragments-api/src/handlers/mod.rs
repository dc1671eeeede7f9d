//! Request handlers

pub mod fragments;
