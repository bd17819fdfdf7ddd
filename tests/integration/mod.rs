//! Integration tests for the HTTP API

mod chat_tests;
mod fpo_tests;
mod health_tests;
mod message_tests;
mod routing_tests;
