#![allow(dead_code)]

use std::sync::Arc;
use teller::application::session::{Response, Teller};
use teller::domain::ports::CardRegistryRef;
use teller::infrastructure::in_memory::InMemoryCardRegistry;

pub const ISSUER_PREFIX: &str = "400000";

pub fn new_teller() -> (Teller, CardRegistryRef) {
    let registry: CardRegistryRef = Arc::new(InMemoryCardRegistry::new());
    (Teller::new(registry.clone(), ISSUER_PREFIX), registry)
}

/// Feeds every input in order and returns the responses.
pub async fn drive(teller: &mut Teller, inputs: &[&str]) -> Vec<Response> {
    let mut responses = Vec::with_capacity(inputs.len());
    for input in inputs {
        responses.push(teller.handle_input(input).await.unwrap());
    }
    responses
}

/// Creates an account through the menu and parses the reported
/// `(number, pin)` out of the response text.
pub async fn create_account(teller: &mut Teller) -> (String, String) {
    let response = teller.handle_input("1").await.unwrap();
    let lines: Vec<&str> = response.text.lines().collect();
    assert_eq!(lines[0], "Your card has been created");
    assert_eq!(lines[1], "Your card number:");
    assert_eq!(lines[3], "Your card PIN:");
    (lines[2].to_string(), lines[4].to_string())
}

/// Runs the login sub-flow from the main menu.
pub async fn login(teller: &mut Teller, number: &str, pin: &str) -> Response {
    teller.handle_input("2").await.unwrap();
    teller.handle_input(number).await.unwrap();
    teller.handle_input(pin).await.unwrap()
}
