mod common;

use common::{ISSUER_PREFIX, new_teller};
use std::collections::HashSet;
use std::sync::Arc;
use teller::application::issuing::CardIssuer;
use teller::domain::luhn;
use teller::domain::ports::CardRegistry;
use teller::infrastructure::in_memory::InMemoryCardRegistry;

#[tokio::test]
async fn test_issued_numbers_validate_and_are_registered() {
    let registry = Arc::new(InMemoryCardRegistry::new());
    let issuer = CardIssuer::new(registry.clone(), ISSUER_PREFIX);

    let card = issuer.issue().await.unwrap();
    assert!(luhn::validate(&card.number));
    assert_eq!(card.pin.len(), 4);
    let pin: u32 = card.pin.parse().unwrap();
    assert!((1000..=9999).contains(&pin));
    assert!(registry.card_exists(&card.number).await.unwrap());
}

#[tokio::test]
async fn test_issuing_in_sequence_yields_distinct_account_portions() {
    let registry = Arc::new(InMemoryCardRegistry::new());
    let issuer = CardIssuer::new(registry.clone(), ISSUER_PREFIX);

    let mut account_portions = HashSet::new();
    for _ in 0..40 {
        let card = issuer.issue().await.unwrap();
        assert_eq!(card.number.len(), 16);
        // Issuer prefix and check digit bracket the account portion.
        let account = &card.number[ISSUER_PREFIX.len()..card.number.len() - 1];
        assert!(
            account_portions.insert(account.to_string()),
            "account portion {account} repeated"
        );
    }
}

#[tokio::test]
async fn test_account_creation_through_the_menu() {
    let (mut teller, registry) = new_teller();

    let response = teller.handle_input("1").await.unwrap();
    let lines: Vec<&str> = response.text.lines().collect();
    let number = lines[2];
    let pin = lines[4];

    assert!(luhn::validate(number));
    assert!(number.starts_with(ISSUER_PREFIX));
    assert!((1000..=9999).contains(&pin.parse::<u32>().unwrap()));
    assert!(registry.card_exists(number).await.unwrap());
}

#[tokio::test]
async fn test_mutating_a_digit_breaks_validation() {
    let registry = Arc::new(InMemoryCardRegistry::new());
    let issuer = CardIssuer::new(registry, ISSUER_PREFIX);
    let card = issuer.issue().await.unwrap();

    for (i, c) in card.number.char_indices() {
        let flipped = if c == '9' { '0' } else { (c as u8 + 1) as char };
        let mut mutated: Vec<char> = card.number.chars().collect();
        mutated[i] = flipped;
        let mutated: String = mutated.into_iter().collect();
        assert!(!luhn::validate(&mutated), "mutation at {i} slipped through");
    }
}
