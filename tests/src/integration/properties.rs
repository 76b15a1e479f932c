//! # Randomized Ledger Properties
//!
//! Seeded random operation sequences checked against a simple model:
//!
//! - A sale is verified exactly when its distinct verifier count exceeds the
//!   count threshold, and stays verified.
//! - A property's escrow balance is the sum of accepted rent payments.
//! - Each accepted rent payment moves the due date exactly one period.
//! - Aborted operations change nothing and emit nothing.

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    use estate_ledger::prelude::*;
    use estate_ledger::RENT_PERIOD_SECS;

    use crate::fixtures::{details, open_sale, verifier, BUYER, OWNER, STRANGER, TENANT};

    const SEEDS: [u64; 4] = [1, 7, 42, 2024];

    #[test]
    fn test_random_verifier_sequences() {
        for seed in SEEDS {
            let mut rng = StdRng::seed_from_u64(seed);
            let (mut ledger, log) = create_in_memory_ledger(EstateConfig::default()).unwrap();
            let (_, tx) = open_sale(&mut ledger, 1_000);

            let mut seen: HashSet<Address> = HashSet::new();
            let mut was_verified = false;

            for _ in 0..40 {
                let candidate = match rng.gen_range(0..10) {
                    0 => OWNER,
                    1 => BUYER,
                    _ => verifier(rng.gen_range(0..6)),
                };
                let events_before = log.len();
                let result = ledger.verify_transaction(candidate, tx.id, 0);

                if candidate == OWNER || candidate == BUYER {
                    assert_eq!(result.unwrap_err().kind(), ErrorKind::UnauthorizedVerifier);
                    assert_eq!(log.len(), events_before);
                } else if !seen.insert(candidate) {
                    assert_eq!(
                        result.unwrap_err().kind(),
                        ErrorKind::DuplicateVerification
                    );
                    assert_eq!(log.len(), events_before);
                } else {
                    let tx = result.unwrap();
                    assert_eq!(tx.verifiers.len(), seen.len());
                    assert_eq!(tx.is_verified, seen.len() > 2, "seed {seed}");
                    assert_eq!(log.len(), events_before + 1);
                }

                let current = ledger.get_transaction(tx.id).unwrap();
                assert!(!was_verified || current.is_verified, "verification latched");
                was_verified = current.is_verified;
            }
        }
    }

    #[test]
    fn test_random_reputation_weights() {
        for seed in SEEDS {
            let mut rng = StdRng::seed_from_u64(seed);
            let threshold = rng.gen_range(50..500);
            let config = EstateConfig {
                verification: VerificationPolicy::ReputationThreshold(threshold),
                ..EstateConfig::default()
            };
            let (mut ledger, _) = create_in_memory_ledger(config).unwrap();
            let (_, tx) = open_sale(&mut ledger, 10);

            let mut score = 0u64;
            for n in 0..20u16 {
                let weight = rng.gen_range(0..100);
                let tx = ledger.verify_transaction(verifier(n), tx.id, weight).unwrap();
                score += weight;
                assert_eq!(tx.verification_score, score);
                assert_eq!(tx.is_verified, score >= threshold, "seed {seed}");
            }
        }
    }

    #[test]
    fn test_random_rent_payments() {
        for seed in SEEDS {
            let mut rng = StdRng::seed_from_u64(seed);
            let (mut ledger, log) = create_in_memory_ledger(EstateConfig::default()).unwrap();
            let property = ledger.create_property(OWNER, details(10_000)).unwrap();
            let rent = rng.gen_range(10..200);
            let start = rng.gen_range(0..1_000_000);
            let agreement = ledger
                .create_rental_agreement(OWNER, property.id, TENANT, rent, start)
                .unwrap();

            let mut expected_balance = 0u64;
            let mut accepted = 0u64;

            for _ in 0..30 {
                let amount = rng.gen_range(0..rent * 2);
                let payer = if rng.gen_bool(0.8) { TENANT } else { STRANGER };
                let events_before = log.len();

                match ledger.pay_rent(payer, agreement.id, Payment::new(amount)) {
                    Ok(_) => {
                        assert!(amount >= rent);
                        expected_balance += amount;
                        accepted += 1;
                        assert_eq!(log.len(), events_before + 1);
                    }
                    Err(e) => {
                        assert!(amount < rent);
                        assert_eq!(e.kind(), ErrorKind::InsufficientFunds);
                        assert_eq!(log.len(), events_before);
                    }
                }
            }

            assert_eq!(
                ledger.get_property(property.id).unwrap().balance,
                expected_balance
            );
            assert_eq!(
                ledger.get_agreement(agreement.id).unwrap().due_date,
                start + accepted * RENT_PERIOD_SECS
            );
        }
    }

    #[test]
    fn test_random_listing_toggles() {
        for seed in SEEDS {
            let mut rng = StdRng::seed_from_u64(seed);
            let (mut ledger, _) = create_in_memory_ledger(EstateConfig::default()).unwrap();
            let property = ledger.create_property(OWNER, details(1)).unwrap();
            let mut for_sale = true;
            let mut price = 1;

            for _ in 0..50 {
                let caller = if rng.gen_bool(0.9) { OWNER } else { STRANGER };
                let result = if rng.gen_bool(0.5) {
                    let new_price = rng.gen_range(1..10_000);
                    ledger
                        .list_property_for_sale(caller, property.id, new_price)
                        .map(|_| {
                            for_sale = true;
                            price = new_price;
                        })
                } else {
                    ledger
                        .delist_property_from_sale(caller, property.id)
                        .map(|_| for_sale = false)
                };

                if caller == STRANGER {
                    assert_eq!(result.unwrap_err().kind(), ErrorKind::NotOwner);
                } else {
                    assert!(result.is_ok());
                }
                let current = ledger.get_property(property.id).unwrap();
                assert_eq!(current.is_for_sale, for_sale);
                assert_eq!(current.price, price);
                assert_eq!(current.owner, OWNER);
            }
        }
    }
}
