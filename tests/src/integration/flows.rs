//! # Integration Test Flows
//!
//! Drives the ledger through complete sale and rental lifecycles and checks
//! what an external indexer observes on the event log.
//!
//! ## Flows Tested:
//!
//! 1. **Sale**: create → verify (×3) → complete, observed by an escrow subscriber
//! 2. **Rental**: create → pay → end, observed by a rental subscriber
//! 3. **Aborts**: rejected operations leave records and the log untouched
//! 4. **Configuration**: a TOML file switches the ledger to reputation verification

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;
    use tokio::time::timeout;

    use estate_ledger::prelude::*;
    use estate_ledger::{EventRecord, LedgerStats};
    use estate_telemetry::{init_telemetry, TelemetryConfig};

    use crate::fixtures::{details, open_sale, verifier, BUYER, OWNER, STRANGER, TENANT};

    // =============================================================================
    // SALE FLOW
    // =============================================================================

    #[tokio::test]
    async fn test_sale_flow_observed_on_escrow_topic() {
        let (mut ledger, log) = create_in_memory_ledger(EstateConfig::default()).unwrap();
        let mut escrow = log.subscribe(EventFilter::topics(vec![EventTopic::Escrow]));

        let (property, tx) = open_sale(&mut ledger, 5_000);
        for n in 1..=3 {
            ledger.verify_transaction(verifier(n), tx.id, 0).unwrap();
        }
        ledger
            .complete_transaction(OWNER, tx.id, Payment::new(5_000))
            .unwrap();

        let mut names = Vec::new();
        while names.len() < 5 {
            let record = timeout(Duration::from_millis(100), escrow.recv())
                .await
                .expect("timeout waiting for event")
                .expect("log closed");
            names.push(record.event.name());
        }
        assert_eq!(
            names,
            vec![
                "TransactionCreated",
                "TransactionVerified",
                "TransactionVerified",
                "TransactionVerified",
                "TransactionCompleted",
            ]
        );

        let property = ledger.get_property(property.id).unwrap();
        assert_eq!(property.owner, BUYER);
        assert_eq!(property.balance, 5_000);
        assert!(!property.is_for_sale);
        assert_eq!(
            ledger.get_transaction(tx.id).unwrap().status(),
            TransactionStatus::Completed
        );
    }

    #[test]
    fn test_index_follows_ownership_transfer() {
        let (mut ledger, log) = create_in_memory_ledger(EstateConfig::default()).unwrap();
        let (property, tx) = open_sale(&mut ledger, 900);

        assert_eq!(
            log.query(|index| index.properties_owned_by(&OWNER)),
            vec![property.id]
        );
        assert_eq!(log.query(|index| index.transactions_for(&BUYER)), vec![tx.id]);

        for n in 1..=3 {
            ledger.verify_transaction(verifier(n), tx.id, 0).unwrap();
        }
        ledger
            .complete_transaction(OWNER, tx.id, Payment::new(900))
            .unwrap();

        let index = log.index();
        assert!(index.properties_owned_by(&OWNER).is_empty());
        assert_eq!(index.properties_owned_by(&BUYER), vec![property.id]);
        assert_eq!(index.property_count(), 1);
    }

    #[test]
    fn test_buyer_can_resell() {
        let (mut ledger, _) = create_in_memory_ledger(EstateConfig::default()).unwrap();
        let (property, tx) = open_sale(&mut ledger, 100);
        for n in 1..=3 {
            ledger.verify_transaction(verifier(n), tx.id, 0).unwrap();
        }
        ledger
            .complete_transaction(OWNER, tx.id, Payment::new(100))
            .unwrap();

        // Former owner lost control.
        let err = ledger
            .list_property_for_sale(OWNER, property.id, 200)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOwner);

        ledger
            .list_property_for_sale(BUYER, property.id, 200)
            .unwrap();
        let resale = ledger
            .create_transaction(BUYER, property.id, STRANGER, 200, None)
            .unwrap();
        for n in 10..=12 {
            ledger.verify_transaction(verifier(n), resale.id, 0).unwrap();
        }
        ledger
            .complete_transaction(BUYER, resale.id, Payment::new(250))
            .unwrap();

        let property = ledger.get_property(property.id).unwrap();
        assert_eq!(property.owner, STRANGER);
        assert_eq!(property.balance, 350);
    }

    #[test]
    fn test_sale_opened_by_previous_owner_cannot_complete() {
        let (mut ledger, log) = create_in_memory_ledger(EstateConfig::default()).unwrap();
        let property = ledger.create_property(OWNER, details(100)).unwrap();
        let first = ledger
            .create_transaction(OWNER, property.id, BUYER, 100, None)
            .unwrap();
        let second = ledger
            .create_transaction(OWNER, property.id, STRANGER, 100, None)
            .unwrap();
        for n in 1..=3 {
            ledger.verify_transaction(verifier(n), first.id, 0).unwrap();
            ledger.verify_transaction(verifier(n), second.id, 0).unwrap();
        }
        ledger
            .complete_transaction(OWNER, first.id, Payment::new(100))
            .unwrap();
        ledger
            .list_property_for_sale(BUYER, property.id, 100)
            .unwrap();
        let events = log.len();

        let err = ledger
            .complete_transaction(BUYER, second.id, Payment::new(100))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PropertyNotAvailable);
        assert_eq!(log.len(), events);
        assert!(!ledger.get_transaction(second.id).unwrap().is_completed);

        let property = ledger.get_property(property.id).unwrap();
        assert_eq!(property.owner, BUYER);
        assert_eq!(property.balance, 100);

        let index = log.index();
        assert!(index.properties_owned_by(&OWNER).is_empty());
        assert_eq!(index.properties_owned_by(&BUYER), vec![property.id]);
        assert!(index.properties_owned_by(&STRANGER).is_empty());
    }

    #[test]
    fn test_delisted_property_cannot_complete() {
        let (mut ledger, log) = create_in_memory_ledger(EstateConfig::default()).unwrap();
        let (property, tx) = open_sale(&mut ledger, 100);
        for n in 1..=3 {
            ledger.verify_transaction(verifier(n), tx.id, 0).unwrap();
        }
        ledger.delist_property_from_sale(OWNER, property.id).unwrap();
        let events = log.len();

        let err = ledger
            .complete_transaction(OWNER, tx.id, Payment::new(100))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PropertyNotAvailable);
        assert_eq!(log.len(), events);
        assert!(!ledger.get_transaction(tx.id).unwrap().is_completed);
    }

    // =============================================================================
    // RENTAL FLOW
    // =============================================================================

    #[tokio::test]
    async fn test_rental_flow_observed_on_rental_topic() {
        let (mut ledger, log) = create_in_memory_ledger(EstateConfig::default()).unwrap();
        let mut rental = log.subscribe(EventFilter::topics(vec![EventTopic::Rental]));

        let property = ledger.create_property(OWNER, details(2_000)).unwrap();
        let agreement = ledger
            .create_rental_agreement(OWNER, property.id, TENANT, 75, 1_700_000_000)
            .unwrap();
        ledger
            .pay_rent(TENANT, agreement.id, Payment::new(75))
            .unwrap();
        ledger
            .pay_rent(STRANGER, agreement.id, Payment::new(80))
            .unwrap();
        ledger.end_rental_agreement(OWNER, agreement.id).unwrap();

        let mut records: Vec<EventRecord> = Vec::new();
        while records.len() < 4 {
            let record = timeout(Duration::from_millis(100), rental.recv())
                .await
                .expect("timeout waiting for event")
                .expect("log closed");
            records.push(record);
        }

        match &records[2].event {
            EstateEvent::RentPaid {
                payer,
                amount,
                new_due_date,
                ..
            } => {
                assert_eq!(*payer, STRANGER);
                assert_eq!(*amount, 80);
                assert_eq!(*new_due_date, 1_700_000_000 + 2 * 2_592_000);
            }
            other => panic!("Expected RentPaid, got {:?}", other),
        }
        assert_eq!(records[3].event.name(), "RentalAgreementEnded");

        assert_eq!(ledger.get_property(property.id).unwrap().balance, 155);
        assert_eq!(log.query(|index| index.agreements_for(&TENANT)), vec![agreement.id]);
    }

    #[test]
    fn test_rent_after_end_rejected() {
        let (mut ledger, log) = create_in_memory_ledger(EstateConfig::default()).unwrap();
        let property = ledger.create_property(OWNER, details(2_000)).unwrap();
        let agreement = ledger
            .create_rental_agreement(OWNER, property.id, TENANT, 75, 0)
            .unwrap();
        ledger.end_rental_agreement(OWNER, agreement.id).unwrap();
        let events = log.len();

        let err = ledger
            .pay_rent(TENANT, agreement.id, Payment::new(75))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AgreementNotActive);
        assert_eq!(ledger.get_property(property.id).unwrap().balance, 0);
        assert_eq!(ledger.get_agreement(agreement.id).unwrap().due_date, 0);
        assert_eq!(log.len(), events);
    }

    #[test]
    fn test_tenant_cannot_end_agreement() {
        let (mut ledger, _) = create_in_memory_ledger(EstateConfig::default()).unwrap();
        let property = ledger.create_property(OWNER, details(2_000)).unwrap();
        let agreement = ledger
            .create_rental_agreement(OWNER, property.id, TENANT, 75, 0)
            .unwrap();
        let err = ledger
            .end_rental_agreement(TENANT, agreement.id)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOwner);
        assert!(ledger.get_agreement(agreement.id).unwrap().is_active);
    }

    // =============================================================================
    // ABORTS AND ACCOUNTING
    // =============================================================================

    #[test]
    fn test_one_event_per_successful_operation() {
        let (mut ledger, log) = create_in_memory_ledger(EstateConfig::default()).unwrap();
        let (property, tx) = open_sale(&mut ledger, 100);

        let _ = ledger.verify_transaction(OWNER, tx.id, 0);
        let _ = ledger.verify_transaction(BUYER, tx.id, 0);
        ledger.verify_transaction(verifier(1), tx.id, 0).unwrap();
        let _ = ledger.verify_transaction(verifier(1), tx.id, 0);
        let _ = ledger.complete_transaction(OWNER, tx.id, Payment::new(100));
        let _ = ledger.update_property_details(STRANGER, property.id, details(1));

        let stats = ledger.stats();
        assert_eq!(
            stats,
            LedgerStats {
                applied: 3,
                aborted: 5,
            }
        );
        assert_eq!(log.len() as u64, stats.applied);
    }

    #[test]
    fn test_underpayment_leaves_records_untouched() {
        let (mut ledger, log) = create_in_memory_ledger(EstateConfig::default()).unwrap();
        let (property, tx) = open_sale(&mut ledger, 1_000);
        for n in 1..=3 {
            ledger.verify_transaction(verifier(n), tx.id, 0).unwrap();
        }
        let before = (ledger.get_property(property.id).unwrap(), log.len());

        let err = ledger
            .complete_transaction(OWNER, tx.id, Payment::new(999))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        assert_eq!((ledger.get_property(property.id).unwrap(), log.len()), before);
    }

    #[test]
    fn test_fee_collection_flow() {
        let config = EstateConfig {
            fees: FeePolicy::flat(10),
            ..EstateConfig::default()
        };
        let (mut ledger, log) = create_in_memory_ledger(config).unwrap();
        let property = ledger.create_property(OWNER, details(100)).unwrap();

        ledger
            .create_transaction(OWNER, property.id, BUYER, 100, Some(Payment::new(10)))
            .unwrap();
        ledger
            .create_transaction(OWNER, property.id, STRANGER, 100, Some(Payment::new(12)))
            .unwrap();
        let err = ledger
            .create_transaction(OWNER, property.id, STRANGER, 100, Some(Payment::new(9)))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        assert_eq!(ledger.fees_collected(), 22);
        // Fees never touch the property's escrow.
        assert_eq!(ledger.get_property(property.id).unwrap().balance, 0);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_event_records_serialize_for_indexers() {
        let (mut ledger, log) = create_in_memory_ledger(EstateConfig::default()).unwrap();
        open_sale(&mut ledger, 100);

        for record in log.records() {
            let json = record.to_json().unwrap();
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["event"]["type"], record.event.name());
            assert_eq!(value["sequence"], record.sequence);
        }
    }

    // =============================================================================
    // CONFIGURATION
    // =============================================================================

    #[test]
    fn test_ledger_from_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[verification]\npolicy = \"reputation\"\nthreshold = 50\n\n[rental]\nperiod_secs = 604800"
        )
        .unwrap();

        let config = EstateConfig::load(file.path()).unwrap();
        let (mut ledger, _) = create_in_memory_ledger(config).unwrap();

        let (_, tx) = open_sale(&mut ledger, 100);
        let tx = ledger.verify_transaction(verifier(1), tx.id, 30).unwrap();
        assert!(!tx.is_verified);
        let tx = ledger.verify_transaction(verifier(2), tx.id, 20).unwrap();
        assert!(tx.is_verified);
        assert_eq!(tx.verification_score, 50);

        let property = ledger.create_property(OWNER, details(1)).unwrap();
        let agreement = ledger
            .create_rental_agreement(OWNER, property.id, TENANT, 5, 0)
            .unwrap();
        let agreement = ledger
            .pay_rent(TENANT, agreement.id, Payment::new(5))
            .unwrap();
        assert_eq!(agreement.due_date, 604_800);
    }

    #[test]
    fn test_ledger_runs_with_logging_installed() {
        let _ = init_telemetry(&TelemetryConfig::default().with_log_level("estate_ledger=debug"));
        let (mut ledger, log) = create_in_memory_ledger(EstateConfig::default()).unwrap();
        let _ = ledger.list_property_for_sale(STRANGER, PropertyId::new([1; 32]), 1);
        open_sale(&mut ledger, 10);
        assert_eq!(log.len(), 2);
    }
}
