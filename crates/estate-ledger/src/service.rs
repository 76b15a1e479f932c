//! # Estate Ledger Service
//!
//! Drives the registry, escrow and rental state machines against a
//! [`RecordStore`] and reports each successful transition to an [`EventSink`].
//!
//! ## Atomicity
//!
//! Every operation follows the same sequence:
//!
//! 1. Load the records it touches (copies, not references into the store).
//! 2. Run the pure domain transition, which checks every precondition before
//!    mutating the copies.
//! 3. Commit all modified records as one [`ChangeSet`].
//! 4. Emit exactly one event.
//!
//! A failure in steps 1-3 returns before anything is emitted, and the store
//! never sees a partial change set.

use crate::adapters::{EventLog, InMemoryRecordStore};
use crate::config::{ConfigError, EstateConfig};
use crate::domain::entities::{Property, PropertyDetails, RentalAgreement, Transaction};
use crate::domain::errors::EstateError;
use crate::domain::invariants::{checked_credit, invariant_owner, invariant_sufficient_payment};
use crate::domain::services::{
    accept_rent, calculate_property_tax, complete_sale, delist, derive_record_id, end_agreement,
    id_tags, list_for_sale, record_verification, update_details,
};
use crate::domain::value_objects::{Address, AgreementId, Payment, PropertyId, TransactionId};
use crate::events::EstateEvent;
use crate::ports::inbound::{EscrowApi, RegistryApi, RentalApi};
use crate::ports::outbound::{ChangeSet, EventSink, RecordStore};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Operation counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedgerStats {
    /// Operations that committed and emitted an event.
    pub applied: u64,
    /// Operations that aborted.
    pub aborted: u64,
}

/// The estate ledger.
pub struct EstateLedger<S: RecordStore, E: EventSink> {
    config: EstateConfig,
    store: S,
    events: E,
    next_sequence: u64,
    fees_collected: u64,
    stats: LedgerStats,
}

impl<S: RecordStore, E: EventSink> EstateLedger<S, E> {
    /// Create a ledger over `store`, reporting to `events`.
    ///
    /// # Errors
    ///
    /// Returns error if `config` fails validation.
    pub fn new(store: S, events: E, config: EstateConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            policy = config.verification.name(),
            threshold = config.verification.threshold(),
            rent_period_secs = config.rent_period_secs,
            transaction_fee = config.fees.transaction_fee,
            "Estate ledger initialized"
        );
        Ok(Self {
            config,
            store,
            events,
            next_sequence: 0,
            fees_collected: 0,
            stats: LedgerStats::default(),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &EstateConfig {
        &self.config
    }

    /// Operation counters.
    pub fn stats(&self) -> LedgerStats {
        self.stats
    }

    /// Total transaction fees collected.
    pub fn fees_collected(&self) -> u64 {
        self.fees_collected
    }

    /// Underlying record store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Underlying event sink.
    pub fn events(&self) -> &E {
        &self.events
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn load_property(&self, id: PropertyId) -> Result<Property, EstateError> {
        self.store.property(id)?.ok_or(EstateError::PropertyNotFound(id))
    }

    fn load_transaction(&self, id: TransactionId) -> Result<Transaction, EstateError> {
        self.store
            .transaction(id)?
            .ok_or(EstateError::TransactionNotFound(id))
    }

    fn load_agreement(&self, id: AgreementId) -> Result<RentalAgreement, EstateError> {
        self.store
            .agreement(id)?
            .ok_or(EstateError::AgreementNotFound(id))
    }

    /// Allocate an identity not yet present in the store.
    fn allocate_id(
        &mut self,
        tag: &[u8],
        exists: impl Fn(&S, [u8; 32]) -> Result<bool, EstateError>,
    ) -> Result<[u8; 32], EstateError> {
        loop {
            let id = derive_record_id(tag, self.next_sequence);
            self.next_sequence += 1;
            if !exists(&self.store, id)? {
                return Ok(id);
            }
            debug!(sequence = self.next_sequence - 1, "Identity taken, skipping");
        }
    }

    fn commit_and_emit(&mut self, changes: ChangeSet, event: EstateEvent) -> Result<(), EstateError> {
        self.store.commit(changes)?;
        let sequence = self.events.emit(event);
        debug!(sequence, "Transition committed");
        Ok(())
    }

    fn finish<T>(&mut self, operation: &'static str, result: Result<T, EstateError>) -> Result<T, EstateError> {
        match &result {
            Ok(_) => self.stats.applied += 1,
            Err(e) => {
                self.stats.aborted += 1;
                warn!(operation, kind = ?e.kind(), error = %e, "Operation aborted");
            }
        }
        result
    }

    fn do_create_property(
        &mut self,
        owner: Address,
        details: PropertyDetails,
    ) -> Result<Property, EstateError> {
        let id = PropertyId::new(self.allocate_id(id_tags::PROPERTY, |store, id| {
            Ok(store.property(PropertyId::new(id))?.is_some())
        })?);
        let property = Property::new(id, owner, details);
        let event = EstateEvent::PropertyCreated {
            property_id: id,
            owner,
            price: property.price,
        };
        self.commit_and_emit(ChangeSet::new().with_property(property.clone()), event)?;
        info!(property_id = %id, owner = %owner, "Property created");
        Ok(property)
    }

    fn do_list(&mut self, caller: Address, id: PropertyId, price: u64) -> Result<Property, EstateError> {
        let mut property = self.load_property(id)?;
        list_for_sale(&mut property, caller, price)?;
        let event = EstateEvent::PropertyListed {
            property_id: id,
            owner: property.owner,
            price,
        };
        self.commit_and_emit(ChangeSet::new().with_property(property.clone()), event)?;
        info!(property_id = %id, price, "Property listed");
        Ok(property)
    }

    fn do_delist(&mut self, caller: Address, id: PropertyId) -> Result<Property, EstateError> {
        let mut property = self.load_property(id)?;
        delist(&mut property, caller)?;
        let event = EstateEvent::PropertyDelisted {
            property_id: id,
            owner: property.owner,
        };
        self.commit_and_emit(ChangeSet::new().with_property(property.clone()), event)?;
        info!(property_id = %id, "Property delisted");
        Ok(property)
    }

    fn do_update(
        &mut self,
        caller: Address,
        id: PropertyId,
        details: PropertyDetails,
    ) -> Result<Property, EstateError> {
        let mut property = self.load_property(id)?;
        update_details(&mut property, caller, details)?;
        let event = EstateEvent::PropertyUpdated {
            property_id: id,
            owner: property.owner,
            size: property.size,
            price: property.price,
        };
        self.commit_and_emit(ChangeSet::new().with_property(property.clone()), event)?;
        info!(property_id = %id, "Property details updated");
        Ok(property)
    }

    fn do_create_transaction(
        &mut self,
        caller: Address,
        property_id: PropertyId,
        buyer: Address,
        amount: u64,
        fee: Option<Payment>,
    ) -> Result<Transaction, EstateError> {
        let property = self.load_property(property_id)?;
        invariant_owner(caller, &property)?;

        let fee_paid = if self.config.fees.is_enabled() {
            let payment = fee.unwrap_or_default();
            invariant_sufficient_payment(payment, self.config.fees.transaction_fee)?;
            payment.value
        } else {
            0
        };
        let fees_collected = checked_credit(self.fees_collected, fee_paid)?;

        let id = TransactionId::new(self.allocate_id(id_tags::TRANSACTION, |store, id| {
            Ok(store.transaction(TransactionId::new(id))?.is_some())
        })?);
        let tx = Transaction::new(id, property_id, buyer, caller, amount);
        let event = EstateEvent::TransactionCreated {
            transaction_id: id,
            property_id,
            buyer,
            seller: caller,
            amount,
            fee_paid,
        };
        self.commit_and_emit(ChangeSet::new().with_transaction(tx.clone()), event)?;
        self.fees_collected = fees_collected;
        info!(transaction_id = %id, property_id = %property_id, amount, fee_paid, "Transaction created");
        Ok(tx)
    }

    fn do_verify(
        &mut self,
        verifier: Address,
        id: TransactionId,
        reputation_weight: u64,
    ) -> Result<Transaction, EstateError> {
        let mut tx = self.load_transaction(id)?;
        let outcome = record_verification(
            &mut tx,
            verifier,
            reputation_weight,
            &self.config.verification,
        )?;
        let event = EstateEvent::TransactionVerified {
            transaction_id: id,
            verifier,
            verifier_count: outcome.verifier_count,
            score: outcome.score,
            is_verified: tx.is_verified,
        };
        self.commit_and_emit(ChangeSet::new().with_transaction(tx.clone()), event)?;
        if outcome.newly_verified {
            info!(transaction_id = %id, score = outcome.score, "Transaction verified");
        } else {
            debug!(transaction_id = %id, score = outcome.score, "Verification recorded");
        }
        Ok(tx)
    }

    fn do_complete(
        &mut self,
        caller: Address,
        id: TransactionId,
        payment: Payment,
    ) -> Result<Transaction, EstateError> {
        let mut tx = self.load_transaction(id)?;
        let mut property = self.load_property(tx.property_id)?;
        complete_sale(&mut tx, &mut property, caller, payment)?;
        let event = EstateEvent::TransactionCompleted {
            transaction_id: id,
            property_id: property.id,
            buyer: tx.buyer,
            seller: tx.seller,
            amount_paid: payment.value,
        };
        self.commit_and_emit(
            ChangeSet::new()
                .with_property(property)
                .with_transaction(tx.clone()),
            event,
        )?;
        info!(transaction_id = %id, buyer = %tx.buyer, amount_paid = payment.value, "Transaction completed");
        Ok(tx)
    }

    fn do_create_agreement(
        &mut self,
        caller: Address,
        property_id: PropertyId,
        tenant: Address,
        rent_amount: u64,
        due_date: u64,
    ) -> Result<RentalAgreement, EstateError> {
        let property = self.load_property(property_id)?;
        invariant_owner(caller, &property)?;

        let id = AgreementId::new(self.allocate_id(id_tags::AGREEMENT, |store, id| {
            Ok(store.agreement(AgreementId::new(id))?.is_some())
        })?);
        let agreement =
            RentalAgreement::new(id, property_id, tenant, caller, rent_amount, due_date);
        let event = EstateEvent::RentalAgreementCreated {
            agreement_id: id,
            property_id,
            tenant,
            owner: caller,
            rent_amount,
            due_date,
        };
        self.commit_and_emit(ChangeSet::new().with_agreement(agreement.clone()), event)?;
        info!(agreement_id = %id, tenant = %tenant, rent_amount, "Rental agreement created");
        Ok(agreement)
    }

    fn do_pay_rent(
        &mut self,
        caller: Address,
        id: AgreementId,
        payment: Payment,
    ) -> Result<RentalAgreement, EstateError> {
        let mut agreement = self.load_agreement(id)?;
        let mut property = self.load_property(agreement.property_id)?;
        let receipt = accept_rent(
            &mut agreement,
            &mut property,
            payment,
            self.config.rent_period_secs,
        )?;
        let event = EstateEvent::RentPaid {
            agreement_id: id,
            property_id: property.id,
            payer: caller,
            amount: payment.value,
            new_due_date: receipt.new_due_date,
        };
        self.commit_and_emit(
            ChangeSet::new()
                .with_property(property)
                .with_agreement(agreement.clone()),
            event,
        )?;
        info!(agreement_id = %id, new_due_date = receipt.new_due_date, "Rent paid");
        Ok(agreement)
    }

    fn do_end_agreement(
        &mut self,
        caller: Address,
        id: AgreementId,
    ) -> Result<RentalAgreement, EstateError> {
        let mut agreement = self.load_agreement(id)?;
        end_agreement(&mut agreement, caller)?;
        let event = EstateEvent::RentalAgreementEnded {
            agreement_id: id,
            property_id: agreement.property_id,
            owner: agreement.owner,
        };
        self.commit_and_emit(ChangeSet::new().with_agreement(agreement.clone()), event)?;
        info!(agreement_id = %id, "Rental agreement ended");
        Ok(agreement)
    }
}

// =============================================================================
// INBOUND PORTS
// =============================================================================

impl<S: RecordStore, E: EventSink> RegistryApi for EstateLedger<S, E> {
    #[instrument(skip(self, details), fields(owner = %owner))]
    fn create_property(
        &mut self,
        owner: Address,
        details: PropertyDetails,
    ) -> Result<Property, EstateError> {
        let result = self.do_create_property(owner, details);
        self.finish("create_property", result)
    }

    #[instrument(skip(self), fields(caller = %caller, property_id = %property_id))]
    fn list_property_for_sale(
        &mut self,
        caller: Address,
        property_id: PropertyId,
        price: u64,
    ) -> Result<Property, EstateError> {
        let result = self.do_list(caller, property_id, price);
        self.finish("list_property_for_sale", result)
    }

    #[instrument(skip(self), fields(caller = %caller, property_id = %property_id))]
    fn delist_property_from_sale(
        &mut self,
        caller: Address,
        property_id: PropertyId,
    ) -> Result<Property, EstateError> {
        let result = self.do_delist(caller, property_id);
        self.finish("delist_property_from_sale", result)
    }

    #[instrument(skip(self, details), fields(caller = %caller, property_id = %property_id))]
    fn update_property_details(
        &mut self,
        caller: Address,
        property_id: PropertyId,
        details: PropertyDetails,
    ) -> Result<Property, EstateError> {
        let result = self.do_update(caller, property_id, details);
        self.finish("update_property_details", result)
    }

    fn calculate_property_tax(&self, property: &Property) -> u64 {
        calculate_property_tax(property)
    }

    fn get_property(&self, property_id: PropertyId) -> Result<Property, EstateError> {
        self.load_property(property_id)
    }
}

impl<S: RecordStore, E: EventSink> EscrowApi for EstateLedger<S, E> {
    #[instrument(skip(self, fee), fields(caller = %caller, property_id = %property_id))]
    fn create_transaction(
        &mut self,
        caller: Address,
        property_id: PropertyId,
        buyer: Address,
        amount: u64,
        fee: Option<Payment>,
    ) -> Result<Transaction, EstateError> {
        let result = self.do_create_transaction(caller, property_id, buyer, amount, fee);
        self.finish("create_transaction", result)
    }

    #[instrument(skip(self), fields(verifier = %verifier, transaction_id = %transaction_id))]
    fn verify_transaction(
        &mut self,
        verifier: Address,
        transaction_id: TransactionId,
        reputation_weight: u64,
    ) -> Result<Transaction, EstateError> {
        let result = self.do_verify(verifier, transaction_id, reputation_weight);
        self.finish("verify_transaction", result)
    }

    #[instrument(skip(self), fields(caller = %caller, transaction_id = %transaction_id))]
    fn complete_transaction(
        &mut self,
        caller: Address,
        transaction_id: TransactionId,
        payment: Payment,
    ) -> Result<Transaction, EstateError> {
        let result = self.do_complete(caller, transaction_id, payment);
        self.finish("complete_transaction", result)
    }

    fn get_transaction(&self, transaction_id: TransactionId) -> Result<Transaction, EstateError> {
        self.load_transaction(transaction_id)
    }
}

impl<S: RecordStore, E: EventSink> RentalApi for EstateLedger<S, E> {
    #[instrument(skip(self), fields(caller = %caller, property_id = %property_id))]
    fn create_rental_agreement(
        &mut self,
        caller: Address,
        property_id: PropertyId,
        tenant: Address,
        rent_amount: u64,
        due_date: u64,
    ) -> Result<RentalAgreement, EstateError> {
        let result = self.do_create_agreement(caller, property_id, tenant, rent_amount, due_date);
        self.finish("create_rental_agreement", result)
    }

    #[instrument(skip(self), fields(caller = %caller, agreement_id = %agreement_id))]
    fn pay_rent(
        &mut self,
        caller: Address,
        agreement_id: AgreementId,
        payment: Payment,
    ) -> Result<RentalAgreement, EstateError> {
        let result = self.do_pay_rent(caller, agreement_id, payment);
        self.finish("pay_rent", result)
    }

    #[instrument(skip(self), fields(caller = %caller, agreement_id = %agreement_id))]
    fn end_rental_agreement(
        &mut self,
        caller: Address,
        agreement_id: AgreementId,
    ) -> Result<RentalAgreement, EstateError> {
        let result = self.do_end_agreement(caller, agreement_id);
        self.finish("end_rental_agreement", result)
    }

    fn get_agreement(&self, agreement_id: AgreementId) -> Result<RentalAgreement, EstateError> {
        self.load_agreement(agreement_id)
    }
}

/// In-memory ledger for tests and embedders.
pub type InMemoryLedger = EstateLedger<InMemoryRecordStore, Arc<EventLog>>;

/// Build an in-memory ledger and return a handle to its event log.
///
/// # Errors
///
/// Returns error if `config` fails validation.
pub fn create_in_memory_ledger(
    config: EstateConfig,
) -> Result<(InMemoryLedger, Arc<EventLog>), ConfigError> {
    let log = Arc::new(EventLog::new());
    let ledger = EstateLedger::new(InMemoryRecordStore::new(), Arc::clone(&log), config)?;
    Ok((ledger, log))
}
