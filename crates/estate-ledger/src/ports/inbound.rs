//! # Inbound Ports (Driving Ports)
//!
//! Operations exposed to an already-authenticated caller. The `caller`
//! argument is the principal the host authenticated; the ledger never derives
//! it.

use crate::domain::entities::{Property, PropertyDetails, RentalAgreement, Transaction};
use crate::domain::errors::EstateError;
use crate::domain::value_objects::{Address, AgreementId, Payment, PropertyId, TransactionId};

/// Property registry.
pub trait RegistryApi {
    /// Register a listed property owned by `owner` with a zero balance.
    fn create_property(
        &mut self,
        owner: Address,
        details: PropertyDetails,
    ) -> Result<Property, EstateError>;

    /// List a property at `price`. Owner only.
    fn list_property_for_sale(
        &mut self,
        caller: Address,
        property_id: PropertyId,
        price: u64,
    ) -> Result<Property, EstateError>;

    /// Withdraw a property from sale. Owner only.
    fn delist_property_from_sale(
        &mut self,
        caller: Address,
        property_id: PropertyId,
    ) -> Result<Property, EstateError>;

    /// Replace the descriptive fields of a property. Owner only.
    fn update_property_details(
        &mut self,
        caller: Address,
        property_id: PropertyId,
        details: PropertyDetails,
    ) -> Result<Property, EstateError>;

    /// Flat-rate tax on a property snapshot. Never fails.
    fn calculate_property_tax(&self, property: &Property) -> u64;

    /// Load a property.
    fn get_property(&self, property_id: PropertyId) -> Result<Property, EstateError>;
}

/// Sale escrow.
pub trait EscrowApi {
    /// Open a sale of `property_id` to `buyer`. The caller becomes the seller.
    ///
    /// `fee` funds the configured transaction fee, if any.
    fn create_transaction(
        &mut self,
        caller: Address,
        property_id: PropertyId,
        buyer: Address,
        amount: u64,
        fee: Option<Payment>,
    ) -> Result<Transaction, EstateError>;

    /// Attest a sale as `verifier`. `reputation_weight` is ignored under the
    /// count policy.
    fn verify_transaction(
        &mut self,
        verifier: Address,
        transaction_id: TransactionId,
        reputation_weight: u64,
    ) -> Result<Transaction, EstateError>;

    /// Hand the property to the buyer against `payment`. Property owner only.
    fn complete_transaction(
        &mut self,
        caller: Address,
        transaction_id: TransactionId,
        payment: Payment,
    ) -> Result<Transaction, EstateError>;

    /// Load a transaction.
    fn get_transaction(&self, transaction_id: TransactionId) -> Result<Transaction, EstateError>;
}

/// Rental ledger.
pub trait RentalApi {
    /// Open an agreement on `property_id`. The caller becomes the landlord.
    fn create_rental_agreement(
        &mut self,
        caller: Address,
        property_id: PropertyId,
        tenant: Address,
        rent_amount: u64,
        due_date: u64,
    ) -> Result<RentalAgreement, EstateError>;

    /// Pay one period of rent.
    fn pay_rent(
        &mut self,
        caller: Address,
        agreement_id: AgreementId,
        payment: Payment,
    ) -> Result<RentalAgreement, EstateError>;

    /// End an agreement. Landlord only; a second call aborts.
    fn end_rental_agreement(
        &mut self,
        caller: Address,
        agreement_id: AgreementId,
    ) -> Result<RentalAgreement, EstateError>;

    /// Load an agreement.
    fn get_agreement(&self, agreement_id: AgreementId) -> Result<RentalAgreement, EstateError>;
}
