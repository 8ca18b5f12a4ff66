//! Aptos chain access: fullnode REST, faucet and the healthcare contract.

pub mod client;
pub mod faucet;
pub mod healthcare;

pub use client::{
    format_apt, AptosClient, EntryArg, EntryFunctionCall, EntryFunctionOutcome, TransactionOptions,
    OCTAS_PER_APT,
};
pub use faucet::FaucetClient;
pub use healthcare::{age_from_i64, Appointment, HealthcareContract, MedicalRecord, PatientDetails};
