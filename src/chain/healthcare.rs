//! Binding for the healthcare Move module.

use crate::chain::{AptosClient, EntryArg, EntryFunctionCall, EntryFunctionOutcome};
use crate::identity::AptosAccount;
use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;

/// Patient fields shared by `add_patient` and `update_patient`.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientDetails {
    pub patient_id: String,
    pub name: String,
    pub age: u8,
    pub contact: String,
    pub email: String,
    pub address: String,
    pub medical_history: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MedicalRecord {
    pub record_id: String,
    pub patient_id: String,
    pub record_type: String,
    pub diagnosis: String,
    pub treatment: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub appointment_id: String,
    pub patient_id: String,
    pub date: String,
    pub time: String,
    pub purpose: String,
    pub status: String,
}

/// Convert a model-supplied age into the contract's `u8`.
pub fn age_from_i64(age: i64) -> Result<u8> {
    u8::try_from(age).with_context(|| format!("Age must be between 0 and 255, got {}", age))
}

/// The healthcare contract as seen from the agent's account.
#[derive(Debug, Clone)]
pub struct HealthcareContract {
    module: String,
    client: AptosClient,
    account: Arc<AptosAccount>,
}

impl HealthcareContract {
    /// `module` is the fully-qualified `address::name`.
    pub fn new(module: impl Into<String>, client: AptosClient, account: Arc<AptosAccount>) -> Self {
        Self {
            module: module.into(),
            client,
            account,
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    fn function(&self, name: &str) -> String {
        format!("{}::{}", self.module, name)
    }

    async fn call(&self, name: &str, arguments: Vec<EntryArg>) -> Result<EntryFunctionOutcome> {
        let call = EntryFunctionCall::new(self.function(name), arguments);
        self.client.execute_entry_function(&self.account, &call).await
    }

    async fn view(&self, name: &str, provider: Option<&str>, rest: &[&str]) -> Result<Value> {
        let provider = provider.unwrap_or_else(|| self.account.address());
        let mut arguments = vec![Value::String(provider.to_string())];
        arguments.extend(rest.iter().map(|s| Value::String(s.to_string())));
        self.client.view(&self.function(name), &[], arguments).await
    }

    /// Register the agent's account as a provider.
    pub async fn initialize(&self) -> Result<EntryFunctionOutcome> {
        self.call("initialize", Vec::new()).await
    }

    pub async fn add_patient(&self, patient: &PatientDetails, gender: &str) -> Result<EntryFunctionOutcome> {
        self.call(
            "add_patient",
            vec![
                EntryArg::String(patient.patient_id.clone()),
                EntryArg::String(patient.name.clone()),
                EntryArg::U8(patient.age),
                EntryArg::String(gender.to_string()),
                EntryArg::String(patient.contact.clone()),
                EntryArg::String(patient.email.clone()),
                EntryArg::String(patient.address.clone()),
                EntryArg::String(patient.medical_history.clone()),
            ],
        )
        .await
    }

    /// Same fields as `add_patient` minus gender, which is immutable on chain.
    pub async fn update_patient(&self, patient: &PatientDetails) -> Result<EntryFunctionOutcome> {
        self.call(
            "update_patient",
            vec![
                EntryArg::String(patient.patient_id.clone()),
                EntryArg::String(patient.name.clone()),
                EntryArg::U8(patient.age),
                EntryArg::String(patient.contact.clone()),
                EntryArg::String(patient.email.clone()),
                EntryArg::String(patient.address.clone()),
                EntryArg::String(patient.medical_history.clone()),
            ],
        )
        .await
    }

    pub async fn add_medical_record(&self, record: &MedicalRecord) -> Result<EntryFunctionOutcome> {
        self.call(
            "add_medical_record",
            vec![
                EntryArg::String(record.record_id.clone()),
                EntryArg::String(record.patient_id.clone()),
                EntryArg::String(record.record_type.clone()),
                EntryArg::String(record.diagnosis.clone()),
                EntryArg::String(record.treatment.clone()),
                EntryArg::String(record.notes.clone()),
            ],
        )
        .await
    }

    pub async fn schedule_appointment(&self, appointment: &Appointment) -> Result<EntryFunctionOutcome> {
        self.call(
            "schedule_appointment",
            vec![
                EntryArg::String(appointment.appointment_id.clone()),
                EntryArg::String(appointment.patient_id.clone()),
                EntryArg::String(appointment.date.clone()),
                EntryArg::String(appointment.time.clone()),
                EntryArg::String(appointment.purpose.clone()),
                EntryArg::String(appointment.status.clone()),
            ],
        )
        .await
    }

    pub async fn update_appointment_status(&self, appointment_id: &str, new_status: &str) -> Result<EntryFunctionOutcome> {
        self.call(
            "update_appointment_status",
            vec![
                EntryArg::String(appointment_id.to_string()),
                EntryArg::String(new_status.to_string()),
            ],
        )
        .await
    }

    /// Patients of `provider` (defaults to the agent's account).
    pub async fn get_patients(&self, provider: Option<&str>) -> Result<Value> {
        self.view("get_patients", provider, &[]).await
    }

    pub async fn get_patient_records(&self, patient_id: &str, provider: Option<&str>) -> Result<Value> {
        self.view("get_patient_records", provider, &[patient_id]).await
    }

    pub async fn get_patient_appointments(&self, patient_id: &str, provider: Option<&str>) -> Result<Value> {
        self.view("get_patient_appointments", provider, &[patient_id]).await
    }
}
