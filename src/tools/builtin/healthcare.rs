//! Healthcare contract tools.

use super::{with_ctx, ToolContext};
use crate::chain::{age_from_i64, Appointment, MedicalRecord, PatientDetails};
use crate::tools::{ParamType, Tool, ToolArgs, ToolDescriptor};
use anyhow::Result;
use std::sync::Arc;

const PROVIDER_HELP: &str = "Provider account address, defaults to the agent's";

pub(super) fn tools(ctx: &Arc<ToolContext>) -> Vec<Arc<dyn Tool>> {
    use ParamType::{Integer, String as Str};

    vec![
        with_ctx(
            ctx,
            ToolDescriptor::new(
                "initialize_healthcare_provider",
                "Register the agent's account as a healthcare provider. Run once before adding patients.",
            ),
            execute_initialize,
        ),
        with_ctx(
            ctx,
            ToolDescriptor::new("add_patient", "Add a new patient to the healthcare system.")
                .param("patient_id", Str, "Unique patient identifier")
                .param("name", Str, "Full name")
                .param("age", Integer, "Age in years (0-255)")
                .param("gender", Str, "Gender")
                .param("contact", Str, "Phone number")
                .param("email", Str, "Email address")
                .param("address_str", Str, "Postal address")
                .param("medical_history", Str, "Relevant medical history"),
            execute_add_patient,
        ),
        with_ctx(
            ctx,
            ToolDescriptor::new("add_medical_record", "Add a medical record for a patient.")
                .param("record_id", Str, "Unique record identifier")
                .param("patient_id", Str, "Patient the record belongs to")
                .param("record_type", Str, "Kind of record, e.g. consultation or lab")
                .param("diagnosis", Str, "Diagnosis")
                .param("treatment", Str, "Treatment")
                .param("notes", Str, "Free-form notes"),
            execute_add_medical_record,
        ),
        with_ctx(
            ctx,
            ToolDescriptor::new("schedule_appointment", "Schedule an appointment for a patient.")
                .param("appointment_id", Str, "Unique appointment identifier")
                .param("patient_id", Str, "Patient identifier")
                .param("date", Str, "Date, e.g. 2024-05-01")
                .param("time", Str, "Time, e.g. 14:30")
                .param("purpose", Str, "Reason for the visit")
                .param("status", Str, "Initial status, e.g. scheduled"),
            execute_schedule_appointment,
        ),
        with_ctx(
            ctx,
            ToolDescriptor::new("update_appointment_status", "Update the status of an appointment.")
                .param("appointment_id", Str, "Appointment identifier")
                .param("new_status", Str, "New status, e.g. completed or cancelled"),
            execute_update_appointment_status,
        ),
        with_ctx(
            ctx,
            ToolDescriptor::new("update_patient", "Update a patient's information.")
                .param("patient_id", Str, "Patient identifier")
                .param("name", Str, "Full name")
                .param("age", Integer, "Age in years (0-255)")
                .param("contact", Str, "Phone number")
                .param("email", Str, "Email address")
                .param("address_str", Str, "Postal address")
                .param("medical_history", Str, "Relevant medical history"),
            execute_update_patient,
        ),
        with_ctx(
            ctx,
            ToolDescriptor::new("get_patients", "List all patients of a provider.")
                .optional("provider_addr", Str, PROVIDER_HELP),
            execute_get_patients,
        ),
        with_ctx(
            ctx,
            ToolDescriptor::new("get_patient_records", "Get the medical records of a patient.")
                .param("patient_id", Str, "Patient identifier")
                .optional("provider_addr", Str, PROVIDER_HELP),
            execute_get_patient_records,
        ),
        with_ctx(
            ctx,
            ToolDescriptor::new("get_patient_appointments", "Get the appointments of a patient.")
                .param("patient_id", Str, "Patient identifier")
                .optional("provider_addr", Str, PROVIDER_HELP),
            execute_get_patient_appointments,
        ),
    ]
}

fn patient_details(args: &ToolArgs) -> Result<PatientDetails> {
    Ok(PatientDetails {
        patient_id: args.str("patient_id")?.to_string(),
        name: args.str("name")?.to_string(),
        age: age_from_i64(args.int("age")?)?,
        contact: args.str("contact")?.to_string(),
        email: args.str("email")?.to_string(),
        address: args.str("address_str")?.to_string(),
        medical_history: args.str("medical_history")?.to_string(),
    })
}

fn provider(args: &ToolArgs) -> Option<&str> {
    args.opt_str("provider_addr").filter(|a| !a.trim().is_empty())
}

async fn execute_initialize(ctx: Arc<ToolContext>, _args: ToolArgs) -> Result<String> {
    let outcome = ctx.healthcare.initialize().await?;
    Ok(serde_json::to_string(&outcome)?)
}

async fn execute_add_patient(ctx: Arc<ToolContext>, args: ToolArgs) -> Result<String> {
    let patient = patient_details(&args)?;
    let outcome = ctx.healthcare.add_patient(&patient, args.str("gender")?).await?;
    Ok(serde_json::to_string(&outcome)?)
}

async fn execute_update_patient(ctx: Arc<ToolContext>, args: ToolArgs) -> Result<String> {
    let patient = patient_details(&args)?;
    let outcome = ctx.healthcare.update_patient(&patient).await?;
    Ok(serde_json::to_string(&outcome)?)
}

async fn execute_add_medical_record(ctx: Arc<ToolContext>, args: ToolArgs) -> Result<String> {
    let record = MedicalRecord {
        record_id: args.str("record_id")?.to_string(),
        patient_id: args.str("patient_id")?.to_string(),
        record_type: args.str("record_type")?.to_string(),
        diagnosis: args.str("diagnosis")?.to_string(),
        treatment: args.str("treatment")?.to_string(),
        notes: args.str("notes")?.to_string(),
    };
    let outcome = ctx.healthcare.add_medical_record(&record).await?;
    Ok(serde_json::to_string(&outcome)?)
}

async fn execute_schedule_appointment(ctx: Arc<ToolContext>, args: ToolArgs) -> Result<String> {
    let appointment = Appointment {
        appointment_id: args.str("appointment_id")?.to_string(),
        patient_id: args.str("patient_id")?.to_string(),
        date: args.str("date")?.to_string(),
        time: args.str("time")?.to_string(),
        purpose: args.str("purpose")?.to_string(),
        status: args.str("status")?.to_string(),
    };
    let outcome = ctx.healthcare.schedule_appointment(&appointment).await?;
    Ok(serde_json::to_string(&outcome)?)
}

async fn execute_update_appointment_status(ctx: Arc<ToolContext>, args: ToolArgs) -> Result<String> {
    let outcome = ctx
        .healthcare
        .update_appointment_status(args.str("appointment_id")?, args.str("new_status")?)
        .await?;
    Ok(serde_json::to_string(&outcome)?)
}

async fn execute_get_patients(ctx: Arc<ToolContext>, args: ToolArgs) -> Result<String> {
    let patients = ctx.healthcare.get_patients(provider(&args)).await?;
    Ok(patients.to_string())
}

async fn execute_get_patient_records(ctx: Arc<ToolContext>, args: ToolArgs) -> Result<String> {
    let records = ctx
        .healthcare
        .get_patient_records(args.str("patient_id")?, provider(&args))
        .await?;
    Ok(records.to_string())
}

async fn execute_get_patient_appointments(ctx: Arc<ToolContext>, args: ToolArgs) -> Result<String> {
    let appointments = ctx
        .healthcare
        .get_patient_appointments(args.str("patient_id")?, provider(&args))
        .await?;
    Ok(appointments.to_string())
}
