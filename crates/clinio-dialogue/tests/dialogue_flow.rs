// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end dialogue flow tests over the mock adapters.
//!
//! These drive whole turns through `DialogueOrchestrator::process_message`
//! and assert on replies, persisted task state, and registry writes.

use std::sync::Arc;

use chrono::{Datelike, Duration as ChronoDuration, Utc};

use clinio_config::ClinioConfig;
use clinio_core::types::{
    AppointmentRecord, Conversation, PatientRecord, TaskState, UserAction,
};
use clinio_core::ConversationStore;
use clinio_dialogue::{DialogueOrchestrator, DialogueSettings};
use clinio_test_utils::{MemoryStore, MockGenerator, MockRegistry};

const PHONE: &str = "59170123456";

struct Harness {
    store: Arc<MemoryStore>,
    registry: Arc<MockRegistry>,
    generator: Arc<MockGenerator>,
    orchestrator: DialogueOrchestrator,
}

fn base_settings() -> DialogueSettings {
    DialogueSettings::from_config(&ClinioConfig::default())
}

fn harness(settings: DialogueSettings) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(MockRegistry::new());
    let generator = Arc::new(MockGenerator::new());
    let orchestrator = DialogueOrchestrator::new(
        store.clone(),
        registry.clone(),
        generator.clone(),
        settings,
    );
    Harness {
        store,
        registry,
        generator,
        orchestrator,
    }
}

fn patient_with_appointment() -> PatientRecord {
    PatientRecord {
        id: "p-1".to_string(),
        name: "Juan Pérez".to_string(),
        phone: PHONE.to_string(),
        next_appointment: Some(AppointmentRecord {
            id: "a-1".to_string(),
            scheduled_at: Utc::now() + ChronoDuration::days(7),
            status: "Programado".to_string(),
            kind: "Control de Tuberculosis".to_string(),
        }),
        last_visit: None,
    }
}

async fn stored_conversation(store: &MemoryStore, user_id: &str) -> Conversation {
    store
        .get(user_id)
        .await
        .expect("store reachable")
        .expect("conversation present")
}

/// Scenario A: an opening reschedule message that already carries date and
/// time skips awaiting-date and awaiting-time and lands on the
/// confirmation prompt.
#[tokio::test]
async fn data_rich_opening_message_jumps_to_confirmation() {
    let tomorrow = Utc::now().date_naive().succ_opt().unwrap();
    let mut settings = base_settings();
    // Keep the test deterministic whatever today is: close the clinic on a
    // weekday that tomorrow is not.
    settings.rules.closed_weekday = tomorrow.weekday().succ();

    let h = harness(settings);
    h.registry.add_patient(PHONE, patient_with_appointment()).await;

    let turn = h
        .orchestrator
        .process_message(PHONE, "quiero reprogramar para mañana a las 10:00")
        .await;

    assert!(turn.reply.contains("¿Confirmas?"), "reply: {}", turn.reply);
    assert!(
        turn.reply
            .contains(&clinio_dialogue::replies::format_date_es(tomorrow)),
        "reply: {}",
        turn.reply
    );
    assert!(turn.reply.contains("10:00"), "reply: {}", turn.reply);

    let conv = stored_conversation(&h.store, PHONE).await;
    let task = conv.task.expect("task active");
    assert_eq!(task.state, TaskState::RescheduleAwaitingConfirmation);
    assert_eq!(task.data.date, Some(tomorrow));

    // No write before confirmation.
    assert!(h.registry.recorded_updates().await.is_empty());
}

/// Confirming issues exactly one registry write and clears the task.
#[tokio::test]
async fn confirmation_writes_exactly_once() {
    let tomorrow = Utc::now().date_naive().succ_opt().unwrap();
    let mut settings = base_settings();
    settings.rules.closed_weekday = tomorrow.weekday().succ();

    let h = harness(settings);
    h.registry.add_patient(PHONE, patient_with_appointment()).await;

    h.orchestrator
        .process_message(PHONE, "quiero reprogramar para mañana a las 10:00")
        .await;
    let turn = h.orchestrator.process_message(PHONE, "sí").await;

    assert!(turn.reply.contains("Cita reprogramada"), "reply: {}", turn.reply);
    let action = turn.action.expect("completed action payload");
    assert_eq!(action.action, UserAction::Reschedule);
    assert_eq!(action.status, "completed");

    let updates = h.registry.recorded_updates().await;
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].patient_id, "p-1");
    assert_eq!(updates[0].scheduled_at.date_naive(), tomorrow);
    assert_eq!(updates[0].reason, "Control de Tuberculosis");

    let conv = stored_conversation(&h.store, PHONE).await;
    assert!(conv.task.is_none(), "task cleared after one attempt");

    // A stray second "sí" has no machine to act on and writes nothing.
    h.orchestrator.process_message(PHONE, "sí").await;
    assert_eq!(h.registry.recorded_updates().await.len(), 1);
}

/// Scenario B: "no" at the confirmation step clears state without a write.
#[tokio::test]
async fn cancellation_at_confirmation_leaves_record_untouched() {
    let tomorrow = Utc::now().date_naive().succ_opt().unwrap();
    let mut settings = base_settings();
    settings.rules.closed_weekday = tomorrow.weekday().succ();

    let h = harness(settings);
    h.registry.add_patient(PHONE, patient_with_appointment()).await;

    h.orchestrator
        .process_message(PHONE, "quiero reprogramar para mañana a las 10:00")
        .await;
    let turn = h.orchestrator.process_message(PHONE, "no").await;

    assert_eq!(turn.reply, "Tu cita se mantiene sin cambios.");
    assert!(h.registry.recorded_updates().await.is_empty());

    let conv = stored_conversation(&h.store, PHONE).await;
    assert!(conv.task.is_none());
}

/// Ambiguous input at the confirmation step re-prompts without moving.
#[tokio::test]
async fn ambiguous_confirmation_reprompts() {
    let tomorrow = Utc::now().date_naive().succ_opt().unwrap();
    let mut settings = base_settings();
    settings.rules.closed_weekday = tomorrow.weekday().succ();

    let h = harness(settings);
    h.registry.add_patient(PHONE, patient_with_appointment()).await;

    h.orchestrator
        .process_message(PHONE, "quiero reprogramar para mañana a las 10:00")
        .await;
    let turn = h.orchestrator.process_message(PHONE, "este... tal vez").await;

    assert!(turn.reply.contains("'sí'"), "reply: {}", turn.reply);
    let conv = stored_conversation(&h.store, PHONE).await;
    assert_eq!(
        conv.task.unwrap().state,
        TaskState::RescheduleAwaitingConfirmation
    );
    assert!(h.registry.recorded_updates().await.is_empty());
}

/// Scenario C: picking the clinic's closed day is rejected and the machine
/// stays in awaiting-date.
#[tokio::test]
async fn closed_weekday_rejected_and_state_kept() {
    let mut settings = base_settings();
    settings.rules.closed_weekday = chrono::Weekday::Sun;

    let h = harness(settings);
    h.registry.add_patient(PHONE, patient_with_appointment()).await;

    let turn = h
        .orchestrator
        .process_message(PHONE, "quiero reprogramar mi cita")
        .await;
    assert!(turn.reply.contains("¿Para qué día"), "reply: {}", turn.reply);

    let turn = h.orchestrator.process_message(PHONE, "el domingo").await;
    assert!(turn.reply.contains("domingos"), "reply: {}", turn.reply);

    let conv = stored_conversation(&h.store, PHONE).await;
    assert_eq!(conv.task.unwrap().state, TaskState::RescheduleAwaitingDate);
}

/// The awaiting-time step validates the opening window and the slot grid.
#[tokio::test]
async fn time_window_and_grid_enforced_in_flow() {
    let monday_next = {
        // A guaranteed-future Monday.
        let today = Utc::now().date_naive();
        let ahead = (7 - today.weekday().num_days_from_monday() as i64).rem_euclid(7);
        today + ChronoDuration::days(if ahead == 0 { 7 } else { ahead })
    };
    let settings = base_settings();

    let h = harness(settings);
    h.registry.add_patient(PHONE, patient_with_appointment()).await;

    h.orchestrator
        .process_message(PHONE, "quiero reprogramar mi cita")
        .await;
    h.orchestrator
        .process_message(PHONE, &format!("el {monday_next}"))
        .await;

    // 19:00 is the exclusive upper bound.
    let turn = h.orchestrator.process_message(PHONE, "a las 19:00").await;
    assert!(turn.reply.contains("horario de atención"), "reply: {}", turn.reply);

    // Off the 30-minute grid.
    let turn = h.orchestrator.process_message(PHONE, "a las 10:15").await;
    assert!(turn.reply.contains("cada 30 minutos"), "reply: {}", turn.reply);

    let conv = stored_conversation(&h.store, PHONE).await;
    assert_eq!(conv.task.unwrap().state, TaskState::RescheduleAwaitingTime);

    // 07:00 is the inclusive lower bound.
    let turn = h.orchestrator.process_message(PHONE, "a las 07:00").await;
    assert!(turn.reply.contains("¿Confirmas?"), "reply: {}", turn.reply);
}

/// Scenario D: a long off-domain message gets the fixed redirect and no task.
#[tokio::test]
async fn off_domain_message_is_redirected() {
    let h = harness(base_settings());

    let message = "explícame por favor cómo se calcula la hipotenusa de un \
                   triángulo rectángulo cuyos catetos miden tres y cuatro \
                   unidades, lo necesito para mi examen de geometría";
    assert!(message.chars().count() > 100);

    let turn = h.orchestrator.process_message(PHONE, message).await;
    assert!(
        turn.reply.contains("solo puedo asistir"),
        "reply: {}",
        turn.reply
    );
    assert!(turn.action.is_none());

    let conv = stored_conversation(&h.store, PHONE).await;
    assert!(conv.task.is_none());
}

/// Scenario E: after TTL expiry the next message starts a brand-new
/// conversation.
#[tokio::test]
async fn expired_conversation_starts_fresh() {
    let h = harness(base_settings());
    h.generator.add_response("Hola, ¿en qué puedo ayudarte?").await;

    let first = h.orchestrator.process_message(PHONE, "hola").await;
    h.store.expire(PHONE).await;

    h.generator.add_response("Bienvenido de nuevo.").await;
    let second = h.orchestrator.process_message(PHONE, "hola").await;

    assert_ne!(first.conversation_id, second.conversation_id);

    let conv = stored_conversation(&h.store, PHONE).await;
    // Only the second turn's user + assistant messages survive.
    assert_eq!(conv.messages.len(), 2);
    assert!(conv.task.is_none());
}

/// Looking up the next appointment formats the registry record.
#[tokio::test]
async fn lookup_formats_next_appointment() {
    let h = harness(base_settings());
    h.registry.add_patient(PHONE, patient_with_appointment()).await;

    let turn = h
        .orchestrator
        .process_message(PHONE, "¿cuándo es mi próxima cita?")
        .await;

    assert!(turn.reply.contains("Tu próxima cita"), "reply: {}", turn.reply);
    assert!(turn.reply.contains("Control de Tuberculosis"));
    let action = turn.action.expect("lookup action");
    assert_eq!(action.action, UserAction::Lookup);
}

/// Unregistered users are told to contact the clinic, with no task started.
#[tokio::test]
async fn unknown_patient_cannot_start_reschedule() {
    let h = harness(base_settings());

    let turn = h
        .orchestrator
        .process_message(PHONE, "quiero reprogramar mi cita")
        .await;

    assert!(
        turn.reply.contains("No encuentro tu registro"),
        "reply: {}",
        turn.reply
    );
    let conv = stored_conversation(&h.store, PHONE).await;
    assert!(conv.task.is_none());
}

/// A registry failure during the confirmed write degrades to an error
/// reply and clears the task instead of leaving the machine stuck.
#[tokio::test]
async fn failed_write_clears_task() {
    let tomorrow = Utc::now().date_naive().succ_opt().unwrap();
    let mut settings = base_settings();
    settings.rules.closed_weekday = tomorrow.weekday().succ();

    let h = harness(settings);
    h.registry.add_patient(PHONE, patient_with_appointment()).await;
    h.registry.fail_updates(true);

    h.orchestrator
        .process_message(PHONE, "quiero reprogramar para mañana a las 10:00")
        .await;
    let turn = h.orchestrator.process_message(PHONE, "sí").await;

    assert!(turn.reply.contains("Error al reprogramar"), "reply: {}", turn.reply);
    let conv = stored_conversation(&h.store, PHONE).await;
    assert!(conv.task.is_none());
    // The one (failed) attempt was issued; nothing retried.
    assert_eq!(h.registry.recorded_updates().await.len(), 1);
}

/// Generator failures never fail the turn: a trouble reply is produced and
/// the conversation stays consistent.
#[tokio::test]
async fn generation_failure_degrades_to_trouble_reply() {
    let h = harness(base_settings());
    h.generator.set_failing(true);

    let turn = h.orchestrator.process_message(PHONE, "hola").await;
    assert!(
        turn.reply.contains("tuve un problema"),
        "reply: {}",
        turn.reply
    );

    let conv = stored_conversation(&h.store, PHONE).await;
    assert_eq!(conv.messages.len(), 2);
}

/// Garbled model output is replaced by the keyword fallback.
#[tokio::test]
async fn invalid_completion_uses_fallback() {
    let h = harness(base_settings());
    h.generator
        .add_response("Tienes TUBERACIÓN muy avanzada señor paciente.")
        .await;

    let turn = h.orchestrator.process_message(PHONE, "hola").await;
    assert!(turn.reply.contains("Bienvenido"), "reply: {}", turn.reply);
}

/// A schedule intent is surfaced in the action payload while the reply
/// comes from the free-form path.
#[tokio::test]
async fn schedule_intent_is_surfaced_as_action() {
    let h = harness(base_settings());
    h.generator.add_response("¡Claro! ¿Para qué día?").await;

    let turn = h
        .orchestrator
        .process_message(PHONE, "quiero agendar una cita")
        .await;

    let action = turn.action.expect("schedule action");
    assert_eq!(action.action, UserAction::Schedule);
    assert_eq!(action.status, "collecting_info");
    assert!(action.data["missing_fields"].as_array().is_some());
}

/// Opening message with only a date lands on awaiting-time with the date
/// already merged into the bag.
#[tokio::test]
async fn date_only_opening_message_waits_for_time() {
    let tomorrow = Utc::now().date_naive().succ_opt().unwrap();
    let mut settings = base_settings();
    settings.rules.closed_weekday = tomorrow.weekday().succ();

    let h = harness(settings);
    h.registry.add_patient(PHONE, patient_with_appointment()).await;

    let turn = h
        .orchestrator
        .process_message(PHONE, "quiero reprogramar para mañana")
        .await;
    assert!(turn.reply.contains("¿A qué hora?"), "reply: {}", turn.reply);

    let conv = stored_conversation(&h.store, PHONE).await;
    let task = conv.task.expect("task active");
    assert_eq!(task.state, TaskState::RescheduleAwaitingTime);
    assert_eq!(task.data.date, Some(tomorrow));
    assert_eq!(task.data.patient_id.as_deref(), Some("p-1"));
}

/// Every turn appends exactly one assistant message and persists it.
#[tokio::test]
async fn each_turn_appends_one_assistant_message() {
    let h = harness(base_settings());
    h.registry.add_patient(PHONE, patient_with_appointment()).await;

    h.orchestrator
        .process_message(PHONE, "quiero reprogramar mi cita")
        .await;
    h.orchestrator.process_message(PHONE, "no entiendo nada").await;

    let conv = stored_conversation(&h.store, PHONE).await;
    // Two turns: two user + two assistant messages, alternating.
    assert_eq!(conv.messages.len(), 4);
    let roles: Vec<String> = conv.messages.iter().map(|m| m.role.to_string()).collect();
    assert_eq!(roles, vec!["user", "assistant", "user", "assistant"]);
}
