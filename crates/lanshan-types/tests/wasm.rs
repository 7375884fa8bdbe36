//! WASM-target tests for lanshan-types.
//!
//! A subset of the native unit tests run under wasm32-unknown-unknown via
//! `wasm-pack test --node`, mostly to exercise uuid and chrono in the browser
//! build.

use wasm_bindgen_test::*;

use lanshan_types::config::*;
use lanshan_types::error::*;
use lanshan_types::event::*;
use lanshan_types::message::*;
use lanshan_types::session::*;

// ─── Message Tests ───────────────────────────────────────

#[wasm_bindgen_test]
fn placeholder_is_empty_assistant() {
    let msg = Message::placeholder();
    assert!(msg.is_assistant());
    assert!(msg.content.is_empty());
    assert!(msg.timestamp > 0);
}

#[wasm_bindgen_test]
fn chat_message_from_message() {
    let msg = Message::user("hi");
    assert_eq!(ChatMessage::from(&msg), ChatMessage::user("hi"));
}

// ─── Event Tests ─────────────────────────────────────────

#[wasm_bindgen_test]
fn update_event_wire_shape() {
    let json = serde_json::to_value(UpdateEvent::Answer("x".into())).unwrap();
    assert_eq!(json["type"], "answer");
    assert_eq!(json["content"], "x");
    assert!(UpdateEvent::Done.is_terminal());
}

// ─── Session Tests ───────────────────────────────────────

#[wasm_bindgen_test]
fn session_ids_are_unique() {
    let a = Session::new();
    let b = Session::new();
    assert_ne!(a.id, b.id);
    assert!(chrono::DateTime::parse_from_rfc3339(&a.created_at).is_ok());
}

#[wasm_bindgen_test]
fn title_truncates_by_character() {
    let title = title_from("这是一个超过二十个字符的很长很长很长的问题标题");
    assert_eq!(title.chars().count(), TITLE_MAX_CHARS + 3);
    assert!(title.ends_with("..."));
}

// ─── Settings / Error Tests ──────────────────────────────

#[wasm_bindgen_test]
fn default_settings_validate() {
    assert!(ChatSettings::default().validate().is_ok());
}

#[wasm_bindgen_test]
fn http_error_message() {
    let err = ChatError::http(404, "Not Found");
    assert_eq!(err.to_string(), "HTTP error! status: 404 Not Found");
    assert!(!err.is_auth());
}
