#![no_main]

use libfuzzer_sys::fuzz_target;
use mygo_bot::line::{WebhookEvent, WebhookPayload};

fuzz_target!(|data: &[u8]| {
    if let Ok(payload) = serde_json::from_slice::<WebhookPayload>(data) {
        for event in &payload.events {
            if let WebhookEvent::Message(event) = event {
                let _ = event.text();
                let _ = event.conversation_key();
            }
        }
    }
});
