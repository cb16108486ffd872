// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations.

use std::collections::HashSet;

use parley_core::ParleyError;
use parley_core::types::{
    ConversationId, ConversationSummary, Message, MessageId, OutgoingMessage, UpdateEvent,
    UpdateKind,
};
use parley_sync::ChatEngine;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub async fn conversations(engine: &ChatEngine) -> Result<(), ParleyError> {
    let conversations = engine.get_my_conversations().await?;
    if conversations.is_empty() {
        println!("no conversations");
    }
    for conversation in &conversations {
        println!("{}", format_conversation(conversation));
    }
    Ok(())
}

/// Prints a conversation's history, then follows it live until the
/// shutdown token fires. Lines typed on stdin are sent as messages.
pub async fn watch(
    engine: &ChatEngine,
    conversation_id: ConversationId,
    shutdown: CancellationToken,
) -> Result<(), ParleyError> {
    engine.connect().await?;
    let view = engine.load_conversation(conversation_id).await?;

    println!("-- {} --", view.summary.other_user_name);
    for message in &view.messages {
        println!("{}", format_message(message));
    }
    let mut printed: HashSet<MessageId> = view.messages.iter().filter_map(|m| m.id).collect();

    let mut updates = engine.subscribe(conversation_id);
    let mut status = engine.watch_status();
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            update = updates.recv() => match update {
                Some(event) => {
                    if let Some(line) = render_update(&event, &mut printed) {
                        println!("{line}");
                    }
                }
                None => break,
            },
            Ok(()) = status.changed() => {
                let current = *status.borrow_and_update();
                eprintln!("[{current}]");
            }
            line = input.next_line(), if input_open => match line {
                Ok(Some(text)) if text.trim().is_empty() => {}
                Ok(Some(text)) => {
                    if let Err(e) = engine.send(OutgoingMessage::new(conversation_id, text)).await {
                        eprintln!("not sent: {e}");
                    }
                }
                Ok(None) => {
                    debug!("stdin closed, watching only");
                    input_open = false;
                }
                Err(e) => {
                    warn!(error = %e, "failed to read stdin");
                    input_open = false;
                }
            },
        }
    }

    engine.teardown();
    Ok(())
}

pub async fn send(
    engine: &ChatEngine,
    conversation_id: ConversationId,
    text: &str,
) -> Result<Message, ParleyError> {
    let message = engine
        .send(OutgoingMessage::new(conversation_id, text))
        .await?;
    println!("{}", format_message(&message));
    Ok(message)
}

pub async fn mark_read(engine: &ChatEngine, conversation_id: ConversationId) -> Result<(), ParleyError> {
    engine.mark_read(conversation_id).await?;
    println!("conversation {conversation_id} marked read");
    Ok(())
}

pub fn format_conversation(conversation: &ConversationSummary) -> String {
    let last = match (&conversation.last_message_at, &conversation.last_message_content) {
        (Some(at), Some(content)) => format!("  [{}] {content}", at.format(TIME_FORMAT)),
        (None, Some(content)) => format!("  {content}"),
        _ => String::new(),
    };
    format!(
        "{:>6}  {}{last}",
        conversation.conversation_id, conversation.other_user_name
    )
}

pub fn format_message(message: &Message) -> String {
    let sender = message
        .sender_name
        .clone()
        .unwrap_or_else(|| format!("user {}", message.sender_id));
    let read = if message.is_read() { " (read)" } else { "" };
    format!(
        "[{}] {sender}: {}{read}",
        message.created_at.format(TIME_FORMAT),
        message.content
    )
}

/// Renders an update, skipping new-message events already on screen.
pub fn render_update(event: &UpdateEvent, printed: &mut HashSet<MessageId>) -> Option<String> {
    match event.kind {
        UpdateKind::NewMessage => {
            if let Some(id) = event.message.id
                && !printed.insert(id)
            {
                return None;
            }
            Some(format_message(&event.message))
        }
        UpdateKind::ReadReceipt => {
            let at = event
                .message
                .read_at
                .map(|t| t.format(TIME_FORMAT).to_string())
                .unwrap_or_default();
            Some(format!("  read {at}: {}", event.message.content))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_test_utils::fixtures;

    #[test]
    fn message_line_shows_sender_and_read_state() {
        let message = fixtures::message(1, 1, 2);
        assert_eq!(
            format_message(&message),
            "[2026-01-01 00:00] user-2: message 1"
        );

        let mut anonymous = fixtures::read(message, 60);
        anonymous.sender_name = None;
        assert_eq!(
            format_message(&anonymous),
            "[2026-01-01 00:00] user 2: message 1 (read)"
        );
    }

    #[test]
    fn conversation_line_includes_last_message() {
        let mut conversation = fixtures::conversation(12, 2);
        assert_eq!(format_conversation(&conversation), "    12  user-2");

        conversation.last_message_content = Some("see you".into());
        conversation.last_message_at = Some(fixtures::epoch());
        assert_eq!(
            format_conversation(&conversation),
            "    12  user-2  [2026-01-01 00:00] see you"
        );
    }

    #[test]
    fn history_replayed_by_first_poll_is_skipped() {
        let mut printed = HashSet::from([MessageId(1)]);

        let replay = UpdateEvent::new_message(fixtures::message(1, 1, 2));
        assert!(render_update(&replay, &mut printed).is_none());

        let fresh = UpdateEvent::new_message(fixtures::message(1, 2, 2));
        assert!(render_update(&fresh, &mut printed).is_some());
        assert!(render_update(&fresh, &mut printed).is_none());
    }

    #[test]
    fn read_receipts_always_render() {
        let mut printed = HashSet::from([MessageId(1)]);
        let receipt = UpdateEvent::read_receipt(fixtures::read(fixtures::message(1, 1, 2), 60));
        let line = render_update(&receipt, &mut printed).unwrap();
        assert_eq!(line, "  read 2026-01-01 00:01: message 1");
    }
}
