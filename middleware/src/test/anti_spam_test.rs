//! Unit tests for AntiSpamMiddleware: keyword denylist, repeated-message
//! detection, and idle sweeping.

use std::sync::Arc;
use std::time::Duration;

use zultra_core::{Middleware, UpdateContext};

use super::support::{sticker_update, text_update, RecordingBot};
use crate::AntiSpamMiddleware;

fn detector(keywords: &[&str]) -> (AntiSpamMiddleware, Arc<RecordingBot>) {
    let bot = Arc::new(RecordingBot::new());
    let mw = AntiSpamMiddleware::new(
        keywords.iter().map(|k| k.to_string()).collect(),
        bot.clone(),
    );
    (mw, bot)
}

/// **Test: keyword matching is a case-insensitive substring check.**
#[tokio::test]
async fn test_keyword_match_is_case_insensitive() {
    let (mw, bot) = detector(&["bitcoin"]);
    let mut ctx = UpdateContext::new();

    let passed = mw
        .process_update(&text_update(1, "Buy BITCOIN now!!"), &mut ctx)
        .await
        .expect("Failed to process update");
    assert!(!passed);

    let sent = bot.sent_texts();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("suspicious content"));
}

/// **Test: a keyword veto leaves no history behind; the check runs before
/// the message is recorded.**
#[tokio::test]
async fn test_keyword_veto_records_nothing() {
    let (mw, _bot) = detector(&["scam"]);
    let mut ctx = UpdateContext::new();

    assert!(!mw
        .process_update(&text_update(1, "great scam here"), &mut ctx)
        .await
        .expect("Failed to process update"));
    assert_eq!(mw.tracked_users(), 0);
}

/// **Test: two identical messages pass; the third is vetoed with a notice.**
#[tokio::test]
async fn test_third_repeat_is_vetoed() {
    let (mw, bot) = detector(&[]);
    let mut ctx = UpdateContext::new();
    let update = text_update(1, "hello");

    for _ in 0..2 {
        assert!(mw
            .process_update(&update, &mut ctx)
            .await
            .expect("Failed to process update"));
    }
    assert!(!mw
        .process_update(&update, &mut ctx)
        .await
        .expect("Failed to process update"));

    let sent = bot.sent_texts();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("repeat"));
}

/// **Test: vetoed repeats stay recorded, so every later copy is vetoed too.**
#[tokio::test]
async fn test_repeats_keep_counting_past_limit() {
    let (mw, _bot) = detector(&[]);
    let mut ctx = UpdateContext::new();
    let update = text_update(1, "hello");

    for _ in 0..2 {
        assert!(mw
            .process_update(&update, &mut ctx)
            .await
            .expect("Failed to process update"));
    }
    for _ in 0..3 {
        assert!(!mw
            .process_update(&update, &mut ctx)
            .await
            .expect("Failed to process update"));
    }
}

/// **Test: repetition compares the lowercased text, so case variants count
/// as the same message.**
#[tokio::test]
async fn test_repeat_match_is_case_insensitive() {
    let (mw, _bot) = detector(&[]);
    let mut ctx = UpdateContext::new();

    assert!(mw
        .process_update(&text_update(1, "Hello"), &mut ctx)
        .await
        .expect("Failed to process update"));
    assert!(mw
        .process_update(&text_update(1, "HELLO"), &mut ctx)
        .await
        .expect("Failed to process update"));
    assert!(!mw
        .process_update(&text_update(1, "hello"), &mut ctx)
        .await
        .expect("Failed to process update"));
}

/// **Test: distinct messages never trip the repetition check.**
#[tokio::test]
async fn test_different_texts_pass() {
    let (mw, _bot) = detector(&[]);
    let mut ctx = UpdateContext::new();

    for text in ["one", "two", "three", "four", "five"] {
        assert!(mw
            .process_update(&text_update(1, text), &mut ctx)
            .await
            .expect("Failed to process update"));
    }
}

/// **Test: repetition history is per user.**
#[tokio::test]
async fn test_history_is_per_user() {
    let (mw, _bot) = detector(&[]);
    let mut ctx = UpdateContext::new();

    for _ in 0..2 {
        assert!(mw
            .process_update(&text_update(1, "hello"), &mut ctx)
            .await
            .expect("Failed to process update"));
    }
    // User 2's first "hello" is not affected by user 1's history.
    assert!(mw
        .process_update(&text_update(2, "hello"), &mut ctx)
        .await
        .expect("Failed to process update"));
}

/// **Test: non-text updates pass unconditionally and are never recorded.**
#[tokio::test]
async fn test_non_text_passes() {
    let (mw, _bot) = detector(&["bitcoin"]);
    let mut ctx = UpdateContext::new();

    for _ in 0..5 {
        assert!(mw
            .process_update(&sticker_update(1), &mut ctx)
            .await
            .expect("Failed to process update"));
    }
    assert_eq!(mw.tracked_users(), 0);
}

/// **Test: sweep_idle evicts users whose newest message has aged out.**
#[tokio::test]
async fn test_sweep_idle_evicts_stale_users() {
    let (mw, _bot) = detector(&[]);
    let mut ctx = UpdateContext::new();

    assert!(mw
        .process_update(&text_update(1, "old"), &mut ctx)
        .await
        .expect("Failed to process update"));
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(mw
        .process_update(&text_update(2, "fresh"), &mut ctx)
        .await
        .expect("Failed to process update"));

    assert_eq!(mw.tracked_users(), 2);
    let dropped = mw.sweep_idle(Duration::from_millis(60));
    assert_eq!(dropped, 1);
    assert_eq!(mw.tracked_users(), 1);
}
