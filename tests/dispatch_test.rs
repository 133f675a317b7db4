mod helpers;

use chrono::{Duration, Utc};
use helpers::*;
use stranger_bot::notices;
use stranger_bot::repositories::{ReportStore, UserStore};
use stranger_bot::services::Dispatch;
use stranger_bot::transport::{Message, Outgoing};
use tokio_test::assert_ok;

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_first_contact_registers_and_welcomes() {
    let h = Harness::new();

    let outcome = h.send_text(100, "hello?").await;
    assert_eq!(outcome, Dispatch::Dropped);

    let user = h.user(100).await;
    assert!(!user.available);
    assert!(user.match_chat_id.is_none());
    assert!(user.allow_pictures);
    assert_eq!(h.messenger.texts_to(100), vec![notices::WELCOME.to_string()]);
}

#[tokio::test]
async fn test_known_chat_is_not_welcomed_again() {
    let h = Harness::new();

    h.send_text(100, "/help").await;
    h.send_text(100, "/help").await;

    assert_eq!(h.store.user_count().await, 1);
    let welcomes = h
        .messenger
        .texts_to(100)
        .into_iter()
        .filter(|t| t == notices::WELCOME)
        .count();
    assert_eq!(welcomes, 1);
}

#[tokio::test]
async fn test_activity_is_touched_after_routing() {
    let h = Harness::new();
    h.send_text(100, "/help").await;
    let before = h.user(100).await.last_activity;

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    h.send_text(100, "/help").await;

    assert!(h.user(100).await.last_activity > before);
}

// ============================================================================
// Commands
// ============================================================================

#[tokio::test]
async fn test_help_command() {
    let h = Harness::new();

    assert_eq!(h.send_text(7, "/HELP").await, Dispatch::Handled("help"));
    assert!(h.messenger.received(7, notices::HELP));
}

#[tokio::test]
async fn test_nopics_toggles_preference() {
    let h = Harness::new();

    assert_eq!(h.send_text(7, "/nopics").await, Dispatch::Handled("nopics"));
    assert!(!h.user(7).await.allow_pictures);
    assert!(h.messenger.received(7, notices::PICTURES_DISABLED));

    h.send_text(7, "/nopics").await;
    assert!(h.user(7).await.allow_pictures);
    assert!(h.messenger.received(7, notices::PICTURES_ENABLED));
}

#[tokio::test]
async fn test_start_puts_user_in_search() {
    let mut h = Harness::new();

    assert_eq!(h.send_text(1, "/start").await, Dispatch::Handled("start"));

    let user = h.user(1).await;
    assert!(user.is_searching());
    assert!(h.messenger.received(1, notices::SEARCHING));

    let job = assert_ok!(h.match_rx.try_recv());
    assert_eq!(job.chat_id, 1);
}

#[tokio::test]
async fn test_start_while_searching_is_not_claimed() {
    let mut h = Harness::new();
    h.send_text(1, "/start").await;
    assert_ok!(h.match_rx.try_recv());

    assert_eq!(h.send_text(1, "/start").await, Dispatch::Dropped);
    assert!(h.match_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_stop_when_idle_is_not_claimed() {
    let mut h = Harness::new();

    assert_eq!(h.send_text(1, "/bye").await, Dispatch::Dropped);
    assert!(h.end_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_stop_aliases_queue_teardown() {
    let mut h = Harness::new();
    h.matched_pair(1, 2).await;

    assert_eq!(h.send_text(1, "/end").await, Dispatch::Handled("stop"));
    assert!(h.messenger.received(1, notices::ENDING));
    assert_eq!(assert_ok!(h.end_rx.try_recv()).chat_id, 1);

    assert_eq!(h.send_text(2, "/Bye").await, Dispatch::Handled("stop"));
    assert_eq!(assert_ok!(h.end_rx.try_recv()).chat_id, 2);
}

#[tokio::test]
async fn test_searching_user_can_cancel() {
    let mut h = Harness::new();
    h.send_text(1, "/start").await;

    assert_eq!(h.send_text(1, "/bye").await, Dispatch::Handled("stop"));
    h.run_jobs().await;

    let user = h.user(1).await;
    assert!(!user.available);
    assert!(user.match_chat_id.is_none());
    assert!(user.previous_match.is_none());
    assert!(h.messenger.received(1, notices::CONVERSATION_OVER));
}

// ============================================================================
// Reports
// ============================================================================

#[tokio::test]
async fn test_report_without_reason_shows_usage() {
    let mut h = Harness::new();
    h.matched_pair(1, 2).await;

    assert_eq!(h.send_text(1, "/report   ").await, Dispatch::Handled("report"));
    assert!(h.messenger.received(1, notices::REPORT_USAGE));
    assert!(h.store.reports().await.is_empty());
}

#[tokio::test]
async fn test_report_persists_against_partner() {
    let mut h = Harness::new();
    h.matched_pair(1, 2).await;

    assert_eq!(
        h.send_text(1, "/report spamming links").await,
        Dispatch::Handled("report")
    );
    assert!(h.messenger.received(1, notices::REPORTED));
    // Nothing reaches the reported partner
    assert!(h.messenger.sent_to(2).is_empty());

    let reports = h.store.reports().await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].user_id, h.user(2).await.id);
    assert_eq!(reports[0].reporter_id, h.user(1).await.id);
    assert_eq!(reports[0].report, "spamming links");
}

#[tokio::test]
async fn test_report_while_unmatched_is_not_claimed() {
    let h = Harness::new();

    assert_eq!(h.send_text(1, "/report rude").await, Dispatch::Dropped);
    assert!(h.store.reports().await.is_empty());
}

// ============================================================================
// Relay
// ============================================================================

#[tokio::test]
async fn test_text_is_relayed_with_prefix() {
    let mut h = Harness::new();
    h.matched_pair(1, 2).await;

    assert_eq!(h.send_text(1, "hi there").await, Dispatch::Handled("relay"));
    assert_eq!(h.messenger.texts_to(2), vec!["Stranger: hi there".to_string()]);
    assert!(h.messenger.sent_to(1).is_empty());
}

#[tokio::test]
async fn test_photo_forwards_largest_variant() {
    let mut h = Harness::new();
    h.matched_pair(1, 2).await;

    assert_eq!(h.send(photo_message(1)).await, Dispatch::Handled("relay"));
    assert_eq!(
        h.messenger.sent_to(2),
        vec![
            Outgoing::text(notices::INCOMING_PHOTO),
            Outgoing::Photo {
                file_id: "photo-large".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_photo_blocked_when_partner_disabled_pictures() {
    let mut h = Harness::new();
    h.matched_pair(1, 2).await;
    h.send_text(2, "/nopics").await;
    h.messenger.clear();

    assert_eq!(h.send(photo_message(1)).await, Dispatch::Handled("relay"));

    assert_eq!(
        h.messenger.sent_to(2),
        vec![Outgoing::text(notices::PHOTO_BLOCKED_FOR_PARTNER)]
    );
    assert_eq!(
        h.messenger.sent_to(1),
        vec![Outgoing::text(notices::PHOTO_BLOCKED_FOR_SENDER)]
    );
}

#[tokio::test]
async fn test_nopics_does_not_block_other_attachments() {
    let mut h = Harness::new();
    h.matched_pair(1, 2).await;
    h.send_text(2, "/nopics").await;
    h.messenger.clear();

    h.send(sticker_message(1)).await;

    assert_eq!(
        h.messenger.sent_to(2),
        vec![
            Outgoing::text(notices::INCOMING_STICKER),
            Outgoing::Sticker {
                file_id: "sticker-1".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_unsupported_message_is_not_relayed() {
    let mut h = Harness::new();
    h.matched_pair(1, 2).await;

    // e.g. a voice note: no text and no attachment kind the bot forwards
    let mut voice = Message::text_from(1, "");
    voice.text = None;

    assert_eq!(h.send(voice).await, Dispatch::Handled("relay"));
    assert!(h.messenger.sent_to(2).is_empty());
    assert!(h.messenger.sent_to(1).is_empty());
}

#[tokio::test]
async fn test_unmatched_text_is_dropped() {
    let mut h = Harness::new();
    h.send_text(1, "/start").await;
    h.messenger.clear();

    assert_eq!(h.send_text(1, "anyone there?").await, Dispatch::Dropped);
    assert_eq!(h.messenger.total(), 0);
}

#[tokio::test]
async fn test_delivery_failure_does_not_fail_dispatch() {
    let mut h = Harness::new();
    h.matched_pair(1, 2).await;
    h.messenger.block(2);

    assert_eq!(h.send_text(1, "are you there").await, Dispatch::Handled("relay"));
    assert!(h.messenger.sent_to(2).is_empty());
    assert!(h.user(1).await.is_matched());
}

// ============================================================================
// Bans
// ============================================================================

#[tokio::test]
async fn test_banned_user_is_short_circuited() {
    let mut h = Harness::new();
    h.send_text(1, "/help").await;
    let until = Utc::now() + Duration::days(3);
    assert!(h.store.ban_until(1, Some(until)).await.unwrap());
    let activity = h.user(1).await.last_activity;
    h.messenger.clear();

    assert_eq!(h.send_text(1, "/start").await, Dispatch::Banned);

    assert_eq!(h.messenger.texts_to(1), vec![notices::banned_until(until)]);
    let user = h.user(1).await;
    assert!(!user.available);
    assert_eq!(user.last_activity, activity);
    assert!(h.match_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_banned_user_cannot_relay_or_report() {
    let mut h = Harness::new();
    h.matched_pair(1, 2).await;
    h.store
        .ban_until(1, Some(Utc::now() + Duration::hours(1)))
        .await
        .unwrap();

    assert_eq!(h.send_text(1, "hello").await, Dispatch::Banned);
    assert_eq!(h.send_text(1, "/report x").await, Dispatch::Banned);
    assert!(h.messenger.sent_to(2).is_empty());
    assert!(h.store.reports().await.is_empty());
}

#[tokio::test]
async fn test_expired_ban_is_ignored() {
    let h = Harness::new();
    h.send_text(1, "/help").await;
    h.store
        .ban_until(1, Some(Utc::now() - Duration::minutes(1)))
        .await
        .unwrap();

    assert_eq!(h.send_text(1, "/help").await, Dispatch::Handled("help"));
}

#[tokio::test]
async fn test_reports_are_stored_for_later_moderation() {
    let h = Harness::new();
    let (subject, _) = h.store.find_or_create(10).await.unwrap();
    let (reporter, _) = h.store.find_or_create(11).await.unwrap();

    let report = assert_ok!(
        h.store
            .create_report(subject.id, reporter.id, "offensive language")
            .await
    );
    assert_eq!(report.user_id, subject.id);
    assert_eq!(h.store.reports().await.len(), 1);
}
