// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end chat flows against the SQLite store.

use std::sync::Arc;

use courierlink_chat::{
    ButtonAction, ChatStarter, ContactRequest, ConversationView, MessageSender, StartChatButton,
};
use courierlink_core::{CourierlinkError, MatchStore, PlanTier, UserId};
use courierlink_plans::gate::GateState;
use courierlink_plans::{Dismissal, WarningBanner, format_remaining, plan_status};
use courierlink_test_utils::{MockSession, TestHarness};

async fn harness() -> TestHarness {
    TestHarness::builder()
        .with_courier("cou", "Elif Arslan")
        .with_business("biz", "Boğaziçi Cafe", PlanTier::Free)
        .with_business("vip", "Marmara Restoran", PlanTier::Premium)
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn free_business_runs_out_after_two_messages() {
    let h = harness().await;
    let session = Arc::new(MockSession::signed_in("biz"));
    let starter = ChatStarter::new(h.storage.clone(), session.clone(), &h.config.gate);
    let sender = MessageSender::new(h.storage.clone(), session.clone());

    let start = starter.start(&ContactRequest::courier("cou")).await.unwrap();
    let conv = start.conversation.id.clone();

    sender.send(&conv, "Merhaba, akşam müsait misiniz?").await.unwrap();
    let second = sender.send(&conv, "Saat 18:00").await.unwrap();
    let banner = WarningBanner::for_state(second.gate, &Dismissal::default()).unwrap();
    assert!(banner.body.contains('1'));

    let err = sender.send(&conv, "Cevap?").await.unwrap_err();
    assert!(matches!(err, CourierlinkError::QuotaExhausted { .. }));

    let status = plan_status(
        &h.storage
            .get_business_plan_status(&UserId::from("biz"))
            .await
            .unwrap()
            .unwrap(),
    );
    assert_eq!(status.messages_left, 0);
    assert_eq!(format_remaining(status.messages_left, status.daily_message_limit), "0 / 2");

    // Courier replies are never metered.
    session.sign_in("cou").await;
    sender.send(&conv, "Evet, müsaitim").await.unwrap();
    assert_eq!(sender.history(&conv, None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn premium_business_shows_unlimited() {
    let h = harness().await;
    let session = Arc::new(MockSession::signed_in("vip"));
    let starter = ChatStarter::new(h.storage.clone(), session.clone(), &h.config.gate);
    let sender = MessageSender::new(h.storage.clone(), session);

    let start = starter.start(&ContactRequest::courier("cou")).await.unwrap();
    for i in 0..25 {
        let sent = sender.send(&start.conversation.id, &format!("mesaj {i}")).await.unwrap();
        assert_eq!(sent.gate, GateState::Allowed);
    }
    let status = plan_status(
        &h.storage
            .get_business_plan_status(&UserId::from("vip"))
            .await
            .unwrap()
            .unwrap(),
    );
    assert_eq!(status.messages_sent_today, 25);
    assert_eq!(
        format_remaining(status.messages_left, status.daily_message_limit),
        "Sınırsız"
    );
}

#[tokio::test]
async fn courier_view_follows_the_feed() {
    let h = harness().await;
    let biz_session = Arc::new(MockSession::signed_in("biz"));
    let starter = ChatStarter::new(h.storage.clone(), biz_session.clone(), &h.config.gate);
    let conv = starter
        .start(&ContactRequest::courier("cou"))
        .await
        .unwrap()
        .conversation;

    let (mut view, mut subscription) =
        ConversationView::open(h.storage.as_ref(), h.bus.as_ref(), conv.id.clone(), None)
            .await
            .unwrap();
    assert!(view.messages().is_empty());

    let biz = MessageSender::new(h.storage.clone(), biz_session);
    biz.send(&conv.id, "Paket hazır").await.unwrap();
    assert_eq!(view.catch_up(&mut subscription), 1);
    assert_eq!(view.unread_for(&UserId::from("cou")), 1);

    let cou = MessageSender::new(h.storage.clone(), Arc::new(MockSession::signed_in("cou")));
    cou.mark_read(&conv.id).await.unwrap();
    view.catch_up(&mut subscription);
    assert_eq!(view.unread_for(&UserId::from("cou")), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_starts_from_both_sides_converge() {
    let h = harness().await;
    let from_business = ChatStarter::new(
        h.storage.clone(),
        Arc::new(MockSession::signed_in("vip")),
        &h.config.gate,
    );
    let from_courier = ChatStarter::new(
        h.storage.clone(),
        Arc::new(MockSession::signed_in("cou")),
        &h.config.gate,
    );

    let mut handles = Vec::new();
    for i in 0..6 {
        let (starter, request) = if i % 2 == 0 {
            (from_business.clone(), ContactRequest::courier("cou"))
        } else {
            (from_courier.clone(), ContactRequest::business("vip"))
        };
        handles.push(tokio::spawn(async move { starter.start(&request).await }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().conversation.id);
    }
    ids.dedup();
    assert_eq!(ids.len(), 1, "every start resolves to one conversation");
    assert_eq!(
        h.storage
            .list_conversations(&UserId::from("cou"))
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn enforced_inbound_policy_routes_to_notice() {
    let h = TestHarness::builder()
        .with_courier("cou", "Elif")
        .with_business("biz", "Boğaziçi Cafe", PlanTier::Standard)
        .enforcing_inbound_requests()
        .build()
        .await
        .unwrap();

    let starter = ChatStarter::new(
        h.storage.clone(),
        Arc::new(MockSession::signed_in("cou")),
        &h.config.gate,
    );
    let button = StartChatButton::new(starter, ContactRequest::business("biz"), &h.config.gate);
    match button.click().await {
        Some(ButtonAction::ShowNotice(notice)) => {
            assert!(notice.message.contains("talep kabul etmiyor"))
        }
        other => panic!("unexpected action: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sends_cannot_overrun_the_daily_limit() {
    let h = harness().await;
    let session = Arc::new(MockSession::signed_in("biz"));
    let starter = ChatStarter::new(h.storage.clone(), session.clone(), &h.config.gate);
    let sender = MessageSender::new(h.storage.clone(), session);

    let conv = starter
        .start(&ContactRequest::courier("cou"))
        .await
        .unwrap()
        .conversation;
    sender.send(&conv.id, "Merhaba").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let sender = sender.clone();
        let conv = conv.id.clone();
        handles.push(tokio::spawn(async move {
            sender.send(&conv, &format!("acil {i}")).await
        }));
    }

    let mut sent = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => sent += 1,
            Err(CourierlinkError::QuotaExhausted { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(sent, 1);

    let record = h
        .storage
        .get_business_plan_status(&UserId::from("biz"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.messages_sent_today, 2);
    assert_eq!(sender.history(&conv.id, None).await.unwrap().len(), 2);
}
