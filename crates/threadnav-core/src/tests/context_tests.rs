use super::{PerfStats, PreparedRefresh, ReconciliationContext};
use crate::config::NavigatorConfig;
use crate::document::HostDocument;
use crate::identity::MessageId;
use crate::memory::MemoryDocument;
use crate::mutation::MutationSource;
use crate::reconciler::{ReconcileOutcome, RenderPlan};
use crate::render_key::DisplayMode;
use crate::scheduler::SchedulerState;
use crate::test_support::{context, Conversation, CountingTarget, FakeHost};

/// Delivers pending records, then fires whatever the host has armed.
fn drive(
    ctx: &mut ReconciliationContext,
    doc: &mut MemoryDocument,
    host: &FakeHost,
    target: &mut CountingTarget,
) -> Option<ReconcileOutcome> {
    let records = doc.take_records();
    if !records.is_empty() {
        ctx.deliver(&*doc, &records);
    }
    ctx.pump(host);
    if let Some(timer) = host.fire_timer() {
        ctx.on_timer(host, timer);
    }
    let frame = host.fire_frame()?;
    if !ctx.on_frame(frame) {
        return None;
    }
    let prepared = ctx.prepare(&*doc);
    Some(ctx.commit(prepared, target).unwrap())
}

fn started(conversation: &mut Conversation) -> ReconciliationContext {
    let ctx = context();
    let root = ctx.observe_root(&conversation.doc).unwrap();
    conversation.doc.observe(root, ctx.observe_options());
    ctx
}

#[test]
fn observes_main_when_present_else_body() {
    let conversation = Conversation::new();
    let ctx = context();
    assert_eq!(ctx.observe_root(&conversation.doc), Some(conversation.main));

    let bare = MemoryDocument::new();
    assert_eq!(ctx.observe_root(&bare), Some(bare.body()));
}

#[test]
fn empty_document_prepares_nothing() {
    let mut ctx = context();
    let doc = MemoryDocument::new();
    assert_eq!(ctx.prepare(&doc), PreparedRefresh::Empty);
    assert_eq!(ctx.stats().refreshes, 1);
    assert!(ctx.identities().is_empty());
}

#[test]
fn three_messages_inserted_at_once() {
    let mut conversation = Conversation::new();
    let mut ctx = started(&mut conversation);
    let host = FakeHost::default();
    let mut target = CountingTarget::default();

    conversation.push("user", "First question");
    conversation.push("assistant", "First answer");
    conversation.push("user", "Second question");
    let outcome = drive(&mut ctx, &mut conversation.doc, &host, &mut target);

    assert_eq!(outcome, Some(ReconcileOutcome::Rebuilt { entries: 3 }));
    let indices: Vec<usize> = target.list.iter().map(|e| e.display_index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
    let ids: Vec<&str> = target.list.iter().map(|e| e.identity.as_str()).collect();
    assert_eq!(ids, vec!["ctn-0", "ctn-1", "ctn-2"]);
    assert_eq!(host.timers_armed(), 1);
}

#[test]
fn mode_switch_rebuilds_without_mutation() {
    let mut conversation =
        Conversation::with_turns(&[("user", "Q1"), ("assistant", "A1"), ("user", "Q2")]);
    let mut ctx = started(&mut conversation);
    let host = FakeHost::default();
    let mut target = CountingTarget::default();
    ctx.schedule_immediate(&host);
    drive(&mut ctx, &mut conversation.doc, &host, &mut target);
    let before = ctx.last_key().cloned().unwrap();

    ctx.set_mode(DisplayMode::UserOnly, &host);
    assert_eq!(ctx.scheduler_state(), SchedulerState::Queued);
    let outcome = drive(&mut ctx, &mut conversation.doc, &host, &mut target);

    assert_eq!(outcome, Some(ReconcileOutcome::Rebuilt { entries: 2 }));
    assert_ne!(ctx.last_key(), Some(&before));
    assert_eq!(ctx.mode(), DisplayMode::UserOnly);
    assert_eq!(host.timers_armed(), 0);
    assert_eq!(ctx.stats().full_renders, 2);
}

#[test]
fn streaming_five_appends_is_one_patch() {
    let mut conversation = Conversation::with_turns(&[("user", "Tell me"), ("assistant", "")]);
    let mut ctx = started(&mut conversation);
    let host = FakeHost::default();
    let mut target = CountingTarget::default();
    ctx.schedule_immediate(&host);
    drive(&mut ctx, &mut conversation.doc, &host, &mut target);
    ctx.reset_stats();

    let text = conversation.turns[1].text;
    for chunk in ["Once", " upon", " a", " time", " there"] {
        conversation.doc.push_text(text, chunk);
        let records = conversation.doc.take_records();
        let classification = ctx.deliver(&conversation.doc, &records);
        assert!(classification.text_changed);
        ctx.pump(&host);
    }
    assert_eq!(host.timers_armed(), 1);
    assert!(ctx.dirty().contains(&MessageId::from("ctn-1")));

    let outcome = drive(&mut ctx, &mut conversation.doc, &host, &mut target);

    assert_eq!(outcome, Some(ReconcileOutcome::Patched { entries: 1 }));
    assert_eq!(
        ctx.stats(),
        PerfStats {
            refreshes: 1,
            full_renders: 0,
            patches: 1
        }
    );
    assert_eq!(target.titles()[1], "Once upon a time there");
    assert!(ctx.dirty().is_empty());
    assert!(!ctx.is_forced());
    assert_eq!(ctx.scheduler_state(), SchedulerState::Idle);
}

#[test]
fn bursts_inside_the_window_coalesce() {
    let mut conversation = Conversation::new();
    let mut ctx = started(&mut conversation);
    let host = FakeHost::default();
    let mut target = CountingTarget::default();

    for n in 0..6 {
        conversation.push(if n % 2 == 0 { "user" } else { "assistant" }, "turn");
        let records = conversation.doc.take_records();
        ctx.deliver(&conversation.doc, &records);
        ctx.pump(&host);
    }
    assert_eq!(ctx.scheduler_state(), SchedulerState::Pending);

    let outcome = drive(&mut ctx, &mut conversation.doc, &host, &mut target);
    assert_eq!(outcome, Some(ReconcileOutcome::Rebuilt { entries: 6 }));
    assert_eq!(ctx.stats().refreshes, 1);
    assert_eq!(host.timers_armed(), 1);
    assert_eq!(host.frames_requested(), 1);
}

#[test]
fn overlay_writes_never_reschedule() {
    let mut doc = MemoryDocument::new();
    let body = doc.body();
    let article = doc.append_element(body, "article", &[("data-testid", "conversation-turn")]);
    let role = doc.append_element(article, "div", &[("data-message-author-role", "user")]);
    doc.append_text(role, "hi");
    let panel = doc.append_element(body, "aside", &[("id", "ctn-panel")]);
    let list = doc.append_element(panel, "div", &[("id", "ctn-list")]);

    let mut ctx = context();
    let root = ctx.observe_root(&doc).unwrap();
    assert_eq!(root, body);
    doc.observe(root, ctx.observe_options());

    let host = FakeHost::default();
    let item = doc.create_element("button");
    let label = doc.create_text("1. hi");
    doc.append_child(item, label);
    doc.replace_children(list, vec![item]);
    doc.push_text(label, "!");
    doc.set_attribute(item, "data-testid", "nav-item");

    let records = doc.take_records();
    assert!(!records.is_empty());
    let classification = ctx.deliver(&doc, &records);
    assert!(!classification.relevant);
    assert_eq!(ctx.pump(&host), 0);
    assert_eq!(ctx.scheduler_state(), SchedulerState::Idle);
    assert_eq!(host.timers_armed(), 0);
}

#[test]
fn irrelevant_batches_leave_state_alone() {
    let mut conversation = Conversation::with_turns(&[("user", "Q")]);
    let mut ctx = started(&mut conversation);
    let host = FakeHost::default();
    conversation
        .doc
        .set_attribute(conversation.turns[0].article, "class", "hovered");

    let records = conversation.doc.take_records();
    assert!(records.is_empty());
    assert_eq!(ctx.pump(&host), 0);
    assert!(ctx.dirty().is_empty());
}

#[test]
fn removed_message_loses_its_identity() {
    let mut conversation = Conversation::with_turns(&[("user", "Q"), ("assistant", "A")]);
    let mut ctx = started(&mut conversation);
    let host = FakeHost::default();
    let mut target = CountingTarget::default();
    ctx.schedule_immediate(&host);
    drive(&mut ctx, &mut conversation.doc, &host, &mut target);

    let gone = conversation.turns[1].article;
    conversation.doc.destroy(gone);
    let outcome = drive(&mut ctx, &mut conversation.doc, &host, &mut target);

    assert_eq!(outcome, Some(ReconcileOutcome::Rebuilt { entries: 1 }));
    assert_eq!(ctx.resolve(&MessageId::from("ctn-1")), None);
    assert_eq!(ctx.identities().len(), 1);
    assert!(!conversation.doc.is_alive(gone));
}

#[test]
fn hidden_panel_skips_rendering_and_catches_up_on_show() {
    let mut conversation = Conversation::with_turns(&[("user", "Q")]);
    let mut ctx = started(&mut conversation);
    let host = FakeHost::default();
    let mut target = CountingTarget::default();
    ctx.schedule_immediate(&host);
    drive(&mut ctx, &mut conversation.doc, &host, &mut target);

    ctx.set_hidden(true, &host);
    conversation.push("assistant", "A");
    conversation.doc.take_records();
    ctx.schedule_immediate(&host);
    let frame = host.fire_frame().unwrap();
    assert!(ctx.on_frame(frame));
    assert_eq!(ctx.prepare(&conversation.doc), PreparedRefresh::Suspended);
    assert_eq!(ctx.identities().len(), 2);
    assert!(ctx.last_key().is_none());
    assert_eq!(target.list.len(), 1);

    ctx.set_hidden(false, &host);
    assert_eq!(ctx.scheduler_state(), SchedulerState::Queued);
    let outcome = drive(&mut ctx, &mut conversation.doc, &host, &mut target);
    assert_eq!(outcome, Some(ReconcileOutcome::Rebuilt { entries: 2 }));
}

#[test]
fn collapsed_dots_follow_the_visible_set() {
    let mut conversation = Conversation::with_turns(&[("user", "Q"), ("assistant", "A")]);
    let mut ctx = started(&mut conversation);
    let host = FakeHost::default();
    let mut target = CountingTarget::default();
    ctx.schedule_immediate(&host);
    drive(&mut ctx, &mut conversation.doc, &host, &mut target);

    let entries = ctx.prepare_collapsed(&conversation.doc);
    ctx.commit_collapsed(&entries, &mut target).unwrap();

    assert_eq!(target.dot_rebuilds, 2);
    assert_eq!(target.dots.len(), 2);
    assert_eq!(target.dots[0].text.preview, "Q");
}

#[test]
fn prepare_then_skip_when_nothing_changed() {
    let conversation = Conversation::with_turns(&[("user", "Q")]);
    let mut ctx = context();
    let mut target = CountingTarget::default();
    ctx.refresh(&conversation.doc, &mut target).unwrap();

    match ctx.prepare(&conversation.doc) {
        PreparedRefresh::Render(RenderPlan::Skip) => {}
        other => panic!("expected a skip, got {other:?}"),
    }
}

#[test]
fn teardown_cancels_and_forgets() {
    let mut conversation = Conversation::with_turns(&[("user", "Q")]);
    let mut ctx = started(&mut conversation);
    let host = FakeHost::default();
    let mut target = CountingTarget::default();
    ctx.refresh(&conversation.doc, &mut target).unwrap();
    conversation.push("assistant", "A");
    let records = conversation.doc.take_records();
    ctx.deliver(&conversation.doc, &records);
    ctx.pump(&host);
    assert_eq!(host.live_timers(), 1);

    ctx.teardown(&host);

    assert_eq!(host.live_timers(), 0);
    assert_eq!(ctx.scheduler_state(), SchedulerState::Idle);
    assert!(ctx.identities().is_empty());
    assert!(ctx.last_key().is_none());
    assert!(ctx.render_index().is_empty());
    assert_eq!(ctx.stats(), PerfStats::default());

    ctx.refresh(&conversation.doc, &mut target).unwrap();
    let ids: Vec<&str> = target.list.iter().map(|e| e.identity.as_str()).collect();
    assert_eq!(ids, vec!["ctn-1", "ctn-2"]);
}

#[test]
fn bad_config_is_reported() {
    let config = NavigatorConfig {
        container_selector: "article,".to_string(),
        ..NavigatorConfig::default()
    };
    assert!(ReconciliationContext::new(&config).is_err());
}
