use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use threadnav_core::{MutationSource, NavigatorConfig, ReconciliationContext};
use threadnav_testing::prelude::*;
use threadnav_ui::RecordingRenderTarget;

const TURN_SAMPLES: &[usize] = &[10, 50, 200];
const WORDS_PER_TURN: usize = 60;

struct ReconcileFixture {
    conversation: ConversationFixture,
    context: ReconciliationContext,
    target: RecordingRenderTarget,
    host: HostLoop<ManualClock>,
}

impl ReconcileFixture {
    fn new(turns: usize) -> Self {
        let mut conversation = ConversationFixture::new();
        for index in 0..turns {
            let role = if index % 2 == 0 { "user" } else { "assistant" };
            conversation.push(role, &lorem(WORDS_PER_TURN));
        }
        let context = ReconciliationContext::new(&NavigatorConfig::default()).expect("config");
        {
            let mut doc = conversation.document().borrow_mut();
            let root = context.observe_root(&*doc).expect("observe root");
            doc.observe(root, context.observe_options());
        }
        let mut fixture = Self {
            conversation,
            context,
            target: RecordingRenderTarget::new(),
            host: HostLoop::new(ManualClock::new()),
        };
        fixture.refresh();
        fixture
    }

    fn refresh(&mut self) {
        let doc = self.conversation.document().borrow();
        self.context
            .refresh(&*doc, &mut self.target)
            .expect("render");
    }

    /// One streamed chunk into the last turn, classified and reconciled.
    fn stream_chunk(&mut self) {
        self.conversation.stream(&[" more"]);
        let records = self.conversation.take_records();
        {
            let doc = self.conversation.document().borrow();
            self.context.deliver(&*doc, &records);
        }
        self.context.pump(&self.host);
        self.refresh();
    }

    /// A structural change: the final turn is removed and pushed again.
    fn reshape(&mut self) {
        let last = self.conversation.turns().len() - 1;
        self.conversation.remove(last);
        self.conversation.push("assistant", "fresh");
        let records = self.conversation.take_records();
        {
            let doc = self.conversation.document().borrow();
            self.context.deliver(&*doc, &records);
        }
        self.context.pump(&self.host);
        self.refresh();
    }
}

fn bench_patch(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_patch");
    for &turns in TURN_SAMPLES {
        group.bench_with_input(BenchmarkId::new("turns", turns), &turns, |b, &turns| {
            let mut fixture = ReconcileFixture::new(turns);
            b.iter(|| {
                fixture.stream_chunk();
                black_box(fixture.context.stats());
            });
        });
    }
    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_rebuild");
    for &turns in TURN_SAMPLES {
        group.bench_with_input(BenchmarkId::new("turns", turns), &turns, |b, &turns| {
            let mut fixture = ReconcileFixture::new(turns);
            b.iter(|| {
                fixture.reshape();
                black_box(fixture.target.len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_patch, bench_rebuild);
criterion_main!(benches);
