//! End-to-end scenarios for a single hive:
//! - request/reply through suspended continuations
//! - self-scheduling loops
//! - auto-reply for unknown directives
//! - routing failures
//! - a department's worth of professors and assistants

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::time::timeout;

use waggle::prelude::*;

const SCENARIO_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Shared cast: assistants run errands, professors run experiments, the
// department chair oversees and shuts the hive down when everyone is done.
// ============================================================================

struct Assistant {
    ctx: ActorContext<Self>,
    errands: Arc<AtomicUsize>,
}

impl Assistant {
    fn new(mut ctx: ActorContext<Self>, errands: Arc<AtomicUsize>) -> Self {
        ctx.route("run_errand", Self::run_errand);
        Self { ctx, errands }
    }

    fn run_errand(&mut self, msg: &mut MessageEnvelope) -> HandlerResult<Self> {
        self.errands.fetch_add(1, Ordering::SeqCst);
        msg.reply(json!({ "did_your_grunt_work": true }))?;
        Ok(Flow::Done)
    }
}

impl Actor for Assistant {
    fn context(&self) -> &ActorContext<Self> {
        &self.ctx
    }
    fn context_mut(&mut self) -> &mut ActorContext<Self> {
        &mut self.ctx
    }
}

struct Professor {
    ctx: ActorContext<Self>,
    replies: Arc<AtomicUsize>,
    creator: Option<ActorId>,
}

impl Professor {
    fn new(mut ctx: ActorContext<Self>, replies: Arc<AtomicUsize>) -> Self {
        ctx.route("run_experiments", Self::run_experiments);
        Self {
            ctx,
            replies,
            creator: None,
        }
    }

    fn run_experiments(&mut self, msg: &mut MessageEnvelope) -> HandlerResult<Self> {
        self.creator = msg.from_id.clone();
        let assistant = ActorId::from(msg.body.str_field("assistant_id")?);
        let rounds = msg.body.u64_field("numtimes")?;
        self.next_errand(assistant, rounds)
    }

    fn next_errand(&mut self, assistant: ActorId, remaining: u64) -> HandlerResult<Self> {
        if remaining == 0 {
            if let Some(creator) = self.creator.clone() {
                self.ctx
                    .send_message(creator, "experiment_is_done", Value::Null)?;
            }
            return Ok(Flow::Done);
        }

        let wait = self
            .ctx
            .wait_on_message(assistant.clone(), "run_errand", Value::Null)?;
        Ok(Flow::wait_on(wait, move |prof: &mut Self, reply| {
            assert!(reply.body.bool_field("did_your_grunt_work")?);
            prof.replies.fetch_add(1, Ordering::SeqCst);
            prof.next_errand(assistant, remaining - 1)
        }))
    }
}

impl Actor for Professor {
    fn context(&self) -> &ActorContext<Self> {
        &self.ctx
    }
    fn context_mut(&mut self) -> &mut ActorContext<Self> {
        &mut self.ctx
    }
}

struct DepartmentChair {
    ctx: ActorContext<Self>,
    expected: usize,
    completed: usize,
    done: Arc<AtomicUsize>,
    errands: Arc<AtomicUsize>,
    replies: Arc<AtomicUsize>,
}

impl DepartmentChair {
    fn new(
        mut ctx: ActorContext<Self>,
        expected: usize,
        done: Arc<AtomicUsize>,
        errands: Arc<AtomicUsize>,
        replies: Arc<AtomicUsize>,
    ) -> Self {
        ctx.route("oversee_experiments", Self::oversee_experiments);
        ctx.route("experiment_is_done", Self::experiment_is_done);
        Self {
            ctx,
            expected,
            completed: 0,
            done,
            errands,
            replies,
        }
    }

    fn oversee_experiments(&mut self, msg: &mut MessageEnvelope) -> HandlerResult<Self> {
        let pairs = msg.body.u64_field("pairs")? as usize;
        let rounds = msg.body.u64_field("numtimes")?;
        self.expected = pairs;

        for _ in 0..pairs {
            let errands = Arc::clone(&self.errands);
            let assistant = self
                .ctx
                .hive()
                .create_actor(move |ctx| Assistant::new(ctx, errands))?;

            let replies = Arc::clone(&self.replies);
            let professor = self
                .ctx
                .hive()
                .create_actor(move |ctx| Professor::new(ctx, replies))?;

            self.ctx.send_message(
                professor,
                "run_experiments",
                json!({ "assistant_id": assistant, "numtimes": rounds }),
            )?;
        }
        Ok(Flow::Done)
    }

    fn experiment_is_done(&mut self, _msg: &mut MessageEnvelope) -> HandlerResult<Self> {
        self.completed += 1;
        self.done.fetch_add(1, Ordering::SeqCst);
        if self.completed == self.expected {
            self.ctx.hive().send_shutdown();
        }
        Ok(Flow::Done)
    }
}

impl Actor for DepartmentChair {
    fn context(&self) -> &ActorContext<Self> {
        &self.ctx
    }
    fn context_mut(&mut self) -> &mut ActorContext<Self> {
        &mut self.ctx
    }
}

struct Counters {
    done: Arc<AtomicUsize>,
    errands: Arc<AtomicUsize>,
    replies: Arc<AtomicUsize>,
}

impl Counters {
    fn new() -> Self {
        Self {
            done: Arc::new(AtomicUsize::new(0)),
            errands: Arc::new(AtomicUsize::new(0)),
            replies: Arc::new(AtomicUsize::new(0)),
        }
    }
}

// ============================================================================
// Scenario: one professor, one assistant, one request/reply cycle
// ============================================================================

#[tokio::test]
async fn test_coroutine_ping_pong() {
    timeout(SCENARIO_TIMEOUT, async {
        let mut hive = Hive::new();
        let counters = Counters::new();

        let errands = Arc::clone(&counters.errands);
        let assistant = hive
            .create_actor(move |ctx| Assistant::new(ctx, errands))
            .unwrap();

        let replies = Arc::clone(&counters.replies);
        let professor = hive
            .create_actor(move |ctx| Professor::new(ctx, replies))
            .unwrap();

        let done = Arc::clone(&counters.done);
        let errands = Arc::clone(&counters.errands);
        let replies = Arc::clone(&counters.replies);
        let chair = hive
            .create_actor_with_id("chair", move |ctx| {
                DepartmentChair::new(ctx, 1, done, errands, replies)
            })
            .unwrap();

        hive.send(
            MessageBuilder::new(professor.clone(), "run_experiments")
                .with_from(chair)
                .with_body(json!({ "assistant_id": assistant, "numtimes": 1 })),
        )
        .unwrap();
        hive.run().await;

        // exactly three envelopes did the work: request, reply, completion
        assert_eq!(counters.errands.load(Ordering::SeqCst), 1);
        assert_eq!(counters.replies.load(Ordering::SeqCst), 1);
        assert_eq!(counters.done.load(Ordering::SeqCst), 1);

        // nothing left suspended anywhere
        let waiting = hive
            .with_actor::<Professor, _>(&professor, |prof| prof.context().waiting_count())
            .unwrap();
        assert_eq!(waiting, 0);
    })
    .await
    .unwrap();
}

// ============================================================================
// Scenario: self-loop via wait_on_self
// ============================================================================

struct Looper {
    ctx: ActorContext<Self>,
    count: u64,
    target: u64,
}

impl Looper {
    fn new(mut ctx: ActorContext<Self>, target: u64) -> Self {
        ctx.route("spin", Self::spin);
        Self {
            ctx,
            count: 0,
            target,
        }
    }

    fn spin(&mut self, _msg: &mut MessageEnvelope) -> HandlerResult<Self> {
        self.step()
    }

    fn step(&mut self) -> HandlerResult<Self> {
        if self.count >= self.target {
            self.ctx.hive().send_shutdown();
            return Ok(Flow::Done);
        }
        self.count += 1;
        let wait = self.ctx.wait_on_self()?;
        Ok(Flow::wait_on(wait, |looper: &mut Self, _msg| looper.step()))
    }
}

impl Actor for Looper {
    fn context(&self) -> &ActorContext<Self> {
        &self.ctx
    }
    fn context_mut(&mut self) -> &mut ActorContext<Self> {
        &mut self.ctx
    }
}

#[tokio::test]
async fn test_wait_on_self_loop_runs_exactly_to_target() {
    timeout(SCENARIO_TIMEOUT, async {
        let mut hive = Hive::new();
        let looper = hive.create_actor(|ctx| Looper::new(ctx, 100)).unwrap();

        hive.send_message(looper.clone(), "spin", Value::Null).unwrap();
        hive.run().await;

        let (count, waiting) = hive
            .with_actor::<Looper, _>(&looper, |looper| {
                (looper.count, looper.context().waiting_count())
            })
            .unwrap();
        assert_eq!(count, 100);
        assert_eq!(waiting, 0);
        assert_eq!(hive.pending(), 0);
    })
    .await
    .unwrap();
}

// ============================================================================
// Scenarios: unknown directive, routing failure, deferred replies
// ============================================================================

/// Sends one `wants_reply` probe and records what comes back.
struct Prober {
    ctx: ActorContext<Self>,
    outcomes: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Prober {
    fn new(mut ctx: ActorContext<Self>, outcomes: Arc<Mutex<Vec<(String, Value)>>>) -> Self {
        ctx.route("probe", Self::probe);
        Self { ctx, outcomes }
    }

    fn probe(&mut self, msg: &mut MessageEnvelope) -> HandlerResult<Self> {
        let target = ActorId::from(msg.body.str_field("target")?);
        let directive = msg.body.str_field("directive")?.to_owned();

        let wait = self.ctx.wait_on_message(target, &directive, Value::Null)?;
        Ok(Flow::wait_on(wait, |prober: &mut Self, reply| {
            prober
                .outcomes
                .lock()
                .push((reply.directive.clone(), reply.body.clone()));
            prober.ctx.hive().send_shutdown();
            Ok(Flow::Done)
        }))
    }
}

impl Actor for Prober {
    fn context(&self) -> &ActorContext<Self> {
        &self.ctx
    }
    fn context_mut(&mut self) -> &mut ActorContext<Self> {
        &mut self.ctx
    }
}

/// Routes nothing at all.
struct Wallflower {
    ctx: ActorContext<Self>,
}

impl Wallflower {
    fn new(ctx: ActorContext<Self>) -> Self {
        Self { ctx }
    }
}

impl Actor for Wallflower {
    fn context(&self) -> &ActorContext<Self> {
        &self.ctx
    }
    fn context_mut(&mut self) -> &mut ActorContext<Self> {
        &mut self.ctx
    }
}

#[tokio::test]
async fn test_unknown_directive_still_gets_auto_reply() {
    timeout(SCENARIO_TIMEOUT, async {
        let mut hive = Hive::new();
        let outcomes = Arc::new(Mutex::new(Vec::new()));

        let wallflower = hive.create_actor(Wallflower::new).unwrap();
        let prober = {
            let outcomes = Arc::clone(&outcomes);
            hive.create_actor(move |ctx| Prober::new(ctx, outcomes))
                .unwrap()
        };

        hive.send_message(
            prober,
            "probe",
            json!({ "target": wallflower, "directive": "no_such_directive" }),
        )
        .unwrap();
        hive.run().await;

        let outcomes = outcomes.lock();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].0, directives::REPLY);
        assert_eq!(outcomes[0].1, Value::Null);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_unknown_remote_hive_produces_no_such_actor_reply() {
    timeout(SCENARIO_TIMEOUT, async {
        let mut hive = Hive::new();
        let outcomes = Arc::new(Mutex::new(Vec::new()));

        let prober = {
            let outcomes = Arc::clone(&outcomes);
            hive.create_actor(move |ctx| Prober::new(ctx, outcomes))
                .unwrap()
        };

        // no ambassador has ever been registered for hive `nowhere`
        hive.send_message(
            prober,
            "probe",
            json!({ "target": "ghost@nowhere", "directive": "anything" }),
        )
        .unwrap();
        hive.run().await;

        let outcomes = outcomes.lock();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].0, directives::ERROR_NO_SUCH_ACTOR);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_missing_actor_produces_no_such_actor_reply() {
    timeout(SCENARIO_TIMEOUT, async {
        let mut hive = Hive::new();
        let outcomes = Arc::new(Mutex::new(Vec::new()));

        let prober = {
            let outcomes = Arc::clone(&outcomes);
            hive.create_actor(move |ctx| Prober::new(ctx, outcomes))
                .unwrap()
        };

        hive.send_message(
            prober,
            "probe",
            json!({ "target": "bogus", "directive": "anything" }),
        )
        .unwrap();
        hive.run().await;

        let outcomes = outcomes.lock();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].0, directives::ERROR_NO_SUCH_ACTOR);
    })
    .await
    .unwrap();
}

/// Defers its reply, reschedules itself, and answers a turn later.
struct SlowAnswerer {
    ctx: ActorContext<Self>,
}

impl SlowAnswerer {
    fn new(mut ctx: ActorContext<Self>) -> Self {
        ctx.route("ask", Self::ask);
        Self { ctx }
    }

    fn ask(&mut self, msg: &mut MessageEnvelope) -> HandlerResult<Self> {
        msg.defer_reply();
        let asker = msg
            .from_id
            .clone()
            .ok_or_else(|| ActorError::other("ask needs a sender"))?;
        let question_id = msg.id().clone();

        let wait = self.ctx.wait_on_self()?;
        Ok(Flow::wait_on(wait, move |answerer: &mut Self, _msg| {
            answerer.ctx.send(
                MessageBuilder::new(asker, directives::REPLY)
                    .with_in_reply_to(question_id)
                    .with_body(json!({ "deferred": true })),
            )?;
            Ok(Flow::Done)
        }))
    }
}

impl Actor for SlowAnswerer {
    fn context(&self) -> &ActorContext<Self> {
        &self.ctx
    }
    fn context_mut(&mut self) -> &mut ActorContext<Self> {
        &mut self.ctx
    }
}

#[tokio::test]
async fn test_defer_reply_suppresses_auto_reply() {
    timeout(SCENARIO_TIMEOUT, async {
        let mut hive = Hive::new();
        let outcomes = Arc::new(Mutex::new(Vec::new()));

        let answerer = hive.create_actor(SlowAnswerer::new).unwrap();
        let prober = {
            let outcomes = Arc::clone(&outcomes);
            hive.create_actor(move |ctx| Prober::new(ctx, outcomes))
                .unwrap()
        };

        hive.send_message(
            prober,
            "probe",
            json!({ "target": answerer, "directive": "ask" }),
        )
        .unwrap();
        hive.run().await;

        // exactly one reply, and it is the deliberate one
        let outcomes = outcomes.lock();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].1, json!({ "deferred": true }));
    })
    .await
    .unwrap();
}

// ============================================================================
// Scenario: 20 professor/assistant pairs, 100 cycles each
// ============================================================================

#[tokio::test]
async fn test_department_of_twenty_runs_two_thousand_errands() {
    timeout(SCENARIO_TIMEOUT, async {
        let mut hive = Hive::new();
        let counters = Counters::new();

        let done = Arc::clone(&counters.done);
        let errands = Arc::clone(&counters.errands);
        let replies = Arc::clone(&counters.replies);
        let chair = hive
            .create_actor(move |ctx| DepartmentChair::new(ctx, 0, done, errands, replies))
            .unwrap();

        hive.send_message(
            chair,
            "oversee_experiments",
            json!({ "pairs": 20, "numtimes": 100 }),
        )
        .unwrap();
        hive.run().await;

        assert_eq!(counters.done.load(Ordering::SeqCst), 20);
        assert_eq!(counters.errands.load(Ordering::SeqCst), 2000);
        assert_eq!(counters.replies.load(Ordering::SeqCst), 2000);
        assert_eq!(hive.pending(), 0);
    })
    .await
    .unwrap();
}

// ============================================================================
// Hive-as-an-actor: ambassador registration rules
// ============================================================================

struct Volunteer {
    ctx: ActorContext<Self>,
}

impl Volunteer {
    fn new(mut ctx: ActorContext<Self>) -> Self {
        ctx.route("volunteer", Self::volunteer);
        ctx.route("withdraw", Self::withdraw);
        Self { ctx }
    }

    fn volunteer(&mut self, msg: &mut MessageEnvelope) -> HandlerResult<Self> {
        let remote = msg.body.str_field("hive_id")?.to_owned();
        self.ctx.send(
            MessageBuilder::new(self.ctx.hive().hive_actor_id(), directives::REGISTER_AMBASSADOR)
                .with_body(json!({ "hive_id": remote })),
        )?;
        self.ctx.hive().send_shutdown();
        Ok(Flow::Done)
    }

    fn withdraw(&mut self, msg: &mut MessageEnvelope) -> HandlerResult<Self> {
        let remote = msg.body.str_field("hive_id")?.to_owned();
        self.ctx.send(
            MessageBuilder::new(
                self.ctx.hive().hive_actor_id(),
                directives::UNREGISTER_AMBASSADOR,
            )
            .with_body(json!({ "hive_id": remote })),
        )?;
        self.ctx.hive().send_shutdown();
        Ok(Flow::Done)
    }
}

impl Actor for Volunteer {
    fn context(&self) -> &ActorContext<Self> {
        &self.ctx
    }
    fn context_mut(&mut self) -> &mut ActorContext<Self> {
        &mut self.ctx
    }
}

#[tokio::test]
async fn test_local_actor_can_register_as_ambassador() {
    timeout(SCENARIO_TIMEOUT, async {
        let mut hive = Hive::new();
        let volunteer = hive.create_actor(Volunteer::new).unwrap();

        hive.send_message(
            volunteer.clone(),
            "volunteer",
            json!({ "hive_id": "far-away-hive" }),
        )
        .unwrap();
        hive.run().await;

        assert_eq!(hive.handle().ambassador_for("far-away-hive"), Some(volunteer));
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_registered_ambassador_can_withdraw_itself() {
    timeout(SCENARIO_TIMEOUT, async {
        let mut hive = Hive::new();
        let volunteer = hive.create_actor(Volunteer::new).unwrap();

        hive.send_message(
            volunteer.clone(),
            "volunteer",
            json!({ "hive_id": "far-away-hive" }),
        )
        .unwrap();
        hive.send_message(
            volunteer.clone(),
            "withdraw",
            json!({ "hive_id": "far-away-hive" }),
        )
        .unwrap();
        hive.run().await;

        assert_eq!(hive.handle().ambassador_for("far-away-hive"), None);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_remote_actor_cannot_register_as_ambassador() {
    timeout(SCENARIO_TIMEOUT, async {
        let mut hive = Hive::new();

        // a forged registration claiming to come from another hive
        hive.send(
            MessageBuilder::new(hive.handle().hive_actor_id(), directives::REGISTER_AMBASSADOR)
                .with_from(ActorId::from("impostor@elsewhere"))
                .with_body(json!({ "hive_id": "elsewhere" })),
        )
        .unwrap();
        hive.send_shutdown();
        hive.run().await;

        assert_eq!(hive.handle().ambassador_for("elsewhere"), None);
    })
    .await
    .unwrap();
}

// ============================================================================
// External futures resume continuations through future_reply
// ============================================================================

struct Futurist {
    ctx: ActorContext<Self>,
    seen: Arc<Mutex<Option<(String, Value)>>>,
}

impl Futurist {
    fn new(mut ctx: ActorContext<Self>, seen: Arc<Mutex<Option<(String, Value)>>>) -> Self {
        ctx.route("compute", Self::compute);
        Self { ctx, seen }
    }

    fn compute(&mut self, _msg: &mut MessageEnvelope) -> HandlerResult<Self> {
        Ok(Flow::await_future(
            async { json!({ "answer": 42 }) },
            |futurist: &mut Self, msg| {
                *futurist.seen.lock() = Some((msg.directive.clone(), msg.body.clone()));
                futurist.ctx.hive().send_shutdown();
                Ok(Flow::Done)
            },
        ))
    }
}

impl Actor for Futurist {
    fn context(&self) -> &ActorContext<Self> {
        &self.ctx
    }
    fn context_mut(&mut self) -> &mut ActorContext<Self> {
        &mut self.ctx
    }
}

#[tokio::test]
async fn test_future_output_arrives_as_future_reply() {
    timeout(SCENARIO_TIMEOUT, async {
        let mut hive = Hive::new();
        let seen = Arc::new(Mutex::new(None));

        let futurist = {
            let seen = Arc::clone(&seen);
            hive.create_actor(move |ctx| Futurist::new(ctx, seen))
                .unwrap()
        };

        hive.send_message(futurist, "compute", Value::Null).unwrap();
        hive.run().await;

        let seen = seen.lock().clone().unwrap();
        assert_eq!(seen.0, directives::FUTURE_REPLY);
        assert_eq!(seen.1, json!({ "answer": 42 }));
    })
    .await
    .unwrap();
}
