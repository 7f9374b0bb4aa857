//! Single-writer sequencer around the [`ResolutionEngine`].
//!
//! The engine is owned by one tokio task. Callers hold a cloneable
//! [`SequencerHandle`] and talk to it over an `mpsc` channel; each command
//! carries a `oneshot` sender for its reply. Commands therefore execute one at
//! a time, in arrival order.
//!
//! The sequencer also owns the notion of "now": a command may carry its own
//! timestamp (journal replay) or use the injected clock, and the effective
//! time never moves backwards. On start the floor is the latest time the
//! store has recorded (claim creation or flip), so the guarantee holds across
//! restarts for everything that left a timestamp behind.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use counterstake_engine::{
    ChallengeReceipt, ChallengeRequest, CreateClaim, CreateReceipt, EngineError, FinalizeReceipt,
    LossReceipt, ResolutionEngine, WithdrawReceipt,
};
use counterstake_types::{Address, Claim, ClaimNum, Clock, CounterstakeParams, Timestamp};

use crate::journal::{Operation, OperationResult};
use crate::NodeError;

type Reply<T> = oneshot::Sender<Result<T, EngineError>>;

/// Messages accepted by the sequencer task.
#[derive(Debug)]
pub enum Command {
    Create {
        req: CreateClaim,
        now: Option<Timestamp>,
        reply: Reply<CreateReceipt>,
    },
    Challenge {
        req: ChallengeRequest,
        now: Option<Timestamp>,
        reply: Reply<ChallengeReceipt>,
    },
    Finalize {
        claim_num: ClaimNum,
        now: Option<Timestamp>,
        reply: Reply<FinalizeReceipt>,
    },
    Withdraw {
        claim_num: ClaimNum,
        beneficiary: Address,
        now: Option<Timestamp>,
        reply: Reply<WithdrawReceipt>,
    },
    AcknowledgeLoss {
        claim_num: ClaimNum,
        staker: Address,
        reply: Reply<LossReceipt>,
    },
    UpdateParams {
        params: CounterstakeParams,
        reply: Reply<()>,
    },
    GetClaim {
        claim_num: ClaimNum,
        reply: Reply<Claim>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Challenge { .. } => "challenge",
            Self::Finalize { .. } => "finalize",
            Self::Withdraw { .. } => "withdraw",
            Self::AcknowledgeLoss { .. } => "acknowledge_loss",
            Self::UpdateParams { .. } => "update_params",
            Self::GetClaim { .. } => "get_claim",
        }
    }
}

/// The task-side state: the engine plus the monotonic clock.
pub struct Sequencer {
    engine: ResolutionEngine,
    clock: Arc<dyn Clock>,
    last_now: Timestamp,
}

impl Sequencer {
    pub fn new(engine: ResolutionEngine, clock: Arc<dyn Clock>) -> Self {
        let last_now = recorded_floor(&engine).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read recorded times, starting from epoch");
            Timestamp::EPOCH
        });
        Self {
            engine,
            clock,
            last_now,
        }
    }

    /// Spawn the sequencer task. The task ends, returning the engine, once
    /// every handle has been dropped.
    pub fn spawn(self, capacity: usize) -> (SequencerHandle, JoinHandle<ResolutionEngine>) {
        let (tx, rx) = mpsc::channel(capacity);
        let task = tokio::spawn(self.run(rx));
        (SequencerHandle { tx }, task)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>) -> ResolutionEngine {
        tracing::info!("sequencer started");
        while let Some(command) = rx.recv().await {
            self.handle(command);
        }
        tracing::info!(last_now = self.last_now.as_secs(), "sequencer stopped");
        self.engine
    }

    /// Effective time for the next command: never earlier than the last one.
    fn tick(&mut self, supplied: Option<Timestamp>) -> Timestamp {
        let candidate = supplied.unwrap_or_else(|| self.clock.now());
        if candidate < self.last_now {
            tracing::debug!(
                supplied = candidate.as_secs(),
                last = self.last_now.as_secs(),
                "clamping timestamp to last seen"
            );
        }
        self.last_now = self.last_now.max(candidate);
        self.last_now
    }

    fn handle(&mut self, command: Command) {
        let name = command.name();
        match command {
            Command::Create { req, now, reply } => {
                let now = self.tick(now);
                respond(name, reply, self.engine.create(req, now));
            }
            Command::Challenge { req, now, reply } => {
                let now = self.tick(now);
                respond(name, reply, self.engine.challenge(req, now));
            }
            Command::Finalize {
                claim_num,
                now,
                reply,
            } => {
                let now = self.tick(now);
                respond(name, reply, self.engine.finalize(claim_num, now));
            }
            Command::Withdraw {
                claim_num,
                beneficiary,
                now,
                reply,
            } => {
                let now = self.tick(now);
                respond(
                    name,
                    reply,
                    self.engine.withdraw(claim_num, &beneficiary, now),
                );
            }
            Command::AcknowledgeLoss {
                claim_num,
                staker,
                reply,
            } => {
                respond(name, reply, self.engine.acknowledge_loss(claim_num, &staker));
            }
            Command::UpdateParams { params, reply } => {
                respond(name, reply, self.engine.update_params(params));
            }
            Command::GetClaim { claim_num, reply } => {
                respond(name, reply, self.engine.claim(claim_num));
            }
        }
    }
}

/// Latest time recorded in the store: the newest claim's creation and the
/// start of the current period of every open claim.
fn recorded_floor(engine: &ResolutionEngine) -> Result<Timestamp, EngineError> {
    let mut nums = engine.ongoing_claim_nums()?;
    let last = engine.last_claim_num()?;
    if last > 0 {
        nums.push(last);
    }
    let mut floor = Timestamp::EPOCH;
    for claim_num in nums {
        let claim = engine.claim(claim_num)?;
        floor = floor.max(claim.created_ts).max(claim.period_start());
    }
    Ok(floor)
}

fn respond<T>(name: &'static str, reply: Reply<T>, result: Result<T, EngineError>) {
    if let Err(e) = &result {
        tracing::warn!(op = name, kind = ?e.kind(), error = %e, "operation rejected");
    }
    // The caller may have given up waiting; the operation stands regardless.
    let _ = reply.send(result);
}

/// Cloneable client of the sequencer task.
#[derive(Clone, Debug)]
pub struct SequencerHandle {
    tx: mpsc::Sender<Command>,
}

impl SequencerHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, NodeError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| NodeError::SequencerClosed)?;
        let result = rx.await.map_err(|_| NodeError::SequencerClosed)?;
        Ok(result?)
    }

    pub async fn create(
        &self,
        req: CreateClaim,
        now: Option<Timestamp>,
    ) -> Result<CreateReceipt, NodeError> {
        self.request(|reply| Command::Create { req, now, reply })
            .await
    }

    pub async fn challenge(
        &self,
        req: ChallengeRequest,
        now: Option<Timestamp>,
    ) -> Result<ChallengeReceipt, NodeError> {
        self.request(|reply| Command::Challenge { req, now, reply })
            .await
    }

    pub async fn finalize(
        &self,
        claim_num: ClaimNum,
        now: Option<Timestamp>,
    ) -> Result<FinalizeReceipt, NodeError> {
        self.request(|reply| Command::Finalize {
            claim_num,
            now,
            reply,
        })
        .await
    }

    pub async fn withdraw(
        &self,
        claim_num: ClaimNum,
        beneficiary: Address,
        now: Option<Timestamp>,
    ) -> Result<WithdrawReceipt, NodeError> {
        self.request(|reply| Command::Withdraw {
            claim_num,
            beneficiary,
            now,
            reply,
        })
        .await
    }

    pub async fn acknowledge_loss(
        &self,
        claim_num: ClaimNum,
        staker: Address,
    ) -> Result<LossReceipt, NodeError> {
        self.request(|reply| Command::AcknowledgeLoss {
            claim_num,
            staker,
            reply,
        })
        .await
    }

    pub async fn update_params(&self, params: CounterstakeParams) -> Result<(), NodeError> {
        self.request(|reply| Command::UpdateParams { params, reply })
            .await
    }

    pub async fn claim(&self, claim_num: ClaimNum) -> Result<Claim, NodeError> {
        self.request(|reply| Command::GetClaim { claim_num, reply })
            .await
    }

    /// Run one journal operation.
    pub async fn execute(
        &self,
        op: Operation,
        now: Option<Timestamp>,
    ) -> Result<OperationResult, NodeError> {
        Ok(match op {
            Operation::Create(req) => OperationResult::Created(self.create(req, now).await?),
            Operation::Challenge(req) => {
                OperationResult::Challenged(self.challenge(req, now).await?)
            }
            Operation::Finalize { claim_num } => {
                OperationResult::Finalized(self.finalize(claim_num, now).await?)
            }
            Operation::Withdraw {
                claim_num,
                beneficiary,
            } => OperationResult::Withdrawn(self.withdraw(claim_num, beneficiary, now).await?),
            Operation::AcknowledgeLoss { claim_num, staker } => {
                OperationResult::LossAcknowledged(self.acknowledge_loss(claim_num, staker).await?)
            }
            Operation::UpdateParams(params) => {
                self.update_params(params).await?;
                OperationResult::ParamsUpdated
            }
            Operation::GetClaim { claim_num } => {
                OperationResult::Claim(self.claim(claim_num).await?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use counterstake_engine::{Asset, ErrorKind};
    use counterstake_nullables::{NullClock, NullPriceProvider, NullSettlement, NullStore};
    use counterstake_types::Outcome;

    const HOUR: u64 = 3600;
    const T0: u64 = 1_700_000_000;

    struct Fixture {
        handle: SequencerHandle,
        task: JoinHandle<ResolutionEngine>,
        clock: Arc<NullClock>,
        settlement: Arc<NullSettlement>,
    }

    fn spawn() -> Fixture {
        let clock = Arc::new(NullClock::new(T0));
        let settlement = Arc::new(NullSettlement::new());
        let params = CounterstakeParams {
            challenging_periods: vec![12 * HOUR, 72 * HOUR],
            large_challenging_periods: vec![72 * HOUR, 168 * HOUR],
            ..Default::default()
        };
        let engine = ResolutionEngine::new(
            Arc::new(NullStore::new()),
            Arc::new(NullPriceProvider::parity()),
            settlement.clone(),
            params,
        )
        .unwrap();
        let (handle, task) = Sequencer::new(engine, clock.clone()).spawn(16);
        Fixture {
            handle,
            task,
            clock,
            settlement,
        }
    }

    fn request(txid: &str) -> CreateClaim {
        CreateClaim {
            sender_address: Address::new("sender"),
            recipient_address: Address::new("recipient"),
            claimant_address: Address::new("recipient"),
            txid: txid.to_string(),
            txts: Timestamp::new(T0 - HOUR),
            amount: 10,
            reward: 0,
            data: String::new(),
            stake: 10,
        }
    }

    #[tokio::test]
    async fn clock_supplies_now_when_command_has_none() {
        let f = spawn();
        f.handle.create(request("tx"), None).await.unwrap();
        let claim = f.handle.claim(1).await.unwrap();
        assert_eq!(claim.created_ts, Timestamp::new(T0));
        assert_eq!(claim.expiry_ts, Timestamp::new(T0 + 12 * HOUR));
    }

    #[tokio::test]
    async fn time_never_moves_backwards() {
        let f = spawn();
        f.handle.create(request("a"), None).await.unwrap();
        f.clock.advance(12 * HOUR);
        f.handle.create(request("b"), None).await.unwrap();

        // Claim 1 expired at T0 + 12h; an earlier supplied time is clamped.
        let err = f
            .handle
            .challenge(
                ChallengeRequest {
                    claim_num: 1,
                    staker: Address::new("alice"),
                    outcome: Outcome::No,
                    stake: 15,
                },
                Some(Timestamp::new(T0 + HOUR)),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NodeError::Engine(EngineError::ChallengingPeriodExpired)
        ));
    }

    #[tokio::test]
    async fn engine_errors_pass_through_unchanged() {
        let f = spawn();
        let err = f.handle.finalize(9, None).await.unwrap_err();
        match err {
            NodeError::Engine(e) => {
                assert_eq!(e.kind(), ErrorKind::State);
                assert_eq!(e.to_string(), "no such claim");
            }
            other => panic!("expected engine error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn journal_operations_run_in_order() {
        let f = spawn();
        let t = |h: u64| Some(Timestamp::new(T0 + h * HOUR));

        let ops = vec![
            (Operation::Create(request("tx")), t(0)),
            (
                Operation::Challenge(ChallengeRequest {
                    claim_num: 1,
                    staker: Address::new("alice"),
                    outcome: Outcome::No,
                    stake: 20,
                }),
                t(1),
            ),
            (
                Operation::Withdraw {
                    claim_num: 1,
                    beneficiary: Address::new("alice"),
                },
                t(73),
            ),
            (
                Operation::AcknowledgeLoss {
                    claim_num: 1,
                    staker: Address::new("recipient"),
                },
                None,
            ),
        ];

        let mut results = Vec::new();
        for (op, now) in ops {
            results.push(f.handle.execute(op, now).await.unwrap());
        }

        match &results[1] {
            OperationResult::Challenged(r) => {
                assert!(r.flipped);
                assert_eq!(r.accepted, 15);
                assert_eq!(r.refunded, 5);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &results[2] {
            OperationResult::Withdrawn(r) => {
                assert_eq!(r.payout, 25);
                assert_eq!(r.message.as_deref(), Some("finished claim 1"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            &results[3],
            OperationResult::LossAcknowledged(r) if r.forfeited == 10
        ));
        assert_eq!(
            f.settlement
                .released_to(&Address::new("alice"), Asset::Bonding),
            25
        );
    }

    #[tokio::test]
    async fn params_update_is_sequenced() {
        let f = spawn();
        let bad = CounterstakeParams {
            counterstake_coef: counterstake_types::Ratio::ONE,
            ..Default::default()
        };
        assert!(matches!(
            f.handle.update_params(bad).await,
            Err(NodeError::Engine(EngineError::InvalidParams(_)))
        ));

        let good = CounterstakeParams {
            counterstake_coef: "2".parse().unwrap(),
            ..Default::default()
        };
        f.handle.update_params(good).await.unwrap();
        let receipt = f.handle.create(request("tx"), None).await.unwrap();
        assert_eq!(receipt.challenging_target, 20);
    }

    #[tokio::test]
    async fn restart_resumes_from_recorded_time() {
        let mut engine = ResolutionEngine::new(
            Arc::new(NullStore::new()),
            Arc::new(NullPriceProvider::parity()),
            Arc::new(NullSettlement::new()),
            CounterstakeParams {
                challenging_periods: vec![12 * HOUR, 72 * HOUR],
                large_challenging_periods: vec![72 * HOUR, 168 * HOUR],
                ..Default::default()
            },
        )
        .unwrap();
        engine.create(request("a"), Timestamp::new(T0)).unwrap();
        engine
            .challenge(
                ChallengeRequest {
                    claim_num: 1,
                    staker: Address::new("alice"),
                    outcome: Outcome::No,
                    stake: 15,
                },
                Timestamp::new(T0 + HOUR),
            )
            .unwrap();

        // A clock stuck at the epoch must not take time back before the flip.
        let (handle, _task) = Sequencer::new(engine, Arc::new(NullClock::new(0))).spawn(4);
        let receipt = handle.create(request("b"), None).await.unwrap();
        let claim = handle.claim(receipt.claim_num).await.unwrap();
        assert_eq!(claim.created_ts, Timestamp::new(T0 + HOUR));
    }

    #[tokio::test]
    async fn dropping_all_handles_returns_the_engine() {
        let f = spawn();
        let second = f.handle.clone();
        second.create(request("tx"), None).await.unwrap();
        drop(second);
        drop(f.handle);
        let engine = f.task.await.unwrap();
        assert_eq!(engine.last_claim_num().unwrap(), 1);
    }
}
