use super::challenge::{Challenge, ChallengeGenerator};
use super::error::BlockReason;
use super::payload::{Field, FormPayload, SubmissionResult};

/// Wrong challenge answers tolerated before hosted verification kicks in.
pub const ESCALATION_THRESHOLD: u32 = 3;

/// Sends a verified payload somewhere. Implemented by the server function
/// wrapper in the browser and by fakes in tests.
#[allow(async_fn_in_trait)]
pub trait Dispatch {
    async fn dispatch(&self, payload: FormPayload) -> SubmissionResult;
}

/// Failed challenge verifications for the current session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AttemptCounter(u32);

impl AttemptCounter {
    pub fn count(&self) -> u32 {
        self.0
    }

    /// Records a failure, returning `true` only on the failure that first
    /// reaches [`ESCALATION_THRESHOLD`].
    pub fn record_failure(&mut self) -> bool {
        self.0 = self.0.saturating_add(1);
        self.0 == ESCALATION_THRESHOLD
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Validating,
    /// A check failed. Behaves like `Idle` for the next submission.
    Blocked(BlockReason),
    /// Escalated: every further submission needs a hosted verification token.
    AwaitingSecondaryVerification,
    Sending,
    Succeeded,
    Failed,
}

/// Everything a submit click carries besides the stored fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitAttempt {
    pub honeypot: String,
    pub answer: String,
    pub verification_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A dispatch is already in flight.
    Busy,
    /// Honeypot tripped. Nothing is shown and nothing is sent.
    Discarded,
    Blocked(BlockReason),
    Sent,
    Failed,
}

/// Client-side owner of the contact form.
///
/// Turns raw input into a verified [`FormPayload`] and walks the
/// anti-automation ladder: silent honeypot, counted arithmetic challenges,
/// then hosted verification once [`ESCALATION_THRESHOLD`] wrong answers
/// have been seen.
#[derive(Debug)]
pub struct SubmissionGate {
    payload: FormPayload,
    generator: ChallengeGenerator,
    challenge: Challenge,
    attempts: AttemptCounter,
    escalated: bool,
    verification_enabled: bool,
    state: GateState,
    error: Option<BlockReason>,
    last_attempt: Option<SubmitAttempt>,
}

impl SubmissionGate {
    /// `verification_enabled` is whether a hosted verification site key is
    /// configured. Without one the escalation step is skipped.
    pub fn new(verification_enabled: bool) -> Self {
        Self::with_generator(ChallengeGenerator::new(), verification_enabled)
    }

    pub fn with_generator(mut generator: ChallengeGenerator, verification_enabled: bool) -> Self {
        let challenge = generator.generate();
        Self {
            payload: FormPayload::default(),
            generator,
            challenge,
            attempts: AttemptCounter::default(),
            escalated: false,
            verification_enabled,
            state: GateState::Idle,
            error: None,
            last_attempt: None,
        }
    }

    /// Attaches a randomness source and replaces the placeholder challenge.
    pub fn initialize(&mut self) {
        if !self.generator.is_initialized() {
            self.generator.initialize();
            self.challenge = self.generator.generate();
        }
    }

    pub fn set_verification_enabled(&mut self, enabled: bool) {
        self.verification_enabled = enabled;
        if matches!(
            self.state,
            GateState::Idle | GateState::AwaitingSecondaryVerification
        ) {
            self.state = self.resting_state();
        }
    }

    pub fn update_field(&mut self, field: Field, value: &str) {
        self.payload.set(field, value);
        if self.error.is_some_and(|e| e.field() == field) {
            self.error = None;
        }
    }

    /// Restores a cached draft through the same normalization as typed input.
    pub fn restore(&mut self, draft: &FormPayload) {
        for field in [
            Field::FirstName,
            Field::LastName,
            Field::Email,
            Field::Phone,
            Field::Subject,
            Field::Message,
        ] {
            if let Some(value) = draft.get(field) {
                self.payload.set(field, value);
            }
        }
    }

    pub fn payload(&self) -> &FormPayload {
        &self.payload
    }

    pub fn challenge(&self) -> Challenge {
        self.challenge
    }

    /// Draws a new question. Ignored while a failed attempt is waiting to be
    /// retried, since that attempt carries the answer to the current one.
    pub fn refresh_challenge(&mut self) {
        if !self.can_retry() {
            self.challenge = self.generator.generate();
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// The field-level error from the last blocked submission, if still relevant.
    pub fn error(&self) -> Option<BlockReason> {
        self.error
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.count()
    }

    pub fn requires_verification(&self) -> bool {
        self.escalated && self.verification_enabled
    }

    pub fn is_sending(&self) -> bool {
        self.state == GateState::Sending
    }

    pub fn can_retry(&self) -> bool {
        self.state == GateState::Failed && self.last_attempt.is_some()
    }

    /// Clears the form. The escalation is kept: only a successful
    /// submission lifts it.
    pub fn reset(&mut self) {
        self.payload = FormPayload::default();
        self.attempts.reset();
        self.error = None;
        self.last_attempt = None;
        self.challenge = self.generator.generate();
        self.state = self.resting_state();
    }

    fn resting_state(&self) -> GateState {
        if self.requires_verification() {
            GateState::AwaitingSecondaryVerification
        } else {
            GateState::Idle
        }
    }

    fn block(&mut self, reason: BlockReason) -> Outcome {
        self.error = Some(reason);
        self.state = if self.requires_verification() {
            GateState::AwaitingSecondaryVerification
        } else {
            GateState::Blocked(reason)
        };
        Outcome::Blocked(reason)
    }

    /// Runs every local check in order and, if they all pass, moves to
    /// `Sending` and hands back the payload to dispatch.
    ///
    /// Must be followed by [`SubmissionGate::complete`] once the dispatch
    /// resolves.
    pub fn prepare(&mut self, attempt: &SubmitAttempt) -> Result<FormPayload, Outcome> {
        self.check(attempt, true)
    }

    /// Like [`SubmissionGate::prepare`] for the stored failed attempt. The
    /// fields are checked again but the challenge is not: that attempt
    /// already answered it. `None` when there is nothing to retry.
    pub fn prepare_retry(&mut self) -> Option<Result<FormPayload, Outcome>> {
        let attempt = self.retry_attempt()?;
        Some(self.check(&attempt, false))
    }

    fn check(
        &mut self,
        attempt: &SubmitAttempt,
        verify_challenge: bool,
    ) -> Result<FormPayload, Outcome> {
        if self.is_sending() {
            return Err(Outcome::Busy);
        }
        self.state = GateState::Validating;

        if !attempt.honeypot.is_empty() {
            self.state = self.resting_state();
            return Err(Outcome::Discarded);
        }
        if let Err(reason) = self.payload.validate() {
            return Err(self.block(reason));
        }
        if verify_challenge && !self.challenge.verify(&attempt.answer) {
            self.challenge = self.generator.generate();
            if self.attempts.record_failure() {
                self.escalated = true;
            }
            return Err(self.block(BlockReason::WrongAnswer));
        }
        if self.requires_verification()
            && attempt
                .verification_token
                .as_deref()
                .is_none_or(|t| t.trim().is_empty())
        {
            return Err(self.block(BlockReason::VerificationRequired));
        }

        self.error = None;
        self.last_attempt = Some(attempt.clone());
        self.state = GateState::Sending;
        Ok(self.payload.clone())
    }

    /// Applies the dispatch result. Success wipes the session; failure keeps
    /// everything so the same attempt can be retried.
    pub fn complete(&mut self, result: SubmissionResult) -> Outcome {
        if result.success {
            self.payload = FormPayload::default();
            self.attempts.reset();
            self.escalated = false;
            self.error = None;
            self.last_attempt = None;
            self.challenge = self.generator.generate();
            self.state = GateState::Succeeded;
            Outcome::Sent
        } else {
            self.state = GateState::Failed;
            Outcome::Failed
        }
    }

    pub async fn submit<D: Dispatch>(&mut self, dispatcher: &D, attempt: SubmitAttempt) -> Outcome {
        let prepared = self.prepare(&attempt);
        self.finish(dispatcher, prepared).await
    }

    async fn finish<D: Dispatch>(
        &mut self,
        dispatcher: &D,
        prepared: Result<FormPayload, Outcome>,
    ) -> Outcome {
        match prepared {
            Ok(payload) => {
                let result = dispatcher.dispatch(payload).await;
                self.complete(result)
            }
            Err(outcome) => outcome,
        }
    }

    /// The attempt to replay after a failed dispatch.
    pub fn retry_attempt(&self) -> Option<SubmitAttempt> {
        if self.can_retry() {
            self.last_attempt.clone()
        } else {
            None
        }
    }

    pub async fn retry<D: Dispatch>(&mut self, dispatcher: &D) -> Option<Outcome> {
        let prepared = self.prepare_retry()?;
        Some(self.finish(dispatcher, prepared).await)
    }
}
