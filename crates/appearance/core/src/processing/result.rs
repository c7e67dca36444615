//! Terminal results of processing one action.

use super::{ActionData, ActionMessage, Problem, Slowdown};
use crate::restriction::PermissionRef;
use crate::state::{CharacterId, GlobalState};

/// Accepted action: the caller may adopt `state`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ValidResult {
    pub state: GlobalState,
    pub messages: Vec<ActionMessage>,
    pub data: Vec<ActionData>,
    pub slowdown: Slowdown,
    pub required_permissions: Vec<PermissionRef>,
}

/// Rejected action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct InvalidResult {
    pub problems: Vec<Problem>,
    /// Character whose approval would turn this into a valid action.
    pub prompt: Option<CharacterId>,
    /// Pending messages; kept only while a prompt exists.
    pub messages: Vec<ActionMessage>,
    pub slowdown: Slowdown,
    pub required_permissions: Vec<PermissionRef>,
}

impl InvalidResult {
    pub fn new(
        problems: Vec<Problem>,
        messages: Vec<ActionMessage>,
        slowdown: Slowdown,
        required_permissions: Vec<PermissionRef>,
    ) -> Self {
        let mut result = Self {
            problems: Vec::with_capacity(problems.len()),
            prompt: None,
            messages,
            slowdown,
            required_permissions,
        };
        result.extend_problems(problems);
        result
    }

    fn extend_problems(&mut self, problems: impl IntoIterator<Item = Problem>) {
        for problem in problems {
            if !self.problems.contains(&problem) {
                self.problems.push(problem);
            }
        }
        self.prompt = prompt_target(&self.problems);
        if self.prompt.is_none() {
            self.messages.clear();
        }
    }
}

/// The single character every problem waits on, if all problems are prompts.
fn prompt_target(problems: &[Problem]) -> Option<CharacterId> {
    let mut targets = problems
        .iter()
        .map(|problem| problem.restriction().and_then(|restriction| restriction.prompt_target()));
    let first = targets.next()??;
    targets
        .all(|target| target == Some(first))
        .then(|| first.clone())
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "result", rename_all = "camelCase")
)]
pub enum ProcessingResult {
    Valid(ValidResult),
    Invalid(InvalidResult),
}

impl ProcessingResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn valid(&self) -> Option<&ValidResult> {
        match self {
            Self::Valid(result) => Some(result),
            Self::Invalid(_) => None,
        }
    }

    pub fn invalid(&self) -> Option<&InvalidResult> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(result) => Some(result),
        }
    }

    pub fn problems(&self) -> &[Problem] {
        match self {
            Self::Valid(_) => &[],
            Self::Invalid(result) => &result.problems,
        }
    }

    pub fn slowdown(&self) -> &Slowdown {
        match self {
            Self::Valid(result) => &result.slowdown,
            Self::Invalid(result) => &result.slowdown,
        }
    }

    pub fn required_permissions(&self) -> &[PermissionRef] {
        match self {
            Self::Valid(result) => &result.required_permissions,
            Self::Invalid(result) => &result.required_permissions,
        }
    }

    /// Layers extra problems on a finalized result; any problem makes it invalid.
    pub fn add_additional_problems(self, problems: impl IntoIterator<Item = Problem>) -> Self {
        let mut problems = problems.into_iter().peekable();
        if problems.peek().is_none() {
            return self;
        }
        match self {
            Self::Valid(valid) => Self::Invalid(InvalidResult::new(
                problems.collect(),
                valid.messages,
                valid.slowdown,
                valid.required_permissions,
            )),
            Self::Invalid(mut invalid) => {
                invalid.extend_problems(problems);
                Self::Invalid(invalid)
            }
        }
    }

    pub fn add_additional_slowdown(&mut self, slowdown: &Slowdown) {
        match self {
            Self::Valid(result) => result.slowdown.merge(slowdown),
            Self::Invalid(result) => result.slowdown.merge(slowdown),
        }
    }

    /// Rejects a valid but slowed-down result with `attemptRequired`.
    pub fn require_immediate(self) -> Self {
        if self.is_valid() && self.slowdown().requires_attempt() {
            self.add_additional_problems([Problem::AttemptRequired])
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::{ActionMessageId, SlowdownReason};
    use crate::restriction::Restriction;
    use crate::state::InteractionId;

    fn prompt_for(owner: &str) -> Problem {
        Restriction::MissingPermission {
            permission: PermissionRef::interaction(CharacterId::new(owner), InteractionId::Interact),
            prompt: true,
        }
        .into()
    }

    fn valid() -> ProcessingResult {
        ProcessingResult::Valid(ValidResult {
            state: GlobalState::default(),
            messages: vec![ActionMessage::new(ActionMessageId::ItemAdd, CharacterId::new("c1"))],
            data: Vec::new(),
            slowdown: Slowdown::default(),
            required_permissions: Vec::new(),
        })
    }

    #[test]
    fn prompt_requires_one_consistent_target() {
        let single = valid().add_additional_problems([prompt_for("c2"), prompt_for("c2")]);
        let single = single.invalid().unwrap();
        assert_eq!(single.problems.len(), 1);
        assert_eq!(single.prompt, Some(CharacterId::new("c2")));
        assert_eq!(single.messages.len(), 1);

        let mixed = valid().add_additional_problems([
            prompt_for("c2"),
            Restriction::BlockedHands.into(),
        ]);
        let mixed = mixed.invalid().unwrap();
        assert_eq!(mixed.prompt, None);
        assert!(mixed.messages.is_empty());

        let two_targets = valid().add_additional_problems([prompt_for("c2"), prompt_for("c3")]);
        assert_eq!(two_targets.invalid().unwrap().prompt, None);
    }

    #[test]
    fn no_additional_problems_keeps_valid() {
        assert!(valid().add_additional_problems(Vec::new()).is_valid());
    }

    #[test]
    fn slowed_results_require_an_attempt() {
        let mut result = valid();
        let mut slowdown = Slowdown::default();
        slowdown.add_reason(SlowdownReason::LimitedHands);
        result.add_additional_slowdown(&slowdown);

        let result = result.require_immediate();
        assert_eq!(result.problems(), [Problem::AttemptRequired]);
    }
}
