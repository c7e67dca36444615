use super::{ActionData, ActionMessageId, ExecutionContext, ModuleActionError, ModuleFailureReason, ModuleRejectReason};
use crate::action::ActionTargetSelector;
use crate::state::{CharacterId, ItemId};

/// Command channel handed to item-module logic.
///
/// Modules never see the processing context. They report through this
/// channel and the `moduleAction` handler folds the collected commands back
/// into the transaction.
#[derive(Debug)]
pub struct ModuleActionContext<'a> {
    pub actor: &'a CharacterId,
    /// The actor may ignore self-blocking rules (safemode on themself).
    pub force: bool,
    pub execution: ExecutionContext,
    pub now: u64,
    target: ActionTargetSelector,
    item: ItemId,
    module: String,
    errors: Vec<ModuleActionError>,
    data: Vec<ActionData>,
    messages: Vec<ActionMessageId>,
}

/// Everything a module reported.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModuleActionReport {
    pub errors: Vec<ModuleActionError>,
    pub data: Vec<ActionData>,
    pub messages: Vec<ActionMessageId>,
}

impl<'a> ModuleActionContext<'a> {
    pub fn new(
        actor: &'a CharacterId,
        target: ActionTargetSelector,
        item: ItemId,
        module: impl Into<String>,
    ) -> Self {
        Self {
            actor,
            force: false,
            execution: ExecutionContext::Act,
            now: 0,
            target,
            item,
            module: module.into(),
            errors: Vec::new(),
            data: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_execution(mut self, execution: ExecutionContext, now: u64) -> Self {
        self.execution = execution;
        self.now = now;
        self
    }

    pub fn target(&self) -> &ActionTargetSelector {
        &self.target
    }

    pub fn item(&self) -> &ItemId {
        &self.item
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// The module refuses the action in the current state.
    pub fn reject(&mut self, reason: ModuleRejectReason) {
        self.errors.push(ModuleActionError::Reject {
            module: self.module.clone(),
            reason,
        });
    }

    /// The action payload does not fit the module.
    pub fn failure(&mut self, reason: ModuleFailureReason) {
        self.errors.push(ModuleActionError::Failure {
            module: self.module.clone(),
            reason,
        });
    }

    pub fn add_data(&mut self, data: ActionData) {
        self.data.push(data);
    }

    pub fn message(&mut self, id: ActionMessageId) {
        self.messages.push(id);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_report(self) -> ModuleActionReport {
        ModuleActionReport {
            errors: self.errors,
            data: self.data,
            messages: self.messages,
        }
    }
}
