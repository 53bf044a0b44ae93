//! Undoable actions against a target, with a history to roll them back.

use bevy::log::{debug, warn};

use super::wallet::Wallet;

/// An action that can be applied to a `T` and reverted later.
///
/// The target is passed on every call, so a command never holds on to it.
pub trait Command<T>: Send + Sync {
    fn execute(&mut self, target: &mut T);

    /// Revert exactly what the last `execute` did.
    fn undo(&mut self, target: &mut T);
}

/// Executes commands and keeps them, most recent last, for undo.
pub struct CommandInvoker<T> {
    history: Vec<Box<dyn Command<T>>>,
}

impl<T> Default for CommandInvoker<T> {
    fn default() -> Self {
        Self {
            history: Vec::new(),
        }
    }
}

impl<T> CommandInvoker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn execute_command(&mut self, mut command: Box<dyn Command<T>>, target: &mut T) {
        command.execute(target);
        self.history.push(command);
    }

    /// Undo the most recent command. Returns false when there is nothing to undo.
    pub fn undo(&mut self, target: &mut T) -> bool {
        let Some(mut command) = self.history.pop() else {
            warn!("No commands to undo");
            return false;
        };

        command.undo(target);
        debug!("Undid command, {} left in history", self.history.len());
        true
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }
}

/// Credit `amount` of a soulstone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddSoulstone {
    pub stone_id: String,
    pub amount: i32,
}

impl AddSoulstone {
    pub fn new(stone_id: impl Into<String>, amount: i32) -> Self {
        Self {
            stone_id: stone_id.into(),
            amount,
        }
    }
}

impl Command<Wallet> for AddSoulstone {
    fn execute(&mut self, wallet: &mut Wallet) {
        wallet.update_amount(&self.stone_id, self.amount);
    }

    fn undo(&mut self, wallet: &mut Wallet) {
        wallet.update_amount(&self.stone_id, self.amount.wrapping_neg());
    }
}

/// Debit `amount` of a soulstone. The balance may drop below zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveSoulstone {
    pub stone_id: String,
    pub amount: i32,
}

impl RemoveSoulstone {
    pub fn new(stone_id: impl Into<String>, amount: i32) -> Self {
        Self {
            stone_id: stone_id.into(),
            amount,
        }
    }
}

impl Command<Wallet> for RemoveSoulstone {
    fn execute(&mut self, wallet: &mut Wallet) {
        wallet.update_amount(&self.stone_id, self.amount.wrapping_neg());
    }

    fn undo(&mut self, wallet: &mut Wallet) {
        wallet.update_amount(&self.stone_id, self.amount);
    }
}
