//! Synchronous yes/no gate in front of destructive actions.

/// Asks the user to confirm something. Declining aborts the action; it is
/// not an error.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// Says yes without asking. The default until the host installs a prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, _message: &str) -> bool {
        true
    }
}

/// Run `confirm` only when `required`.
pub fn confirmed(confirm: &mut dyn Confirm, required: bool, message: &str) -> bool {
    if !required {
        return true;
    }
    let answer = confirm.confirm(message);
    log::debug!("confirmation {message:?} -> {answer}");
    answer
}
