//! Declarative form validation.
//!
//! # Design
//! A `Form` owns the set of validators. Fields never talk to the form
//! directly: they get a `FormContext` and `subscribe` a predicate, receiving
//! a `Subscription` that unregisters the predicate when dropped (the field
//! unmounting). On `submit` the form runs every registered predicate, with
//! no short-circuit so each field refreshes its own errors, and only calls
//! the submit handler when all of them pass.
//!
//! Everything here lives on one UI thread, hence `Rc`/`RefCell`.

mod field;
mod rules;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::notify::{Notification, Notifier};

pub use field::{FieldKind, FormField, SelectOption};
pub use rules::{check_all, Rule, RuleKind};

type Validator = Rc<RefCell<dyn FnMut() -> bool>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// A registered validator. `live` is cleared on unsubscribe even when the
/// set cannot be borrowed at that moment; dead entries are pruned later.
struct Registered {
    validator: Validator,
    live: Rc<Cell<bool>>,
}

#[derive(Default)]
struct ValidatorSet {
    next_id: u64,
    validators: BTreeMap<SubscriptionId, Registered>,
}

impl ValidatorSet {
    fn insert(&mut self, validator: Validator) -> (SubscriptionId, Rc<Cell<bool>>) {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let live = Rc::new(Cell::new(true));
        self.validators.insert(
            id,
            Registered {
                validator,
                live: Rc::clone(&live),
            },
        );
        (id, live)
    }

    fn prune(&mut self) {
        self.validators.retain(|_, entry| entry.live.get());
    }
}

/// Result of `Form::submit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    Blocked { failed: usize },
}

pub struct Form {
    validators: Rc<RefCell<ValidatorSet>>,
    notifier: Rc<dyn Notifier>,
    failure_title: String,
    failure_message: String,
}

impl Form {
    pub fn new(notifier: Rc<dyn Notifier>) -> Self {
        Self {
            validators: Rc::new(RefCell::new(ValidatorSet::default())),
            notifier,
            failure_title: "Validation error".to_string(),
            failure_message: "Please correct the highlighted fields".to_string(),
        }
    }

    /// Override the aggregate notification raised when submission is blocked.
    pub fn with_failure_message(mut self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.failure_title = title.into();
        self.failure_message = message.into();
        self
    }

    /// Handle given to fields so they can register themselves.
    pub fn context(&self) -> FormContext {
        FormContext {
            validators: Rc::downgrade(&self.validators),
        }
    }

    /// Number of currently registered validators.
    pub fn registered(&self) -> usize {
        self.validators
            .borrow()
            .validators
            .values()
            .filter(|entry| entry.live.get())
            .count()
    }

    /// Run every validator and return how many failed.
    ///
    /// Validators are snapshotted first, so one that mounts or unmounts
    /// fields while running does not disturb this pass.
    pub fn validate(&self) -> usize {
        if let Ok(mut set) = self.validators.try_borrow_mut() {
            set.prune();
        }
        let snapshot: Vec<Validator> = self
            .validators
            .borrow()
            .validators
            .values()
            .filter(|entry| entry.live.get())
            .map(|entry| Rc::clone(&entry.validator))
            .collect();
        snapshot
            .iter()
            .map(|validator| {
                let mut check = validator.borrow_mut();
                (&mut *check)()
            })
            .filter(|passed| !passed)
            .count()
    }

    /// Validate everything; call `on_submit` only if all fields pass,
    /// otherwise raise one error notification.
    pub fn submit<F: FnOnce()>(&self, on_submit: F) -> SubmitOutcome {
        let failed = self.validate();
        if failed == 0 {
            on_submit();
            return SubmitOutcome::Submitted;
        }
        tracing::debug!(failed, "form submission blocked");
        self.notifier
            .notify(&Notification::error(&self.failure_title, &self.failure_message));
        SubmitOutcome::Blocked { failed }
    }
}

/// Weak handle to a form's validator set.
#[derive(Clone)]
pub struct FormContext {
    validators: Weak<RefCell<ValidatorSet>>,
}

impl FormContext {
    /// Register `validator`. It stays registered until the returned
    /// `Subscription` is dropped or unsubscribed.
    ///
    /// Subscribing after the form is gone returns a detached subscription.
    pub fn subscribe(&self, validator: impl FnMut() -> bool + 'static) -> Subscription {
        let registered = self.validators.upgrade().map(|set| {
            let validator: Validator = Rc::new(RefCell::new(validator));
            set.borrow_mut().insert(validator)
        });
        let (id, live) = match registered {
            Some((id, live)) => (Some(id), live),
            None => (None, Rc::new(Cell::new(false))),
        };
        Subscription {
            validators: self.validators.clone(),
            id,
            live,
        }
    }
}

/// Keeps a validator registered. Dropping it unregisters.
#[must_use = "dropping a Subscription unregisters the validator immediately"]
pub struct Subscription {
    validators: Weak<RefCell<ValidatorSet>>,
    id: Option<SubscriptionId>,
    live: Rc<Cell<bool>>,
}

impl Subscription {
    pub fn id(&self) -> Option<SubscriptionId> {
        self.id
    }

    pub fn is_active(&self) -> bool {
        if !self.live.get() {
            return false;
        }
        match (self.id, self.validators.upgrade()) {
            (Some(id), Some(set)) => set.borrow().validators.contains_key(&id),
            _ => false,
        }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Marks the validator dead first, so it never runs again even if the
    /// set is borrowed right now and the entry has to be pruned later.
    fn release(&mut self) {
        if !self.live.replace(false) {
            return;
        }
        if let (Some(id), Some(set)) = (self.id, self.validators.upgrade()) {
            if let Ok(mut set) = set.try_borrow_mut() {
                set.validators.remove(&id);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
