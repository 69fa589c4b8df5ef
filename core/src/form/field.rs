use std::cell::RefCell;
use std::rc::Rc;

use super::rules::{check_all, Rule};
use super::{FormContext, Subscription};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Input,
    Select(Vec<SelectOption>),
}

#[derive(Debug)]
struct FieldState {
    name: String,
    kind: FieldKind,
    value: String,
    rules: Vec<Rule>,
    errors: Vec<String>,
}

impl FieldState {
    fn validate(&mut self) -> bool {
        self.errors = check_all(&self.rules, &self.value);
        self.errors.is_empty()
    }
}

/// A mounted input or select bound to a form.
///
/// Mounting registers the field's validator with the form; dropping the
/// field unmounts it and unregisters the validator.
pub struct FormField {
    state: Rc<RefCell<FieldState>>,
    subscription: Subscription,
}

impl FormField {
    pub fn mount(ctx: &FormContext, name: impl Into<String>, kind: FieldKind, rules: Vec<Rule>) -> Self {
        let state = Rc::new(RefCell::new(FieldState {
            name: name.into(),
            kind,
            value: String::new(),
            rules,
            errors: Vec::new(),
        }));
        let bound = Rc::clone(&state);
        let subscription = ctx.subscribe(move || bound.borrow_mut().validate());
        Self { state, subscription }
    }

    pub fn input(ctx: &FormContext, name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self::mount(ctx, name, FieldKind::Input, rules)
    }

    pub fn select(
        ctx: &FormContext,
        name: impl Into<String>,
        options: Vec<SelectOption>,
        rules: Vec<Rule>,
    ) -> Self {
        Self::mount(ctx, name, FieldKind::Select(options), rules)
    }

    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    pub fn kind(&self) -> FieldKind {
        self.state.borrow().kind.clone()
    }

    pub fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    /// Typing does not validate; errors refresh on `validate` or submit.
    pub fn set_value(&self, value: impl Into<String>) {
        self.state.borrow_mut().value = value.into();
    }

    /// Pick a select option by value. Returns false, leaving the value
    /// unchanged, if the field is not a select or the value is not offered.
    pub fn choose(&self, value: &str) -> bool {
        let mut state = self.state.borrow_mut();
        let offered = match &state.kind {
            FieldKind::Select(options) => options.iter().any(|o| o.value == value),
            FieldKind::Input => false,
        };
        if offered {
            state.value = value.to_string();
        }
        offered
    }

    /// Validate now, e.g. on blur.
    pub fn validate(&self) -> bool {
        self.state.borrow_mut().validate()
    }

    pub fn errors(&self) -> Vec<String> {
        self.state.borrow().errors.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_active()
    }

    /// Unmount explicitly. Same as dropping the field.
    pub fn unmount(self) {}
}
