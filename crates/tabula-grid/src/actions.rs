//! Row actions
//!
//! Actions are declared once per grid and resolved per row: the disabled
//! state may depend on the record, and destructive actions can require a
//! confirmation step before the handler runs.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Semantic kind of a row action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowActionKind {
    Edit,
    Delete,
    View,
    Custom,
}

/// Button styling for an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActionVariant {
    #[default]
    Default,
    Outline,
    Ghost,
    Destructive,
    Link,
    Secondary,
}

/// How row actions render in the actions column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RowActionsVariant {
    /// Icon buttons inline in the row
    #[default]
    Inline,
    /// Collapsed behind an overflow menu
    Menu,
}

impl RowActionsVariant {
    /// Width reserved for the actions column
    pub fn column_width(&self) -> u32 {
        match self {
            Self::Inline => 80,
            Self::Menu => 160,
        }
    }
}

enum Disabled<R> {
    Always(bool),
    When(Rc<dyn Fn(&R) -> bool>),
}

impl<R> Clone for Disabled<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Always(flag) => Self::Always(*flag),
            Self::When(predicate) => Self::When(predicate.clone()),
        }
    }
}

/// A single action attached to every row
pub struct RowAction<R> {
    kind: RowActionKind,
    label: String,
    variant: ActionVariant,
    icon: Option<String>,
    confirm: bool,
    disabled: Disabled<R>,
    handler: Rc<dyn Fn(&R)>,
}

impl<R> Clone for RowAction<R> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            label: self.label.clone(),
            variant: self.variant,
            icon: self.icon.clone(),
            confirm: self.confirm,
            disabled: self.disabled.clone(),
            handler: self.handler.clone(),
        }
    }
}

impl<R> std::fmt::Debug for RowAction<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowAction")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("confirm", &self.confirm)
            .finish_non_exhaustive()
    }
}

impl<R> RowAction<R> {
    pub fn new(
        kind: RowActionKind,
        label: impl Into<String>,
        handler: impl Fn(&R) + 'static,
    ) -> Self {
        Self {
            kind,
            label: label.into(),
            variant: ActionVariant::default(),
            icon: None,
            confirm: false,
            disabled: Disabled::Always(false),
            handler: Rc::new(handler),
        }
    }

    pub fn with_variant(mut self, variant: ActionVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Require a confirmation step before the handler runs
    pub fn with_confirm(mut self, confirm: bool) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Disabled::Always(disabled);
        self
    }

    /// Disable per row based on the record
    pub fn disabled_when(mut self, predicate: impl Fn(&R) -> bool + 'static) -> Self {
        self.disabled = Disabled::When(Rc::new(predicate));
        self
    }

    pub fn kind(&self) -> RowActionKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn requires_confirmation(&self) -> bool {
        self.confirm
    }

    pub fn is_disabled(&self, record: &R) -> bool {
        match &self.disabled {
            Disabled::Always(flag) => *flag,
            Disabled::When(predicate) => predicate(record),
        }
    }
}

/// Resolved per-row view of an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionView {
    pub kind: RowActionKind,
    pub label: String,
    pub variant: ActionVariant,
    pub icon: Option<String>,
    pub disabled: bool,
    pub requires_confirmation: bool,
}

/// Outcome of dispatching a row action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handler ran
    Invoked,
    /// Action requires confirmation and none was given
    NeedsConfirmation,
    /// Action is disabled for this row
    Disabled,
    /// No action at that index
    UnknownAction,
}

/// The grid's action set plus its rendering variant
pub struct RowActions<R> {
    actions: Vec<RowAction<R>>,
    variant: RowActionsVariant,
}

impl<R> Clone for RowActions<R> {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
            variant: self.variant,
        }
    }
}

impl<R> Default for RowActions<R> {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
            variant: RowActionsVariant::default(),
        }
    }
}

impl<R> std::fmt::Debug for RowActions<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowActions")
            .field("len", &self.actions.len())
            .field("variant", &self.variant)
            .finish()
    }
}

impl<R> RowActions<R> {
    pub fn new(variant: RowActionsVariant) -> Self {
        Self {
            actions: Vec::new(),
            variant,
        }
    }

    pub fn with_action(mut self, action: RowAction<R>) -> Self {
        self.actions.push(action);
        self
    }

    pub fn variant(&self) -> RowActionsVariant {
        self.variant
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Resolve the action views for one row
    pub fn views_for(&self, record: &R) -> Vec<ActionView> {
        self.actions
            .iter()
            .map(|action| ActionView {
                kind: action.kind,
                label: action.label.clone(),
                variant: action.variant,
                icon: action.icon.clone(),
                disabled: action.is_disabled(record),
                requires_confirmation: action.confirm,
            })
            .collect()
    }

    /// Run the action at `index` against a record
    ///
    /// Confirm-gated actions only run when `confirmed` is true; the
    /// caller shows the confirmation dialog and calls again.
    pub fn dispatch(&self, index: usize, record: &R, confirmed: bool) -> DispatchOutcome {
        let Some(action) = self.actions.get(index) else {
            return DispatchOutcome::UnknownAction;
        };
        if action.is_disabled(record) {
            return DispatchOutcome::Disabled;
        }
        if action.confirm && !confirmed {
            return DispatchOutcome::NeedsConfirmation;
        }
        (action.handler)(record);
        DispatchOutcome::Invoked
    }
}
