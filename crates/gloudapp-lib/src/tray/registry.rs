//! Ordered, declarative list of tray menu actions.
//!
//! Each action owns a [`MenuEntry`] (what the menu shows), an activation
//! handler and an optional refresh hook. [`ActionRegistry::prepare_for_display`]
//! runs the hooks in registration order right before the menu is shown; the
//! menu layer then mirrors [`ActionRegistry::entries`] onto native items.

use std::fmt;
use std::panic::AssertUnwindSafe;

use crate::errors::{safe_run, GloudError, Result};

/// Runs when the user picks the action.
pub type ActivationHandler = Box<dyn FnMut() -> Result<()>>;

/// Recomputes an entry's title or enabled flag before display.
pub type RefreshHandler = Box<dyn Fn(&mut MenuEntry) -> Result<()>>;

/// Stable handle of a registered action; its value is the display position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(usize);

impl ActionId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action#{}", self.0)
    }
}

/// What the menu shows for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub title: String,
    pub enabled: bool,
    pub separator_before: bool,
}

/// Registration options.
pub struct ActionOptions {
    enabled: bool,
    separator_before: bool,
    refresh: Option<RefreshHandler>,
}

impl Default for ActionOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            separator_before: false,
            refresh: None,
        }
    }
}

impl ActionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start out greyed out (until a refresh enables it).
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Draw a separator line above the action.
    pub fn separator_before(mut self) -> Self {
        self.separator_before = true;
        self
    }

    pub fn refresh<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut MenuEntry) -> Result<()> + 'static,
    {
        self.refresh = Some(Box::new(hook));
        self
    }
}

struct TrayAction {
    entry: MenuEntry,
    activate: ActivationHandler,
    refresh: Option<RefreshHandler>,
}

/// Menu actions in display order. Lives on the UI thread.
#[derive(Default)]
pub struct ActionRegistry {
    actions: Vec<TrayAction>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action; it is displayed after every earlier registration.
    pub fn register<F>(&mut self, title: impl Into<String>, options: ActionOptions, handler: F) -> ActionId
    where
        F: FnMut() -> Result<()> + 'static,
    {
        let id = ActionId(self.actions.len());
        self.actions.push(TrayAction {
            entry: MenuEntry {
                title: title.into(),
                enabled: options.enabled,
                separator_before: options.separator_before,
            },
            activate: Box::new(handler),
            refresh: options.refresh,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn entry(&self, id: ActionId) -> Option<&MenuEntry> {
        self.actions.get(id.0).map(|a| &a.entry)
    }

    /// Entries in display order.
    pub fn entries(&self) -> impl Iterator<Item = (ActionId, &MenuEntry)> {
        self.actions
            .iter()
            .enumerate()
            .map(|(i, a)| (ActionId(i), &a.entry))
    }

    /// Run every refresh hook, in registration order.
    ///
    /// A hook works on a copy of its entry; the copy's title and enabled flag
    /// are committed only when the hook returns `Ok`. Errors and panics are
    /// logged and leave the previous state on screen. Returns whether any
    /// entry changed.
    pub fn prepare_for_display(&mut self) -> bool {
        let mut changed = false;
        for (index, action) in self.actions.iter_mut().enumerate() {
            let Some(refresh) = action.refresh.as_ref() else {
                continue;
            };

            let mut draft = action.entry.clone();
            let outcome = safe_run(AssertUnwindSafe(|| refresh(&mut draft)));
            match outcome {
                Ok(()) => {
                    if draft.title != action.entry.title || draft.enabled != action.entry.enabled {
                        action.entry.title = draft.title;
                        action.entry.enabled = draft.enabled;
                        changed = true;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        action = index,
                        title = %action.entry.title,
                        "Menu refresh failed, keeping previous state: {}",
                        e
                    );
                }
            }
        }
        changed
    }

    /// Invoke the activation handler of `id`. Disabled actions are ignored.
    pub fn dispatch(&mut self, id: ActionId) -> Result<()> {
        let action = self
            .actions
            .get_mut(id.0)
            .ok_or_else(|| GloudError::Tray(format!("unknown menu {id}")))?;

        if !action.entry.enabled {
            tracing::debug!(title = %action.entry.title, "Ignoring activation of disabled action");
            return Ok(());
        }
        tracing::debug!(title = %action.entry.title, "Dispatching menu action");
        (action.activate)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn noop() -> Result<()> {
        Ok(())
    }

    #[test]
    fn test_register_preserves_order() {
        let mut registry = ActionRegistry::new();
        let a = registry.register("Take screenshot", ActionOptions::new(), noop);
        let b = registry.register("About", ActionOptions::new().separator_before(), noop);
        let c = registry.register("Quit", ActionOptions::new().separator_before(), noop);

        let ids: Vec<_> = registry.entries().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b, c]);
        assert!(registry.entry(b).unwrap().separator_before);
        assert!(!registry.entry(a).unwrap().separator_before);
    }

    #[test]
    fn test_dispatch_runs_handler() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let mut registry = ActionRegistry::new();
        let id = registry.register("About", ActionOptions::new(), move || {
            counter.set(counter.get() + 1);
            Ok(())
        });

        registry.dispatch(id).unwrap();
        registry.dispatch(id).unwrap();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_dispatch_unknown_id_is_error() {
        let mut registry = ActionRegistry::new();
        registry.register("Quit", ActionOptions::new(), noop);
        let err = registry.dispatch(ActionId(7)).unwrap_err();
        assert!(matches!(err, GloudError::Tray(_)));
    }

    #[test]
    fn test_dispatch_propagates_handler_error() {
        let mut registry = ActionRegistry::new();
        let id = registry.register("Upload file...", ActionOptions::new(), || {
            Err(GloudError::Dialog("no display".into()))
        });
        assert!(matches!(registry.dispatch(id), Err(GloudError::Dialog(_))));
    }

    #[test]
    fn test_disabled_action_is_not_dispatched() {
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let mut registry = ActionRegistry::new();
        let id = registry.register("Upload...", ActionOptions::new().disabled(), move || {
            flag.set(true);
            Ok(())
        });
        registry.dispatch(id).unwrap();
        assert!(!fired.get());
    }

    #[test]
    fn test_refresh_updates_title_and_enabled() {
        let source = Rc::new(RefCell::new(None::<String>));
        let seen = source.clone();
        let mut registry = ActionRegistry::new();
        let id = registry.register(
            "Upload...",
            ActionOptions::new().disabled().refresh(move |entry| {
                match seen.borrow().as_deref() {
                    Some(path) => {
                        entry.title = format!("Upload: {path}");
                        entry.enabled = true;
                    }
                    None => {
                        entry.title = "Upload...".into();
                        entry.enabled = false;
                    }
                }
                Ok(())
            }),
            noop,
        );

        assert!(!registry.prepare_for_display());
        *source.borrow_mut() = Some("/tmp/a.png".into());
        assert!(registry.prepare_for_display());
        let entry = registry.entry(id).unwrap();
        assert_eq!(entry.title, "Upload: /tmp/a.png");
        assert!(entry.enabled);
    }

    #[test]
    fn test_failed_refresh_keeps_previous_state() {
        let mut registry = ActionRegistry::new();
        let id = registry.register(
            "Upload: /tmp/a.png",
            ActionOptions::new().refresh(|entry| {
                entry.title = "half-written".into();
                entry.enabled = false;
                Err(GloudError::Clipboard("probe failed".into()))
            }),
            noop,
        );

        assert!(!registry.prepare_for_display());
        let entry = registry.entry(id).unwrap();
        assert_eq!(entry.title, "Upload: /tmp/a.png");
        assert!(entry.enabled);
    }

    #[test]
    fn test_panicking_refresh_is_contained() {
        let mut registry = ActionRegistry::new();
        let broken = registry.register(
            "Broken",
            ActionOptions::new().refresh(|entry| {
                entry.enabled = false;
                panic!("refresh exploded");
            }),
            noop,
        );
        let after = registry.register(
            "After",
            ActionOptions::new().refresh(|entry| {
                entry.title = "After (refreshed)".into();
                Ok(())
            }),
            noop,
        );

        registry.prepare_for_display();
        assert!(registry.entry(broken).unwrap().enabled);
        assert_eq!(registry.entry(after).unwrap().title, "After (refreshed)");
    }

    #[test]
    fn test_refresh_cannot_move_separator() {
        let mut registry = ActionRegistry::new();
        let id = registry.register(
            "About",
            ActionOptions::new().separator_before().refresh(|entry| {
                entry.separator_before = false;
                Ok(())
            }),
            noop,
        );
        registry.prepare_for_display();
        assert!(registry.entry(id).unwrap().separator_before);
    }

    #[derive(Debug, Clone)]
    enum Hook {
        None,
        Toggle,
        Rename,
        Fail,
    }

    fn hook_strategy() -> impl Strategy<Value = Hook> {
        prop_oneof![
            Just(Hook::None),
            Just(Hook::Toggle),
            Just(Hook::Rename),
            Just(Hook::Fail),
        ]
    }

    fn build(layout: &[(String, bool, Hook)]) -> ActionRegistry {
        let mut registry = ActionRegistry::new();
        for (title, separator, hook) in layout {
            let mut options = ActionOptions::new();
            if *separator {
                options = options.separator_before();
            }
            options = match hook {
                Hook::None => options,
                Hook::Toggle => options.refresh(|entry| {
                    entry.enabled = !entry.enabled;
                    Ok(())
                }),
                Hook::Rename => options.refresh(|entry| {
                    entry.title = format!("{}'", entry.title);
                    Ok(())
                }),
                Hook::Fail => options.refresh(|entry| {
                    entry.title.clear();
                    Err(GloudError::Tray("refresh failed".into()))
                }),
            };
            registry.register(title.clone(), options, noop);
        }
        registry
    }

    proptest! {
        #[test]
        fn prop_prepare_never_reorders_or_duplicates(
            layout in prop::collection::vec(("[a-z]{1,8}", any::<bool>(), hook_strategy()), 0..12),
            rounds in 1usize..5,
        ) {
            let mut registry = build(&layout);
            let before: Vec<(ActionId, MenuEntry)> =
                registry.entries().map(|(id, e)| (id, e.clone())).collect();

            for _ in 0..rounds {
                registry.prepare_for_display();
            }

            let after: Vec<(ActionId, MenuEntry)> =
                registry.entries().map(|(id, e)| (id, e.clone())).collect();
            prop_assert_eq!(after.len(), layout.len());

            for (i, ((id_before, old), (id_after, new))) in before.iter().zip(&after).enumerate() {
                prop_assert_eq!(id_before, id_after);
                prop_assert_eq!(id_after.index(), i);
                prop_assert_eq!(old.separator_before, new.separator_before);
                match layout[i].2 {
                    Hook::None | Hook::Fail => prop_assert_eq!(old, new),
                    Hook::Toggle => prop_assert_eq!(new.enabled, old.enabled ^ (rounds % 2 == 1)),
                    Hook::Rename => prop_assert!(new.title.starts_with(&old.title)),
                }
            }
        }
    }
}
