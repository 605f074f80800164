//! Task-scoped ambient state: the selected profile stack and the caller's
//! attribute bundle.
//!
//! Both live in `tokio::task_local!` slots, so two tasks never observe each
//! other's state. Frames are pushed for the dynamic extent of a future and
//! released when that future completes, fails, panics or is dropped.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

tokio::task_local! {
    static PROFILES: ProfileStack;
    static ATTRIBUTES: AttributeBundle;
}

/// Profile frames, most recent last. `None` is an explicit default frame.
#[derive(Debug, Clone, Default)]
struct ProfileStack(Vec<Option<Arc<str>>>);

/// The profile selected by the innermost enclosing frame, or `None` when the
/// default profile applies.
pub fn current_profile() -> Option<String> {
    PROFILES
        .try_with(|stack| stack.0.last().cloned().flatten())
        .ok()
        .flatten()
        .map(|name| name.to_string())
}

/// Number of profile frames enclosing the current task position.
pub fn depth() -> usize {
    PROFILES.try_with(|stack| stack.0.len()).unwrap_or(0)
}

/// Run `fut` with `profile` pushed on top of the profile stack.
///
/// `None` pushes a default frame, which hides any outer selection for the
/// duration of `fut`. The outer stack is restored on every exit path.
pub async fn enter<F: Future>(profile: Option<&str>, fut: F) -> F::Output {
    let mut stack = PROFILES.try_with(Clone::clone).unwrap_or_default();
    stack.0.push(profile.map(Arc::from));
    PROFILES.scope(stack, fut).await
}

/// Establish the attribute bundle for an externally originated call.
///
/// Only the outermost call sets the bundle. If one is already in place the
/// new bundle is ignored and `fut` runs with the existing one.
pub async fn scope<F: Future>(bundle: AttributeBundle, fut: F) -> F::Output {
    if ATTRIBUTES.try_with(|_| ()).is_ok() {
        tracing::warn!("attribute bundle already established, keeping the outer one");
        return fut.await;
    }
    ATTRIBUTES.scope(bundle, fut).await
}

/// Install `bundle` for the duration of `fut` regardless of what the task
/// held before. Used by dispatch workers.
pub(crate) async fn install<F: Future>(bundle: AttributeBundle, fut: F) -> F::Output {
    ATTRIBUTES.scope(bundle, fut).await
}

/// Snapshot of the attribute bundle visible to the current task. Empty when
/// no call established one.
pub fn current_attributes() -> AttributeBundle {
    ATTRIBUTES.try_with(Clone::clone).unwrap_or_default()
}

/// Caller-scoped metadata, such as a request id, propagated to the worker
/// that performs a send.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeBundle(Arc<BTreeMap<String, String>>);

impl AttributeBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.0).insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeBundle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter.into_iter().map(|(k, v)| (k.into(), v.into()));
        Self(Arc::new(entries.collect()))
    }
}

impl fmt::Display for AttributeBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for AttributeBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}
