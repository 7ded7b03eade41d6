//! Page scripts evaluated through the DevTools protocol.
//!
//! The identity provider renders its stages inside custom elements with
//! shadow roots, which `document.querySelector` cannot see into. Selectors are
//! therefore given as a chain: each link is searched for below the previous
//! match, descending through every open shadow root on the way.

use serde_json::json;

/// Deep query + action. Returns `false` when any link of the chain is missing.
const DEEP_ACTION: &str = r#"(chain, action, value) => {
  const find = (root, selector) => {
    const direct = root.querySelector(selector);
    if (direct) return direct;
    for (const el of root.querySelectorAll('*')) {
      if (el.shadowRoot) {
        const hit = find(el.shadowRoot, selector);
        if (hit) return hit;
      }
    }
    return null;
  };
  let scope = document;
  let el = null;
  for (const selector of chain) {
    el = find(scope, selector);
    if (!el) return false;
    scope = el.shadowRoot || el;
  }
  switch (action) {
    case 'visible': {
      const rect = el.getBoundingClientRect();
      return rect.width > 0 && rect.height > 0;
    }
    case 'fill':
      el.focus();
      el.value = value;
      el.dispatchEvent(new Event('input', { bubbles: true, composed: true }));
      el.dispatchEvent(new Event('change', { bubbles: true, composed: true }));
      return true;
    case 'click':
      el.click();
      return true;
    default:
      return true;
  }
}"#;

/// Status of the current document's navigation (0 while unknown)
pub const NAVIGATION_STATUS: &str =
    "(performance.getEntriesByType('navigation')[0] || {}).responseStatus || 0";

/// `document.readyState`
pub const READY_STATE: &str = "document.readyState";

/// What to do with the element at the end of a selector chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomAction<'a> {
    Exists,
    Visible,
    Fill(&'a str),
    Click,
}

impl DomAction<'_> {
    fn name(&self) -> &'static str {
        match self {
            DomAction::Exists => "exists",
            DomAction::Visible => "visible",
            DomAction::Fill(_) => "fill",
            DomAction::Click => "click",
        }
    }

    fn value(&self) -> &str {
        match self {
            DomAction::Fill(value) => value,
            _ => "",
        }
    }
}

/// Build the expression applying `action` to the element found by `chain`
pub fn deep_action(chain: &[&str], action: &DomAction<'_>) -> String {
    format!(
        "({})({}, {}, {})",
        DEEP_ACTION,
        json!(chain),
        json!(action.name()),
        json!(action.value())
    )
}
