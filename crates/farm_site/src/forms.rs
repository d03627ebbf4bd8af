//! Booking and contact forms: submission stays on the page, shows a
//! confirmation banner, clears the form and logs the captured fields.

use crate::notifier::{Severity, show_message};
use anyhow::Result;
use dom::{Console, NodeKey, View};
use log::debug;
use page_handler::{EventTarget, EventType, Page};
use serde::Serialize;
use serde_json::{Map, Value};

pub const BOOKING_CONFIRMATION: &str =
    "Thank you for your booking request! We will contact you soon to confirm your farm tour.";
pub const CONTACT_CONFIRMATION: &str =
    "Thank you for your message! We will get back to you as soon as possible.";

/// Field values captured from a form. A repeated name keeps its first
/// position and its last value.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CapturedForm(Map<String, Value>);

impl CapturedForm {
    pub fn from_entries(entries: Vec<(String, String)>) -> Self {
        let mut fields = Map::new();
        for (name, value) in entries {
            fields.insert(name, Value::String(value));
        }
        Self(fields)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// # Errors
    /// Fails only if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// A form intercepted by the site.
#[derive(Clone, Copy, Debug)]
pub struct FormHandler {
    pub form: NodeKey,
    /// Prefix of the diagnostic log line.
    pub label: &'static str,
    pub confirmation: &'static str,
}

impl FormHandler {
    /// Capture the current field values.
    ///
    /// # Errors
    /// Fails when the form is gone.
    pub fn capture(&self, view: &dyn View) -> Result<CapturedForm> {
        Ok(CapturedForm::from_entries(view.form_entries(self.form)?))
    }
}

/// Intercept submission of `handler.form`.
pub fn install(page: &mut Page, handler: FormHandler) {
    page.add_listener(EventTarget::Node(handler.form), EventType::Submit, move |ctx, event| {
        event.prevent_default();
        let data = handler.capture(ctx.view)?;
        show_message(ctx, handler.confirmation, Severity::Success)?;
        ctx.view.reset_form(handler.form)?;
        Console::log(format!("{} Data: {}", handler.label, data.to_json()?));
        Ok(())
    });
}

/// Intercept whichever of the booking and contact forms the page has.
pub fn install_all(page: &mut Page, booking: Option<NodeKey>, contact: Option<NodeKey>) {
    let forms = [
        (booking, "Booking", BOOKING_CONFIRMATION),
        (contact, "Contact", CONTACT_CONFIRMATION),
    ];
    for (form, label, confirmation) in forms {
        let Some(form) = form else {
            debug!("{label} form missing, submission handler skipped");
            continue;
        };
        install(
            page,
            FormHandler {
                form,
                label,
                confirmation,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_names_keep_first_position_and_last_value() -> serde_json::Result<()> {
        let captured = CapturedForm::from_entries(vec![
            ("name".into(), "Ana".into()),
            ("date".into(), "2025-01-01".into()),
            ("name".into(), "Bea".into()),
        ]);
        assert_eq!(captured.len(), 2);
        assert_eq!(captured.get("name"), Some("Bea"));
        assert_eq!(captured.to_json()?, r#"{"name":"Bea","date":"2025-01-01"}"#);
        Ok(())
    }
}
