//! Form control state: current values, checkedness, entry lists and reset.

use crate::document::{Document, NodeKind};
use crate::{NodeKey, View as _};
use anyhow::{Result, bail};
use indextree::NodeId;

const CONTROL_TAGS: [&str; 3] = ["input", "select", "textarea"];

impl Document {
    fn is_control(&self, id: NodeId) -> bool {
        self.element_at(id)
            .is_some_and(|data| CONTROL_TAGS.contains(&data.tag.as_str()))
    }

    fn input_type(&self, id: NodeId) -> String {
        self.element_at(id)
            .and_then(|data| data.attr("type"))
            .unwrap_or("text")
            .to_ascii_lowercase()
    }

    fn is_checkable(&self, id: NodeId) -> bool {
        self.element_at(id).is_some_and(|data| data.tag == "input")
            && matches!(self.input_type(id).as_str(), "checkbox" | "radio")
    }

    fn text_below(&self, id: NodeId) -> String {
        id.descendants(&self.arena)
            .filter_map(|child| match self.kind(child) {
                Some(NodeKind::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Options of a select, in tree order.
    fn options_of(&self, select: NodeId) -> Vec<NodeId> {
        select
            .descendants(&self.arena)
            .filter(|id| self.element_at(*id).is_some_and(|data| data.tag == "option"))
            .collect()
    }

    fn option_value(&self, option: NodeId) -> String {
        self.element_at(option)
            .and_then(|data| data.attr("value"))
            .map_or_else(|| self.text_below(option).trim().to_owned(), str::to_owned)
    }

    /// Value a control has before the user touches it.
    fn default_value(&self, id: NodeId) -> String {
        let Some(data) = self.element_at(id) else {
            return String::new();
        };
        match data.tag.as_str() {
            "textarea" => self.text_below(id),
            "select" => {
                let options = self.options_of(id);
                options
                    .iter()
                    .copied()
                    .find(|option| {
                        self.element_at(*option)
                            .is_some_and(|opt| opt.attr("selected").is_some())
                    })
                    .or_else(|| options.first().copied())
                    .map(|option| self.option_value(option))
                    .unwrap_or_default()
            }
            _ => data.attr("value").unwrap_or_default().to_owned(),
        }
    }

    fn default_checked(&self, id: NodeId) -> bool {
        self.element_at(id)
            .is_some_and(|data| data.attr("checked").is_some())
    }

    fn restore_control(&mut self, id: NodeId) {
        let value = self.default_value(id);
        let checked = self.default_checked(id);
        if let Some(NodeKind::Element(data)) = self.arena.get_mut(id).map(|node| &mut node.get_mut().kind) {
            data.value = value;
            data.checked = checked;
        }
    }

    fn controls_of(&self, form: NodeId) -> Vec<NodeId> {
        form.descendants(&self.arena)
            .filter(|id| self.is_control(*id))
            .collect()
    }

    /// Seed every control in the document from its markup defaults.
    pub(crate) fn initialize_form_controls(&mut self) {
        let controls = self.controls_of(self.root);
        for id in controls {
            self.restore_control(id);
        }
    }

    pub(crate) fn set_control_value(&mut self, node: NodeKey, value: &str) -> Result<()> {
        let id = self.node_id(node)?;
        if self.tag_name(node).as_deref() == Some("select") {
            let known = self
                .options_of(id)
                .into_iter()
                .any(|option| self.option_value(option) == value);
            let data = self.element_mut(node)?;
            data.value = if known { value.to_owned() } else { String::new() };
            return Ok(());
        }
        self.element_mut(node)?.value = value.to_owned();
        Ok(())
    }

    /// Entry list of a form: named, enabled controls in tree order, skipping
    /// buttons and unchecked checkboxes or radios.
    pub(crate) fn collect_form_entries(&self, form: NodeKey) -> Result<Vec<(String, String)>> {
        let form_id = self.node_id(form)?;
        if self.element_at(form_id).is_none_or(|data| data.tag != "form") {
            bail!("node {form} is not a form");
        }
        let mut entries = Vec::new();
        for id in self.controls_of(form_id) {
            let Some(data) = self.element_at(id) else {
                continue;
            };
            let name = data.attr("name").unwrap_or_default();
            if name.is_empty() || data.attr("disabled").is_some() {
                continue;
            }
            if data.tag == "input"
                && matches!(
                    self.input_type(id).as_str(),
                    "button" | "submit" | "reset" | "file" | "image"
                )
            {
                continue;
            }
            let value = if self.is_checkable(id) {
                if !data.checked {
                    continue;
                }
                data.attr("value").unwrap_or("on").to_owned()
            } else {
                data.value.clone()
            };
            entries.push((name.to_owned(), value));
        }
        Ok(entries)
    }

    pub(crate) fn reset_form_controls(&mut self, form: NodeKey) -> Result<()> {
        let form_id = self.node_id(form)?;
        for id in self.controls_of(form_id) {
            self.restore_control(id);
        }
        Ok(())
    }
}
