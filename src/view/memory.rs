use std::collections::HashMap;

use super::{ElementId, Notice, NoticeLevel, SelectOption, TableRow, View};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub text: String,
    pub classes: Vec<String>,
    pub value: Option<String>,
    pub rows: Vec<TableRow>,
    pub options: Vec<SelectOption>,
}

/// In-process view used by the terminal dashboard and by tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryView {
    elements: HashMap<ElementId, Element>,
    notices: Vec<Notice>,
}

impl MemoryView {
    /// A view with no elements; every write is dropped.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A view holding every element of the dashboard page, with the page's initial
    /// selector values.
    #[must_use]
    pub fn dashboard() -> Self {
        let mut view = Self::default();
        for id in ElementId::ALL {
            view.elements.insert(id, Element::default());
        }
        view.set_value(ElementId::TimeRange, "24");
        view.set_value(ElementId::DeviceSelect, "");
        view
    }

    #[must_use]
    pub fn with_element(mut self, id: ElementId) -> Self {
        self.elements.entry(id).or_default();
        self
    }

    pub fn remove_element(&mut self, id: ElementId) {
        self.elements.remove(&id);
    }

    /// Set an input value, as a user would by picking an option.
    pub fn set_value(&mut self, id: ElementId, value: &str) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.value = Some(value.to_string());
        }
    }

    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    #[must_use]
    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.elements.get(&id).map(|e| e.text.as_str())
    }

    #[must_use]
    pub fn class_name(&self, id: ElementId) -> Option<String> {
        self.elements.get(&id).map(|e| e.classes.join(" "))
    }

    #[must_use]
    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.elements
            .get(&id)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    #[must_use]
    pub fn rows(&self, id: ElementId) -> &[TableRow] {
        self.elements
            .get(&id)
            .map(|e| e.rows.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn options(&self, id: ElementId) -> &[SelectOption] {
        self.elements
            .get(&id)
            .map(|e| e.options.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

impl View for MemoryView {
    fn has_element(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    fn set_text(&mut self, id: ElementId, text: &str) {
        if let Some(element) = self.elements.get_mut(&id) {
            text.clone_into(&mut element.text);
        }
    }

    fn set_class_name(&mut self, id: ElementId, class_name: &str) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.classes = class_name.split_whitespace().map(str::to_string).collect();
        }
    }

    fn add_class(&mut self, id: ElementId, class: &str) {
        if let Some(element) = self.elements.get_mut(&id) {
            if !element.classes.iter().any(|c| c == class) {
                element.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, id: ElementId, class: &str) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.classes.retain(|c| c != class);
        }
    }

    fn value(&self, id: ElementId) -> Option<String> {
        self.elements.get(&id).and_then(|e| e.value.clone())
    }

    fn replace_rows(&mut self, id: ElementId, rows: Vec<TableRow>) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.rows = rows;
        }
    }

    fn replace_options(&mut self, id: ElementId, options: Vec<SelectOption>) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.options = options;
        }
    }

    fn show_notice(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::error!(message = %notice.message, "Notice"),
            NoticeLevel::Info => tracing::info!(message = %notice.message, "Notice"),
        }
        self.notices.push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_elements_ignore_writes() {
        let mut view = MemoryView::empty().with_element(ElementId::CurrentTemp);
        view.set_text(ElementId::CurrentHumidity, "50.0%");
        view.set_text(ElementId::CurrentTemp, "20.0°C");
        assert_eq!(view.text(ElementId::CurrentHumidity), None);
        assert_eq!(view.text(ElementId::CurrentTemp), Some("20.0°C"));
        assert!(!view.has_element(ElementId::DataTableBody));
    }

    #[test]
    fn class_list_operations() {
        let mut view = MemoryView::dashboard();
        view.set_class_name(ElementId::DeviceStatus, "text-success  fw-bold");
        view.add_class(ElementId::DeviceStatus, "data-update");
        view.add_class(ElementId::DeviceStatus, "data-update");
        assert_eq!(
            view.class_name(ElementId::DeviceStatus).as_deref(),
            Some("text-success fw-bold data-update")
        );
        view.remove_class(ElementId::DeviceStatus, "data-update");
        assert!(!view.has_class(ElementId::DeviceStatus, "data-update"));
    }

    #[test]
    fn dashboard_starts_with_selector_defaults() {
        let view = MemoryView::dashboard();
        assert_eq!(view.value(ElementId::TimeRange).as_deref(), Some("24"));
        assert_eq!(view.value(ElementId::DeviceSelect).as_deref(), Some(""));
        assert_eq!(view.value(ElementId::CurrentTemp), None);
    }
}
