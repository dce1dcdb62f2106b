//! Option list with at most one selected entry.

/// One entry of a selector: the value handed to handlers and the text shown.
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

    /// Option whose label is its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// A selector. Adding options to an empty selector selects the first one;
/// selecting a value that is not listed leaves nothing selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Select {
    options: Vec<SelectOption>,
    selected: Option<usize>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut select = Self::new();
        for v in values {
            select.push(SelectOption::plain(v));
        }
        select
    }

    pub fn clear(&mut self) {
        self.options.clear();
        self.selected = None;
    }

    pub fn push(&mut self, option: SelectOption) {
        self.options.push(option);
        if self.selected.is_none() {
            self.selected = Some(0);
        }
    }

    /// Replace all options, selecting the first.
    pub fn replace<I>(&mut self, options: I)
    where
        I: IntoIterator<Item = SelectOption>,
    {
        self.clear();
        for o in options {
            self.push(o);
        }
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|o| o.value.as_str())
    }

    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    /// Select the first option with `value`. Returns whether it was found.
    pub fn set_value(&mut self, value: &str) -> bool {
        self.selected = self.options.iter().position(|o| o.value == value);
        self.selected.is_some()
    }

    pub fn value(&self) -> Option<&str> {
        self.selected_option().map(|o| o.value.as_str())
    }

    pub fn label(&self) -> Option<&str> {
        self.selected_option().map(|o| o.label.as_str())
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn set_selected_index(&mut self, index: usize) {
        self.selected = (index < self.options.len()).then_some(index);
    }

    /// Move to the next option, wrapping to the first after the last.
    pub fn advance_wrapping(&mut self) {
        if self.options.is_empty() {
            self.selected = None;
            return;
        }
        let next = self.selected.map(|i| i + 1).unwrap_or(0);
        self.selected = Some(next % self.options.len());
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    fn selected_option(&self) -> Option<&SelectOption> {
        self.selected.and_then(|i| self.options.get(i))
    }
}
