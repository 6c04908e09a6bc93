use crate::models::{BOOKED, Record};
use crate::range::DateSelection;
use serde::{Deserialize, Serialize};

/// Dashboard view state. Transitions return a new value instead of mutating.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub selection: DateSelection,
    pub selected_status: Option<String>,
    pub selected_provider: Option<String>,
    pub status_collapsed: bool,
    pub provider_collapsed: bool,
}

impl ViewState {
    /// A new date selection drops any drill-down.
    pub fn with_selection(&self, selection: DateSelection) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    pub fn click_status(&self, status: &str) -> Self {
        if self.selected_status.as_deref() == Some(status) {
            return Self {
                status_collapsed: !self.status_collapsed,
                ..self.clone()
            };
        }
        Self {
            selected_status: Some(status.to_string()),
            selected_provider: None,
            status_collapsed: false,
            ..self.clone()
        }
    }

    pub fn click_provider(&self, provider: &str) -> Self {
        if self.selected_provider.as_deref() == Some(provider) {
            return Self {
                provider_collapsed: !self.provider_collapsed,
                ..self.clone()
            };
        }
        Self {
            selected_provider: Some(provider.to_string()),
            selected_status: None,
            provider_collapsed: false,
            ..self.clone()
        }
    }

    /// Rows for the open detail panel; empty when nothing is selected or the
    /// panel is collapsed.
    pub fn details<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        if let Some(status) = self.selected_status.as_deref() {
            if self.status_collapsed {
                return Vec::new();
            }
            return records
                .iter()
                .filter(|record| record.status_label() == status)
                .collect();
        }
        if let Some(provider) = self.selected_provider.as_deref() {
            if self.provider_collapsed {
                return Vec::new();
            }
            return records
                .iter()
                .filter(|record| record.provider_label() == provider)
                .filter(|record| record.status_label() == BOOKED)
                .collect();
        }
        Vec::new()
    }
}
