//! The command form: text, its validation and the analysis in progress

use crate::analysis::{
    AnalysisCoordinator, AnalysisResult, AnalysisState, PendingAnalysis, RequestId, Resolution,
    SubmitRejection,
};
use crate::error::ApiError;
use crate::grammar::{validate, ValidationState};

/// Example command and what it shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Example {
    pub command: &'static str,
    pub description: &'static str,
}

pub const EXAMPLES: [Example; 4] = [
    Example {
        command: "Agendá reunión con Juan el viernes a las 15:00",
        description: "Evento con día de la semana y hora",
    },
    Example {
        command: "Recordame pagar la factura de luz mañana",
        description: "Recordatorio para mañana",
    },
    Example {
        command: "Anotá cita médica el 12 de mayo a las 9:00",
        description: "Fecha completa con hora",
    },
    Example {
        command: "Recordame llevar el auto al mecánico el lunes",
        description: "Recordatorio con día de la semana",
    },
];

#[derive(Debug, Default)]
pub struct CommandForm {
    text: String,
    validation: ValidationState,
    coordinator: AnalysisCoordinator,
    /// A create call is in flight
    pub saving: bool,
    next_example: usize,
}

impl CommandForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn validation(&self) -> &ValidationState {
        &self.validation
    }

    pub fn analysis(&self) -> &AnalysisState {
        self.coordinator.state()
    }

    /// Replace the text. Any change revalidates and drops the current analysis.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.text {
            return;
        }
        self.text = text;
        self.validation = validate(&self.text);
        self.coordinator.reset();
    }

    /// Load the next example in the cycle, returning it
    pub fn next_example(&mut self) -> Example {
        let example = EXAMPLES[self.next_example % EXAMPLES.len()];
        self.next_example = (self.next_example + 1) % EXAMPLES.len();
        self.set_text(example.command);
        example
    }

    pub fn load_example(&mut self, index: usize) -> Option<Example> {
        let example = *EXAMPLES.get(index)?;
        self.next_example = (index + 1) % EXAMPLES.len();
        self.set_text(example.command);
        Some(example)
    }

    pub fn can_submit(&self) -> bool {
        self.validation.can_submit() && !self.analysis().is_analyzing()
    }

    pub fn submit(&mut self) -> Result<PendingAnalysis, SubmitRejection> {
        self.coordinator.begin(&self.text, &self.validation)
    }

    pub fn resolve(
        &mut self,
        request_id: RequestId,
        outcome: Result<AnalysisResult, ApiError>,
    ) -> Resolution {
        self.coordinator.resolve(request_id, outcome)
    }

    /// Empty the text and return to idle
    pub fn clear(&mut self) {
        self.set_text(String::new());
        self.coordinator.reset();
        self.saving = false;
    }
}
