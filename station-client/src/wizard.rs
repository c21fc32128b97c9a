//! Three-step FIR filing wizard.
//!
//! Complainant, incident and narrative fields are collected in order. Each
//! step boundary checks that the step's required fields are present (and, for
//! the complainant step, that the age is a number). The create payload can
//! only be built from the last step.

use crate::error::ValidationError;
use crate::types::FirCreate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Complainant,
    Incident,
    Narrative,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [
        WizardStep::Complainant,
        WizardStep::Incident,
        WizardStep::Narrative,
    ];

    pub fn index(&self) -> usize {
        match self {
            WizardStep::Complainant => 0,
            WizardStep::Incident => 1,
            WizardStep::Narrative => 2,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Complainant => "Complainant",
            WizardStep::Incident => "Incident",
            WizardStep::Narrative => "Narrative",
        }
    }

    /// Form fields that must be non-blank before leaving this step.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            WizardStep::Complainant => &[
                "fullname",
                "age",
                "gender",
                "address",
                "contact_number",
                "id_proof_type",
            ],
            WizardStep::Incident => &[
                "incident_date",
                "incident_time",
                "offence_type",
                "incident_location",
            ],
            WizardStep::Narrative => &["case_narrative"],
        }
    }

    fn next(self) -> Self {
        match self {
            WizardStep::Complainant => WizardStep::Incident,
            _ => WizardStep::Narrative,
        }
    }

    fn previous(self) -> Self {
        match self {
            WizardStep::Narrative => WizardStep::Incident,
            _ => WizardStep::Complainant,
        }
    }
}

/// Raw form input, exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilingForm {
    pub fullname: String,
    pub age: String,
    pub gender: String,
    pub address: String,
    pub contact_number: String,
    pub id_proof_type: String,
    pub id_proof_value: String,
    pub incident_date: String,
    pub incident_time: String,
    pub offence_type: String,
    pub incident_location: String,
    pub case_narrative: String,
}

impl FilingForm {
    /// Field value by wire name.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "fullname" => &self.fullname,
            "age" => &self.age,
            "gender" => &self.gender,
            "address" => &self.address,
            "contact_number" => &self.contact_number,
            "id_proof_type" => &self.id_proof_type,
            "id_proof_value" => &self.id_proof_value,
            "incident_date" => &self.incident_date,
            "incident_time" => &self.incident_time,
            "offence_type" => &self.offence_type,
            "incident_location" => &self.incident_location,
            "case_narrative" => &self.case_narrative,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Set a field by wire name. Returns false for an unknown name.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> bool {
        let slot = match name {
            "fullname" => &mut self.fullname,
            "age" => &mut self.age,
            "gender" => &mut self.gender,
            "address" => &mut self.address,
            "contact_number" => &mut self.contact_number,
            "id_proof_type" => &mut self.id_proof_type,
            "id_proof_value" => &mut self.id_proof_value,
            "incident_date" => &mut self.incident_date,
            "incident_time" => &mut self.incident_time,
            "offence_type" => &mut self.offence_type,
            "incident_location" => &mut self.incident_location,
            "case_narrative" => &mut self.case_narrative,
            _ => return false,
        };
        *slot = value.into();
        true
    }
}

/// Linear wizard state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingWizard {
    step: WizardStep,
    pub form: FilingForm,
}

impl Default for FilingWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl FilingWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Complainant,
            form: FilingForm::default(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Check the fields of `step` against the current form.
    pub fn validate_step(&self, step: WizardStep) -> Result<(), ValidationError> {
        let missing: Vec<&str> = step
            .required_fields()
            .iter()
            .copied()
            .filter(|name| self.form.field(name).map_or(true, |v| v.trim().is_empty()))
            .collect();

        if !missing.is_empty() {
            return Err(ValidationError::new(format!(
                "Please fill all required fields:\n{}",
                missing.join(", ")
            )));
        }

        if step == WizardStep::Complainant && parse_age(&self.form.age).is_none() {
            return Err(ValidationError::new("Age must be a number."));
        }
        Ok(())
    }

    /// Advance one step if the current one validates. Stays on the last step.
    pub fn next(&mut self) -> Result<WizardStep, ValidationError> {
        self.validate_step(self.step)?;
        self.step = self.step.next();
        Ok(self.step)
    }

    /// Go back one step. Never validates.
    pub fn back(&mut self) -> WizardStep {
        self.step = self.step.previous();
        self.step
    }

    /// Build the create payload. Only valid from the final step, and only
    /// when every step validates.
    pub fn build_payload(&self) -> Result<FirCreate, ValidationError> {
        if self.step != WizardStep::Narrative {
            return Err(ValidationError::new(format!(
                "Finish the {} step first.",
                self.step.title()
            )));
        }
        for step in WizardStep::ALL {
            self.validate_step(step)?;
        }

        let form = &self.form;
        let age = parse_age(&form.age).ok_or_else(|| ValidationError::new("Age must be a number."))?;
        let id_proof_value = Some(form.id_proof_value.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(FirCreate {
            fullname: form.fullname.trim().to_string(),
            age,
            gender: form.gender.trim().to_string(),
            address: form.address.trim().to_string(),
            contact_number: form.contact_number.trim().to_string(),
            id_proof_type: form.id_proof_type.trim().to_string(),
            id_proof_value,
            incident_date: form.incident_date.clone(),
            incident_time: form.incident_time.clone(),
            offence_type: form.offence_type.trim().to_string(),
            incident_location: form.incident_location.trim().to_string(),
            case_narrative: form.case_narrative.trim().to_string(),
        })
    }

    /// Clear the form and return to the first step.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

fn parse_age(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charlie() -> FilingForm {
        FilingForm {
            fullname: "Charlie Test".into(),
            age: "28".into(),
            gender: "Male".into(),
            address: "12 Test Lane".into(),
            contact_number: "9876543210".into(),
            id_proof_type: "Aadhar".into(),
            id_proof_value: String::new(),
            incident_date: "2025-11-06".into(),
            incident_time: "10:30".into(),
            offence_type: "Robbery".into(),
            incident_location: "Main Square".into(),
            case_narrative: "Bag snatched near the fountain".into(),
        }
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let wizard = FilingWizard::new();
        let err = wizard.validate_step(WizardStep::Complainant).unwrap_err();
        assert_eq!(
            err.message,
            "Please fill all required fields:\nfullname, age, gender, address, contact_number, id_proof_type"
        );
    }

    #[test]
    fn test_non_numeric_age_blocks_step_one() {
        let mut wizard = FilingWizard::new();
        wizard.form = FilingForm {
            age: "twenty".into(),
            ..charlie()
        };
        assert_eq!(wizard.next().unwrap_err().message, "Age must be a number.");
        assert_eq!(wizard.step(), WizardStep::Complainant);
    }

    #[test]
    fn test_walk_through_to_payload() {
        let mut wizard = FilingWizard::new();
        wizard.form = charlie();
        assert_eq!(wizard.next().unwrap(), WizardStep::Incident);
        assert_eq!(wizard.next().unwrap(), WizardStep::Narrative);
        assert_eq!(wizard.next().unwrap(), WizardStep::Narrative);

        let payload = wizard.build_payload().unwrap();
        assert_eq!(payload.age, 28);
        assert_eq!(payload.fullname, "Charlie Test");
        assert!(payload.id_proof_value.is_none());
    }

    #[test]
    fn test_payload_requires_final_step() {
        let mut wizard = FilingWizard::new();
        wizard.form = charlie();
        assert!(wizard.build_payload().is_err());
    }

    #[test]
    fn test_back_and_reset() {
        let mut wizard = FilingWizard::new();
        wizard.form = charlie();
        wizard.next().unwrap();
        assert_eq!(wizard.back(), WizardStep::Complainant);
        assert_eq!(wizard.back(), WizardStep::Complainant);

        wizard.reset();
        assert_eq!(wizard.step(), WizardStep::Complainant);
        assert!(wizard.form.fullname.is_empty());
    }

    #[test]
    fn test_blank_narrative_fails_on_submit() {
        let mut wizard = FilingWizard::new();
        wizard.form = charlie();
        wizard.next().unwrap();
        wizard.next().unwrap();
        wizard.form.case_narrative = "   ".into();
        assert_eq!(
            wizard.build_payload().unwrap_err().message,
            "Please fill all required fields:\ncase_narrative"
        );
    }

    #[test]
    fn test_set_field_by_name() {
        let mut form = FilingForm::default();
        assert!(form.set_field("offence_type", "Robbery"));
        assert!(!form.set_field("unknown", "x"));
        assert_eq!(form.field("offence_type"), Some("Robbery"));
    }
}
