// 📝 Edit-Form Validation
// Raw dialog input for a species record, validated whole-form with
// per-field error reports so the UI can highlight each offending control.

use crate::species::{Kingdom, Species, SpeciesEditValues};

// ============================================================================
// FIELD ERRORS
// ============================================================================

/// A validation failure attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}

// ============================================================================
// EDIT FORM
// ============================================================================

/// Raw text values as held by the edit dialog's five controls.
///
/// Everything is a `String` here; typing, trimming and absence are decided
/// by `validate`, which checks the entire form at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSpeciesForm {
    pub scientific_name: String,
    pub common_name: String,
    pub kingdom: String,
    pub total_population: String,
    pub description: String,
}

impl EditSpeciesForm {
    /// Seed the form from a store snapshot, the defaults a fresh edit
    /// dialog shows.
    pub fn from_species(species: &Species) -> Self {
        EditSpeciesForm {
            scientific_name: species.scientific_name.clone(),
            common_name: species.common_name.clone().unwrap_or_default(),
            kingdom: species.kingdom.as_str().to_string(),
            total_population: species
                .total_population
                .map(|p| p.to_string())
                .unwrap_or_default(),
            description: species.description.clone().unwrap_or_default(),
        }
    }

    /// Validate the whole form.
    ///
    /// Success yields normalized values (optionals absent rather than
    /// empty); failure yields one error per offending field. No field is
    /// accepted in isolation.
    pub fn validate(&self) -> Result<SpeciesEditValues, Vec<FieldError>> {
        let mut errors = Vec::new();

        let scientific_name = self.scientific_name.trim();
        if scientific_name.is_empty() {
            errors.push(FieldError::new("scientific_name", "Required field is empty"));
        }

        let kingdom = Kingdom::parse(&self.kingdom);
        if kingdom.is_none() {
            errors.push(FieldError::new(
                "kingdom",
                format!(
                    "Must be one of: {}",
                    Kingdom::ALL
                        .iter()
                        .map(Kingdom::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            ));
        }

        let total_population = match self.total_population.trim() {
            "" => None,
            raw => match raw.parse::<i64>() {
                Ok(n) if n >= 0 => Some(n),
                Ok(_) => {
                    errors.push(FieldError::new(
                        "total_population",
                        "Must be zero or greater",
                    ));
                    None
                }
                Err(_) => {
                    errors.push(FieldError::new(
                        "total_population",
                        "Must be a whole number",
                    ));
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(SpeciesEditValues {
            scientific_name: scientific_name.to_string(),
            common_name: optional_text(&self.common_name),
            // unwrap is safe: a None kingdom pushed an error above
            kingdom: kingdom.unwrap(),
            total_population,
            description: optional_text(&self.description),
        })
    }
}

/// Empty or whitespace-only input is stored as absent, never as "".
fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> EditSpeciesForm {
        EditSpeciesForm {
            scientific_name: "Panthera leo".to_string(),
            common_name: "Lion".to_string(),
            kingdom: "Animalia".to_string(),
            total_population: "20000".to_string(),
            description: "Large cat of the genus Panthera.".to_string(),
        }
    }

    #[test]
    fn test_valid_form_passes() {
        let values = valid_form().validate().unwrap();

        assert_eq!(values.scientific_name, "Panthera leo");
        assert_eq!(values.common_name, Some("Lion".to_string()));
        assert_eq!(values.kingdom, Kingdom::Animalia);
        assert_eq!(values.total_population, Some(20_000));
        assert!(values.description.is_some());
    }

    #[test]
    fn test_whitespace_scientific_name_fails_on_that_field() {
        let mut form = valid_form();
        form.scientific_name = "   ".to_string();

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "scientific_name");
    }

    #[test]
    fn test_optional_fields_normalize_to_absent() {
        let form = EditSpeciesForm {
            scientific_name: "Panthera leo".to_string(),
            common_name: "  ".to_string(),
            kingdom: "Animalia".to_string(),
            total_population: "".to_string(),
            description: String::new(),
        };

        let values = form.validate().unwrap();
        assert_eq!(values.common_name, None);
        assert_eq!(values.total_population, None);
        assert_eq!(values.description, None);
    }

    #[test]
    fn test_optional_text_is_trimmed_when_present() {
        let mut form = valid_form();
        form.common_name = "  Lion  ".to_string();
        form.scientific_name = "  Panthera leo  ".to_string();

        let values = form.validate().unwrap();
        assert_eq!(values.common_name, Some("Lion".to_string()));
        assert_eq!(values.scientific_name, "Panthera leo");
    }

    #[test]
    fn test_negative_population_rejected() {
        let mut form = valid_form();
        form.total_population = "-5".to_string();

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "total_population");
    }

    #[test]
    fn test_fractional_population_rejected() {
        let mut form = valid_form();
        form.total_population = "3.5".to_string();

        let errors = form.validate().unwrap_err();
        assert_eq!(errors[0].field, "total_population");
    }

    #[test]
    fn test_unknown_kingdom_rejected() {
        let mut form = valid_form();
        form.kingdom = "Mineralia".to_string();

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "kingdom");
        assert!(errors[0].message.contains("Animalia"));
    }

    #[test]
    fn test_kingdom_accepts_surrounding_whitespace() {
        let mut form = valid_form();
        form.kingdom = " Plantae ".to_string();

        let values = form.validate().unwrap();
        assert_eq!(values.kingdom, Kingdom::Plantae);
    }

    #[test]
    fn test_all_failures_reported_together() {
        let form = EditSpeciesForm {
            scientific_name: " ".to_string(),
            common_name: String::new(),
            kingdom: "rocks".to_string(),
            total_population: "-1".to_string(),
            description: String::new(),
        };

        let errors = form.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["scientific_name", "kingdom", "total_population"]
        );
    }

    #[test]
    fn test_form_seeded_from_species_snapshot() {
        let species = Species {
            id: "id-1".to_string(),
            scientific_name: "Panthera leo".to_string(),
            common_name: None,
            kingdom: Kingdom::Animalia,
            total_population: Some(20_000),
            description: None,
            author: "user-1".to_string(),
        };

        let form = EditSpeciesForm::from_species(&species);
        assert_eq!(form.scientific_name, "Panthera leo");
        assert_eq!(form.common_name, "");
        assert_eq!(form.kingdom, "Animalia");
        assert_eq!(form.total_population, "20000");

        // a round-trip through validate is a no-op edit
        let values = form.validate().unwrap();
        assert_eq!(values.common_name, None);
        assert_eq!(values.total_population, Some(20_000));
    }
}
