//! Parses the raw text submitted by the forms into validated values.
//!
//! Form fields are deserialized as strings so that non-numeric input becomes
//! a message next to the field instead of a rejected request. Missing fields
//! are treated as blank.

use std::fmt::Display;

use serde::Deserialize;

use crate::{
    family::{FamilyName, NewFamily},
    ledger::{FeeRate, PaymentAmount},
};

/// A problem with the value of a single form field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// The `name` of the form input.
    pub field: &'static str,
    /// What is wrong with the value, shown under the input.
    pub message: String,
}

/// The problems found in a submitted form, at most one per field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Display) {
        self.0.push(FieldError {
            field,
            message: message.to_string(),
        });
    }

    /// The error message for `field`, if it has one.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    /// Whether no field has an error.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect();

        write!(f, "{}", messages.join("; "))
    }
}

/// Parse `text` as a finite number.
///
/// Returns `Ok(None)` for blank text so the caller can decide whether the
/// field is required.
fn parse_number(text: &str, label: &str) -> Result<Option<f64>, String> {
    let text = text.trim();

    if text.is_empty() {
        return Ok(None);
    }

    match text.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(Some(number)),
        Ok(_) => Err(format!("{label} must be a finite number")),
        Err(_) => Err(format!("{label} must be a number, got \"{text}\"")),
    }
}

fn parse_required_number(text: &str, label: &str) -> Result<f64, String> {
    parse_number(text, label)?.ok_or_else(|| format!("{label} is required"))
}

/// The form data for adding a family.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddFamilyForm {
    /// The family name as typed.
    pub name: String,
    /// The land held in acres.
    pub land_area: String,
    /// The amount already owed. May be left blank.
    pub opening_due: String,
}

impl AddFamilyForm {
    /// Check every field and build the [NewFamily].
    ///
    /// # Errors
    /// Returns every field that is missing or invalid.
    pub fn validate(&self) -> Result<NewFamily, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = FamilyName::new(&self.name)
            .inspect_err(|error| errors.push("name", error))
            .ok();

        let land_area = match parse_required_number(&self.land_area, "Land area") {
            Ok(land_area) if land_area < 0.0 => {
                errors.push("land_area", "Land area cannot be negative");
                None
            }
            Ok(land_area) => Some(land_area),
            Err(message) => {
                errors.push("land_area", message);
                None
            }
        };

        let opening_due = match parse_number(&self.opening_due, "Opening balance") {
            Ok(opening_due) => Some(opening_due.unwrap_or(0.0)),
            Err(message) => {
                errors.push("opening_due", message);
                None
            }
        };

        match (name, land_area, opening_due) {
            (Some(name), Some(land_area), Some(opening_due)) if errors.is_empty() => {
                NewFamily::new(name, land_area, opening_due).map_err(|error| {
                    errors.push("land_area", error);
                    errors
                })
            }
            _ => Err(errors),
        }
    }
}

/// The form data for charging a periodic fee to every family.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PeriodicFeeForm {
    /// The fee per acre.
    pub rate: String,
}

impl PeriodicFeeForm {
    /// Check the rate and build the [FeeRate].
    ///
    /// # Errors
    /// Returns an error for `rate` if it is missing, not a number or not above zero.
    pub fn validate(&self) -> Result<FeeRate, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        match parse_required_number(&self.rate, "Rate per acre").map(FeeRate::new) {
            Ok(Ok(rate)) => return Ok(rate),
            Ok(Err(error)) => errors.push("rate", error),
            Err(message) => errors.push("rate", message),
        }

        Err(errors)
    }
}

/// The form data for recording a payment from a family.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentForm {
    /// The amount received.
    pub amount: String,
}

impl PaymentForm {
    /// Check the amount and build the [PaymentAmount].
    ///
    /// # Errors
    /// Returns an error for `amount` if it is missing, not a number or not above zero.
    pub fn validate(&self) -> Result<PaymentAmount, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        match parse_required_number(&self.amount, "Payment amount").map(PaymentAmount::new) {
            Ok(Ok(amount)) => return Ok(amount),
            Ok(Err(error)) => errors.push("amount", error),
            Err(message) => errors.push("amount", message),
        }

        Err(errors)
    }
}

#[cfg(test)]
mod add_family_form_tests {
    use crate::validation::AddFamilyForm;

    fn form(name: &str, land_area: &str, opening_due: &str) -> AddFamilyForm {
        AddFamilyForm {
            name: name.to_owned(),
            land_area: land_area.to_owned(),
            opening_due: opening_due.to_owned(),
        }
    }

    #[test]
    fn valid_form() {
        let new_family = form(" Kaur ", "1.5", "100").validate().unwrap();

        assert_eq!(new_family.name.as_ref(), "Kaur");
        assert_eq!(new_family.land_area, 1.5);
        assert_eq!(new_family.opening_due, 100.0);
    }

    #[test]
    fn blank_opening_due_is_zero() {
        let new_family = form("Singh", "2", "  ").validate().unwrap();

        assert_eq!(new_family.opening_due, 0.0);
    }

    #[test]
    fn negative_opening_due_is_allowed() {
        let new_family = form("Singh", "2", "-25.5").validate().unwrap();

        assert_eq!(new_family.opening_due, -25.5);
    }

    #[test]
    fn reports_every_invalid_field() {
        let errors = form("  ", "lots", "abc").validate().unwrap_err();

        assert_eq!(errors.get("name"), Some("Family name cannot be empty"));
        assert_eq!(
            errors.get("land_area"),
            Some("Land area must be a number, got \"lots\"")
        );
        assert_eq!(
            errors.get("opening_due"),
            Some("Opening balance must be a number, got \"abc\"")
        );
    }

    #[test]
    fn land_area_is_required() {
        let errors = form("Singh", "", "").validate().unwrap_err();

        assert_eq!(errors.get("land_area"), Some("Land area is required"));
        assert_eq!(errors.get("name"), None);
    }

    #[test]
    fn rejects_negative_land_area() {
        let errors = form("Singh", "-1", "").validate().unwrap_err();

        assert_eq!(errors.get("land_area"), Some("Land area cannot be negative"));
    }

    #[test]
    fn rejects_non_finite_numbers() {
        let errors = form("Singh", "inf", "NaN").validate().unwrap_err();

        assert_eq!(
            errors.get("land_area"),
            Some("Land area must be a finite number")
        );
        assert_eq!(
            errors.get("opening_due"),
            Some("Opening balance must be a finite number")
        );
    }
}

#[cfg(test)]
mod amount_form_tests {
    use crate::validation::{PaymentForm, PeriodicFeeForm};

    #[test]
    fn valid_rate() {
        let form = PeriodicFeeForm {
            rate: "500".to_owned(),
        };

        assert_eq!(form.validate().map(|rate| rate.as_f64()), Ok(500.0));
    }

    #[test]
    fn rate_must_be_positive() {
        for rate in ["0", "-10"] {
            let form = PeriodicFeeForm {
                rate: rate.to_owned(),
            };

            let errors = form.validate().unwrap_err();

            assert!(
                errors
                    .get("rate")
                    .is_some_and(|message| message.starts_with("Rate per acre must be greater than zero")),
                "got {errors:?} for rate {rate}"
            );
        }
    }

    #[test]
    fn rate_is_required() {
        let errors = PeriodicFeeForm::default().validate().unwrap_err();

        assert_eq!(errors.get("rate"), Some("Rate per acre is required"));
    }

    #[test]
    fn valid_payment() {
        let form = PaymentForm {
            amount: " 300.50 ".to_owned(),
        };

        assert_eq!(form.validate().map(|amount| amount.as_f64()), Ok(300.5));
    }

    #[test]
    fn payment_must_be_positive() {
        let form = PaymentForm {
            amount: "0".to_owned(),
        };

        let errors = form.validate().unwrap_err();

        assert!(
            errors
                .get("amount")
                .is_some_and(|message| message.starts_with("Payment amount must be greater than zero")),
            "got {errors:?}"
        );
    }

    #[test]
    fn non_numeric_payment_is_a_field_error() {
        let form = PaymentForm {
            amount: "three hundred".to_owned(),
        };

        let errors = form.validate().unwrap_err();

        assert_eq!(
            errors.get("amount"),
            Some("Payment amount must be a number, got \"three hundred\"")
        );
    }
}
