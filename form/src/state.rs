//! The bound form: every control's state in one value.

use std::time::{SystemTime, UNIX_EPOCH};

use anketo_message::{SubmissionPayload, Timestamp};

/// Debt-status code that makes the delinquency-period select mandatory.
pub const DELINQUENT_CODE: &str = "delinquent";

pub(crate) const CONSENT_MESSAGE: &str = "プライバシーポリシーに同意してください。";
pub(crate) const GROUP_MESSAGE: &str = "1つ以上選択してください。";
pub(crate) const DELINQUENCY_MESSAGE: &str = "滞納期間を選択してください。";

/// Transient banner shown at the top of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Danger,
}

/// A text input, select-as-text, or textarea.
#[derive(Debug, Clone, Default)]
pub struct TextControl {
    pub value: String,
    pub required: bool,
    pub invalid: bool,
}

impl TextControl {
    fn required() -> Self {
        TextControl {
            required: true,
            ..TextControl::default()
        }
    }

    /// Native constraint check: required controls must be non-empty.
    pub fn check_validity(&self) -> bool {
        !self.required || !self.value.is_empty()
    }
}

/// A select element that can be conditionally required or disabled.
#[derive(Debug, Clone, Default)]
pub struct SelectControl {
    pub value: String,
    pub required: bool,
    pub disabled: bool,
    pub invalid: bool,
    /// Non-empty message makes the control fail validation, mirroring
    /// `setCustomValidity`.
    pub validation_message: String,
}

impl SelectControl {
    fn required() -> Self {
        SelectControl {
            required: true,
            ..SelectControl::default()
        }
    }

    pub fn check_validity(&self) -> bool {
        if self.disabled {
            // disabled controls never participate in constraint validation
            return true;
        }
        if !self.validation_message.is_empty() {
            return false;
        }
        !self.required || !self.value.is_empty()
    }
}

/// A radio group; at most one selected code.
#[derive(Debug, Clone, Default)]
pub struct RadioGroup {
    pub value: Option<String>,
    pub required: bool,
}

impl RadioGroup {
    fn required() -> Self {
        RadioGroup {
            required: true,
            ..RadioGroup::default()
        }
    }

    pub fn check_validity(&self) -> bool {
        !self.required || self.value.is_some()
    }
}

/// One checkbox within a multi-select group.
#[derive(Debug, Clone)]
pub struct CheckboxOption {
    pub code: &'static str,
    pub checked: bool,
    pub invalid: bool,
}

/// A multi-select checkbox group. Option order is definition order, which is
/// also the order codes appear in the serialized payload.
#[derive(Debug, Clone)]
pub struct CheckboxGroup {
    options: Vec<CheckboxOption>,
    pub feedback_visible: bool,
    /// Carried by the group's first checkbox in the markup.
    pub validation_message: String,
}

impl CheckboxGroup {
    fn new(codes: &'static [&'static str]) -> Self {
        CheckboxGroup {
            options: codes
                .iter()
                .map(|code| CheckboxOption {
                    code,
                    checked: false,
                    invalid: false,
                })
                .collect(),
            feedback_visible: false,
            validation_message: String::new(),
        }
    }

    pub fn options(&self) -> &[CheckboxOption] {
        &self.options
    }

    /// Returns false when the code is not part of this group.
    pub fn set_checked(&mut self, code: &str, checked: bool) -> bool {
        match self.options.iter_mut().find(|option| option.code == code) {
            Some(option) => {
                option.checked = checked;
                true
            }
            None => false,
        }
    }

    pub fn any_checked(&self) -> bool {
        self.options.iter().any(|option| option.checked)
    }

    /// Checked codes in definition order.
    pub fn checked_codes(&self) -> Vec<String> {
        self.options
            .iter()
            .filter(|option| option.checked)
            .map(|option| option.code.to_string())
            .collect()
    }

    /// True iff at least one option is checked. Side effects: every option's
    /// invalid mark, the group feedback visibility, and the validation
    /// message are all updated.
    pub fn validate_at_least_one_checked(&mut self) -> bool {
        let any_checked = self.any_checked();
        self.validation_message = if any_checked {
            String::new()
        } else {
            GROUP_MESSAGE.to_string()
        };
        for option in &mut self.options {
            option.invalid = !any_checked;
        }
        self.feedback_visible = !any_checked;
        any_checked
    }
}

/// The privacy-consent checkbox that gates submission.
#[derive(Debug, Clone, Default)]
pub struct ConsentControl {
    pub checked: bool,
    pub invalid: bool,
    pub feedback_visible: bool,
    pub validation_message: String,
}

/// The whole questionnaire as one value. Constructed once per page view;
/// every operation takes it by reference.
#[derive(Debug, Clone)]
pub struct QuestionnaireForm {
    pub last_name: TextControl,
    pub first_name: TextControl,
    pub last_name_kana: TextControl,
    pub first_name_kana: TextControl,
    pub postal_code: TextControl,
    pub prefecture: SelectControl,
    pub city: TextControl,
    pub street: TextControl,
    pub building: TextControl,
    pub phone: TextControl,
    pub email: TextControl,
    pub gender: RadioGroup,
    pub occupation: SelectControl,
    pub industry: TextControl,
    pub living_issues: CheckboxGroup,
    pub property_types: CheckboxGroup,
    pub site_area: TextControl,
    pub building_age: TextControl,
    pub loan_balance: TextControl,
    pub debt_status: RadioGroup,
    pub delinquency_period: SelectControl,
    pub notes: TextControl,
    pub privacy_consent: ConsentControl,
    /// Hidden honeypot; stays empty for real users.
    pub website: TextControl,
    /// Page-load clock, epoch millis; submitted as `formStartedAt`.
    pub started_at_ms: u64,
    pub submit_enabled: bool,
    pub was_validated: bool,
    pub alert: Option<Alert>,
    /// Pretty-printed payload + formatted message, shown in debug mode.
    pub debug_panel: Option<String>,
}

impl QuestionnaireForm {
    pub fn new() -> Self {
        let started_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();

        let mut form = QuestionnaireForm {
            last_name: TextControl::required(),
            first_name: TextControl::required(),
            last_name_kana: TextControl::required(),
            first_name_kana: TextControl::required(),
            postal_code: TextControl::required(),
            prefecture: SelectControl::required(),
            city: TextControl::required(),
            street: TextControl::required(),
            building: TextControl::default(),
            phone: TextControl::required(),
            email: TextControl::required(),
            gender: RadioGroup::required(),
            occupation: SelectControl::required(),
            industry: TextControl::default(),
            living_issues: CheckboxGroup::new(&[
                "mortgage",
                "unsecured_loan",
                "inheritance",
                "rent",
                "other",
            ]),
            property_types: CheckboxGroup::new(&["land", "house", "apartment"]),
            site_area: TextControl::default(),
            building_age: TextControl::default(),
            loan_balance: TextControl::default(),
            debt_status: RadioGroup::required(),
            delinquency_period: SelectControl::default(),
            notes: TextControl::default(),
            privacy_consent: ConsentControl::default(),
            website: TextControl::default(),
            started_at_ms,
            submit_enabled: false,
            was_validated: false,
            alert: None,
            debug_panel: None,
        };
        form.sync_delinquency_period_visibility();
        form.sync_privacy_consent_state();
        form
    }

    pub fn show_alert(&mut self, kind: AlertKind, message: impl Into<String>) {
        self.alert = Some(Alert {
            kind,
            message: message.into(),
        });
    }

    pub fn set_debt_status(&mut self, code: impl Into<String>) {
        self.debt_status.value = Some(code.into());
        self.sync_delinquency_period_visibility();
    }

    /// Delinquency period is mandatory and editable only while the selected
    /// debt status is "delinquent"; otherwise it is disabled and cleared.
    pub fn sync_delinquency_period_visibility(&mut self) {
        let is_delinquent = self.debt_status.value.as_deref() == Some(DELINQUENT_CODE);
        self.delinquency_period.required = is_delinquent;
        self.delinquency_period.disabled = !is_delinquent;
        if !is_delinquent {
            self.delinquency_period.value.clear();
            self.delinquency_period.invalid = false;
            self.delinquency_period.validation_message.clear();
        }
    }

    pub fn set_privacy_consent(&mut self, checked: bool) {
        self.privacy_consent.checked = checked;
        self.sync_privacy_consent_state();
    }

    /// Submission is gated on consent; the submit control follows it.
    pub fn sync_privacy_consent_state(&mut self) {
        let consent_ok = self.privacy_consent.checked;
        self.submit_enabled = consent_ok;
        self.privacy_consent.validation_message = if consent_ok {
            String::new()
        } else {
            CONSENT_MESSAGE.to_string()
        };
        if consent_ok {
            self.privacy_consent.invalid = false;
            self.privacy_consent.feedback_visible = false;
        }
    }

    pub fn show_privacy_consent_error(&mut self) {
        self.privacy_consent.invalid = true;
        self.privacy_consent.feedback_visible = true;
    }

    /// Advisory per-change validation for a multi-select group. No-op for
    /// codes outside the group.
    pub fn toggle_living_issue(&mut self, code: &str, checked: bool) {
        if self.living_issues.set_checked(code, checked) {
            self.living_issues.validate_at_least_one_checked();
        }
    }

    pub fn toggle_property_type(&mut self, code: &str, checked: bool) {
        if self.property_types.set_checked(code, checked) {
            self.property_types.validate_at_least_one_checked();
        }
    }

    /// Satisfied when not delinquent, or delinquent with a period chosen.
    pub fn delinquency_period_satisfied(&self) -> bool {
        self.debt_status.value.as_deref() != Some(DELINQUENT_CODE)
            || !self.delinquency_period.value.trim().is_empty()
    }

    fn text_controls(&self) -> [&TextControl; 15] {
        [
            &self.last_name,
            &self.first_name,
            &self.last_name_kana,
            &self.first_name_kana,
            &self.postal_code,
            &self.city,
            &self.street,
            &self.building,
            &self.phone,
            &self.email,
            &self.industry,
            &self.site_area,
            &self.building_age,
            &self.loan_balance,
            &self.notes,
        ]
    }

    fn select_controls(&self) -> [&SelectControl; 3] {
        [&self.prefecture, &self.occupation, &self.delinquency_period]
    }

    /// Native constraint validation across the whole form, including custom
    /// validation messages carried by the consent box and checkbox groups.
    pub fn check_validity(&self) -> bool {
        self.text_controls()
            .iter()
            .all(|control| control.check_validity())
            && self
                .select_controls()
                .iter()
                .all(|select| select.check_validity())
            && self.gender.check_validity()
            && self.debt_status.check_validity()
            && self.privacy_consent.validation_message.is_empty()
            && self.living_issues.validation_message.is_empty()
            && self.property_types.validation_message.is_empty()
    }

    /// Marks each scalar control invalid/valid. Checkbox and radio controls
    /// keep the styling applied by their own validation passes.
    pub fn apply_validation_styles(&mut self) {
        let marks: Vec<bool> = self
            .text_controls()
            .iter()
            .map(|control| !control.check_validity())
            .collect();
        for (control, invalid) in self.text_controls_mut().into_iter().zip(marks) {
            control.invalid = invalid;
        }

        let select_marks: Vec<bool> = self
            .select_controls()
            .iter()
            .map(|select| !select.check_validity())
            .collect();
        for (select, invalid) in self.select_controls_mut().into_iter().zip(select_marks) {
            select.invalid = invalid;
        }
    }

    fn text_controls_mut(&mut self) -> [&mut TextControl; 15] {
        [
            &mut self.last_name,
            &mut self.first_name,
            &mut self.last_name_kana,
            &mut self.first_name_kana,
            &mut self.postal_code,
            &mut self.city,
            &mut self.street,
            &mut self.building,
            &mut self.phone,
            &mut self.email,
            &mut self.industry,
            &mut self.site_area,
            &mut self.building_age,
            &mut self.loan_balance,
            &mut self.notes,
        ]
    }

    fn select_controls_mut(&mut self) -> [&mut SelectControl; 3] {
        [
            &mut self.prefecture,
            &mut self.occupation,
            &mut self.delinquency_period,
        ]
    }

    /// Serializes the form into the wire payload. Multi-selects become the
    /// ordered list of checked codes; a disabled delinquency-period select is
    /// omitted the way form serialization omits disabled controls.
    pub fn to_payload(&self) -> SubmissionPayload {
        SubmissionPayload {
            last_name: Some(self.last_name.value.clone()),
            first_name: Some(self.first_name.value.clone()),
            last_name_kana: Some(self.last_name_kana.value.clone()),
            first_name_kana: Some(self.first_name_kana.value.clone()),
            postal_code: Some(self.postal_code.value.clone()),
            prefecture: Some(self.prefecture.value.clone()),
            city: Some(self.city.value.clone()),
            street: Some(self.street.value.clone()),
            building: Some(self.building.value.clone()),
            phone: Some(self.phone.value.clone()),
            email: Some(self.email.value.clone()),
            gender: self.gender.value.clone(),
            occupation: Some(self.occupation.value.clone()),
            industry: Some(self.industry.value.clone()),
            living_issues: self.living_issues.checked_codes(),
            property_types: self.property_types.checked_codes(),
            site_area: Some(self.site_area.value.clone()),
            building_age: Some(self.building_age.value.clone()),
            loan_balance: Some(self.loan_balance.value.clone()),
            debt_status: self.debt_status.value.clone(),
            delinquency_period: (!self.delinquency_period.disabled)
                .then(|| self.delinquency_period.value.clone()),
            notes: Some(self.notes.value.clone()),
            website: Some(self.website.value.clone()),
            form_started_at: Some(Timestamp::Millis(self.started_at_ms as f64)),
        }
    }

    /// Restores construction defaults. The page-load timestamp, the alert
    /// banner, and the debug panel live outside the form proper and survive.
    pub fn reset(&mut self) {
        let started_at_ms = self.started_at_ms;
        let alert = self.alert.take();
        let debug_panel = self.debug_panel.take();
        *self = QuestionnaireForm::new();
        self.started_at_ms = started_at_ms;
        self.alert = alert;
        self.debug_panel = debug_panel;
    }
}

impl Default for QuestionnaireForm {
    fn default() -> Self {
        QuestionnaireForm::new()
    }
}
