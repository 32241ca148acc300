//! The editor variants an edit switch can flip into, plus the factory
//! that builds one from its manifest entry.

pub mod checkboxes;
pub mod date;
pub mod dropdown;
pub mod fields;
pub mod multi_dropdown;
pub mod multi_input;
pub mod new_value;
pub mod text;
pub mod text_area;
pub mod text_edit;
pub mod toggle;

pub use checkboxes::{CheckboxesEditor, NONE_SELECTED};
pub use date::DateEditor;
pub use dropdown::{Choice, DropdownEditor};
pub use fields::{FieldsEditor, FormField};
pub use multi_dropdown::MultiDropdownEditor;
pub use multi_input::MultiInputEditor;
pub use new_value::NewValueEditor;
pub use text::{TextEditor, TextFlavor};
pub use text_area::TextAreaEditor;
pub use toggle::ToggleEditor;

use crate::core::value::FieldValue;
use crate::manifest::{ChoiceManifest, FieldManifest, ManifestError, SubInputKind};
use crate::validate::CompiledConstraints;
use crate::widget::traits::{Editor, VariantKind};

fn choices(options: &[ChoiceManifest]) -> Vec<Choice> {
    options
        .iter()
        .map(|opt| Choice::new(opt.value(), opt.text()))
        .collect()
}

fn invalid(field: &FieldManifest, reason: impl Into<String>) -> ManifestError {
    ManifestError::Invalid {
        field: field.id.clone(),
        reason: reason.into(),
    }
}

fn compiled(field: &FieldManifest) -> Result<CompiledConstraints, ManifestError> {
    field
        .constraints
        .compile()
        .map_err(|err| invalid(field, format!("bad pattern: {err}")))
}

/// Build the editor a manifest field asks for. `roles` fields are
/// membership panels rather than edit switches and are rejected here.
pub fn build_editor(field: &FieldManifest) -> Result<Box<dyn Editor>, ManifestError> {
    let value = field.value.clone().unwrap_or_default();
    let editor: Box<dyn Editor> = match field.kind {
        VariantKind::PlainText => Box::new(
            TextEditor::new(TextFlavor::Plain)
                .with_value(value)
                .with_constraints(compiled(field)?),
        ),
        VariantKind::Integer => Box::new(
            TextEditor::new(TextFlavor::Integer)
                .with_value(value)
                .with_constraints(compiled(field)?),
        ),
        VariantKind::Url => Box::new(
            TextEditor::new(TextFlavor::Url)
                .with_value(value)
                .with_constraints(compiled(field)?),
        ),
        VariantKind::TextArea => Box::new(TextAreaEditor::new().with_text(&value)),
        VariantKind::Dropdown => {
            if field.options.is_empty() {
                return Err(invalid(field, "dropdown without options"));
            }
            Box::new(DropdownEditor::new(choices(&field.options)).with_selected_text(&value))
        }
        VariantKind::MultiDropdown => {
            if field.options.is_empty() {
                return Err(invalid(field, "multi-dropdown without options"));
            }
            Box::new(
                MultiDropdownEditor::new(choices(&field.options))
                    .with_marked_texts(&field.values),
            )
        }
        VariantKind::Toggle => {
            let flag = FieldValue::Text(value).to_flag().unwrap_or(false);
            let editor = ToggleEditor::new(flag);
            Box::new(if field.reload {
                editor.with_row_reload()
            } else {
                editor
            })
        }
        VariantKind::Checkboxes => Box::new(CheckboxesEditor::new(
            field
                .checks
                .iter()
                .map(|check| (check.name.clone(), check.checked)),
        )),
        VariantKind::Date => Box::new(DateEditor::new().with_label_text(&value)),
        VariantKind::MultiInput => Box::new(
            MultiInputEditor::new(field.values.clone()).with_constraints(compiled(field)?),
        ),
        VariantKind::NewValue => {
            if field.options.is_empty() {
                return Err(invalid(field, "new-value without options"));
            }
            Box::new(NewValueEditor::picked(choices(&field.options)))
        }
        VariantKind::NewFreeTextValue => {
            Box::new(NewValueEditor::free_text().with_constraints(compiled(field)?))
        }
        VariantKind::NewFreeTextMultiValue => {
            if field.fields.is_empty() {
                return Err(invalid(field, "form without sub-fields"));
            }
            let mut form_fields = Vec::with_capacity(field.fields.len());
            for sub in &field.fields {
                let form_field = match sub.input {
                    SubInputKind::Text => {
                        let constraints = sub.constraints.compile().map_err(|err| {
                            invalid(field, format!("bad pattern in `{}`: {err}", sub.name))
                        })?;
                        FormField::text_with_constraints(&sub.name, &sub.caption, constraints)
                    }
                    SubInputKind::Check => FormField::check(&sub.name, &sub.caption),
                    SubInputKind::Select => {
                        if sub.options.is_empty() {
                            return Err(invalid(
                                field,
                                format!("select `{}` without options", sub.name),
                            ));
                        }
                        FormField::select(&sub.name, &sub.caption, choices(&sub.options))
                    }
                };
                form_fields.push(form_field);
            }
            Box::new(FieldsEditor::new(form_fields))
        }
        VariantKind::Roles => {
            return Err(invalid(field, "roles fields are panels, not edit switches"));
        }
    };
    Ok(editor)
}
